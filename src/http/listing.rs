//! Directory listing page

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Bytes escaped in a link's path segment; non-ASCII is always escaped
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Render a listing for `user_path` (URL path of the directory, no leading slash).
///
/// One link per entry, separated by `<br>`. Links are absolute so they work
/// whether or not the request had a trailing slash, and each name is percent-encoded
/// so the link resolves back to the same entry.
pub fn render_listing(user_path: &str, entries: &[String]) -> String {
    let base = user_path.trim_matches('/');
    let links: Vec<String> = entries
        .iter()
        .map(|name| {
            let encoded = utf8_percent_encode(name, SEGMENT);
            let href = if base.is_empty() {
                format!("/{encoded}")
            } else {
                format!("/{base}/{encoded}")
            };
            format!(
                "<a href=\"{}\">{}</a>",
                escape_html(&href),
                escape_html(name)
            )
        })
        .collect();

    format!("Directory: {}<br>{}", escape_html(base), links.join("<br>"))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
