//! Static file serving module
//!
//! Turns a resolved mount into a response: a streamed file download, a directory
//! listing, or a [`ServeError`].

use crate::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::{self, FileBody, ResponseBody};
use crate::logger;
use crate::routing::MountMatch;
use hyper::header::HeaderValue;
use hyper::Response;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve whatever the resolved mount points at
pub async fn serve(
    ctx: &RequestContext<'_>,
    mount: &MountMatch<'_>,
) -> Result<Response<ResponseBody>, ServeError> {
    let target = mount.target()?;
    if ctx.request_logging {
        logger::log_resolved(&target);
    }

    let metadata = fs::metadata(&target)
        .await
        .map_err(|e| ServeError::from_stat(target.clone(), e))?;

    if metadata.is_dir() {
        serve_listing(ctx, mount, target).await
    } else if metadata.is_file() {
        serve_file(ctx, target, metadata.len()).await
    } else {
        Err(ServeError::ResourceInaccessible {
            path: target,
            source: io::Error::other("not a regular file or directory"),
        })
    }
}

async fn serve_file(
    ctx: &RequestContext<'_>,
    target: PathBuf,
    size: u64,
) -> Result<Response<ResponseBody>, ServeError> {
    let disposition = content_disposition(&target)?;
    let file = fs::File::open(&target)
        .await
        .map_err(|e| ServeError::from_stat(target.clone(), e))?;

    let body = FileBody::new(file, target, size, ctx.request_logging);
    Ok(http::build_file_response(body, size, disposition))
}

/// `attachment; filename="<name>"`, refused when the name cannot go in a header
fn content_disposition(target: &Path) -> Result<HeaderValue, ServeError> {
    let filename = target
        .file_name()
        .map(|name| name.to_string_lossy().replace('"', ""))
        .unwrap_or_default();
    HeaderValue::try_from(format!("attachment; filename=\"{filename}\""))
        .map_err(|e| ServeError::ResourceInaccessible {
            path: target.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })
}

async fn serve_listing(
    ctx: &RequestContext<'_>,
    mount: &MountMatch<'_>,
    target: PathBuf,
) -> Result<Response<ResponseBody>, ServeError> {
    if !ctx.directory_listing {
        return Err(ServeError::ListingDisabled(target));
    }

    let entries = read_entries(&target)
        .await
        .map_err(|source| ServeError::DirectoryRead {
            path: target.clone(),
            source,
        })?;

    let html = http::render_listing(&mount.user_path(), &entries);
    if ctx.request_logging {
        logger::log_listing_returned(&target, entries.len());
    }
    Ok(http::build_listing_response(html))
}

/// Names of the direct children of `dir`, sorted
async fn read_entries(dir: &Path) -> io::Result<Vec<String>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort_unstable();
    Ok(names)
}
