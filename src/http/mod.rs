//! HTTP protocol layer module
//!
//! Response bodies, response builders and the listing page, decoupled from routing.

pub mod body;
pub mod listing;
pub mod response;

// Re-export commonly used types
pub use body::{FileBody, ResponseBody};
pub use listing::render_listing;
pub use response::{build_error_response, build_file_response, build_listing_response};
