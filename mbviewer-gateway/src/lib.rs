//! Backend gateway for mbviewer
//!
//! Typed access to the processing backend (file listing, conversion jobs,
//! analysis scripts, deletion), to the upload server, and an HTTP
//! [`PointCloudSource`](mbviewer_io::PointCloudSource) for LOD downloads.

pub mod config;
pub mod models;
pub mod client;
pub mod source;

pub use config::*;
pub use models::*;
pub use client::*;
pub use source::*;

use mbviewer_core::Error;

/// Map a transport error into the mbviewer error type
pub(crate) fn http_error(err: reqwest::Error) -> Error {
    match err.url() {
        Some(url) => Error::Http(format!("{} ({})", err, url)),
        None => Error::Http(err.to_string()),
    }
}
