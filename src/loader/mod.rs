//! Page loading
//!
//! This module contains:
//! - `LoaderSettings`, which sequences pagination positions into URLs
//! - `PageLoader`, the fetch seam the worker consumes, and its HTTP implementation

mod http;
mod sequencer;

pub use http::{build_http_client, HttpLoader, PageLoader};
pub use sequencer::LoaderSettings;
