//! HTTP client module bound to a REST API root.

mod client;

pub use client::{DEFAULT_API_URL, HttpClient, normalize_api_url};
