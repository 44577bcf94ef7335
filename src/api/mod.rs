//! Generic REST fetch layer: path templates, the release route table, `Link`
//! header parsing and the paginated fetcher built on them.

pub mod endpoint;
pub mod link;
pub mod paginate;
pub mod template;

pub use endpoint::{ACCEPT_OCTET_STREAM, ACCEPT_STABLE, Endpoint};
pub use paginate::{FetchOptions, Page, PaginatedFetcher};
pub use template::{ResourcePath, render};
