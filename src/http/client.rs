//! HTTP client bound to one REST API root.

use futures_util::TryStreamExt;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use url::Url;

use crate::error::ApiFetchError;

/// Public API root used when no other is configured.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// HTTP client that resolves relative request targets against an API root.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    api_url: String,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Turns a request target into a full URL. Absolute targets (as found in
    /// `Link` headers) are used as they are.
    pub fn resolve(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}/{}", self.api_url, target.trim_start_matches('/'))
        }
    }

    /// Whether `target` would be sent to the API root's scheme, host and port.
    /// Relative targets always are.
    pub fn is_same_origin(&self, target: &str) -> bool {
        if !(target.starts_with("http://") || target.starts_with("https://")) {
            return true;
        }
        match (Url::parse(target), Url::parse(&self.api_url)) {
            (Ok(target), Ok(root)) => target.origin() == root.origin(),
            _ => false,
        }
    }

    /// Performs a GET and fails on any non-2xx status.
    #[tracing::instrument(skip(self, query))]
    pub async fn get(
        &self,
        target: &str,
        accept: &str,
        query: &[(&str, String)],
    ) -> Result<Response, ApiFetchError> {
        let url = self.resolve(target);
        debug!("GET {} (accept {}) with query {:?}...", url, accept, query);

        let mut request = self.client.get(&url).header(ACCEPT, accept);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|source| ApiFetchError::Request {
            path: target.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiFetchError::Status {
                path: target.to_string(),
                status,
            });
        }
        Ok(response)
    }

    /// Performs a GET and exposes the response body as an async byte reader.
    #[tracing::instrument(skip(self))]
    pub async fn get_stream(
        &self,
        target: &str,
        accept: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, ApiFetchError> {
        let response = self.get(target, accept, &[]).await?;
        debug!(
            "Streaming {} (content-length {:?})",
            target,
            response.content_length()
        );
        Ok(Box::new(StreamReader::new(
            response.bytes_stream().map_err(std::io::Error::other),
        )))
    }
}

/// Maps a configured server address onto its REST API root. The public host
/// (`github.com` or `api.github.com`) maps to the public API; any other host is
/// treated as an Enterprise server whose API lives under `/api/v3`.
pub fn normalize_api_url(address: &str) -> anyhow::Result<String> {
    let url = Url::parse(address)?;
    match url.host_str() {
        Some("github.com") | Some("api.github.com") => Ok(DEFAULT_API_URL.to_string()),
        Some(_) => {
            let base = address.trim_end_matches('/');
            if base.ends_with("/api/v3") {
                Ok(base.to_string())
            } else {
                Ok(format!("{}/api/v3", base))
            }
        }
        None => anyhow::bail!("API URL has no host: {}", address),
    }
}
