//! Sequential fetching of paginated collections.

use log::{debug, warn};
use reqwest::header::LINK;
use serde::de::DeserializeOwned;

use crate::error::ApiFetchError;
use crate::http::HttpClient;

use super::link;

/// Bounds for a paginated fetch. The default fetches every page with the
/// server's default page size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Items per page, sent as `per_page` on the first request.
    pub page_size: Option<u32>,
    /// Maximum number of pages to fetch. The first page is always fetched.
    pub page_count: Option<u32>,
    /// Page to start from, sent as `page` on the first request.
    pub start_page: Option<u32>,
}

impl FetchOptions {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = Some(page_count);
        self
    }

    pub fn with_start_page(mut self, start_page: u32) -> Self {
        self.start_page = Some(start_page);
        self
    }

    fn first_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(size) = self.page_size {
            query.push(("per_page", size.to_string()));
        }
        if let Some(page) = self.start_page {
            query.push(("page", page.to_string()));
        }
        query
    }

    fn allows_another(&self, fetched: u32) -> bool {
        self.page_count.is_none_or(|cap| fetched < cap)
    }
}

/// One decoded page. Without a `next` target this is the last page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

/// Turns a request target into a fully materialized, ordered `Vec<T>` by
/// following `rel="next"` links.
#[derive(Clone)]
pub struct PaginatedFetcher {
    http: HttpClient,
}

impl PaginatedFetcher {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Fetches and decodes a single page.
    #[tracing::instrument(skip(self, query))]
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        target: &str,
        accept: &str,
        query: &[(&str, String)],
    ) -> Result<Page<T>, ApiFetchError> {
        let response = self.http.get(target, accept, query).await?;
        let status = response.status();

        let link_header = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiFetchError::Request {
                path: target.to_string(),
                source,
            })?;

        let items: Vec<T> =
            serde_json::from_slice(&body).map_err(|source| ApiFetchError::Decode {
                path: target.to_string(),
                status,
                source,
            })?;

        // Only links back to the API root's origin are followed.
        let next = link_header
            .as_deref()
            .and_then(link::next_link)
            .filter(|next| {
                let same_origin = self.http.is_same_origin(next);
                if !same_origin {
                    warn!("Ignoring next link to a foreign origin: {}", next);
                }
                same_origin
            });
        if let Some(last) = link_header
            .as_deref()
            .and_then(|header| link::find_rel(header, "last"))
        {
            debug!("{} item(s) from {}, last page is {}", items.len(), target, last);
        }

        Ok(Page { items, next })
    }

    /// Fetches every page starting at `initial`, in server order. Any failing
    /// page discards everything fetched so far.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        initial: &str,
        accept: &str,
        options: FetchOptions,
    ) -> Result<Vec<T>, ApiFetchError> {
        let mut items = Vec::new();
        let mut target = initial.to_string();
        let mut query = options.first_query();
        let mut fetched: u32 = 0;

        loop {
            debug!("Fetching page {} from {}...", fetched + 1, target);
            let page: Page<T> = self.fetch_page(&target, accept, &query).await?;
            fetched += 1;
            items.extend(page.items);

            match page.next {
                Some(next) if options.allows_another(fetched) => {
                    target = next;
                    // The continuation link already carries its own query.
                    query.clear();
                }
                _ => break,
            }
        }

        debug!("Fetched {} item(s) in {} page(s) from {}", items.len(), fetched, initial);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Client, StatusCode};

    fn fetcher(url: &str) -> PaginatedFetcher {
        PaginatedFetcher::new(HttpClient::new(Client::new(), url))
    }

    fn page_body(start: u32, count: u32) -> String {
        let items: Vec<String> = (start..start + count).map(|i| i.to_string()).collect();
        format!("[{}]", items.join(","))
    }

    #[tokio::test]
    async fn test_fetch_all_follows_next_links() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();
        let first_links = format!(
            r#"<{}/items?page=2>; rel="next", <{}/items?page=3>; rel="last""#,
            url, url
        );

        let p1 = server
            .mock("GET", "/items")
            .with_status(200)
            .with_header("link", &first_links)
            .with_body(page_body(0, 10))
            .expect(1)
            .create_async()
            .await;
        let p2 = server
            .mock("GET", "/items?page=2")
            .with_status(200)
            .with_header("link", &format!(r#"<{}/items?page=3>; rel="next""#, url))
            .with_body(page_body(10, 10))
            .expect(1)
            .create_async()
            .await;
        let p3 = server
            .mock("GET", "/items?page=3")
            .with_status(200)
            .with_header("link", &format!(r#"<{}/items?page=1>; rel="first""#, url))
            .with_body(page_body(20, 10))
            .expect(1)
            .create_async()
            .await;

        let items: Vec<u32> = fetcher(&url)
            .fetch_all("items", "application/json", FetchOptions::default())
            .await
            .unwrap();

        p1.assert_async().await;
        p2.assert_async().await;
        p3.assert_async().await;
        assert_eq!(items, (0..30).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_fetch_all_stops_without_next_even_when_short() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let p1 = server
            .mock("GET", "/items?per_page=10")
            .with_status(200)
            .with_body(page_body(0, 3))
            .expect(1)
            .create_async()
            .await;
        let p2 = server
            .mock("GET", "/items?page=2")
            .with_status(200)
            .with_body(page_body(3, 3))
            .expect(0)
            .create_async()
            .await;

        let items: Vec<u32> = fetcher(&url)
            .fetch_all(
                "items",
                "application/json",
                FetchOptions::default().with_page_size(10),
            )
            .await
            .unwrap();

        p1.assert_async().await;
        p2.assert_async().await;
        assert_eq!(items, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_fetch_all_respects_page_count() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let p1 = server
            .mock("GET", "/items?per_page=2&page=4")
            .with_status(200)
            .with_header("link", &format!(r#"<{}/items?page=5>; rel="next""#, url))
            .with_body(page_body(0, 2))
            .expect(1)
            .create_async()
            .await;
        let p2 = server
            .mock("GET", "/items?page=5")
            .with_status(200)
            .with_header("link", &format!(r#"<{}/items?page=6>; rel="next""#, url))
            .with_body(page_body(2, 2))
            .expect(1)
            .create_async()
            .await;
        let p3 = server
            .mock("GET", "/items?page=6")
            .with_status(200)
            .with_body(page_body(4, 2))
            .expect(0)
            .create_async()
            .await;

        let options = FetchOptions::default()
            .with_page_size(2)
            .with_start_page(4)
            .with_page_count(2);
        let items: Vec<u32> = fetcher(&url)
            .fetch_all("items", "application/json", options)
            .await
            .unwrap();

        p1.assert_async().await;
        p2.assert_async().await;
        p3.assert_async().await;
        assert_eq!(items, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_all_failing_page_discards_everything() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _p1 = server
            .mock("GET", "/items")
            .with_status(200)
            .with_header("link", &format!(r#"<{}/items?page=2>; rel="next""#, url))
            .with_body(page_body(0, 10))
            .create_async()
            .await;
        let _p2 = server
            .mock("GET", "/items?page=2")
            .with_status(502)
            .create_async()
            .await;

        let err = fetcher(&url)
            .fetch_all::<u32>("items", "application/json", FetchOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(err.path(), format!("{}/items?page=2", url));
    }

    #[tokio::test]
    async fn test_fetch_page_decode_failure() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/items")
            .with_status(200)
            .with_body(r#"{"message": "not a list"}"#)
            .create_async()
            .await;

        let err = fetcher(&url)
            .fetch_page::<u32>("items", "application/json", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiFetchError::Decode { .. }));
        assert_eq!(err.status(), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_fetch_page_reports_next() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/items")
            .with_status(200)
            .with_header("link", r#"</items?page=2>; rel="next""#)
            .with_body("[1]")
            .create_async()
            .await;

        let page: Page<u32> = fetcher(&url)
            .fetch_page("items", "application/json", &[])
            .await
            .unwrap();

        assert_eq!(page.items, vec![1]);
        assert_eq!(page.next.as_deref(), Some("/items?page=2"));
    }

    #[tokio::test]
    async fn test_fetch_all_ignores_next_link_to_foreign_origin() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let p1 = server
            .mock("GET", "/items")
            .with_status(200)
            .with_header("link", r#"<http://elsewhere.invalid/items?page=2>; rel="next""#)
            .with_body(page_body(0, 3))
            .expect(2)
            .create_async()
            .await;

        let page: Page<u32> = fetcher(&url)
            .fetch_page("items", "application/json", &[])
            .await
            .unwrap();
        assert_eq!(page.next, None);

        let items: Vec<u32> = fetcher(&url)
            .fetch_all("items", "application/json", FetchOptions::default())
            .await
            .unwrap();

        p1.assert_async().await;
        assert_eq!(items, vec![0, 1, 2]);
    }
}
