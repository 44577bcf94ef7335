//! GitHub release source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use tokio::io::AsyncRead;

use crate::api::{ACCEPT_OCTET_STREAM, ACCEPT_STABLE, Endpoint, FetchOptions, PaginatedFetcher};

use super::{Asset, Release, ReleaseSource, RepoId};

/// GitHub API response types (internal).
mod api {
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub id: u64,
        pub name: Option<String>,
        pub tag_name: String,
        pub body: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Asset {
        pub id: u64,
        pub name: String,
        pub size: u64,
    }
}

/// Page size requested from the API.
const PAGE_SIZE: u32 = 100;

/// GitHub implementation of [`ReleaseSource`].
pub struct GitHubSource {
    fetcher: PaginatedFetcher,
    options: FetchOptions,
}

impl GitHubSource {
    pub fn new(fetcher: PaginatedFetcher) -> Self {
        Self {
            fetcher,
            options: FetchOptions::default().with_page_size(PAGE_SIZE),
        }
    }

    /// Overrides the paging bounds used for list calls.
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn fetcher(&self) -> &PaginatedFetcher {
        &self.fetcher
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource {
    #[tracing::instrument(skip(self))]
    async fn list_releases(&self, repo: &RepoId) -> Result<Vec<Release>> {
        let path = Endpoint::Releases.path(&[&repo.owner, &repo.repo])?;
        debug!("Listing releases of {} from {}...", repo, path);

        let releases: Vec<api::Release> = self
            .fetcher
            .fetch_all(&path, ACCEPT_STABLE, self.options)
            .await
            .with_context(|| format!("Failed to list releases of {}", repo))?;

        Ok(releases.into_iter().map(Release::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn list_assets(&self, repo: &RepoId, release_id: u64) -> Result<Vec<Asset>> {
        let path = Endpoint::ReleaseAssets.path(&[&repo.owner, &repo.repo, &release_id])?;
        debug!("Listing assets of release {} from {}...", release_id, path);

        let assets: Vec<api::Asset> = self
            .fetcher
            .fetch_all(&path, ACCEPT_STABLE, self.options)
            .await
            .with_context(|| format!("Failed to list assets of release {}", release_id))?;

        Ok(assets
            .into_iter()
            .map(|a| Asset {
                id: a.id,
                name: a.name,
                size: a.size,
                release_id,
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn open_asset(
        &self,
        repo: &RepoId,
        asset_id: u64,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        let path = Endpoint::ReleaseAsset.path(&[&repo.owner, &repo.repo, &asset_id])?;
        let stream = self
            .fetcher
            .http()
            .get_stream(&path, ACCEPT_OCTET_STREAM)
            .await
            .with_context(|| format!("Failed to start download of asset {}", asset_id))?;
        Ok(stream)
    }
}

impl From<api::Release> for Release {
    fn from(r: api::Release) -> Self {
        Release {
            id: r.id,
            name: r.name,
            tag_name: r.tag_name,
            body: r.body.unwrap_or_default(),
            created_at: r.created_at,
            assets: Vec::new(),
        }
    }
}
