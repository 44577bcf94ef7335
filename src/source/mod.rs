//! Release source abstraction.
//!
//! The catalog and the downloader only talk to a [`ReleaseSource`]; the
//! GitHub implementation reaches the REST API through the paginated fetcher.

mod github;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::io::AsyncRead;

pub use github::GitHubSource;

/// Display-name prefix marking automated weekly builds.
pub const WEEKLY_PREFIX: &str = "Autobuild ";

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Invalid repository format. Expected 'owner/repo'.")
        } else {
            Ok(RepoId {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}

/// A downloadable asset attached to a release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    pub size: u64,
    /// Identifier of the owning release.
    pub release_id: u64,
}

/// A published release and its assets, in the order the server listed them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub id: u64,
    /// Release title; may be absent on the server.
    pub name: Option<String>,
    pub tag_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub assets: Vec<Asset>,
}

impl Release {
    /// Title shown to the user, falling back to the tag.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag_name,
        }
    }

    /// Automated weekly builds are recognised by their title prefix.
    pub fn is_weekly(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.starts_with(WEEKLY_PREFIX))
    }

    /// Sum of the declared asset sizes.
    pub fn total_size(&self) -> u64 {
        self.assets.iter().map(|a| a.size).sum()
    }
}

/// Trait for release sources.
///
/// `list_releases` returns releases with an empty asset list; assets come
/// from a separate `list_assets` call per release.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch every release of a repository.
    async fn list_releases(&self, repo: &RepoId) -> Result<Vec<Release>>;

    /// Fetch every asset of one release.
    async fn list_assets(&self, repo: &RepoId, release_id: u64) -> Result<Vec<Asset>>;

    /// Open the raw byte stream of an asset.
    async fn open_asset(
        &self,
        repo: &RepoId,
        asset_id: u64,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>>;
}
