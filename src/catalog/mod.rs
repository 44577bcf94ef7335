//! In-memory release catalog.
//!
//! The catalog is only ever replaced as a whole: `reload` builds a complete
//! new [`Catalog`] off to the side and swaps it in, so readers see either the
//! previous catalog or the new one.

mod guard;
mod view;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::{Arc, PoisonError, RwLock};

use crate::source::{Release, ReleaseSource, RepoId};

pub use guard::{RELOAD_INTERVAL, ReloadGuard, ReloadTooSoon};
pub use view::{PAGE_LEN, ReleaseView};

/// Every release of one repository, with assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    releases: Vec<Release>,
    loaded_at: Option<DateTime<Utc>>,
}

impl Catalog {
    pub fn new(releases: Vec<Release>, loaded_at: DateTime<Utc>) -> Self {
        Self {
            releases,
            loaded_at: Some(loaded_at),
        }
    }

    /// All releases, weekly builds included, in server order.
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// Releases that are not weekly builds, in server order.
    pub fn stable(&self) -> impl Iterator<Item = &Release> {
        self.releases.iter().filter(|r| !r.is_weekly())
    }

    /// Time of the reload that produced this catalog; `None` before the first.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

/// Owns the current catalog of one repository.
pub struct ReleaseCatalog<S: ReleaseSource> {
    source: S,
    repo: RepoId,
    current: RwLock<Arc<Catalog>>,
}

impl<S: ReleaseSource> ReleaseCatalog<S> {
    pub fn new(source: S, repo: RepoId) -> Self {
        Self {
            source,
            repo,
            current: RwLock::new(Arc::new(Catalog::default())),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Returns the catalog produced by the last successful reload.
    pub fn get_cached(&self) -> Arc<Catalog> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Fetches every release and then, in order, the assets of each one. The
    /// new catalog replaces the current one only if every fetch succeeded.
    #[tracing::instrument(skip(self))]
    pub async fn reload(&self) -> Result<Arc<Catalog>> {
        info!("Loading releases of {}...", self.repo);

        let listed = self.source.list_releases(&self.repo).await?;
        let mut releases = Vec::with_capacity(listed.len());
        for release in listed {
            let assets = self
                .source
                .list_assets(&self.repo, release.id)
                .await
                .with_context(|| format!("Failed to load assets of {}", release.tag_name))?;
            debug!("{}: {} asset(s)", release.tag_name, assets.len());
            releases.push(Release { assets, ..release });
        }

        let catalog = Arc::new(Catalog::new(releases, Utc::now()));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&catalog);

        info!("Loaded {} release(s) of {}", catalog.len(), self.repo);
        Ok(catalog)
    }
}
