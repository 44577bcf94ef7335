//! Sequential download of a release's assets to local storage.

mod copier;
mod display;
mod progress;

use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;
use crate::source::{Asset, Release, ReleaseSource, RepoId};

pub use copier::{CHUNK_SIZE, copy, copy_with_chunk_size};
pub use display::ConsoleProgress;
pub use progress::{DownloadTask, ProgressDisplay, ProgressObserver, ProgressSlot, SlotObserver};

#[cfg(test)]
pub(crate) use progress::test_support;

/// Folder under the base directory that receives every download.
pub const DOWNLOADS_DIR: &str = "Descargas";

/// Subfolder of [`DOWNLOADS_DIR`] for weekly builds.
pub const WEEKLY_DIR: &str = "Weekly";

/// Turns a server-provided name into a single path component.
fn path_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => cleaned.replace('.', "_") + "_",
        _ => cleaned,
    }
}

/// `<base>/Descargas/[Weekly/]<tag>`
pub fn release_dir(base: &Path, release: &Release) -> PathBuf {
    let mut dir = base.join(DOWNLOADS_DIR);
    if release.is_weekly() {
        dir.push(WEEKLY_DIR);
    }
    dir.push(path_component(&release.tag_name));
    dir
}

/// Files written by one [`Downloader::download_release`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
    pub bytes: u64,
}

/// Downloads assets one at a time through the shared progress slot.
pub struct Downloader<'a, R: Runtime + ?Sized, S: ReleaseSource + ?Sized> {
    runtime: &'a R,
    source: &'a S,
    repo: &'a RepoId,
    slot: &'a ProgressSlot,
    display: &'a dyn ProgressDisplay,
}

impl<'a, R: Runtime + ?Sized, S: ReleaseSource + ?Sized> Downloader<'a, R, S> {
    pub fn new(
        runtime: &'a R,
        source: &'a S,
        repo: &'a RepoId,
        slot: &'a ProgressSlot,
        display: &'a dyn ProgressDisplay,
    ) -> Self {
        Self {
            runtime,
            source,
            repo,
            slot,
            display,
        }
    }

    /// Downloads every asset of `release` into [`release_dir`], in order.
    /// Stops at the first failure; files already written stay in place.
    #[tracing::instrument(skip(self, base, release), fields(tag = %release.tag_name))]
    pub async fn download_release(&self, base: &Path, release: &Release) -> Result<DownloadReport> {
        let directory = release_dir(base, release);
        self.runtime
            .create_dir_all(&directory)
            .with_context(|| format!("Failed to create download directory {:?}", directory))?;

        info!(
            "Downloading {} file(s) of {} into {:?}",
            release.assets.len(),
            release.display_name(),
            directory
        );

        let mut report = DownloadReport {
            directory,
            files: Vec::with_capacity(release.assets.len()),
            bytes: 0,
        };
        for asset in &release.assets {
            let (path, bytes) = self.download_asset(&report.directory, asset).await?;
            report.files.push(path);
            report.bytes += bytes;
        }

        info!("Finished downloading {}", release.display_name());
        Ok(report)
    }

    /// Downloads one asset into `directory`, returning the file path and the
    /// number of bytes written. The slot is released whether or not the copy
    /// succeeds.
    #[tracing::instrument(skip(self, directory, asset), fields(asset = %asset.name))]
    pub async fn download_asset(&self, directory: &Path, asset: &Asset) -> Result<(PathBuf, u64)> {
        let task = self.slot.begin(&asset.name, asset.size)?;
        self.display.started(&task);

        let path = directory.join(path_component(&asset.name));
        let result = self.transfer(asset, &path).await;
        let task = self.slot.complete();

        let bytes = result?;
        if let Some(task) = task {
            self.display.finished(&task);
        }
        info!("Downloaded {}", asset.name);
        Ok((path, bytes))
    }

    async fn transfer(&self, asset: &Asset, path: &Path) -> Result<u64> {
        let mut file = self.runtime.create_file(path)?;
        let mut stream = self
            .source
            .open_asset(self.repo, asset.id)
            .await
            .with_context(|| format!("Failed to open {}", asset.name))?;

        let observer = SlotObserver::new(self.slot, self.display);
        let bytes = copy(&mut stream, &mut file, &observer)
            .await
            .with_context(|| format!("Failed to download {} to {:?}", asset.name, path))?;
        Ok(bytes)
    }
}
