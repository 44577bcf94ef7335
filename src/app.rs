//! The interactive release browser.
//!
//! [`App`] owns every piece of session state: the catalog, the reload guard,
//! the list view and the progress slot. The menu reads one command per line
//! from any `BufRead` and writes to any `Write`, so whole sessions can be
//! scripted in tests.

use anyhow::Result;
use chrono::Local;
use log::warn;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use crate::catalog::{ReleaseCatalog, ReleaseView, ReloadGuard};
use crate::config::Config;
use crate::download::{Downloader, ProgressDisplay, ProgressSlot, release_dir};
use crate::format::format_memory;
use crate::runtime::Runtime;
use crate::source::{GitHubSource, Release, ReleaseSource, RepoId};

const LIST_HELP: &str =
    "Commands: 0-9 open, < previous page, > next page, w toggle weekly, r reload, q quit";

const DETAIL_HELP: &str = "Commands: d download, b back";

/// A command typed at the release list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open the release in this slot of the current page.
    Select(usize),
    Previous,
    Next,
    ToggleWeekly,
    Reload,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut chars = line.chars();
        let (first, rest) = (chars.next()?, chars.next());
        if rest.is_some() {
            return None;
        }
        match first.to_ascii_lowercase() {
            '0'..='9' => first.to_digit(10).map(|d| Command::Select(d as usize)),
            '<' | 'p' => Some(Command::Previous),
            '>' | 'n' => Some(Command::Next),
            'w' => Some(Command::ToggleWeekly),
            'r' => Some(Command::Reload),
            'q' => Some(Command::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Writes `prompt` and reads one line. `None` on end of input.
fn prompt_line<I: BufRead, O: Write>(
    prompt: &str,
    input: &mut I,
    output: &mut O,
) -> Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Asks a yes/no question; anything but `y`/`yes` is a no.
fn confirm_with_io<I: BufRead, O: Write>(
    prompt: &str,
    input: &mut I,
    output: &mut O,
) -> Result<bool> {
    let response = prompt_line(&format!("{} [y/N] ", prompt), input, output)?;
    Ok(response.is_some_and(|r| {
        let r = r.to_lowercase();
        r == "y" || r == "yes"
    }))
}

pub struct App<R: Runtime, S: ReleaseSource> {
    runtime: R,
    catalog: ReleaseCatalog<S>,
    guard: ReloadGuard,
    view: ReleaseView,
    slot: ProgressSlot,
    display: Box<dyn ProgressDisplay>,
    base_dir: PathBuf,
}

impl<R: Runtime> App<R, GitHubSource> {
    pub fn from_config(config: Config<R>, display: Box<dyn ProgressDisplay>) -> Self {
        Self::new(config.runtime, config.source, config.repo, config.base_dir, display)
    }
}

impl<R: Runtime, S: ReleaseSource> App<R, S> {
    pub fn new(
        runtime: R,
        source: S,
        repo: RepoId,
        base_dir: PathBuf,
        display: Box<dyn ProgressDisplay>,
    ) -> Self {
        Self {
            runtime,
            catalog: ReleaseCatalog::new(source, repo),
            guard: ReloadGuard::default(),
            view: ReleaseView::new(),
            slot: ProgressSlot::new(),
            display,
            base_dir,
        }
    }

    /// Loads the catalog, then serves commands until `q` or end of input.
    pub async fn run<I: BufRead, O: Write>(
        &mut self,
        input: &mut I,
        output: &mut O,
    ) -> Result<()> {
        self.reload(output).await?;

        loop {
            self.render_list(output)?;
            let Some(line) = prompt_line("> ", input, output)? else {
                break;
            };
            if line.is_empty() {
                continue;
            }

            let Some(command) = Command::parse(&line) else {
                writeln!(output, "Unknown command: {}", line)?;
                continue;
            };
            match command {
                Command::Quit => break,
                Command::Select(slot) => {
                    let catalog = self.catalog.get_cached();
                    match self.view.select(&catalog, slot) {
                        Some(release) => {
                            if self.show_release(release, input, output).await? == Flow::Quit {
                                break;
                            }
                        }
                        None => writeln!(output, "No release in slot {}", slot)?,
                    }
                }
                Command::Previous => {
                    if !self.view.previous_page() {
                        writeln!(output, "Already on the first page")?;
                    }
                }
                Command::Next => {
                    let catalog = self.catalog.get_cached();
                    if !self.view.next_page(&catalog) {
                        writeln!(output, "Already on the last page")?;
                    }
                }
                Command::ToggleWeekly => {
                    let catalog = self.catalog.get_cached();
                    self.view.toggle_weekly(&catalog);
                }
                Command::Reload => self.reload(output).await?,
            }
        }

        Ok(())
    }

    /// Reloads the catalog if the reload guard allows it. Failures are
    /// reported and leave the previous catalog in place.
    async fn reload<O: Write>(&mut self, output: &mut O) -> Result<()> {
        if let Err(too_soon) = self.guard.try_acquire(Instant::now()) {
            writeln!(output, "Too soon: {}", too_soon)?;
            return Ok(());
        }

        writeln!(output, "Loading releases of {}...", self.catalog.repo())?;
        match self.catalog.reload().await {
            Ok(catalog) => {
                self.view.clamp(&catalog);
                writeln!(output, "Loaded {} release(s)", catalog.len())?;
            }
            Err(e) => {
                warn!("Reload failed: {:#}", e);
                writeln!(output, "Failed to load releases: {:#}", e)?;
            }
        }
        Ok(())
    }

    fn render_list<O: Write>(&self, output: &mut O) -> Result<()> {
        let catalog = self.catalog.get_cached();
        let (page, pages) = self.view.page_position(&catalog);
        let weekly = if self.view.show_weekly() { "shown" } else { "hidden" };

        writeln!(output)?;
        writeln!(
            output,
            "Releases of {}, page {}/{} (weekly builds {})",
            self.catalog.repo(),
            page,
            pages,
            weekly
        )?;

        let entries = self.view.page(&catalog);
        if entries.is_empty() {
            writeln!(output, "  (no releases)")?;
        }
        for (slot, release) in entries.iter().enumerate() {
            writeln!(
                output,
                "  [{}] {} ({})  {}  {} file(s), {}",
                slot,
                release.display_name(),
                release.tag_name,
                release.created_at.with_timezone(&Local).format("%Y-%m-%d"),
                release.assets.len(),
                format_memory(release.total_size())
            )?;
        }
        writeln!(output, "{}", LIST_HELP)?;
        Ok(())
    }

    fn render_release<O: Write>(&self, release: &Release, output: &mut O) -> Result<()> {
        writeln!(output)?;
        writeln!(
            output,
            "{} ({}), published {}",
            release.display_name(),
            release.tag_name,
            release.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        )?;
        if !release.body.trim().is_empty() {
            writeln!(output)?;
            for line in release.body.lines() {
                writeln!(output, "  {}", line)?;
            }
            writeln!(output)?;
        }

        writeln!(output, "Files:")?;
        if release.assets.is_empty() {
            writeln!(output, "  (none)")?;
        }
        for asset in &release.assets {
            writeln!(output, "  {}  {}", asset.name, format_memory(asset.size))?;
        }
        writeln!(output, "Total: {}", format_memory(release.total_size()))?;
        writeln!(output, "{}", DETAIL_HELP)?;
        Ok(())
    }

    async fn show_release<I: BufRead, O: Write>(
        &self,
        release: &Release,
        input: &mut I,
        output: &mut O,
    ) -> Result<Flow> {
        self.render_release(release, output)?;
        loop {
            let Some(line) = prompt_line("> ", input, output)? else {
                return Ok(Flow::Quit);
            };
            match line.to_lowercase().as_str() {
                "b" => return Ok(Flow::Continue),
                "d" => {
                    self.confirm_and_download(release, input, output).await?;
                    return Ok(Flow::Continue);
                }
                "" => {}
                other => writeln!(output, "Unknown command: {}", other)?,
            }
        }
    }

    async fn confirm_and_download<I: BufRead, O: Write>(
        &self,
        release: &Release,
        input: &mut I,
        output: &mut O,
    ) -> Result<()> {
        if release.assets.is_empty() {
            writeln!(output, "This release has no files to download")?;
            return Ok(());
        }

        let destination = release_dir(&self.base_dir, release);
        writeln!(output, "Files to download:")?;
        for asset in &release.assets {
            writeln!(output, "  {} ({})", asset.name, format_memory(asset.size))?;
        }
        let prompt = format!(
            "Download {} file(s) ({}) to {}?",
            release.assets.len(),
            format_memory(release.total_size()),
            destination.display()
        );
        if !confirm_with_io(&prompt, input, output)? {
            writeln!(output, "Download cancelled")?;
            return Ok(());
        }

        let downloader = Downloader::new(
            &self.runtime,
            self.catalog.source(),
            self.catalog.repo(),
            &self.slot,
            self.display.as_ref(),
        );
        match downloader.download_release(&self.base_dir, release).await {
            Ok(report) => writeln!(
                output,
                "Downloaded {} file(s) ({}) to {}",
                report.files.len(),
                format_memory(report.bytes),
                report.directory.display()
            )?,
            Err(e) => {
                warn!("Download of {} failed: {:#}", release.tag_name, e);
                writeln!(output, "Download failed: {:#}", e)?;
            }
        }
        Ok(())
    }
}
