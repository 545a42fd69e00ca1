use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

pub mod banner;
pub mod logging;
mod progress;
mod prompt;

use anifold::contexts::{
    AnimeSearch, CachedLookup, JikanClient, JsonFileCache, RetryPolicy, Sleeper, ThreadSleeper,
    IconSnapshot, apply_folder_icon, find_valid_icon, open_icon_search, retry_with_backoff,
};
use anifold::mode_detection::{OperationMode, detect_operation_mode};
use anifold::name_cleaner::{DEFAULT_MAX_WORDS, clean_anime_name, looks_like_anime_folder};
use progress::ProgressIndicator;

pub use prompt::wait_for_enter;

/// Settings for one run, fixed at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub working_dir: PathBuf,
    pub library: Option<PathBuf>,
    pub single: bool,
    pub icon_dir: PathBuf,
    pub auto_select: bool,
    pub no_wait: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
    pub cache_file: PathBuf,
    pub cache_ttl_hours: u64,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Config {
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay)
    }
}

/// Outcome of a library scan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub total_folders: usize,
    pub anime_folders: usize,
    pub successful: usize,
    pub skipped: usize,
}

/// What the top-level dispatch ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Library(Option<ScanSummary>),
    Single(bool),
}

/// Processes the working folder or library according to `config`.
pub fn run(config: &Config) -> Result<RunOutcome> {
    let client = JikanClient::new().context("Failed to build HTTP client")?;
    let cache = JsonFileCache::new(&config.cache_file, config.cache_ttl_hours);
    let session = Session::new(config, CachedLookup::new(client, cache), Box::new(ThreadSleeper));
    Ok(session.dispatch())
}

/// Opens the icon search page for a title and returns the URL used
pub type BrowserLauncher = fn(&str) -> Result<String>;

/// Everything a folder needs resolved once per run
pub struct Session<'a, S: AnimeSearch> {
    config: &'a Config,
    lookup: CachedLookup<S, JsonFileCache>,
    sleeper: Box<dyn Sleeper>,
    browser: BrowserLauncher,
}

impl<'a, S: AnimeSearch> Session<'a, S> {
    pub fn new(
        config: &'a Config,
        lookup: CachedLookup<S, JsonFileCache>,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        Self {
            config,
            lookup,
            sleeper,
            browser: open_icon_search,
        }
    }

    /// Explicit library, then explicit single, then auto-detection on the working folder.
    pub fn dispatch(&self) -> RunOutcome {
        let config = self.config;
        if let Some(library) = &config.library {
            println!(
                "{}",
                format!("🔧 Library mode: Processing {}", library.display()).blue()
            );
            return RunOutcome::Library(self.scan_library(library));
        }

        if config.single {
            println!(
                "{}",
                "🔧 Single folder mode: Processing current directory".blue()
            );
            return RunOutcome::Single(
                self.process_anime_folder(&config.working_dir, OperationMode::Single),
            );
        }

        println!("{}", "🔮 Auto-detecting folder type...".cyan());
        match detect_operation_mode(&config.working_dir) {
            OperationMode::Library => {
                println!(
                    "{}",
                    "📚 Detected library folder! Processing all subdirectories...".green()
                );
                RunOutcome::Library(self.scan_library(&config.working_dir))
            }
            OperationMode::Single => {
                println!(
                    "{}",
                    "🎬 Detected single anime folder! Processing current directory...".green()
                );
                RunOutcome::Single(
                    self.process_anime_folder(&config.working_dir, OperationMode::Single),
                )
            }
        }
    }

    /// Turns a title guess into the title used for the icon search.
    ///
    /// Lookup failures that survive the retries are reported and treated as
    /// "no results", so the guess itself is used.
    fn resolve_title(&self, guess: &str) -> String {
        println!("\n{}", format!("🔍 Searching MAL for: '{}'...", guess).cyan());

        let policy = self.config.retry_policy();
        let results = match retry_with_backoff(&policy, self.sleeper.as_ref(), || {
            self.lookup.lookup(guess)
        }) {
            Ok(results) => results,
            Err(e) => {
                println!("{}", format!("⚠️  MAL error: {}", e).red());
                error!("Lookup for '{}' failed: {}", guess, e);
                Vec::new()
            }
        };

        if self.config.auto_select {
            info!("Auto-selecting for '{}'", guess);
            return match results.first() {
                Some(first) => {
                    println!("{}", format!("✨ Auto-selected: {}", first.title).green());
                    first.title.clone()
                }
                None => {
                    println!("{}\n", "❌ No results! Using best guess.".red());
                    guess.to_string()
                }
            };
        }

        prompt::choose_candidate(guess, &results)
    }

    /// Runs the whole flow for one folder. Returns whether an icon was applied
    /// (or, in a dry run, whether the flow completed).
    pub fn process_anime_folder(&self, folder: &Path, mode: OperationMode) -> bool {
        info!("Processing folder: {}", folder.display());

        let folder_name = folder_name(folder);
        let guess = clean_anime_name(&folder_name, DEFAULT_MAX_WORDS);

        println!(
            "\n{}",
            format!("🎬 Processing: {}", folder_name).bold().magenta()
        );
        println!("{}", format!("💭 Guess: '{}'", guess).cyan());

        let title = self.resolve_title(&guess);
        if title.trim().is_empty() {
            println!(
                "{}",
                "❌ Could not determine anime name, skipping...".red()
            );
            return false;
        }

        let icon_dir = &self.config.icon_dir;
        let snapshot = match mode {
            OperationMode::Library => Some(IconSnapshot::capture(icon_dir)),
            OperationMode::Single => None,
        };

        if !self.config.dry_run {
            println!("\n{}", "🎨 Opening DeviantArt...".blue());
            if let Err(e) = (self.browser)(&title) {
                println!("{}", format!("⚠️  {:#}", e).yellow());
                warn!("{:#}", e);
            }
        }

        if self.config.no_wait {
            println!("{}", "⏯️  Continuing without waiting...".yellow());
        } else if !self.config.dry_run {
            println!(
                "{}",
                format!("📂 Save icon to: {}", icon_dir.display()).cyan()
            );
            wait_for_enter(&"⏸️  Press ENTER when downloaded...".yellow().to_string());
        }

        // a dry run only looks; it never creates the icon directory
        let icon = if self.config.dry_run && !icon_dir.is_dir() {
            println!(
                "{}",
                format!("📂 Icon directory {} does not exist yet", icon_dir.display()).yellow()
            );
            None
        } else {
            self.pick_icon(icon_dir, snapshot.as_ref())
        };

        if self.config.dry_run {
            println!(
                "{}",
                format!("✅ Dry run complete for: {}", title).green()
            );
            return true;
        }

        let Some(icon) = icon else {
            println!("{}", "❌ No valid icon found, skipping...".red());
            warn!("No valid icon found for {}", folder.display());
            return false;
        };

        match apply_folder_icon(folder, &icon) {
            Ok(descriptor) => {
                println!("\n{}", "✅ Icon applied!".green());
                println!(
                    "{}",
                    "💡 Refresh: Press F5 or restart Explorer via Task Manager".yellow()
                );
                banner::show_success_art();
                info!(
                    "Successfully applied icon to {} ({})",
                    folder.display(),
                    descriptor.display()
                );
                true
            }
            Err(e) => {
                println!("{}", format!("❌ Icon application failed: {:#}", e).red());
                error!("Icon application failed for {}: {:#}", folder.display(), e);
                false
            }
        }
    }

    fn pick_icon(&self, icon_dir: &Path, snapshot: Option<&IconSnapshot>) -> Option<PathBuf> {
        match find_valid_icon(icon_dir, snapshot) {
            Ok(icon) => {
                let name = icon
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                println!("{}", format!("📦 Using: {}", name).green());
                Some(icon)
            }
            Err(e) => {
                if !self.config.dry_run {
                    println!("{}", format!("❌ {}", e).red());
                }
                None
            }
        }
    }

    /// Processes every anime-like subfolder of `library`.
    ///
    /// Returns `None` when the library could not be listed or held nothing to do.
    pub fn scan_library(&self, library: &Path) -> Option<ScanSummary> {
        if !library.exists() {
            println!(
                "{}",
                format!("❌ Library path does not exist: {}", library.display()).red()
            );
            return None;
        }

        info!("Scanning library: {}", library.display());
        println!(
            "\n{}",
            format!("📚 Scanning library: {}", library.display())
                .bold()
                .cyan()
        );
        println!("{}", "🔍 Detecting anime folders...".cyan());

        let subdirs = match list_subdirs(library) {
            Ok(subdirs) => subdirs,
            Err(e) => {
                println!(
                    "{}",
                    format!("❌ Cannot access directory: {}", library.display()).red()
                );
                error!("{:#}", e);
                return None;
            }
        };

        if subdirs.is_empty() {
            println!(
                "{}",
                "📂 No subdirectories found. This might not be a library folder.".yellow()
            );
            return None;
        }

        let (anime_folders, other_folders): (Vec<PathBuf>, Vec<PathBuf>) =
            subdirs.iter().cloned().partition(|dir| {
                dir.file_name()
                    .is_some_and(|name| looks_like_anime_folder(&name.to_string_lossy()))
            });

        println!(
            "{}",
            format!("📂 Found {} total folders", subdirs.len()).green()
        );
        println!(
            "{}",
            format!("🎬 Detected {} anime-like folders", anime_folders.len()).green()
        );

        if anime_folders.is_empty() {
            println!(
                "{}",
                "⚠️  No anime folders detected. Maybe try running with --single flag?".yellow()
            );
            return None;
        }

        println!("{}", "=".repeat(60).yellow());
        println!("{}", "🚀 Starting batch processing...".bold().blue());

        let mut progress = ProgressIndicator::new(anime_folders.len());
        for folder in &anime_folders {
            let name = folder
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress.start_item(&name);
            let success =
                progress.suspend(|| self.process_anime_folder(folder, OperationMode::Library));
            progress.complete_item(&name, success);
        }
        progress.finish();

        if !other_folders.is_empty() {
            println!(
                "{}",
                format!("ℹ️  Skipped {} non-anime folders", other_folders.len()).cyan()
            );
        }
        println!("{}", "=".repeat(60).bold().green());

        let summary = ScanSummary {
            total_folders: subdirs.len(),
            anime_folders: anime_folders.len(),
            successful: progress.succeeded(),
            skipped: other_folders.len(),
        };
        info!(
            "Library scan complete: {}/{} successful, {} of {} folders skipped",
            summary.successful, summary.anime_folders, summary.skipped, summary.total_folders
        );
        Some(summary)
    }
}

/// Name of `folder` as the shell shows it, with `.` and `..` resolved first.
fn folder_name(folder: &Path) -> String {
    let resolved = fs::canonicalize(folder)
        .or_else(|_| std::path::absolute(folder))
        .unwrap_or_else(|_| folder.to_path_buf());
    resolved
        .file_name()
        .or_else(|| folder.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| resolved.display().to_string())
}

/// Subdirectories of `dir`, sorted by name.
fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.sort();
    Ok(subdirs)
}
