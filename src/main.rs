use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

mod cli;

use cli::banner;

#[derive(Parser)]
#[command(name = "anifold")]
#[command(version)]
#[command(about = "Set custom anime folder icons from DeviantArt", long_about = None)]
struct Cli {
    #[arg(value_parser = parse_existing_dir, help = "Folder to process instead of the current directory")]
    folder: Option<PathBuf>,

    #[arg(short, long, env = "ANIFOLD_LIBRARY", value_parser = parse_library_path, help = "Process every anime folder inside this library folder")]
    library: Option<PathBuf>,

    #[arg(long, env = "ANIFOLD_SINGLE", help = "Force single-folder mode")]
    single: bool,

    #[arg(long, env = "ANIFOLD_ICON_DIR", help = "Directory where downloaded icons are saved")]
    icon_dir: Option<PathBuf>,

    #[arg(long, env = "ANIFOLD_AUTO_SELECT", help = "Take the top lookup result without asking")]
    auto_select: bool,

    #[arg(long, env = "ANIFOLD_NO_WAIT", help = "Do not wait for ENTER after opening the browser")]
    no_wait: bool,

    #[arg(long = "log", env = "ANIFOLD_LOG", value_name = "FILE", help = "Append debug logs to FILE")]
    log_file: Option<PathBuf>,

    #[arg(long, env = "ANIFOLD_DRY_RUN", help = "Preview without opening the browser or writing files")]
    dry_run: bool,

    #[arg(long, env = "ANIFOLD_CACHE_FILE", help = "Lookup cache file")]
    cache_file: Option<PathBuf>,

    #[arg(long, env = "ANIFOLD_CACHE_TTL_HOURS", default_value_t = 24, help = "Hours before a cached lookup expires")]
    cache_ttl_hours: u64,

    #[arg(long, env = "ANIFOLD_MAX_RETRIES", default_value_t = 3, help = "Retries for a failed lookup")]
    max_retries: u32,

    #[arg(long, env = "ANIFOLD_RETRY_DELAY", value_name = "SECS", default_value_t = 2, help = "Base delay between retries, doubled each attempt")]
    retry_delay: u64,

    #[arg(long, env = "ANIFOLD_VERBOSE", help = "Enable info-level console logging")]
    verbose: bool,
}

/// Accepts a library path as typed or pasted, with surrounding quotes stripped.
fn parse_library_path(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw.trim().trim_matches(|c| c == '"' || c == '\''));
    if !path.exists() {
        return Err(format!("Library path does not exist: {}", path.display()));
    }
    if !path.is_dir() {
        return Err(format!("Library path is not a directory: {}", path.display()));
    }
    Ok(path)
}

fn parse_existing_dir(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("Not a directory: {}", path.display()))
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_icon_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\AniFold\icons")
    } else {
        home_dir().join("AniFold").join("icons")
    }
}

fn default_cache_file() -> PathBuf {
    home_dir().join(".anifold_cache.json")
}

/// Ctrl-C says goodbye, logs the interruption and exits cleanly.
fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        println!("\n\n{}", "👋 Sayonara!".yellow());
        info!("Application interrupted by user");
        info!("Application finished");
        std::process::exit(0);
    })
    .context("Failed to install the Ctrl-C handler")
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let args = Cli::parse();

    let working_dir = match args.folder {
        Some(folder) => std::path::absolute(&folder)
            .with_context(|| format!("Failed to resolve {}", folder.display()))?,
        None => std::env::current_dir().context("Failed to determine the current directory")?,
    };

    let custom_icon_dir = args.icon_dir.is_some();
    let config = cli::Config {
        working_dir,
        library: args.library,
        single: args.single,
        icon_dir: args.icon_dir.unwrap_or_else(default_icon_dir),
        auto_select: args.auto_select,
        no_wait: args.no_wait,
        dry_run: args.dry_run,
        verbose: args.verbose,
        log_file: args.log_file,
        cache_file: args.cache_file.unwrap_or_else(default_cache_file),
        cache_ttl_hours: args.cache_ttl_hours,
        max_retries: args.max_retries,
        retry_delay: Duration::from_secs(args.retry_delay),
    };

    cli::logging::init(config.verbose, config.log_file.as_deref())?;
    if let Err(e) = install_interrupt_handler() {
        warn!("{:#}", e);
    }

    banner::show_banner(banner::QUOTES);
    banner::show_header(env!("CARGO_PKG_VERSION"));
    if config.dry_run {
        println!("{}", "🔍 DRY RUN MODE - No changes will be made".yellow());
    }
    if custom_icon_dir {
        println!(
            "{}",
            format!("📁 Custom icon directory: {}", config.icon_dir.display()).cyan()
        );
    }
    println!("{}", banner::rule());
    info!("AniFold started with {:?}", config);

    match cli::run(&config) {
        Ok(cli::RunOutcome::Library(Some(summary))) => info!(
            "Library run: {}/{} anime folders upgraded",
            summary.successful, summary.anime_folders
        ),
        Ok(cli::RunOutcome::Library(None)) => info!("Library run had nothing to process"),
        Ok(cli::RunOutcome::Single(applied)) => info!("Single folder run succeeded: {}", applied),
        Err(e) => {
            println!("\n{}", format!("💥 Unexpected error: {:#}", e).red());
            error!("Unexpected error: {:#}", e);
        }
    }

    info!("Application finished");

    if config.dry_run && config.auto_select {
        println!("\n{}", "🔄 Dry run completed automatically".cyan());
    } else {
        cli::wait_for_enter(&format!("\n{}", "Press ENTER to exit...".cyan()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_library_path_strips_quotes() {
        let dir = TempDir::new().unwrap();
        let quoted = format!("\"{}\"", dir.path().display());
        assert_eq!(parse_library_path(&quoted).unwrap(), dir.path());

        let single = format!("  '{}' ", dir.path().display());
        assert_eq!(parse_library_path(&single).unwrap(), dir.path());
    }

    #[test]
    fn test_parse_library_path_rejects_missing_and_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(parse_library_path(&missing.display().to_string()).is_err());

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        let err = parse_library_path(&file.display().to_string()).unwrap_err();
        assert!(err.contains("not a directory"));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["anifold"]).unwrap();
        assert_eq!(cli.cache_ttl_hours, 24);
        assert_eq!(cli.max_retries, 3);
        assert_eq!(cli.retry_delay, 2);
        assert!(cli.folder.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "anifold",
            "--auto-select",
            "--dry-run",
            "--max-retries",
            "5",
            "--log",
            "run.log",
        ])
        .unwrap();
        assert!(cli.auto_select);
        assert!(cli.dry_run);
        assert_eq!(cli.max_retries, 5);
        assert_eq!(cli.log_file, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn test_interrupt_handler_is_installed_once() {
        assert!(install_interrupt_handler().is_ok());
        assert!(install_interrupt_handler().is_err());
    }

    #[test]
    fn test_default_cache_file_name() {
        assert!(default_cache_file().ends_with(".anifold_cache.json"));
    }
}
