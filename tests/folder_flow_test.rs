/// Integration tests for the folder icon workflow
///
/// These exercise the library API against scratch directories: mode detection,
/// icon discovery and the desktop.ini writer, plus the lookup cache on disk.
///
/// The binary test hits the live lookup API and is ignored by default.
/// Run with: cargo test --test folder_flow_test -- --ignored --nocapture
use anifold::contexts::{
    AnimeSearch, CachedLookup, DESKTOP_INI, IconError, IconSnapshot, JsonFileCache, LookupError,
    RetryPolicy, Sleeper, apply_folder_icon, find_valid_icon, retry_with_backoff,
};
use anifold::data::{Cache, Candidate};
use anifold::mode_detection::{OperationMode, detect_operation_mode};
use anifold::name_cleaner::{DEFAULT_MAX_WORDS, clean_anime_name, looks_like_anime_folder};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::rc::Rc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const ICO_BYTES: [u8; 6] = [0, 0, 1, 0, 1, 0];

fn make_library(root: &Path, names: &[&str]) {
    for name in names {
        fs::create_dir_all(root.join(name)).unwrap();
    }
}

#[test]
fn test_library_detected_and_names_cleaned() {
    let root = TempDir::new().unwrap();
    let names = [
        "[SubsPlease] Frieren - 01 (1080p)",
        "Mushishi (2005) [BD 1080p]",
        "Cowboy.Bebop.1998.BluRay.x265",
    ];
    make_library(root.path(), &names);

    assert_eq!(detect_operation_mode(root.path()), OperationMode::Library);
    assert!(names.iter().all(|name| looks_like_anime_folder(name)));
    assert_eq!(clean_anime_name(names[1], DEFAULT_MAX_WORDS), "Mushishi");
}

#[test]
fn test_folder_with_episodes_is_single() {
    let root = TempDir::new().unwrap();
    for ep in 1..=3 {
        fs::write(root.path().join(format!("Episode {:02}.mkv", ep)), b"").unwrap();
    }
    fs::create_dir(root.path().join("Extras")).unwrap();

    assert_eq!(detect_operation_mode(root.path()), OperationMode::Single);
}

#[test]
fn test_icon_is_found_and_applied() {
    let root = TempDir::new().unwrap();
    let icons = root.path().join("icons");
    let show = root.path().join("Mushishi");
    fs::create_dir_all(&icons).unwrap();
    fs::create_dir_all(&show).unwrap();
    fs::write(icons.join("broken.ico"), b"not an icon").unwrap();
    fs::write(icons.join("mushishi.ico"), ICO_BYTES).unwrap();

    let icon = find_valid_icon(&icons, None).unwrap();
    assert!(icon.ends_with("mushishi.ico"));

    let descriptor = apply_folder_icon(&show, &icon).unwrap();
    assert_eq!(descriptor, show.join(DESKTOP_INI));
    let contents = fs::read_to_string(&descriptor).unwrap();
    assert!(contents.starts_with("[.ShellClassInfo]"));
    assert!(contents.contains("mushishi.ico,0"));
}

#[test]
fn test_snapshot_ignores_icons_that_were_already_there() {
    let root = TempDir::new().unwrap();
    let icons = root.path().join("icons");
    fs::create_dir_all(&icons).unwrap();
    fs::write(icons.join("old.ico"), ICO_BYTES).unwrap();
    fs::File::options()
        .write(true)
        .open(icons.join("old.ico"))
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(60))
        .unwrap();

    let snapshot = IconSnapshot::capture(&icons);
    assert_eq!(snapshot.len(), 1);
    assert!(matches!(
        find_valid_icon(&icons, Some(&snapshot)),
        Err(IconError::NoNewIcons(_))
    ));
}

#[test]
fn test_cache_survives_reopen() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("nested").join("cache.json");
    let results = vec![Candidate::new("Monster", Some(2004), Some(8.75))];

    JsonFileCache::new(&path, 24).set("  MONSTER ", &results);
    assert!(path.exists());

    let reopened = JsonFileCache::new(&path, 24);
    assert_eq!(reopened.get("monster"), Some(results));

    let expired = JsonFileCache::new(&path, 0);
    assert_eq!(expired.get("monster"), None);
}

struct FlakySearch {
    failures_left: Cell<u32>,
    calls: Rc<Cell<u32>>,
}

impl AnimeSearch for FlakySearch {
    fn search(&self, _query: &str) -> Result<Vec<Candidate>, LookupError> {
        self.calls.set(self.calls.get() + 1);
        if self.failures_left.get() > 0 {
            self.failures_left.set(self.failures_left.get() - 1);
            return Err(LookupError::Http("connection reset".to_string()));
        }
        Ok(vec![Candidate::new("Frieren", Some(2023), Some(9.25))])
    }
}

struct NoSleep;

impl Sleeper for NoSleep {
    fn sleep(&self, _duration: Duration) {}
}

#[test]
fn test_retry_recovers_and_result_is_cached() {
    let root = TempDir::new().unwrap();
    let calls = Rc::new(Cell::new(0));
    let search = FlakySearch {
        failures_left: Cell::new(2),
        calls: Rc::clone(&calls),
    };
    let lookup = CachedLookup::new(search, JsonFileCache::new(root.path().join("c.json"), 24));
    let policy = RetryPolicy::new(3, Duration::from_secs(2));

    let first = retry_with_backoff(&policy, &NoSleep, || lookup.lookup("Frieren")).unwrap();
    assert_eq!(first[0].title, "Frieren");
    assert_eq!(calls.get(), 3);

    // served from the cache, no extra search
    let second = retry_with_backoff(&policy, &NoSleep, || lookup.lookup("frieren")).unwrap();
    assert_eq!(second, first);
    assert_eq!(calls.get(), 3);
}

#[test]
#[ignore] // needs network access to the lookup API
fn test_binary_dry_run_over_library() {
    let root = TempDir::new().unwrap();
    let library = root.path().join("library");
    make_library(&library, &["[Erai-raws] Spy x Family - 1080p", "Documents"]);

    let output = Command::new(env!("CARGO_BIN_EXE_anifold"))
        .arg("--library")
        .arg(&library)
        .args(["--dry-run", "--auto-select", "--max-retries", "0", "--retry-delay", "0"])
        .arg("--icon-dir")
        .arg(root.path().join("icons"))
        .arg("--cache-file")
        .arg(root.path().join("cache.json"))
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run anifold");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Detected 1 anime-like folders"));
    assert!(!library.join("Documents").join(DESKTOP_INI).exists());
}
