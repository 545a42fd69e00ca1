//! Icon discovery in the download directory
//!
//! Only the 6-byte ICONDIR header is checked: reserved must be 0, type must be
//! 1 (icon, not cursor) and the image count must be non-zero.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

const ICO_HEADER_LEN: usize = 6;

/// Why no icon could be picked
#[derive(Debug)]
pub enum IconError {
    Io(PathBuf, std::io::Error),
    NoIcons(PathBuf),
    NoNewIcons(PathBuf),
    NoValidIcons(PathBuf),
}

impl fmt::Display for IconError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IconError::Io(dir, e) => write!(f, "Cannot read icon directory {}: {}", dir.display(), e),
            IconError::NoIcons(dir) => write!(f, "No .ico files found in {}", dir.display()),
            IconError::NoNewIcons(dir) => write!(
                f,
                "No new icons downloaded to {}; every .ico there predates this search",
                dir.display()
            ),
            IconError::NoValidIcons(dir) => {
                write!(f, "No valid .ico files found in {}", dir.display())
            }
        }
    }
}

impl std::error::Error for IconError {}

pub fn validate_ico_header(header: &[u8]) -> bool {
    if header.len() < ICO_HEADER_LEN {
        return false;
    }
    let reserved = u16::from_le_bytes([header[0], header[1]]);
    let kind = u16::from_le_bytes([header[2], header[3]]);
    let count = u16::from_le_bytes([header[4], header[5]]);
    reserved == 0 && kind == 1 && count > 0
}

/// Reads the header of `path`. Unreadable files are invalid.
pub fn validate_ico_file(path: &Path) -> bool {
    let mut header = Vec::with_capacity(ICO_HEADER_LEN);
    let read = File::open(path).and_then(|file| {
        file.take(ICO_HEADER_LEN as u64).read_to_end(&mut header)
    });
    match read {
        Ok(_) => validate_ico_header(&header),
        Err(e) => {
            debug!("Cannot read {}: {}", path.display(), e);
            false
        }
    }
}

/// The `.ico` files present before the browser was opened
#[derive(Debug, Clone)]
pub struct IconSnapshot {
    taken_at: SystemTime,
    existing: HashSet<OsString>,
}

impl IconSnapshot {
    /// Records the current icons in `dir`. An unreadable directory yields an empty snapshot.
    pub fn capture(dir: &Path) -> Self {
        let existing = list_icons(dir)
            .map(|icons| {
                icons
                    .into_iter()
                    .filter_map(|icon| icon.path.file_name().map(|n| n.to_os_string()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            taken_at: SystemTime::now(),
            existing,
        }
    }

    /// A file counts as new when it was absent from the snapshot or has been
    /// modified since it was taken.
    pub fn is_new(&self, path: &Path, modified: SystemTime) -> bool {
        let known = path
            .file_name()
            .is_some_and(|name| self.existing.contains(name));
        !known || modified > self.taken_at
    }

    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }
}

struct IconFile {
    path: PathBuf,
    modified: SystemTime,
}

fn list_icons(dir: &Path) -> std::io::Result<Vec<IconFile>> {
    let mut icons = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_ico = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ico"));
        if !is_ico {
            continue;
        }
        // follows symlinks; entries that vanish mid-download are skipped
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping unreadable icon {}: {}", path.display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        icons.push(IconFile {
            path,
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }
    Ok(icons)
}

/// Picks the most recently modified valid icon in `dir`, creating `dir` if needed.
///
/// With a snapshot, icons that already existed and were not touched since are ignored.
pub fn find_valid_icon(dir: &Path, snapshot: Option<&IconSnapshot>) -> Result<PathBuf, IconError> {
    fs::create_dir_all(dir).map_err(|e| IconError::Io(dir.to_path_buf(), e))?;

    let mut icons = list_icons(dir).map_err(|e| IconError::Io(dir.to_path_buf(), e))?;
    if icons.is_empty() {
        return Err(IconError::NoIcons(dir.to_path_buf()));
    }

    if let Some(snapshot) = snapshot {
        icons.retain(|icon| snapshot.is_new(&icon.path, icon.modified));
        if icons.is_empty() {
            return Err(IconError::NoNewIcons(dir.to_path_buf()));
        }
    }

    icons.sort_by(|a, b| b.modified.cmp(&a.modified));

    for icon in icons {
        if validate_ico_file(&icon.path) {
            return Ok(icon.path);
        }
        warn!("Skipping invalid ICO: {}", icon.path.display());
    }

    Err(IconError::NoValidIcons(dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    const VALID_HEADER: [u8; 6] = [0, 0, 1, 0, 1, 0];

    fn write_icon(dir: &Path, name: &str, bytes: &[u8], modified: SystemTime) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
        path
    }

    fn ago(secs: u64) -> SystemTime {
        SystemTime::now() - Duration::from_secs(secs)
    }

    #[test]
    fn test_header_validation() {
        assert!(validate_ico_header(&VALID_HEADER));
        assert!(validate_ico_header(&[0, 0, 1, 0, 3, 0, 16, 16]));
        assert!(!validate_ico_header(&[0, 0, 1, 0, 1]));
        assert!(!validate_ico_header(&[]));
        assert!(!validate_ico_header(&[0, 0, 2, 0, 1, 0]));
        assert!(!validate_ico_header(&[1, 0, 1, 0, 1, 0]));
        assert!(!validate_ico_header(&[0, 0, 1, 0, 0, 0]));
    }

    #[test]
    fn test_validate_file() {
        let dir = TempDir::new().unwrap();
        let good = write_icon(dir.path(), "good.ico", &VALID_HEADER, ago(0));
        let png = write_icon(dir.path(), "fake.ico", b"\x89PNG\r\n\x1a\n", ago(0));

        assert!(validate_ico_file(&good));
        assert!(!validate_ico_file(&png));
        assert!(!validate_ico_file(&dir.path().join("missing.ico")));
    }

    #[test]
    fn test_picks_newest_valid_icon() {
        let dir = TempDir::new().unwrap();
        write_icon(dir.path(), "older.ico", &VALID_HEADER, ago(300));
        let newer = write_icon(dir.path(), "newer.ICO", &VALID_HEADER, ago(100));
        write_icon(dir.path(), "newest-broken.ico", b"GIF89a", ago(10));
        write_icon(dir.path(), "notes.txt", b"hello", ago(1));

        assert_eq!(find_valid_icon(dir.path(), None).unwrap(), newer);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let icons = dir.path().join("icons");

        let err = find_valid_icon(&icons, None).unwrap_err();
        assert!(matches!(err, IconError::NoIcons(_)));
        assert!(icons.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_skips_entries_that_cannot_be_read() {
        let dir = TempDir::new().unwrap();
        let good = write_icon(dir.path(), "good.ico", &VALID_HEADER, ago(100));
        std::os::unix::fs::symlink(dir.path().join("gone.ico"), dir.path().join("dangling.ico"))
            .unwrap();

        assert_eq!(find_valid_icon(dir.path(), None).unwrap(), good);
    }

    #[test]
    fn test_all_invalid() {
        let dir = TempDir::new().unwrap();
        write_icon(dir.path(), "a.ico", b"nope!!", ago(5));

        let err = find_valid_icon(dir.path(), None).unwrap_err();
        assert!(matches!(err, IconError::NoValidIcons(_)));
    }

    #[test]
    fn test_snapshot_ignores_existing_icons() {
        let dir = TempDir::new().unwrap();
        write_icon(dir.path(), "previous-show.ico", &VALID_HEADER, ago(600));

        let snapshot = IconSnapshot::capture(dir.path());
        assert_eq!(snapshot.len(), 1);

        let err = find_valid_icon(dir.path(), Some(&snapshot)).unwrap_err();
        assert!(matches!(err, IconError::NoNewIcons(_)));

        let downloaded = write_icon(dir.path(), "this-show.ico", &VALID_HEADER, ago(600));
        assert_eq!(
            find_valid_icon(dir.path(), Some(&snapshot)).unwrap(),
            downloaded
        );
    }

    #[test]
    fn test_snapshot_accepts_overwritten_icon() {
        let dir = TempDir::new().unwrap();
        let path = write_icon(dir.path(), "icon.ico", &VALID_HEADER, ago(600));
        let snapshot = IconSnapshot::capture(dir.path());

        let later = SystemTime::now() + Duration::from_secs(5);
        write_icon(dir.path(), "icon.ico", &VALID_HEADER, later);

        assert_eq!(find_valid_icon(dir.path(), Some(&snapshot)).unwrap(), path);
    }
}
