//! Library vs. single-folder detection

use crate::name_cleaner::looks_like_anime_folder;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "mov", "wmv", "flv", "webm", "m4v"];

/// How a working directory should be processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Every anime-like subfolder is processed in turn
    Library,
    /// The directory itself is one show
    Single,
}

/// Counts gathered from a single directory listing
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryCensus {
    pub subdirs: usize,
    pub anime_like_subdirs: usize,
    pub video_files: usize,
}

impl DirectoryCensus {
    /// Lists `dir` once and counts subfolders and video files.
    pub fn take(dir: &Path) -> std::io::Result<Self> {
        let mut census = DirectoryCensus::default();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                census.subdirs += 1;
                let name = entry.file_name();
                if looks_like_anime_folder(&name.to_string_lossy()) {
                    census.anime_like_subdirs += 1;
                }
            } else if is_video_file(&path) {
                census.video_files += 1;
            }
        }

        Ok(census)
    }

    pub fn mode(&self) -> OperationMode {
        classify(self.anime_like_subdirs, self.subdirs, self.video_files)
    }
}

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Picks a mode from directory counts.
///
/// Many anime-like folders with few loose videos, or many folders with no
/// videos at all, means a library. Everything else is treated as one show.
pub fn classify(anime_like_subdirs: usize, subdirs: usize, video_files: usize) -> OperationMode {
    let many_shows = anime_like_subdirs >= 3 && video_files <= 2;
    let only_folders = subdirs >= 3 && video_files == 0;

    if many_shows || only_folders {
        OperationMode::Library
    } else {
        OperationMode::Single
    }
}

/// Auto-detects the mode for `dir`. An unreadable directory is treated as a single show.
pub fn detect_operation_mode(dir: &Path) -> OperationMode {
    match DirectoryCensus::take(dir) {
        Ok(census) => {
            debug!(?census, "directory census for {}", dir.display());
            census.mode()
        }
        Err(e) => {
            warn!("Cannot read {}: {}; assuming single folder", dir.display(), e);
            OperationMode::Single
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_classify_library_by_anime_folders() {
        assert_eq!(classify(3, 3, 2), OperationMode::Library);
    }

    #[test]
    fn test_classify_library_by_bare_folders() {
        assert_eq!(classify(0, 4, 0), OperationMode::Library);
    }

    #[test]
    fn test_classify_single_by_videos() {
        assert_eq!(classify(0, 0, 4), OperationMode::Single);
        assert_eq!(classify(5, 5, 3), OperationMode::Single);
    }

    #[test]
    fn test_classify_ambiguous_defaults_to_single() {
        assert_eq!(classify(1, 2, 0), OperationMode::Single);
    }

    #[test]
    fn test_video_extension_is_case_insensitive() {
        assert!(is_video_file(Path::new("Episode 01.MKV")));
        assert!(!is_video_file(Path::new("cover.jpg")));
        assert!(!is_video_file(Path::new("README")));
    }

    #[test]
    fn test_detect_library_directory() {
        let dir = TempDir::new().unwrap();
        for name in [
            "[Erai-raws] Spy x Family - 1080p",
            "[SubsPlease] Bocchi the Rock! (1080p)",
            "Cowboy.Bebop.1998.BluRay.x265",
            "[Judas] Vinland Saga S2 [1080p][HEVC x265 10bit]",
            "Mushishi (2005) [BD 1080p]",
        ] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let census = DirectoryCensus::take(dir.path()).unwrap();
        assert_eq!(census.subdirs, 5);
        assert_eq!(census.anime_like_subdirs, 5);
        assert_eq!(census.video_files, 0);
        assert_eq!(detect_operation_mode(dir.path()), OperationMode::Library);
    }

    #[test]
    fn test_detect_single_directory() {
        let dir = TempDir::new().unwrap();
        for i in 1..=4 {
            fs::write(dir.path().join(format!("Episode {:02}.mkv", i)), b"").unwrap();
        }

        assert_eq!(detect_operation_mode(dir.path()), OperationMode::Single);
    }

    #[test]
    fn test_missing_directory_is_single() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            detect_operation_mode(&dir.path().join("missing")),
            OperationMode::Single
        );
    }
}
