//! Folder-name normalization
//!
//! Release folders tend to look like `[Group] Some.Title.S01.1080p.BluRay.x265`.
//! The cleaner strips the release noise and keeps the words that are most
//! likely part of the title, which is what gets sent to the lookup API.

use regex::Regex;
use std::sync::OnceLock;

/// Default number of words kept in a cleaned title.
pub const DEFAULT_MAX_WORDS: usize = 5;

/// Release-metadata tokens that never belong to a title (compared lowercase).
const RELEASE_TOKENS: &[&str] = &[
    "1080p", "720p", "480p", "2160p", "4k", "bluray", "web", "dvd", "hd", "x264", "x265", "h264",
    "h265", "avc", "hevc", "aac", "ac3", "dts", "flac", "proper", "repack", "dual", "audio",
    "multi", "subs", "sub", "eng", "en", "ar", "ara", "fre", "fr", "de", "ger", "ita", "es", "spa",
    "kor", "jpn", "ch", "chs", "cht", "sdh", "hc", "remux", "bit", "10bit", "8bit", "flac5",
    "flac8", "hi10p", "season",
];

/// Substrings that mark a folder as a season or episode folder rather than a show.
const EPISODE_MARKERS: &[&str] = &["season", "ep", "episode", "s01", "s02", "s03"];

fn bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]|\(.*?\)").expect("valid bracket regex"))
}

fn extension_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.[a-zA-Z0-9]{2,4}$").expect("valid extension regex"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[._\-\s]+").expect("valid separator regex"))
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(19|20)\d{2}$").expect("valid year regex"))
}

fn season_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)season\s*\d+").expect("valid season regex"))
}

/// Turns a raw folder name into a human-readable title guess.
///
/// Falls back to the trimmed original name when every token is noise.
pub fn clean_anime_name(folder_name: &str, max_words: usize) -> String {
    let without_groups = bracket_re().replace_all(folder_name, "");
    let without_extension = extension_re().replace(&without_groups, "");

    let kept: Vec<&str> = separator_re()
        .split(&without_extension)
        .filter(|token| is_title_token(token))
        .take(max_words)
        .collect();

    if kept.is_empty() {
        return folder_name.trim().to_string();
    }

    title_case(&kept.join(" ")).trim().to_string()
}

fn is_title_token(token: &str) -> bool {
    if token.is_empty() || token.starts_with('-') {
        return false;
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if year_re().is_match(token) {
        return false;
    }
    let lower = token.to_lowercase();
    !RELEASE_TOKENS.contains(&lower.as_str())
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest,
/// so `s01e02` becomes `S01E02` and `ATTACK` becomes `Attack`.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Heuristic used by library scanning to decide whether a subfolder holds a show.
pub fn looks_like_anime_folder(folder_name: &str) -> bool {
    let cleaned = clean_anime_name(folder_name, DEFAULT_MAX_WORDS);
    let raw_len = folder_name.chars().count();
    let cleaned_len = cleaned.chars().count();

    // Cleaning removed a lot of noise
    if (cleaned_len as f64) < raw_len as f64 * 0.7 {
        return true;
    }

    if season_re().is_match(folder_name) {
        return true;
    }

    let lower = folder_name.to_lowercase();
    if EPISODE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return false;
    }

    cleaned_len >= 3 && folder_name.chars().any(|c| c.is_ascii_digit())
}
