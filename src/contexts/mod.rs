mod anime_lookup;
mod browser;
mod desktop_ini;
mod file_cache;
mod icon_finder;
mod retry;

pub use anime_lookup::{
    AnimeEntry, AnimeSearch, CachedLookup, JikanClient, LookupError, JIKAN_BASE_URL,
    MAX_CANDIDATES, filter_results,
};
pub use browser::{icon_search_url, open_icon_search};
pub use desktop_ini::{DESKTOP_INI, apply_folder_icon, render_desktop_ini};
pub use file_cache::{CacheEntry, JsonFileCache};
pub use icon_finder::{
    IconError, IconSnapshot, find_valid_icon, validate_ico_file, validate_ico_header,
};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper, retry_with_backoff};
