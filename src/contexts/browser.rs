use anyhow::{Context, Result};
use tracing::info;

pub const ICON_SEARCH_BASE: &str = "https://www.deviantart.com/search?q=";

/// Search page for fan-made icons of `title`.
pub fn icon_search_url(title: &str) -> String {
    let query = format!("{} icon", title.trim());
    format!("{}{}", ICON_SEARCH_BASE, urlencoding::encode(&query))
}

/// Opens the icon search for `title` in the default browser.
pub fn open_icon_search(title: &str) -> Result<String> {
    let url = icon_search_url(title);
    info!("Opening {}", url);
    webbrowser::open(&url).with_context(|| format!("Failed to open browser for {}", url))?;
    Ok(url)
}
