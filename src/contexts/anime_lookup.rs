use crate::data::{Cache, Candidate};
use chrono::{Datelike, Local};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

pub const JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Maximum number of candidates offered to the user
pub const MAX_CANDIDATES: usize = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const NOT_YET_AIRED: &str = "Not yet aired";

/// Errors that can occur while querying the anime database
#[derive(Debug)]
pub enum LookupError {
    Http(String),
    Status(u16),
    Decode(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LookupError::Http(details) => write!(f, "Request failed: {}", details),
            LookupError::Status(code) => write!(f, "API returned HTTP {}", code),
            LookupError::Decode(details) => write!(f, "Unexpected API response: {}", details),
        }
    }
}

impl std::error::Error for LookupError {}

/// Trait for anything that can turn a title guess into candidates
pub trait AnimeSearch {
    fn search(&self, query: &str) -> Result<Vec<Candidate>, LookupError>;
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<AnimeEntry>,
}

/// The subset of a Jikan anime object used here
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimeEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Keeps aired titles from `current_year` or earlier, first occurrence of each
/// title only, at most [`MAX_CANDIDATES`], in API order.
pub fn filter_results(entries: Vec<AnimeEntry>, current_year: i32) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut filtered = Vec::new();

    for entry in entries {
        let Some(title) = entry.title.filter(|t| !t.is_empty()) else {
            continue;
        };
        if entry.status.as_deref() == Some(NOT_YET_AIRED) {
            continue;
        }
        if entry.year.is_some_and(|year| year > current_year) {
            continue;
        }
        if !seen.insert(title.clone()) {
            continue;
        }

        filtered.push(Candidate::new(title, entry.year, entry.score));
        if filtered.len() >= MAX_CANDIDATES {
            break;
        }
    }

    filtered
}

/// Blocking client for the Jikan `/anime` search endpoint
pub struct JikanClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl JikanClient {
    pub fn new() -> Result<Self, LookupError> {
        Self::with_base_url(JIKAN_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("anifold/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/anime?q={}&type=tv&limit=10",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

impl AnimeSearch for JikanClient {
    fn search(&self, query: &str) -> Result<Vec<Candidate>, LookupError> {
        let url = self.search_url(query);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| LookupError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        Ok(filter_results(body.data, Local::now().year()))
    }
}

/// Lookup context that answers from the cache when it can and records fresh
/// results otherwise. Failed searches are never cached.
pub struct CachedLookup<S, C>
where
    S: AnimeSearch,
    C: Cache,
{
    search: S,
    cache: C,
}

impl<S, C> CachedLookup<S, C>
where
    S: AnimeSearch,
    C: Cache,
{
    pub fn new(search: S, cache: C) -> Self {
        Self { search, cache }
    }

    pub fn lookup(&self, query: &str) -> Result<Vec<Candidate>, LookupError> {
        if let Some(cached) = self.cache.get(query) {
            info!("Cache hit for '{}'", query);
            return Ok(cached);
        }

        info!("Cache miss for '{}', fetching from API", query);
        let results = self.search.search(query)?;
        self.cache.set(query, &results);
        Ok(results)
    }
}
