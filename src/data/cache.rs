use super::Candidate;

/// Cache trait for storing and retrieving lookup results by query.
///
/// Implementations should handle errors gracefully without panicking.
pub trait Cache {
    /// Retrieves the cached candidates for the given query.
    ///
    /// # Returns
    /// * `Some(Vec<Candidate>)` - A fresh entry exists for the query
    /// * `None` - No entry, an expired entry, or the cache could not be read
    fn get(&self, query: &str) -> Option<Vec<Candidate>>;

    /// Stores candidates for the given query.
    ///
    /// # Notes
    /// Errors during storage should be logged, not returned. A failed save
    /// only costs a future cache miss.
    fn set(&self, query: &str, results: &[Candidate]);
}
