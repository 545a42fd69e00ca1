use serde::{Deserialize, Serialize};
use std::fmt;

/// A single anime title returned by a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, year: Option<i32>, score: Option<f64>) -> Self {
        Self {
            title: title.into(),
            year,
            score,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(year) = self.year {
            write!(f, " ({})", year)?;
        }
        Ok(())
    }
}
