//! Collection payloads: bare arrays or paginated envelopes.

use serde::Deserialize;

/// Paginated envelope `{ count, next, previous, results }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    /// Total number of records across all pages.
    #[serde(default)]
    pub count: Option<u64>,
    /// URL of the next page.
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page.
    #[serde(default)]
    pub previous: Option<String>,
    /// Records on this page.
    pub results: Vec<T>,
}

/// Any collection response the backend produces.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Paginated(Page<T>),
    Plain(Vec<T>),
}

impl<T> ListPayload<T> {
    /// Discard pagination metadata and return the records.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paginated(page) => page.results,
            Self::Plain(items) => items,
        }
    }
}
