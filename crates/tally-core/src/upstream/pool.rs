//! Endpoint pool: the candidate providers a read can fan out to.
//!
//! The pool is built once and read-only afterwards, so it is shared across
//! concurrent reads behind an `Arc` without locking.

use super::endpoint::{normalize_url, Endpoint};
use std::collections::HashSet;

/// De-duplicated, ordered set of candidate endpoints.
#[derive(Debug, Clone, Default)]
pub struct EndpointPool {
    endpoints: Vec<Endpoint>,
}

impl EndpointPool {
    /// Builds a pool from candidate URLs.
    ///
    /// URLs are normalized before de-duplication; the first occurrence of each
    /// URL keeps its position. Blank entries are skipped.
    #[must_use]
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let endpoints = candidates
            .into_iter()
            .filter_map(|candidate| {
                let url = normalize_url(candidate.as_ref());
                (!url.is_empty() && seen.insert(url.to_string())).then(|| Endpoint::backup(url))
            })
            .collect();

        Self { endpoints }
    }

    /// Every pool endpoint except `primary_url`, in pool order.
    ///
    /// Returns an empty list for an empty pool.
    #[must_use]
    pub fn backups_for(&self, primary_url: &str) -> Vec<Endpoint> {
        let primary_url = normalize_url(primary_url);
        self.endpoints.iter().filter(|e| e.url() != primary_url).cloned().collect()
    }

    /// The dispatch set for one read: the primary followed by up to
    /// `width - 1` backups.
    #[must_use]
    pub fn select(&self, primary_url: &str, width: usize) -> Vec<Endpoint> {
        if width == 0 {
            return Vec::new();
        }

        let mut selected = Vec::with_capacity(width);
        selected.push(Endpoint::primary(primary_url));
        selected.extend(self.backups_for(primary_url).into_iter().take(width - 1));
        selected
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        let url = normalize_url(url);
        self.endpoints.iter().any(|e| e.url() == url)
    }
}
