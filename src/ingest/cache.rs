// src/ingest/cache.rs
//! Per-source result cache.
//!
//! Keyed by (source, query, days). Entries expire after a TTL. An expired
//! entry is a miss and is dropped on read; every write also sweeps out all
//! expired entries, so keys that are never read again do not accumulate.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::types::JobPosting;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub source: String,
    pub query: String,
    pub days: u32,
}

impl SearchKey {
    pub fn new(source: &str, query: &str, days: u32) -> Self {
        Self {
            source: source.to_string(),
            query: query.trim().to_lowercase(),
            days,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    stored_at: DateTime<Utc>,
    postings: Vec<JobPosting>,
}

#[derive(Debug)]
pub struct SearchCache {
    ttl: chrono::Duration,
    entries: Mutex<HashMap<SearchKey, Entry>>,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl SearchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero()),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn fresh(&self, e: &Entry, now: DateTime<Utc>) -> bool {
        now - e.stored_at < self.ttl
    }

    pub fn get(&self, key: &SearchKey, now: DateTime<Utc>) -> Option<Vec<JobPosting>> {
        let mut map = self.entries.lock().ok()?;
        match map.get(key) {
            Some(e) if self.fresh(e, now) => Some(e.postings.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: SearchKey, postings: Vec<JobPosting>, now: DateTime<Utc>) {
        if let Ok(mut map) = self.entries.lock() {
            let ttl = self.ttl;
            map.retain(|_, e| now - e.stored_at < ttl);
            map.insert(
                key,
                Entry {
                    stored_at: now,
                    postings,
                },
            );
        }
    }

    /// Drop expired entries; returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut map) = self.entries.lock() else {
            return 0;
        };
        let before = map.len();
        map.retain(|_, e| now - e.stored_at < self.ttl);
        before - map.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
