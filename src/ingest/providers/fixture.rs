// src/ingest/providers/fixture.rs
//! Offline source backed by a JSON array of raw provider records.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use crate::error::SourceError;
use crate::ingest::normalize::{normalize_batch, SourceProfile};
use crate::ingest::types::PostingSource;
use crate::types::JobPosting;

pub struct FixtureSource {
    profile: SourceProfile,
    items: Vec<Value>,
}

impl FixtureSource {
    pub fn from_items(profile: SourceProfile, items: Vec<Value>) -> Self {
        Self { profile, items }
    }

    pub fn from_json_str(profile: SourceProfile, s: &str) -> Result<Self> {
        let items: Vec<Value> = serde_json::from_str(s).context("parsing fixture postings")?;
        Ok(Self::from_items(profile, items))
    }

    pub fn from_path(profile: SourceProfile, path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture postings from {}", path.display()))?;
        Self::from_json_str(profile, &s)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl PostingSource for FixtureSource {
    /// Returns every record regardless of query; the orchestrator does the filtering.
    async fn search(
        &self,
        _query: &str,
        _location: &str,
        _days: u32,
    ) -> Result<Vec<JobPosting>, SourceError> {
        Ok(normalize_batch(&self.profile, &self.items, chrono::Utc::now()))
    }

    fn name(&self) -> &str {
        self.profile.name
    }
}
