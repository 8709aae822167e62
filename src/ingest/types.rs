// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SourceError;
use crate::types::JobPosting;

/// A black-box provider of raw postings (actor platform, fixture file, ...).
#[async_trait::async_trait]
pub trait PostingSource: Send + Sync {
    async fn search(
        &self,
        query: &str,
        location: &str,
        days: u32,
    ) -> Result<Vec<JobPosting>, SourceError>;
    fn name(&self) -> &str;
}

/// Look-back window for a search. Only 1, 7, 14 and 30 days are offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DateWindow {
    Day,
    #[default]
    Week,
    TwoWeeks,
    Month,
}

impl DateWindow {
    pub const ALL: [DateWindow; 4] = [
        DateWindow::Day,
        DateWindow::Week,
        DateWindow::TwoWeeks,
        DateWindow::Month,
    ];

    pub fn days(self) -> u32 {
        match self {
            DateWindow::Day => 1,
            DateWindow::Week => 7,
            DateWindow::TwoWeeks => 14,
            DateWindow::Month => 30,
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.days() == days)
    }

    /// Lenient parse for query strings: anything unknown means a week.
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::from_days)
            .unwrap_or_default()
    }

    /// Inclusive bounds `[now - days, now]`.
    pub fn bounds(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - chrono::Duration::days(i64::from(self.days())), now)
    }

    pub fn contains(self, now: DateTime<Utc>, ts: DateTime<Utc>) -> bool {
        let (from, to) = self.bounds(now);
        from <= ts && ts <= to
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeInfo {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub from_formatted: String,
    pub to_formatted: String,
}

impl DateRangeInfo {
    pub fn for_window(window: DateWindow, now: DateTime<Utc>) -> Self {
        let (from, to) = window.bounds(now);
        Self {
            from,
            to,
            from_formatted: from.format("%-m/%-d/%Y").to_string(),
            to_formatted: to.format("%-m/%-d/%Y").to_string(),
        }
    }
}

/// Per-run pipeline counters, mirrored into metrics.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub queries: usize,
    pub fetched: usize,
    pub duplicates: usize,
    pub outside_window: usize,
    pub ineligible: usize,
    pub failed_calls: usize,
    pub cache_hits: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub postings: Vec<JobPosting>,
    pub total_count: usize,
    pub date_range: DateRangeInfo,
    pub filters_applied: Vec<String>,
    pub stats: SearchStats,
}
