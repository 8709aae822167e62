// src/ingest/mod.rs
//! Search orchestration: fan out to posting sources, then merge, de-dup,
//! window-filter and eligibility-filter the results.

pub mod cache;
pub mod normalize;
pub mod providers;
pub mod types;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use crate::eligibility::{EligibilityFilter, FILTER_NAMES};
use crate::error::SourceError;
use crate::ingest::cache::{SearchCache, SearchKey};
use crate::ingest::types::{DateRangeInfo, DateWindow, PostingSource, SearchResult, SearchStats};
use crate::types::JobPosting;

pub const DEFAULT_LOCATION: &str = "United States";
pub const DEFAULT_BASE_QUERY: &str = "project manager";
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(60);

/// How many résumé keywords make up the fallback query.
const KEYWORD_QUERY_TERMS: usize = 3;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "search_postings_fetched_total",
            "Postings returned by sources before filtering."
        );
        describe_counter!("search_dedup_total", "Postings removed as duplicates.");
        describe_counter!(
            "search_date_filtered_total",
            "Postings outside the requested date window."
        );
        describe_counter!(
            "search_source_errors_total",
            "Source calls that failed or timed out."
        );
        describe_counter!("search_cache_hits_total", "Source calls served from cache.");
        describe_counter!(
            "search_malformed_total",
            "Raw records dropped during normalization."
        );
        describe_counter!(
            "eligibility_rejected_total",
            "Eligibility rule failures, by reason."
        );
        describe_histogram!("search_source_ms", "Source call latency in milliseconds.");
    });
}

/// Drop later postings whose (title, company) was already seen.
/// Returns (kept, removed).
pub fn dedup_postings(postings: Vec<JobPosting>) -> (Vec<JobPosting>, usize) {
    let mut seen = HashSet::new();
    let mut removed = 0usize;
    let mut keep = Vec::with_capacity(postings.len());
    for p in postings {
        if seen.insert(p.dedup_key()) {
            keep.push(p);
        } else {
            removed += 1;
        }
    }
    (keep, removed)
}

/// Keep postings inside `[now - days, now]`. Returns (kept, removed).
pub fn filter_by_window(
    postings: Vec<JobPosting>,
    window: DateWindow,
    now: DateTime<Utc>,
) -> (Vec<JobPosting>, usize) {
    let before = postings.len();
    let keep: Vec<JobPosting> = postings
        .into_iter()
        .filter(|p| window.contains(now, p.posted_date))
        .collect();
    let removed = before - keep.len();
    (keep, removed)
}

/// Human-readable filters reported alongside results.
pub fn filters_applied(window: DateWindow) -> Vec<String> {
    let days = window.days();
    let mut out: Vec<String> = FILTER_NAMES.iter().map(|s| s.to_string()).collect();
    out.push(format!(
        "Posted in the last {days} {}",
        if days == 1 { "day" } else { "days" }
    ));
    out
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub location: String,
    /// Generic query for the target role, always searched.
    pub base_query: String,
    /// Upper bound for a single source call.
    pub source_timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            base_query: DEFAULT_BASE_QUERY.to_string(),
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }
}

type CallOutcome = (usize, usize, SearchKey, Result<Vec<JobPosting>, SourceError>);

pub struct SearchOrchestrator {
    sources: Vec<Arc<dyn PostingSource>>,
    filter: Arc<EligibilityFilter>,
    cache: Option<Arc<SearchCache>>,
    settings: SearchSettings,
}

impl SearchOrchestrator {
    pub fn new(
        sources: Vec<Arc<dyn PostingSource>>,
        filter: Arc<EligibilityFilter>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            sources,
            filter,
            cache: None,
            settings,
        }
    }

    pub fn with_cache(mut self, cache: Arc<SearchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Base query first, then the résumé title, or a few keywords without one.
    pub fn build_queries(&self, title: Option<&str>, keywords: &[String]) -> Vec<String> {
        let base = self.settings.base_query.trim();
        let mut out = vec![base.to_string()];

        let extra = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => Some(t.to_string()),
            None => {
                let kw: Vec<&str> = keywords
                    .iter()
                    .map(|k| k.trim())
                    .filter(|k| !k.is_empty())
                    .take(KEYWORD_QUERY_TERMS)
                    .collect();
                (!kw.is_empty()).then(|| kw.join(" "))
            }
        };
        if let Some(q) = extra {
            if !q.eq_ignore_ascii_case(base) {
                out.push(q);
            }
        }
        out
    }

    pub async fn search_postings(
        &self,
        title: Option<&str>,
        keywords: &[String],
        window: DateWindow,
    ) -> SearchResult {
        self.search_postings_at(Utc::now(), title, keywords, window)
            .await
    }

    /// Same as [`search_postings`](Self::search_postings) with an explicit clock.
    pub async fn search_postings_at(
        &self,
        now: DateTime<Utc>,
        title: Option<&str>,
        keywords: &[String],
        window: DateWindow,
    ) -> SearchResult {
        ensure_metrics_described();

        let queries = self.build_queries(title, keywords);
        let days = window.days();
        let mut stats = SearchStats {
            queries: queries.len(),
            ..Default::default()
        };

        if let Some(cache) = &self.cache {
            let purged = cache.purge_expired(now);
            if purged > 0 {
                tracing::debug!(target: "ingest", purged, "expired cache entries dropped");
            }
        }

        let mut batches: Vec<((usize, usize), Vec<JobPosting>)> = Vec::new();
        let mut set: JoinSet<CallOutcome> = JoinSet::new();

        for (qi, query) in queries.iter().enumerate() {
            for (si, source) in self.sources.iter().enumerate() {
                let key = SearchKey::new(source.name(), query, days);
                if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&key, now)) {
                    stats.cache_hits += 1;
                    counter!("search_cache_hits_total").increment(1);
                    batches.push(((qi, si), hit));
                    continue;
                }

                let source = Arc::clone(source);
                let query = query.clone();
                let location = self.settings.location.clone();
                let limit = self.settings.source_timeout;
                set.spawn(async move {
                    let t0 = Instant::now();
                    let res = match tokio::time::timeout(limit, source.search(&query, &location, days))
                        .await
                    {
                        Ok(r) => r,
                        Err(_) => Err(SourceError::Timeout {
                            source_name: source.name().to_string(),
                            elapsed: limit,
                        }),
                    };
                    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
                    histogram!("search_source_ms", "source" => source.name().to_string()).record(ms);
                    (qi, si, key, res)
                });
            }
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((qi, si, key, Ok(postings))) => {
                    if let Some(cache) = &self.cache {
                        if !postings.is_empty() {
                            cache.put(key, postings.clone(), now);
                        }
                    }
                    batches.push(((qi, si), postings));
                }
                Ok((_, _, key, Err(e))) => {
                    stats.failed_calls += 1;
                    tracing::warn!(target: "ingest", error = %e, source = %key.source, query = %key.query, "source call failed");
                    counter!("search_source_errors_total", "kind" => e.kind()).increment(1);
                }
                Err(e) => {
                    stats.failed_calls += 1;
                    tracing::warn!(target: "ingest", error = ?e, "source task aborted");
                    counter!("search_source_errors_total", "kind" => "join").increment(1);
                }
            }
        }

        // Completion order is arbitrary; merge in (query, source) order.
        batches.sort_by_key(|(k, _)| *k);
        let merged: Vec<JobPosting> = batches.into_iter().flat_map(|(_, v)| v).collect();
        stats.fetched = merged.len();

        let (unique, duplicates) = dedup_postings(merged);
        let (in_window, outside) = filter_by_window(unique, window, now);
        let candidates = in_window.len();
        let postings = self.filter.filter_jobs(in_window);

        stats.duplicates = duplicates;
        stats.outside_window = outside;
        stats.ineligible = candidates - postings.len();

        counter!("search_postings_fetched_total").increment(stats.fetched as u64);
        counter!("search_dedup_total").increment(duplicates as u64);
        counter!("search_date_filtered_total").increment(outside as u64);

        tracing::info!(
            target: "ingest",
            queries = stats.queries,
            fetched = stats.fetched,
            duplicates = stats.duplicates,
            outside_window = stats.outside_window,
            ineligible = stats.ineligible,
            failed_calls = stats.failed_calls,
            kept = postings.len(),
            "search finished"
        );

        let filters = if stats.fetched == 0 {
            Vec::new()
        } else {
            filters_applied(window)
        };

        SearchResult {
            total_count: postings.len(),
            postings,
            date_range: DateRangeInfo::for_window(window, now),
            filters_applied: filters,
            stats,
        }
    }
}
