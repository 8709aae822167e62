// tests/search_orchestrator.rs
//
// Fan-out, merge, de-dup, window and eligibility behavior of the search
// pipeline, driven by in-memory sources and the JSON fixture.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use job_match_assistant::error::SourceError;
use job_match_assistant::ingest::cache::SearchCache;
use job_match_assistant::ingest::normalize::LINKEDIN;
use job_match_assistant::ingest::providers::FixtureSource;
use job_match_assistant::ingest::types::{DateWindow, PostingSource};
use job_match_assistant::ingest::{SearchOrchestrator, SearchSettings};
use job_match_assistant::{EligibilityFilter, JobPosting};

const ELIGIBLE: &str = "Full-time, $120k, health insurance and 401(k) benefits.";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

fn posting(id: &str, title: &str, company: &str, posted: DateTime<Utc>) -> JobPosting {
    JobPosting {
        id: id.into(),
        title: title.into(),
        company: company.into(),
        location: "Remote".into(),
        description: ELIGIBLE.into(),
        requirements: vec![],
        posted_date: posted,
        url: format!("https://example.test/{id}"),
        apply_url: String::new(),
        source: "Static".into(),
    }
}

struct StaticSource {
    name: &'static str,
    postings: Vec<JobPosting>,
    calls: AtomicUsize,
}

impl StaticSource {
    fn new(name: &'static str, postings: Vec<JobPosting>) -> Arc<Self> {
        Arc::new(Self {
            name,
            postings,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PostingSource for StaticSource {
    async fn search(&self, _q: &str, _l: &str, _d: u32) -> Result<Vec<JobPosting>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.postings.clone())
    }
    fn name(&self) -> &str {
        self.name
    }
}

struct FailingSource;

#[async_trait]
impl PostingSource for FailingSource {
    async fn search(&self, _q: &str, _l: &str, _d: u32) -> Result<Vec<JobPosting>, SourceError> {
        Err(SourceError::unavailable("failing", "actor run failed"))
    }
    fn name(&self) -> &str {
        "failing"
    }
}

struct HangingSource;

#[async_trait]
impl PostingSource for HangingSource {
    async fn search(&self, _q: &str, _l: &str, _d: u32) -> Result<Vec<JobPosting>, SourceError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![])
    }
    fn name(&self) -> &str {
        "hanging"
    }
}

fn orchestrator(sources: Vec<Arc<dyn PostingSource>>) -> SearchOrchestrator {
    SearchOrchestrator::new(
        sources,
        Arc::new(EligibilityFilter::default()),
        SearchSettings {
            source_timeout: Duration::from_secs(5),
            ..SearchSettings::default()
        },
    )
}

#[tokio::test]
async fn identical_postings_across_sources_merge_to_one() {
    let t = now() - chrono::Duration::days(1);
    let a = StaticSource::new("a", vec![posting("a-1", "Program Manager", "PepsiCo", t)]);
    let b = StaticSource::new("b", vec![posting("b-9", "Program Manager", "PepsiCo", t)]);
    let o = orchestrator(vec![a, b]);

    let res = o
        .search_postings_at(now(), None, &[], DateWindow::Week)
        .await;
    assert_eq!(res.total_count, 1);
    assert_eq!(res.postings[0].id, "a-1", "first source wins");
    assert_eq!(res.stats.fetched, 2);
    assert_eq!(res.stats.duplicates, 1);
}

#[tokio::test]
async fn window_bounds_are_inclusive() {
    let n = now();
    let src = StaticSource::new(
        "s",
        vec![
            posting("edge-old", "Project Manager", "Toyota", n - chrono::Duration::days(7)),
            posting(
                "too-old",
                "Program Manager",
                "Toyota",
                n - chrono::Duration::days(7) - chrono::Duration::seconds(1),
            ),
            posting("now", "Delivery Manager", "Toyota", n),
            posting("future", "Portfolio Manager", "Toyota", n + chrono::Duration::seconds(1)),
        ],
    );
    let res = orchestrator(vec![src])
        .search_postings_at(n, None, &[], DateWindow::Week)
        .await;
    let ids: Vec<&str> = res.postings.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["edge-old", "now"]);
    assert_eq!(res.stats.outside_window, 2);
    assert!(res
        .postings
        .iter()
        .all(|p| res.date_range.from <= p.posted_date && p.posted_date <= res.date_range.to));
}

#[tokio::test]
async fn failing_source_contributes_nothing() {
    let t = now() - chrono::Duration::hours(3);
    let good = StaticSource::new("good", vec![posting("g-1", "Project Manager", "Toyota", t)]);
    let o = orchestrator(vec![Arc::new(FailingSource), good]);

    let res = o
        .search_postings_at(now(), Some("Program Manager"), &[], DateWindow::Day)
        .await;
    assert_eq!(res.stats.queries, 2);
    assert_eq!(res.stats.failed_calls, 2);
    assert_eq!(res.total_count, 1, "duplicate across both queries collapses");
    assert!(!res.filters_applied.is_empty());
}

#[tokio::test(start_paused = true)]
async fn hanging_source_times_out() {
    let t = now() - chrono::Duration::hours(1);
    let good = StaticSource::new("good", vec![posting("g-1", "Project Manager", "Toyota", t)]);
    let o = orchestrator(vec![Arc::new(HangingSource), good]);

    let res = o
        .search_postings_at(now(), None, &[], DateWindow::Week)
        .await;
    assert_eq!(res.stats.failed_calls, 1);
    assert_eq!(res.total_count, 1);
}

#[tokio::test]
async fn all_sources_failing_is_an_empty_result() {
    let o = orchestrator(vec![Arc::new(FailingSource)]);
    let res = o
        .search_postings_at(now(), None, &["agile".to_string()], DateWindow::Month)
        .await;
    assert!(res.postings.is_empty());
    assert_eq!(res.total_count, 0);
    assert!(res.filters_applied.is_empty());
    assert_eq!(res.date_range.to, now());
    assert_eq!(res.date_range.from, now() - chrono::Duration::days(30));
}

#[tokio::test]
async fn no_sources_is_an_empty_result() {
    let res = orchestrator(vec![])
        .search_postings_at(now(), None, &[], DateWindow::Week)
        .await;
    assert!(res.postings.is_empty());
    assert!(res.filters_applied.is_empty());
}

#[tokio::test]
async fn cache_serves_repeat_searches() {
    let t = now() - chrono::Duration::days(2);
    let src = StaticSource::new("s", vec![posting("s-1", "Project Manager", "Toyota", t)]);
    let cache = Arc::new(SearchCache::new(Duration::from_secs(60)));
    let o = orchestrator(vec![src.clone()]).with_cache(cache.clone());

    let first = o
        .search_postings_at(now(), None, &[], DateWindow::Week)
        .await;
    let second = o
        .search_postings_at(now() + chrono::Duration::seconds(30), None, &[], DateWindow::Week)
        .await;
    assert_eq!(src.calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.stats.cache_hits, 1);
    assert_eq!(first.postings, second.postings);

    // Past the TTL the source is asked again.
    o.search_postings_at(now() + chrono::Duration::seconds(61), None, &[], DateWindow::Week)
        .await;
    assert_eq!(src.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn each_search_drops_stale_entries_for_other_queries() {
    let t = now() - chrono::Duration::days(2);
    let src = StaticSource::new("s", vec![posting("s-1", "Project Manager", "Toyota", t)]);
    let cache = Arc::new(SearchCache::new(Duration::from_secs(60)));
    let o = orchestrator(vec![src]).with_cache(cache.clone());

    o.search_postings_at(now(), Some("Program Manager"), &[], DateWindow::Week)
        .await;
    assert_eq!(cache.len(), 2);

    // A later search with different queries never reads those keys again.
    o.search_postings_at(now() + chrono::Duration::seconds(120), None, &[], DateWindow::Month)
        .await;
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn fixture_pipeline_end_to_end() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/postings.json");
    let src = FixtureSource::from_path(LINKEDIN, &path).unwrap();
    assert_eq!(src.len(), 7);
    let o = orchestrator(vec![Arc::new(src)]);

    let week = o
        .search_postings_at(now(), None, &[], DateWindow::Week)
        .await;
    let companies: Vec<&str> = week.postings.iter().map(|p| p.company.as_str()).collect();
    assert_eq!(companies, vec!["Toyota", "PepsiCo"]);
    assert_eq!(week.stats.fetched, 6);
    assert_eq!(week.stats.duplicates, 1);
    assert_eq!(week.stats.outside_window, 1);
    assert_eq!(week.stats.ineligible, 2);
    assert_eq!(week.date_range.from_formatted, "6/8/2025");
    assert_eq!(week.date_range.to_formatted, "6/15/2025");

    let toyota = &week.postings[0];
    assert_eq!(toyota.url, "https://www.linkedin.com/jobs/view/3901");
    assert_eq!(toyota.apply_url, "https://www.linkedin.com/jobs/view/3901/apply");
    assert!(toyota.requirements.iter().any(|r| r == "PMP"));

    let month = o
        .search_postings_at(now(), None, &[], DateWindow::Month)
        .await;
    let companies: Vec<&str> = month.postings.iter().map(|p| p.company.as_str()).collect();
    assert_eq!(companies, vec!["Toyota", "PepsiCo", "Globex"]);
}
