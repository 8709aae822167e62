// tests/search_cache.rs
use std::time::Duration;

use chrono::{TimeZone, Utc};
use job_match_assistant::ingest::cache::{SearchCache, SearchKey};
use job_match_assistant::JobPosting;

fn posting(id: &str) -> JobPosting {
    JobPosting {
        id: id.into(),
        title: "Project Manager".into(),
        company: "Toyota".into(),
        location: String::new(),
        description: String::new(),
        requirements: vec![],
        posted_date: Utc::now(),
        url: String::new(),
        apply_url: String::new(),
        source: "Test".into(),
    }
}

#[test]
fn entries_expire_after_ttl() {
    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let cache = SearchCache::new(Duration::from_secs(24 * 60 * 60));
    let key = SearchKey::new("LinkedIn", "Project Manager", 7);

    cache.put(key.clone(), vec![posting("a")], t0);
    assert_eq!(cache.get(&key, t0 + chrono::Duration::hours(23)).map(|v| v.len()), Some(1));
    assert!(cache.get(&key, t0 + chrono::Duration::hours(24)).is_none());
    assert!(cache.is_empty(), "expired entry evicted on read");
}

#[test]
fn keys_distinguish_source_and_window_but_not_query_case() {
    let t0 = Utc::now();
    let cache = SearchCache::default();
    cache.put(SearchKey::new("LinkedIn", "Project Manager", 7), vec![posting("a")], t0);

    assert!(cache.get(&SearchKey::new("LinkedIn", " project manager ", 7), t0).is_some());
    assert!(cache.get(&SearchKey::new("LinkedIn", "project manager", 14), t0).is_none());
    assert!(cache.get(&SearchKey::new("Google Jobs", "project manager", 7), t0).is_none());
}

#[test]
fn purge_drops_only_stale_entries() {
    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let cache = SearchCache::new(Duration::from_secs(60));
    cache.put(SearchKey::new("a", "q", 7), vec![posting("1")], t0);
    cache.put(
        SearchKey::new("b", "q", 7),
        vec![posting("2")],
        t0 + chrono::Duration::seconds(50),
    );
    assert_eq!(cache.purge_expired(t0 + chrono::Duration::seconds(90)), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn unread_keys_do_not_outlive_the_ttl() {
    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let cache = SearchCache::new(Duration::from_secs(60));
    let a = SearchKey::new("LinkedIn", "project manager", 7);
    let b = SearchKey::new("LinkedIn", "quantum basket weaver", 7);
    cache.put(a.clone(), vec![posting("a")], t0);
    cache.put(b, vec![posting("b")], t0);
    assert_eq!(cache.len(), 2);

    let later = t0 + chrono::Duration::seconds(120);
    assert!(cache.get(&a, later).is_none());
    assert_eq!(cache.len(), 1, "only the key that was read is gone");

    assert_eq!(cache.purge_expired(later), 1);
    assert_eq!(cache.len(), 0);
}

#[test]
fn writes_sweep_expired_entries() {
    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let cache = SearchCache::new(Duration::from_secs(60));
    for q in ["a", "b", "c"] {
        cache.put(SearchKey::new("LinkedIn", q, 7), vec![posting(q)], t0);
    }
    let later = t0 + chrono::Duration::seconds(61);
    cache.put(SearchKey::new("LinkedIn", "d", 7), vec![posting("d")], later);
    assert_eq!(cache.len(), 1);
    assert!(cache
        .get(&SearchKey::new("LinkedIn", "d", 7), later)
        .is_some());
}
