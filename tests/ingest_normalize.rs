// tests/ingest_normalize.rs
use chrono::{TimeZone, Utc};
use serde_json::json;

use job_match_assistant::error::MalformedPosting;
use job_match_assistant::ingest::normalize::{
    normalize_batch, normalize_item, normalize_text, GOOGLE_JOBS, LINKEDIN,
};

#[test]
fn scraped_html_is_cleaned() {
    let raw = "<div>Lead&nbsp;our <strong>PMO</strong>.<br/>\n\n  Hybrid &amp; remote</div>";
    assert_eq!(normalize_text(raw), "Lead our PMO . Hybrid & remote");
}

#[test]
fn relative_url_and_text_date() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let item = json!({
        "title": "Project Manager",
        "company": "Toyota",
        "jobUrl": "/jobs/view/555",
        "datePosted": "3 hours ago",
        "description": "Agile. 3+ years of experience. Kanban boards."
    });
    let p = normalize_item(&LINKEDIN, &item, 0, now).unwrap();
    assert_eq!(p.url, "https://www.linkedin.com/jobs/view/555");
    assert_eq!(p.apply_url, "https://www.linkedin.com/jobs/view/555/apply");
    assert_eq!(p.posted_date, now - chrono::Duration::hours(3));
    assert_eq!(p.requirements, vec!["3+ years of experience", "Agile", "Kanban"]);
    assert_eq!(p.id, "linkedin-https://www.linkedin.com/jobs/view/555-0");
}

#[test]
fn explicit_apply_link_and_epoch_dates() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let posted = Utc.with_ymd_and_hms(2025, 6, 14, 0, 0, 0).unwrap();
    let item = json!({
        "title": "Program Manager",
        "companyName": "PepsiCo",
        "link": "https://careers.pepsico.test/jobs/1",
        "applyLink": "careers.pepsico.test/apply/1",
        "publishedAt": posted.timestamp_millis()
    });
    let p = normalize_item(&GOOGLE_JOBS, &item, 4, now).unwrap();
    assert_eq!(p.apply_url, "https://careers.pepsico.test/apply/1");
    assert_eq!(p.posted_date, posted);
    assert_eq!(p.source, "Google Jobs");
    assert!(p.id.starts_with("google-") && p.id.ends_with("-4"));
}

#[test]
fn malformed_records_are_dropped_not_fatal() {
    let now = Utc::now();
    let items = vec![
        json!({"title": "PM", "company": "Acme"}),
        json!(null),
        json!({"company": "Acme"}),
        json!({"title": "Coordinator", "company": "Globex"}),
    ];
    assert_eq!(
        normalize_item(&LINKEDIN, &items[2], 2, now).unwrap_err(),
        MalformedPosting::MissingField("title")
    );
    let out = normalize_batch(&LINKEDIN, &items, now);
    let titles: Vec<&str> = out.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["PM", "Coordinator"]);
    assert_eq!(out[1].id, "linkedin-item-3");
}
