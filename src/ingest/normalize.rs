// src/ingest/normalize.rs
//! Raw provider JSON → `JobPosting`.
//!
//! Providers disagree on field names, date formats and URL shapes. Each
//! field is read through a fallback list; records without a title or
//! company are rejected.

use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde_json::Value;

use crate::error::MalformedPosting;
use crate::types::JobPosting;

/// Static description of where records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceProfile {
    /// Display name stored on each posting.
    pub name: &'static str,
    /// Prefix used in generated ids.
    pub slug: &'static str,
    /// Site root for relative links and numeric job ids, if any.
    pub site: Option<&'static str>,
}

pub const LINKEDIN: SourceProfile = SourceProfile {
    name: "LinkedIn",
    slug: "linkedin",
    site: Some("https://www.linkedin.com"),
};

pub const GOOGLE_JOBS: SourceProfile = SourceProfile {
    name: "Google Jobs",
    slug: "google",
    site: None,
};

/// Offline records; links are taken as given.
pub const FIXTURE: SourceProfile = SourceProfile {
    name: "Fixture",
    slug: "fixture",
    site: None,
};

const TITLE_KEYS: &[&str] = &["title", "jobTitle"];
const COMPANY_KEYS: &[&str] = &["company", "companyName", "employer"];
const LOCATION_KEYS: &[&str] = &["location", "jobLocation", "locationName"];
const DESCRIPTION_KEYS: &[&str] = &["description", "jobDescription", "summary", "text"];
const DATE_KEYS: &[&str] = &["datePosted", "publishedAt", "postedDate"];
const URL_KEYS: &[&str] = &["url", "jobUrl", "link", "jobLink", "externalUrl", "linkedInUrl"];
const APPLY_KEYS: &[&str] = &["applyUrl", "applicationUrl", "applyLink", "externalApplyUrl"];
const ID_KEYS: &[&str] = &["jobId", "id", "linkedInJobId", "job_id"];

const DESCRIPTION_MAX_CHARS: usize = 20_000;

/// Decode entities, strip tags, normalize quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > DESCRIPTION_MAX_CHARS {
        out = out.chars().take(DESCRIPTION_MAX_CHARS).collect();
    }
    out
}

fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        // e.g. {"company": {"name": "Toyota"}}
        Value::Object(o) => o.get("name").and_then(value_as_string),
        _ => None,
    }
}

fn first_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .find_map(value_as_string)
}

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("number regex"));

/// Resolve absolute or relative ("3 days ago") dates against `now`.
/// Unparseable input yields `now`.
pub fn parse_posted_date(raw: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Utc.from_utc_datetime(&dt);
        }
    }

    let lower = raw.to_lowercase();
    if lower.contains("yesterday") {
        return now - chrono::Duration::days(1);
    }
    let n: i64 = FIRST_NUMBER
        .find(&lower)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);

    if lower.contains("month") {
        let months = u32::try_from(n).unwrap_or(0);
        return now.checked_sub_months(Months::new(months)).unwrap_or(now);
    }
    let delta = if lower.contains("minute") {
        chrono::Duration::try_minutes(n)
    } else if lower.contains("hour") {
        chrono::Duration::try_hours(n)
    } else if lower.contains("day") {
        chrono::Duration::try_days(n)
    } else if lower.contains("week") {
        chrono::Duration::try_weeks(n)
    } else {
        None
    };
    // Out-of-range offsets are treated like unparseable input.
    delta
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(now)
}

fn posted_date(item: &Value, now: DateTime<Utc>) -> DateTime<Utc> {
    for key in DATE_KEYS {
        match item.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return parse_posted_date(s, now),
            Some(Value::Number(n)) => {
                if let Some(ts) = n.as_i64() {
                    // Heuristic: epoch millis vs. seconds.
                    let parsed = if ts > 100_000_000_000 {
                        Utc.timestamp_millis_opt(ts).single()
                    } else {
                        Utc.timestamp_opt(ts, 0).single()
                    };
                    if let Some(dt) = parsed {
                        return dt;
                    }
                }
            }
            _ => {}
        }
    }
    now
}

fn requirement_patterns() -> &'static [Regex] {
    static RE: OnceCell<Vec<Regex>> = OnceCell::new();
    RE.get_or_init(|| {
        [
            r"(?i)\d+\+?\s*(?:years?|yrs?)\s*(?:of\s*)?(?:experience|exp)",
            r"(?i)\b(?:bachelor|master|phd|degree|bs|ms|mba)\b",
            r"(?i)\b(?:pmp|certified|certification)\b",
            r"(?i)\b(?:agile|scrum|kanban|waterfall)\b",
            r"(?i)(?:javascript|python|java|c\+\+|react|node\.js|sql|aws|docker|kubernetes)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("requirement regex"))
        .collect()
    })
}

/// Requirement phrases in original casing, de-duplicated in order.
pub fn extract_requirements(description: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for re in requirement_patterns() {
        for m in re.find_iter(description) {
            let s = m.as_str().to_string();
            if !out.contains(&s) {
                out.push(s);
            }
        }
    }
    out
}

fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Make a link absolute using the source's site root when possible.
pub fn repair_url(raw: &str, profile: &SourceProfile) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_string();
    }
    match profile.site {
        Some(site) if is_numeric_id(raw) => format!("{site}/jobs/view/{raw}"),
        Some(site) if raw.starts_with('/') => format!("{site}{raw}"),
        Some(site) if !raw.contains('.') => format!("{site}/{raw}"),
        _ => format!("https://{}", raw.trim_start_matches('/')),
    }
}

fn job_view_from_id(id: &str, profile: &SourceProfile) -> Option<String> {
    let site = profile.site?;
    let digits = if is_numeric_id(id) {
        id.to_string()
    } else {
        FIRST_NUMBER.find(id)?.as_str().to_string()
    };
    Some(format!("{site}/jobs/view/{digits}"))
}

/// Map one raw record. `index` disambiguates ids within a batch.
pub fn normalize_item(
    profile: &SourceProfile,
    item: &Value,
    index: usize,
    now: DateTime<Utc>,
) -> Result<JobPosting, MalformedPosting> {
    if !item.is_object() {
        return Err(MalformedPosting::NotAnObject);
    }
    let title = first_field(item, TITLE_KEYS).ok_or(MalformedPosting::MissingField("title"))?;
    let company =
        first_field(item, COMPANY_KEYS).ok_or(MalformedPosting::MissingField("company"))?;

    let description = first_field(item, DESCRIPTION_KEYS)
        .map(|d| normalize_text(&d))
        .unwrap_or_default();
    let raw_id = first_field(item, ID_KEYS);

    let mut url = first_field(item, URL_KEYS)
        .map(|u| repair_url(&u, profile))
        .unwrap_or_default();
    if url.is_empty() || url.contains("/jobs/search") {
        if let Some(v) = raw_id.as_deref().and_then(|id| job_view_from_id(id, profile)) {
            url = v;
        }
    }

    let apply_url = match first_field(item, APPLY_KEYS).map(|u| repair_url(&u, profile)) {
        Some(a) if !a.is_empty() && a != url => a,
        _ if url.contains("/jobs/view/") => format!("{}/apply", url.trim_end_matches('/')),
        _ => url.clone(),
    };

    let id_part = raw_id
        .clone()
        .or_else(|| (!url.is_empty()).then(|| url.clone()))
        .unwrap_or_else(|| "item".to_string());

    Ok(JobPosting {
        id: format!("{}-{}-{}", profile.slug, id_part, index),
        title: normalize_text(&title),
        company: normalize_text(&company),
        location: first_field(item, LOCATION_KEYS)
            .map(|l| normalize_text(&l))
            .unwrap_or_default(),
        requirements: extract_requirements(&description),
        description,
        posted_date: posted_date(item, now),
        url,
        apply_url,
        source: profile.name.to_string(),
    })
}

/// Normalize a batch, dropping malformed records with a debug log.
pub fn normalize_batch(
    profile: &SourceProfile,
    items: &[Value],
    now: DateTime<Utc>,
) -> Vec<JobPosting> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match normalize_item(profile, item, i, now) {
            Ok(p) => out.push(p),
            Err(e) => {
                tracing::debug!(target: "ingest", source = profile.name, index = i, error = %e, "dropping malformed record");
                metrics::counter!("search_malformed_total").increment(1);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn normalize_text_strips_markup() {
        let s = "  <p>Hello,&nbsp;&nbsp;<b>world</b></p>  &ldquo;ok&rdquo; ";
        assert_eq!(normalize_text(s), "Hello, world \"ok\"");
    }

    #[test]
    fn relative_dates() {
        let n = now();
        assert_eq!(parse_posted_date("3 hours ago", n), n - chrono::Duration::hours(3));
        assert_eq!(parse_posted_date("2 days ago", n), n - chrono::Duration::days(2));
        assert_eq!(parse_posted_date("1 week ago", n), n - chrono::Duration::days(7));
        assert_eq!(
            parse_posted_date("1 month ago", n),
            Utc.with_ymd_and_hms(2025, 5, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(parse_posted_date("Yesterday", n), n - chrono::Duration::days(1));
        assert_eq!(parse_posted_date("whenever", n), n);
    }

    #[test]
    fn huge_relative_offsets_fall_back_to_now() {
        let n = now();
        assert_eq!(parse_posted_date("Posted 1000000000 days ago", n), n);
        assert_eq!(parse_posted_date("9000000000000 weeks ago", n), n);
        assert_eq!(parse_posted_date("9223372036854775807 hours ago", n), n);
        assert_eq!(parse_posted_date("9223372036854775807 minutes ago", n), n);
        assert_eq!(parse_posted_date("4294967295 months ago", n), n);
    }

    #[test]
    fn huge_offset_does_not_drop_the_batch() {
        let items = vec![
            json!({"title": "PM", "company": "Toyota", "postedDate": "2 days ago"}),
            json!({"title": "PM2", "company": "Acme", "postedDate": "Posted 1000000000 days ago"}),
        ];
        let out = normalize_batch(&LINKEDIN, &items, now());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].posted_date, now() - chrono::Duration::days(2));
        assert_eq!(out[1].posted_date, now());
    }

    #[test]
    fn absolute_dates() {
        let n = now();
        assert_eq!(
            parse_posted_date("2025-06-01T08:30:00Z", n),
            Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap()
        );
        assert_eq!(
            parse_posted_date("2025-06-01", n),
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn requirements_keep_casing_and_order() {
        let r = extract_requirements("5+ years of experience. PMP required. Agile/Scrum, SQL. PMP");
        assert_eq!(
            r,
            vec!["5+ years of experience", "PMP", "Agile", "Scrum", "SQL"]
        );
    }

    #[test]
    fn url_repair() {
        assert_eq!(
            repair_url("123456", &LINKEDIN),
            "https://www.linkedin.com/jobs/view/123456"
        );
        assert_eq!(
            repair_url("/jobs/view/9", &LINKEDIN),
            "https://www.linkedin.com/jobs/view/9"
        );
        assert_eq!(repair_url("careers.acme.com/1", &GOOGLE_JOBS), "https://careers.acme.com/1");
        assert_eq!(repair_url("https://x.test/a", &GOOGLE_JOBS), "https://x.test/a");
    }

    #[test]
    fn field_fallbacks_and_ids() {
        let item = json!({
            "jobTitle": "Program Manager",
            "companyName": {"name": "Toyota"},
            "jobLocation": "Plano, TX",
            "summary": "<p>PMP preferred</p>",
            "postedDate": "2 days ago",
            "jobId": 4242
        });
        let p = normalize_item(&LINKEDIN, &item, 3, now()).unwrap();
        assert_eq!(p.id, "linkedin-4242-3");
        assert_eq!(p.title, "Program Manager");
        assert_eq!(p.company, "Toyota");
        assert_eq!(p.location, "Plano, TX");
        assert_eq!(p.description, "PMP preferred");
        assert_eq!(p.requirements, vec!["PMP"]);
        assert_eq!(p.posted_date, now() - chrono::Duration::days(2));
        assert_eq!(p.url, "https://www.linkedin.com/jobs/view/4242");
        assert_eq!(p.apply_url, "https://www.linkedin.com/jobs/view/4242/apply");
        assert_eq!(p.source, "LinkedIn");
    }

    #[test]
    fn apply_url_defaults_to_url() {
        let item = json!({"title": "PM", "employer": "Acme", "link": "acme.com/jobs/1"});
        let p = normalize_item(&GOOGLE_JOBS, &item, 0, now()).unwrap();
        assert_eq!(p.url, "https://acme.com/jobs/1");
        assert_eq!(p.apply_url, p.url);
        assert_eq!(p.posted_date, now());
    }

    #[test]
    fn missing_title_or_company_is_malformed() {
        let n = now();
        assert_eq!(
            normalize_item(&LINKEDIN, &json!({"company": "Acme"}), 0, n),
            Err(MalformedPosting::MissingField("title"))
        );
        assert_eq!(
            normalize_item(&LINKEDIN, &json!({"title": "PM", "company": "  "}), 0, n),
            Err(MalformedPosting::MissingField("company"))
        );
        assert_eq!(
            normalize_item(&LINKEDIN, &json!("nope"), 0, n),
            Err(MalformedPosting::NotAnObject)
        );
    }

    #[test]
    fn batch_drops_malformed() {
        let items = vec![json!({"title": "PM", "company": "A"}), json!({"title": "PM"})];
        assert_eq!(normalize_batch(&GOOGLE_JOBS, &items, now()).len(), 1);
    }
}
