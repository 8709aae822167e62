// src/applications.rs
//! In-session log of postings the user applied to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub applied_date: DateTime<Utc>,
    pub apply_url: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total: usize,
    pub this_week: usize,
    pub this_month: usize,
}

#[derive(Debug, Default)]
pub struct ApplicationLog {
    records: Mutex<Vec<ApplicationRecord>>,
}

impl ApplicationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the job was already recorded; the first record wins.
    pub fn mark_applied(&self, record: ApplicationRecord) -> bool {
        let Ok(mut recs) = self.records.lock() else {
            return false;
        };
        if recs.iter().any(|r| r.job_id == record.job_id) {
            return false;
        }
        recs.push(record);
        true
    }

    pub fn unmark(&self, job_id: &str) -> bool {
        let Ok(mut recs) = self.records.lock() else {
            return false;
        };
        let before = recs.len();
        recs.retain(|r| r.job_id != job_id);
        recs.len() != before
    }

    pub fn is_applied(&self, job_id: &str) -> bool {
        self.records
            .lock()
            .map(|r| r.iter().any(|x| x.job_id == job_id))
            .unwrap_or(false)
    }

    /// Newest first.
    pub fn records(&self) -> Vec<ApplicationRecord> {
        let mut out = self.records.lock().map(|r| r.clone()).unwrap_or_default();
        out.sort_by(|a, b| b.applied_date.cmp(&a.applied_date));
        out
    }

    pub fn stats(&self, now: DateTime<Utc>) -> ApplicationStats {
        let recs = self.records.lock().map(|r| r.clone()).unwrap_or_default();
        let week_ago = now - chrono::Duration::days(7);
        let month_ago = now - chrono::Duration::days(30);
        ApplicationStats {
            total: recs.len(),
            this_week: recs.iter().filter(|r| r.applied_date >= week_ago).count(),
            this_month: recs.iter().filter(|r| r.applied_date >= month_ago).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rec(id: &str, at: DateTime<Utc>) -> ApplicationRecord {
        ApplicationRecord {
            job_id: id.into(),
            job_title: "Project Manager".into(),
            company: "Toyota".into(),
            applied_date: at,
            apply_url: format!("https://example.test/{id}"),
        }
    }

    #[test]
    fn marking_is_idempotent() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let log = ApplicationLog::new();
        assert!(log.mark_applied(rec("a", now)));
        assert!(!log.mark_applied(rec("a", now + chrono::Duration::hours(1))));
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].applied_date, now);
        assert!(log.is_applied("a"));
        assert!(log.unmark("a"));
        assert!(!log.unmark("a"));
        assert!(!log.is_applied("a"));
    }

    #[test]
    fn stats_by_period() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        let log = ApplicationLog::new();
        log.mark_applied(rec("a", now - chrono::Duration::days(1)));
        log.mark_applied(rec("b", now - chrono::Duration::days(10)));
        log.mark_applied(rec("c", now - chrono::Duration::days(60)));
        assert_eq!(
            log.stats(now),
            ApplicationStats {
                total: 3,
                this_week: 1,
                this_month: 2
            }
        );
        let ids: Vec<String> = log.records().into_iter().map(|r| r.job_id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
