// src/types.rs
//! Shared data model: postings, résumé data and match results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized job posting. Immutable once it leaves the ingest layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub posted_date: DateTime<Utc>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub apply_url: String,
    #[serde(default)]
    pub source: String,
}

impl JobPosting {
    /// Link the user should follow to apply; falls back to the listing URL.
    pub fn apply_link(&self) -> &str {
        if self.apply_url.is_empty() {
            &self.url
        } else {
            &self.apply_url
        }
    }

    /// Key used for cross-source de-duplication.
    pub fn dedup_key(&self) -> (String, String) {
        (
            self.title.trim().to_lowercase(),
            self.company.trim().to_lowercase(),
        )
    }
}

/// Structured view of an uploaded résumé.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub text: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Apply,
    Skip,
}

/// Result of scoring one posting against one résumé.
///
/// Borrows the posting; the scorer never copies or mutates it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch<'a> {
    pub job: &'a JobPosting,
    pub score: u8,
    pub recommendation: Recommendation,
    pub reasons: Vec<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

impl JobMatch<'_> {
    pub fn should_apply(&self) -> bool {
        self.recommendation == Recommendation::Apply
    }
}
