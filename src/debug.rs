// src/debug.rs
//! Dev-only observability: anonymized ranking logs and a small ring buffer
//! of recent rankings exposed under `/debug`.
//!
//! Raw résumé text is never logged or stored; only a short sha256 prefix.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{extract::Query, routing::get, Json, Router};
use std::{collections::VecDeque, sync::Mutex};
use tracing::info;

use crate::types::JobMatch;

const HISTORY_CAP: usize = 200;
const TOP_N: usize = 5;

/// One scored posting in a recorded ranking.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedEntry {
    pub job_id: String,
    pub score: u8,
    pub apply: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankingRecord {
    pub at: chrono::DateTime<chrono::Utc>,
    pub resume_id: String,
    pub total: usize,
    pub top: Vec<RankedEntry>,
}

static HISTORY: Lazy<Mutex<VecDeque<RankingRecord>>> =
    Lazy::new(|| Mutex::new(VecDeque::with_capacity(HISTORY_CAP)));

// Dev logging gate: JOBMATCH_DEV_LOG=1 AND dev env (debug or SHUTTLE_ENV in {local,development,dev})
pub fn dev_logging_enabled() -> bool {
    let on = std::env::var("JOBMATCH_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// First 6 bytes of sha256, hex encoded.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

/// In dev only: log a compact anonymized summary and keep it for `/debug/rankings`.
pub fn dev_log_ranking(resume_text: &str, ranking: &[JobMatch<'_>]) {
    if !dev_logging_enabled() {
        return;
    }
    let resume_id = anon_hash(resume_text);
    let top: Vec<RankedEntry> = ranking
        .iter()
        .take(TOP_N)
        .map(|m| RankedEntry {
            job_id: m.job.id.clone(),
            score: m.score,
            apply: m.should_apply(),
        })
        .collect();

    let scores: Vec<u8> = top.iter().map(|e| e.score).collect();
    let reasons = ranking
        .first()
        .map(|m| truncate_vec(&m.reasons, 3))
        .unwrap_or_default();
    info!(
        target: "scoring",
        %resume_id, total = ranking.len(),
        top_scores = ?scores, top_reasons = ?reasons,
        "ranked postings"
    );

    if let Ok(mut h) = HISTORY.lock() {
        if h.len() >= HISTORY_CAP {
            h.pop_front();
        }
        h.push_back(RankingRecord {
            at: chrono::Utc::now(),
            resume_id,
            total: ranking.len(),
            top,
        });
    }
}

pub fn recent_rankings(limit: usize) -> Vec<RankingRecord> {
    match HISTORY.lock() {
        Ok(h) => {
            let start = h.len().saturating_sub(limit);
            h.iter().skip(start).cloned().collect()
        }
        Err(_) => Vec::new(),
    }
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub fn router() -> Router {
    Router::new().route("/debug/rankings", get(rankings))
}

async fn rankings(Query(q): Query<HistoryQuery>) -> Json<Vec<RankingRecord>> {
    Json(recent_rankings(q.limit.unwrap_or(20)))
}
