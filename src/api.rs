// src/api.rs
//! HTTP JSON surface: search, résumé upload, scoring, application log.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shuttle_axum::axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::applications::{ApplicationLog, ApplicationRecord};
use crate::config::AppConfig;
use crate::debug;
use crate::eligibility::{EligibilityFilter, EligibilityRules};
use crate::error::ExtractError;
use crate::ingest::cache::SearchCache;
use crate::ingest::types::{DateWindow, PostingSource};
use crate::ingest::{SearchOrchestrator, SearchSettings};
use crate::keywords::KeywordExtractor;
use crate::notify::{fire_and_forget, AnalyticsEvent, AnalyticsSink, WebhookSink};
use crate::resume::{DocumentExtractor, TextExtractor};
use crate::scoring::{HotReloadPolicy, MatchScorer};
use crate::types::{JobPosting, ResumeData};
use crate::vocabulary::Vocabulary;

/// Upload cap for résumé documents.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SearchOrchestrator>,
    pub filter: Arc<EligibilityFilter>,
    pub extractor: KeywordExtractor,
    pub policy: Arc<HotReloadPolicy>,
    pub documents: Arc<dyn TextExtractor>,
    pub applications: Arc<ApplicationLog>,
    pub analytics: Arc<dyn AnalyticsSink>,
}

impl AppState {
    /// Built-in vocabulary, rules and policy; no cache; analytics disabled.
    pub fn new(sources: Vec<Arc<dyn PostingSource>>, settings: SearchSettings) -> Self {
        let filter = Arc::new(EligibilityFilter::default());
        Self {
            orchestrator: Arc::new(SearchOrchestrator::new(
                sources,
                Arc::clone(&filter),
                settings,
            )),
            filter,
            extractor: KeywordExtractor::default(),
            policy: Arc::new(HotReloadPolicy::new(None)),
            documents: Arc::new(DocumentExtractor),
            applications: Arc::new(ApplicationLog::new()),
            analytics: Arc::new(WebhookSink::new(None)),
        }
    }

    /// Production wiring: config files, actor sources, cache and webhook.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let filter = Arc::new(EligibilityFilter::new(EligibilityRules::load_default()));
        let cache = Arc::new(SearchCache::new(cfg.cache_ttl));
        let orchestrator =
            SearchOrchestrator::new(cfg.build_sources()?, Arc::clone(&filter), cfg.search_settings())
                .with_cache(cache);
        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            filter,
            extractor: KeywordExtractor::new(Arc::new(Vocabulary::load_default())),
            policy: Arc::new(HotReloadPolicy::from_env()),
            documents: Arc::new(DocumentExtractor),
            applications: Arc::new(ApplicationLog::new()),
            analytics: Arc::new(WebhookSink::new(cfg.analytics_webhook_url.clone())),
        })
    }

    pub fn with_analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = sink;
        self
    }

    fn scorer(&self) -> MatchScorer {
        MatchScorer::new(self.extractor.clone(), self.policy.current())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/search-jobs", get(search_jobs))
        .route(
            "/upload-resume",
            post(upload_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/score-jobs", post(score_jobs))
        .route("/apply-job", post(apply_job))
        .route("/applications", get(applications))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
        .merge(debug::router())
}

/// Error body: `{ "success": false, "error": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        let status = match e {
            ExtractError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ExtractError::Unreadable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    date_range: Option<String>,
    title: Option<String>,
    keywords: Option<String>,
}

async fn search_jobs(
    State(state): State<AppState>,
    Query(q): Query<SearchParams>,
) -> Json<serde_json::Value> {
    let window = DateWindow::parse(q.date_range.as_deref().unwrap_or_default());
    let keywords: Vec<String> = q
        .keywords
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    let result = state
        .orchestrator
        .search_postings(q.title.as_deref(), &keywords, window)
        .await;

    let days = window.days();
    let unit = if days == 1 { "day" } else { "days" };
    let message = if result.total_count == 0 {
        format!("No eligible jobs found in the last {days} {unit}")
    } else {
        format!(
            "Found {} eligible jobs posted in the last {days} {unit}",
            result.total_count
        )
    };
    tracing::info!(target: "api", days, total = result.total_count, "search-jobs");

    Json(json!({
        "success": true,
        "jobs": result.postings,
        "totalJobs": result.total_count,
        "dateRange": result.date_range,
        "filtersApplied": result.filters_applied,
        "stats": result.stats,
        "message": message,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResp {
    success: bool,
    resume_text: String,
    skills: Vec<String>,
    experience: Vec<String>,
    education: Vec<String>,
    job_title: Option<String>,
    job_keywords: Vec<String>,
}

async fn upload_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResp>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("No file uploaded"));
    }
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let text = state.documents.extract_text(&body, mime)?;
    if text.trim().is_empty() {
        return Err(ExtractError::Unreadable("no text found in document".into()).into());
    }

    let r = ResumeData::from_text(text);
    tracing::info!(
        target: "api",
        resume_id = %debug::anon_hash(&r.text),
        skills = r.skills.len(),
        has_title = r.job_title.is_some(),
        "resume parsed"
    );
    Ok(Json(UploadResp {
        success: true,
        resume_text: r.text,
        skills: r.skills,
        experience: r.experience,
        education: r.education,
        job_title: r.job_title,
        job_keywords: r.job_keywords,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreReq {
    resume_text: Option<String>,
    job_title: Option<String>,
    job_keywords: Option<Vec<String>>,
    jobs: Option<Vec<JobPosting>>,
}

async fn score_jobs(
    State(state): State<AppState>,
    Json(req): Json<ScoreReq>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(text), Some(jobs)) = (req.resume_text, req.jobs) else {
        return Err(ApiError::bad_request("Missing resume text or jobs"));
    };
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("Missing resume text or jobs"));
    }

    let mut resume = ResumeData::from_text(text);
    if let Some(t) = req.job_title.filter(|t| !t.trim().is_empty()) {
        resume.job_title = Some(t);
    }
    if let Some(k) = req.job_keywords.filter(|k| !k.is_empty()) {
        resume.job_keywords = k;
    }

    // Postings from the client are untrusted; re-apply the rules.
    let eligible = state.filter.filter_jobs(jobs);
    let matches = state.scorer().score_all(&resume, &eligible);
    debug::dev_log_ranking(&resume.text, &matches);

    Ok(Json(json!({
        "success": true,
        "matches": matches,
        "totalJobs": matches.len(),
        "extractedRole": resume.job_title,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyReq {
    job_id: Option<String>,
    #[serde(default)]
    job_title: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    apply_url: String,
}

async fn apply_job(
    State(state): State<AppState>,
    Json(req): Json<ApplyReq>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(job_id) = req.job_id.filter(|id| !id.trim().is_empty()) else {
        return Err(ApiError::bad_request("Missing jobId"));
    };
    let now = chrono::Utc::now();

    let recorded = state.applications.mark_applied(ApplicationRecord {
        job_id: job_id.clone(),
        job_title: req.job_title.clone(),
        company: req.company.clone(),
        applied_date: now,
        apply_url: req.apply_url,
    });
    if recorded {
        fire_and_forget(
            Arc::clone(&state.analytics),
            AnalyticsEvent::apply_clicked(job_id.clone(), req.job_title, req.company, now),
        );
    }

    Ok(Json(json!({
        "success": true,
        "jobId": job_id,
        "alreadyApplied": !recorded,
    })))
}

async fn applications(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "records": state.applications.records(),
        "stats": state.applications.stats(chrono::Utc::now()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_errors_map_to_status() {
        let e: ApiError = ExtractError::UnsupportedFormat("application/zip".into()).into();
        assert_eq!(e.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let e: ApiError = ExtractError::Unreadable("x".into()).into();
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
