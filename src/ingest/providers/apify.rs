// src/ingest/providers/apify.rs
//! Actor-platform scraper source.
//!
//! One call = start an actor run, wait a bounded time for it to finish,
//! then read whatever landed in its default dataset. A run that is still
//! RUNNING or ended FAILED may still hold partial results, so the dataset
//! is read either way.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::SourceError;
use crate::ingest::normalize::{normalize_batch, SourceProfile, GOOGLE_JOBS, LINKEDIN};
use crate::ingest::types::PostingSource;
use crate::types::JobPosting;

pub const DEFAULT_APIFY_BASE_URL: &str = "https://api.apify.com";
pub const DEFAULT_LINKEDIN_ACTOR: &str = "curious_coder~linkedin-jobs-scraper";
pub const DEFAULT_GOOGLE_ACTOR: &str = "orgupdate~google-jobs-scraper";

const LINKEDIN_SEARCH_URL: &str = "https://www.linkedin.com/jobs/search/";
const US_GEO_ID: &str = "103644278";

/// Which scraper the actor is, which decides its input shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorFlavor {
    LinkedIn,
    GoogleJobs,
}

impl ActorFlavor {
    pub fn profile(self) -> &'static SourceProfile {
        match self {
            ActorFlavor::LinkedIn => &LINKEDIN,
            ActorFlavor::GoogleJobs => &GOOGLE_JOBS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApifySettings {
    pub base_url: String,
    pub token: Option<String>,
    /// Upper bound for the server-side `waitForFinish`.
    pub wait_secs: u64,
    pub result_count: u32,
}

impl Default for ApifySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_APIFY_BASE_URL.to_string(),
            token: None,
            wait_secs: 45,
            result_count: 50,
        }
    }
}

fn is_us(location: &str) -> bool {
    let l = location.trim().to_lowercase();
    l == "us" || l == "usa" || l.contains("united states")
}

/// LinkedIn search URL: full-time only, posted within `days`.
pub fn linkedin_search_url(query: &str, location: &str, days: u32) -> String {
    let tpr = format!("r{}", u64::from(days) * 86_400);
    let mut params: Vec<(&str, &str)> = vec![("keywords", query), ("location", location)];
    if is_us(location) {
        params.push(("geoId", US_GEO_ID));
    }
    params.extend([
        ("f_JT", "F"),
        ("f_TPR", tpr.as_str()),
        ("position", "1"),
        ("pageNum", "0"),
    ]);
    match Url::parse_with_params(LINKEDIN_SEARCH_URL, &params) {
        Ok(u) => u.to_string(),
        Err(_) => LINKEDIN_SEARCH_URL.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    data: RunInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunInfo {
    id: String,
    #[serde(default)]
    status: String,
    default_dataset_id: String,
}

pub struct ApifyActorSource {
    flavor: ActorFlavor,
    actor_id: String,
    settings: ApifySettings,
    client: Client,
}

impl ApifyActorSource {
    pub fn new(flavor: ActorFlavor, actor_id: impl Into<String>, settings: ApifySettings) -> Self {
        let client = Client::builder()
            .user_agent("job-match-assistant/0.1")
            .build()
            .unwrap_or_default();
        Self {
            flavor,
            actor_id: actor_id.into(),
            settings,
            client,
        }
    }

    pub fn flavor(&self) -> ActorFlavor {
        self.flavor
    }

    /// Actor input for one query.
    pub fn build_input(&self, query: &str, location: &str, days: u32) -> Value {
        match self.flavor {
            ActorFlavor::LinkedIn => json!({
                "urls": [linkedin_search_url(query, location, days)],
                "scrapeCompany": true,
                "count": self.settings.result_count,
                "splitByLocation": false,
            }),
            ActorFlavor::GoogleJobs => json!({
                "query": query,
                "location": location,
                "google_domain": "google.com",
                "num_results": self.settings.result_count,
                "max_pagination": 0,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v2/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn start_run(&self, token: &str, input: &Value) -> Result<RunInfo, SourceError> {
        let url = self.endpoint(&format!("acts/{}/runs", self.actor_id.replace('/', "~")));
        let env: RunEnvelope = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(input)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(env.data)
    }

    async fn wait_for_run(&self, token: &str, run_id: &str) -> Result<RunInfo, SourceError> {
        let url = self.endpoint(&format!("actor-runs/{run_id}"));
        let env: RunEnvelope = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("waitForFinish", self.settings.wait_secs)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(env.data)
    }

    async fn dataset_items(&self, token: &str, dataset_id: &str) -> Result<Vec<Value>, SourceError> {
        let url = self.endpoint(&format!("datasets/{dataset_id}/items"));
        let body: Value = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("clean", "true"), ("format", "json")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        match body {
            Value::Array(items) => Ok(items),
            other => Err(SourceError::Decode(format!(
                "expected dataset array, got {}",
                match other {
                    Value::Object(_) => "object",
                    Value::Null => "null",
                    _ => "scalar",
                }
            ))),
        }
    }
}

#[async_trait]
impl PostingSource for ApifyActorSource {
    async fn search(
        &self,
        query: &str,
        location: &str,
        days: u32,
    ) -> Result<Vec<JobPosting>, SourceError> {
        let Some(token) = self.settings.token.as_deref().filter(|t| !t.is_empty()) else {
            return Err(SourceError::unavailable(self.name(), "APIFY_API_TOKEN not set"));
        };

        let input = self.build_input(query, location, days);
        let started = self.start_run(token, &input).await?;

        let run = match self.wait_for_run(token, &started.id).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "ingest", error = %e, source = self.name(), run = %started.id, "wait for run failed; reading dataset anyway");
                started
            }
        };
        if run.status != "SUCCEEDED" {
            tracing::info!(target: "ingest", source = self.name(), status = %run.status, "actor run not finished; using partial results");
        }

        let items = self.dataset_items(token, &run.default_dataset_id).await?;
        Ok(normalize_batch(
            self.flavor.profile(),
            &items,
            chrono::Utc::now(),
        ))
    }

    fn name(&self) -> &str {
        self.flavor.profile().name
    }
}
