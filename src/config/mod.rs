// src/config/mod.rs
//! Process configuration from the environment (`.env` is loaded by the binary).

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::ingest::cache::DEFAULT_CACHE_TTL;
use crate::ingest::normalize::FIXTURE;
use crate::ingest::providers::apify::{
    ActorFlavor, ApifyActorSource, ApifySettings, DEFAULT_APIFY_BASE_URL, DEFAULT_GOOGLE_ACTOR,
    DEFAULT_LINKEDIN_ACTOR,
};
use crate::ingest::providers::FixtureSource;
use crate::ingest::types::PostingSource;
use crate::ingest::{SearchSettings, DEFAULT_BASE_QUERY, DEFAULT_LOCATION};
use crate::notify::webhook::ENV_ANALYTICS_WEBHOOK_URL;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub apify_token: Option<String>,
    pub apify_base_url: String,
    pub linkedin_actor: String,
    pub google_actor: String,
    pub location: String,
    pub source_timeout: Duration,
    pub actor_wait_secs: u64,
    pub actor_result_count: u32,
    pub cache_ttl: Duration,
    /// When set, postings come from this JSON file instead of the actor platform.
    pub fixture_postings_path: Option<PathBuf>,
    pub analytics_webhook_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            apify_token: None,
            apify_base_url: DEFAULT_APIFY_BASE_URL.to_string(),
            linkedin_actor: DEFAULT_LINKEDIN_ACTOR.to_string(),
            google_actor: DEFAULT_GOOGLE_ACTOR.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            source_timeout: Duration::from_secs(60),
            actor_wait_secs: 45,
            actor_result_count: 50,
            cache_ttl: DEFAULT_CACHE_TTL,
            fixture_postings_path: None,
            analytics_webhook_url: None,
        }
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {v:?}")),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let d = Self::default();

        Ok(Self {
            apify_token: get("APIFY_API_TOKEN"),
            apify_base_url: get("APIFY_BASE_URL").unwrap_or(d.apify_base_url),
            linkedin_actor: get("APIFY_LINKEDIN_ACTOR_ID").unwrap_or(d.linkedin_actor),
            google_actor: get("APIFY_GOOGLE_ACTOR_ID").unwrap_or(d.google_actor),
            location: get("SEARCH_LOCATION").unwrap_or(d.location),
            source_timeout: Duration::from_secs(parse_num(
                "SOURCE_TIMEOUT_SECS",
                get("SOURCE_TIMEOUT_SECS"),
                d.source_timeout.as_secs(),
            )?),
            actor_wait_secs: parse_num("ACTOR_WAIT_SECS", get("ACTOR_WAIT_SECS"), d.actor_wait_secs)?,
            actor_result_count: parse_num(
                "ACTOR_RESULT_COUNT",
                get("ACTOR_RESULT_COUNT"),
                d.actor_result_count,
            )?,
            cache_ttl: Duration::from_secs(parse_num(
                "SEARCH_CACHE_TTL_SECS",
                get("SEARCH_CACHE_TTL_SECS"),
                d.cache_ttl.as_secs(),
            )?),
            fixture_postings_path: get("FIXTURE_POSTINGS_PATH").map(PathBuf::from),
            analytics_webhook_url: get(ENV_ANALYTICS_WEBHOOK_URL),
        })
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            location: self.location.clone(),
            base_query: DEFAULT_BASE_QUERY.to_string(),
            source_timeout: self.source_timeout,
        }
    }

    /// Fixture file wins; otherwise both actor flavors when a token is present.
    pub fn build_sources(&self) -> Result<Vec<Arc<dyn PostingSource>>> {
        if let Some(path) = &self.fixture_postings_path {
            let src = FixtureSource::from_path(FIXTURE, path)?;
            tracing::info!(path = %path.display(), records = src.len(), "using fixture postings");
            return Ok(vec![Arc::new(src)]);
        }

        let Some(token) = &self.apify_token else {
            tracing::warn!("APIFY_API_TOKEN not set; job search will return no postings");
            return Ok(Vec::new());
        };

        let settings = ApifySettings {
            base_url: self.apify_base_url.clone(),
            token: Some(token.clone()),
            wait_secs: self.actor_wait_secs,
            result_count: self.actor_result_count,
        };
        Ok(vec![
            Arc::new(ApifyActorSource::new(
                ActorFlavor::LinkedIn,
                self.linkedin_actor.clone(),
                settings.clone(),
            )),
            Arc::new(ApifyActorSource::new(
                ActorFlavor::GoogleJobs,
                self.google_actor.clone(),
                settings,
            )),
        ])
    }
}
