// src/notify/mod.rs
//! Outbound analytics for user actions (apply clicks).
//!
//! Delivery is best effort: callers never wait on it and failures are
//! only logged.

pub mod webhook;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub use webhook::WebhookSink;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    /// e.g. "job_apply_clicked"
    pub event: String,
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub ts: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn apply_clicked(
        job_id: impl Into<String>,
        job_title: impl Into<String>,
        company: impl Into<String>,
        ts: DateTime<Utc>,
    ) -> Self {
        Self {
            event: "job_apply_clicked".to_string(),
            job_id: job_id.into(),
            job_title: job_title.into(),
            company: company.into(),
            ts,
        }
    }
}

#[async_trait::async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn send(&self, ev: &AnalyticsEvent) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Spawn delivery in the background; errors are logged, never returned.
pub fn fire_and_forget(
    sink: Arc<dyn AnalyticsSink>,
    ev: AnalyticsEvent,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = sink.send(&ev).await {
            tracing::warn!(error = ?e, sink = sink.name(), event = %ev.event, "analytics delivery failed");
        }
    })
}
