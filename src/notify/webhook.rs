// src/notify/webhook.rs
use anyhow::{Context, Result};
use reqwest::Client;

use super::{AnalyticsEvent, AnalyticsSink};

pub const ENV_ANALYTICS_WEBHOOK_URL: &str = "ANALYTICS_WEBHOOK_URL";

/// POSTs each event as JSON. Without a URL it is a silent no-op.
pub struct WebhookSink {
    webhook_url: Option<String>,
    client: Client,
}

impl WebhookSink {
    pub fn new(url: Option<String>) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for WebhookSink {
    async fn send(&self, ev: &AnalyticsEvent) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("analytics disabled (no {ENV_ANALYTICS_WEBHOOK_URL})");
            return Ok(());
        };

        self.client
            .post(url)
            .json(ev)
            .send()
            .await
            .context("analytics post")?
            .error_for_status()
            .context("analytics non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
