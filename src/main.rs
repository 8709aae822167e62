//! Job Match Assistant: binary entrypoint.
//! Boots the Axum HTTP server with search, résumé and scoring routes.

use job_match_assistant::{api, config::AppConfig, metrics::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - JOBMATCH_DEV_LOG=1
fn enable_dev_tracing() {
    if !job_match_assistant::debug::dev_logging_enabled() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ingest=info,eligibility=info,scoring=info,api=info,warn"));

    // Ignore the error if a subscriber is already set (e.g. by the runtime).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = AppConfig::from_env()?;
    let state = api::AppState::from_config(&cfg)?;
    let mut router = api::router(state);

    match Metrics::init(cfg.cache_ttl.as_secs()) {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics disabled"),
    }

    Ok(router.into())
}
