use anyhow::{bail, Context};
use incident_postmortem::{
    config::{Config, ObservabilityConfig},
    integrations::{AworkClient, NotionClient, ZoomClient},
    postmortem::PostmortemService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("incident_postmortem={}", observability.log_level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            observability
                .json_logs
                .then(|| tracing_subscriber::fmt::layer().json()),
        )
        .with((!observability.json_logs).then(tracing_subscriber::fmt::layer))
        .init();
}

/// Validate configuration and check every configured integration is reachable
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_tracing(&config.observability);

    tracing::info!(
        "Starting {} v{}",
        config.observability.service_name,
        env!("CARGO_PKG_VERSION")
    );

    config.validate().context("Invalid configuration")?;

    let mut failed = Vec::new();

    if let Some(notion) = &config.integrations.notion {
        if NotionClient::new(notion)?.test().await {
            tracing::info!("✅ Notion connection verified");
        } else {
            failed.push("notion");
        }
    }

    if let Some(awork) = &config.integrations.awork {
        if AworkClient::new(awork)?.test().await {
            tracing::info!("✅ awork connection verified");
        } else {
            failed.push("awork");
        }
    }

    if let Some(zoom) = &config.integrations.zoom {
        if ZoomClient::new(zoom)?.test_auth().await {
            tracing::info!("✅ Zoom authentication verified");
        } else {
            failed.push("zoom");
        }
    }

    match PostmortemService::from_config(&config) {
        Ok(service) => {
            tracing::info!(backend = %service.kind(), "Postmortem backend ready");
        }
        Err(e) => {
            tracing::warn!(error = %e, "⚠️  Postmortems disabled");
        }
    }

    if !failed.is_empty() {
        bail!("Integration checks failed: {}", failed.join(", "));
    }

    tracing::info!("All configured integrations are healthy");
    Ok(())
}
