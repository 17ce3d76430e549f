use access_service::{config::AccessConfig, services, Application};
use service_core::error::AppError;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = AccessConfig::load()?;

    init_tracing(
        &config.service_name,
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )?;

    services::init_metrics();

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting access service"
    );

    let application = Application::build(config)?;
    let report = application.run().await?;

    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to render report: {}", e)))?;
    println!("{}", rendered);

    tracing::debug!(metrics = %services::gather_metrics(), "Final metrics snapshot");
    tracing::info!("Access service finished");

    Ok(())
}
