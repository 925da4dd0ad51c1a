use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use datachat_agent::{HttpLlmClient, LlmError, SqlAgent, WarehouseTools};
use datachat_core::config::{AppConfig, ConfigError, LoadOptions};
use datachat_warehouse::{connect_with_settings, WarehousePool};

pub struct Application {
    pub config: AppConfig,
    pub pool: WarehousePool,
    pub agent: Arc<SqlAgent>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("warehouse connection failed: {0}")]
    WarehouseConnect(#[source] sqlx::Error),
    #[error("language model client could not be constructed: {0}")]
    LlmClient(#[source] LlmError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Build the immutable application context once, before the listener binds.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let pool = connect_with_settings(
        &config.warehouse.connection_url(),
        config.warehouse.max_connections,
        config.warehouse.timeout_secs,
    )
    .await
    .map_err(BootstrapError::WarehouseConnect)?;
    info!(
        event_name = "system.bootstrap.warehouse_connected",
        project = %config.warehouse.project,
        "warehouse connection established"
    );

    let llm = HttpLlmClient::new(&config.llm, &config.warehouse.project)
        .map_err(BootstrapError::LlmClient)?;
    let agent = Arc::new(SqlAgent::new(
        Arc::new(llm),
        Arc::new(WarehouseTools::new(pool.clone())),
        config.warehouse.dataset.as_deref(),
    ));
    info!(
        event_name = "system.bootstrap.agent_ready",
        model = %config.llm.model,
        "sql agent constructed"
    );

    Ok(Application { config, pool, agent })
}

#[cfg(test)]
mod tests {
    use datachat_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap, BootstrapError};

    #[tokio::test]
    async fn bootstrap_fails_fast_without_required_project() {
        std::env::remove_var("DATACHAT_WAREHOUSE_PROJECT");

        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                llm_api_key: Some("test-key".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let error = result.err().expect("bootstrap should fail without a project");
        assert!(matches!(error, BootstrapError::Config(_)));
        assert!(error.to_string().contains("warehouse.project"));
    }
}
