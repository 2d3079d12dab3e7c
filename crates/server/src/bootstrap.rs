use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use salit_core::config::{AppConfig, ConfigError, LoadOptions};
use salit_core::{JsonFileStore, Recommender, SystemClock};
use salit_db::repositories::{
    SqlItemHistoryRepository, SqlPatternRepository, SqlPredictionRepository,
    SqlProductAnalyticsRepository,
};
use salit_db::{connect, migrations, AnalyticsRunner, DbPool};

use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let clock = Arc::new(SystemClock);
    let runner = AnalyticsRunner::new(
        Arc::new(SqlItemHistoryRepository::new(db_pool.clone())),
        Arc::new(SqlProductAnalyticsRepository::new(db_pool.clone())),
        Arc::new(SqlPredictionRepository::new(db_pool.clone())),
        Arc::new(SqlPatternRepository::new(db_pool.clone())),
        clock.clone(),
    );

    let recommender = Recommender::new(
        Box::new(JsonFileStore::new(config.recommender.state_path.clone())),
        Box::new(SystemClock),
    );

    let state = AppState::new(
        runner,
        recommender,
        Arc::new(SqlPredictionRepository::new(db_pool.clone())),
    );

    Ok(Application { config, db_pool, state })
}
