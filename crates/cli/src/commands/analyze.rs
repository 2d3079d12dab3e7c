use std::sync::Arc;

use crate::commands::CommandResult;
use salit_core::config::{AppConfig, LoadOptions};
use salit_core::SystemClock;
use salit_db::repositories::{
    SqlItemHistoryRepository, SqlPatternRepository, SqlPredictionRepository,
    SqlProductAnalyticsRepository,
};
use salit_db::{connect, migrations, AnalyticsRunError, AnalyticsRunner};

pub fn run(user_id: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "analyze",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "analyze",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let runner = AnalyticsRunner::new(
            Arc::new(SqlItemHistoryRepository::new(pool.clone())),
            Arc::new(SqlProductAnalyticsRepository::new(pool.clone())),
            Arc::new(SqlPredictionRepository::new(pool.clone())),
            Arc::new(SqlPatternRepository::new(pool.clone())),
            Arc::new(SystemClock),
        );

        let summary = runner.run(user_id).await.map_err(|error| match error {
            AnalyticsRunError::MissingUser => ("missing_user", error.to_string(), 6u8),
            AnalyticsRunError::Repository(_) => ("analytics_run", error.to_string(), 7u8),
        })?;

        pool.close().await;
        Ok::<salit_db::RunSummary, (&'static str, String, u8)>(summary)
    });

    match result {
        Ok(summary) => CommandResult::success(
            "analyze",
            format!(
                "processed {} products, generated {} predictions",
                summary.processed_products, summary.predictions_generated
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("analyze", error_class, message, exit_code)
        }
    }
}
