use crate::commands::CommandResult;
use salit_core::config::{AppConfig, LoadOptions};
use salit_core::{JsonFileStore, Recommender, SystemClock};

pub fn run(item: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "recommend",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let recommender = Recommender::new(
        Box::new(JsonFileStore::new(config.recommender.state_path)),
        Box::new(SystemClock),
    );

    let suggestions = recommender.get_recommendations(item);
    if suggestions.is_empty() {
        return CommandResult::success("recommend", format!("no recommendations for `{item}`"));
    }

    CommandResult::success("recommend", suggestions.join(", "))
}
