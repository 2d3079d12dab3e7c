pub mod connection;
pub mod migrations;
pub mod repositories;
pub mod runs;

pub use connection::{connect, connect_with_settings, DbPool};
pub use runs::{AnalyticsRunError, AnalyticsRunner, RunSummary};
