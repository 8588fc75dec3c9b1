pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{Dataset, LocalStorage, MemoryStore, SqliteStore};
pub use config::AppConfig;
pub use core::{
    export::ReportExporter,
    period::{Period, TimeRangeSelector},
    reporter::{AnalyticsReporter, ReportOptions},
};
pub use domain::model::AnalyticsReport;
pub use utils::error::{AnalyticsError, Result};
