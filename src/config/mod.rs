pub mod toml_config;

pub use toml_config::AppConfig;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "dine-analytics")]
#[command(about = "Order, revenue and rating analytics for restaurants")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override database.url from config
    #[arg(long)]
    pub database_url: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the analytics HTTP endpoint
    Serve {
        /// Override server.port from config
        #[arg(long)]
        port: Option<u16>,
    },

    /// Compute one report and print or export it
    Report {
        #[arg(long)]
        restaurant_id: i64,

        /// 7days, 30days or custom
        #[arg(long, default_value = "7days")]
        time_range: String,

        /// YYYY-MM-DD, used with --time-range custom
        #[arg(long)]
        start_date: Option<String>,

        /// YYYY-MM-DD, used with --time-range custom
        #[arg(long)]
        end_date: Option<String>,

        /// Read orders and reviews from a JSON dataset instead of the database
        #[arg(long)]
        data: Option<String>,

        /// Directory to write report.json and revenue_trend.csv into
        #[arg(long)]
        output_path: Option<String>,
    },

    /// Store per-day order totals in the analytics table
    Rollup {
        #[arg(long)]
        restaurant_id: i64,

        #[arg(long)]
        start_date: String,

        #[arg(long)]
        end_date: String,
    },

    /// Create the database schema, optionally importing a JSON dataset
    InitDb {
        #[arg(long)]
        seed: Option<String>,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML config and applies command-line overrides.
    pub fn app_config(&self) -> crate::Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;

        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        if let Command::Serve { port: Some(port) } = &self.command {
            config.server.port = *port;
        }

        Ok(config)
    }
}
