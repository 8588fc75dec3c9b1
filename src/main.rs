use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use dine_analytics::adapters::http;
use dine_analytics::core::ConfigProvider;
use dine_analytics::utils::{logger, validation};
use dine_analytics::utils::validation::Validate;
use dine_analytics::{
    AnalyticsError, AnalyticsReporter, AppConfig, CliConfig, Command, Dataset, LocalStorage,
    MemoryStore, Period, ReportExporter, ReportOptions, SqliteStore, TimeRangeSelector,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match cli.app_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            fail(&e);
        }
    };

    match &cli.command {
        Command::Serve { .. } => logger::init_server_logger(cli.verbose, config.server.json_logs),
        _ => logger::init_cli_logger(cli.verbose),
    }

    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
        tracing::debug!("App config: {:?}", config);
    }

    if let Err(e) = run(cli.command, config).await {
        fail(&e);
    }
}

fn fail(e: &AnalyticsError) -> ! {
    tracing::error!(
        "Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code().max(1));
}

async fn run(command: Command, config: AppConfig) -> Result<(), AnalyticsError> {
    let options = ReportOptions::from_config(&config);

    match command {
        Command::Serve { .. } => {
            let store = open_store(&config).await?;
            let reporter = AnalyticsReporter::new(store.clone(), store).with_options(options);
            http::serve(Arc::new(reporter), &config.bind_address()).await?;
        }

        Command::Report {
            restaurant_id,
            time_range,
            start_date,
            end_date,
            data,
            output_path,
        } => {
            validation::validate_restaurant_id(restaurant_id)?;
            let selector = TimeRangeSelector::from_params(
                Some(time_range.as_str()),
                start_date.as_deref(),
                end_date.as_deref(),
            );

            let report = match data {
                Some(path) => {
                    tracing::info!("Loading dataset from {}", path);
                    let store = MemoryStore::from_dataset(Dataset::from_file(&path)?);
                    AnalyticsReporter::new(store.clone(), store)
                        .with_options(options)
                        .compute_analytics(restaurant_id, &selector)
                        .await?
                }
                None => {
                    let store = open_store(&config).await?;
                    AnalyticsReporter::new(store.clone(), store)
                        .with_options(options)
                        .compute_analytics(restaurant_id, &selector)
                        .await?
                }
            };

            match output_path {
                Some(output_path) => {
                    let exporter = ReportExporter::new(LocalStorage::new(output_path.clone()));
                    for file in exporter.export(&report).await? {
                        println!("📁 Wrote {}", Path::new(&output_path).join(file).display());
                    }
                }
                None => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }

        Command::Rollup {
            restaurant_id,
            start_date,
            end_date,
        } => {
            validation::validate_restaurant_id(restaurant_id)?;
            let start = validation::validate_date("start_date", &start_date)?;
            let end = validation::validate_date("end_date", &end_date)?;
            let period = Period::new(start, end).ok_or_else(|| {
                AnalyticsError::validation(format!(
                    "start_date {} is after end_date {}",
                    start, end
                ))
            })?;

            let store = open_store(&config).await?;
            let reporter = AnalyticsReporter::new(store.clone(), store.clone());
            let summaries = reporter.rollup(restaurant_id, &period, &store).await?;
            println!(
                "✅ Stored {} daily summaries for restaurant {}",
                summaries.len(),
                restaurant_id
            );
        }

        Command::InitDb { seed } => {
            let store = open_store(&config).await?;
            if let Some(path) = seed {
                let dataset = Dataset::from_file(&path)?;
                for order in &dataset.orders {
                    store.insert_order(order).await?;
                }
                for review in &dataset.reviews {
                    store.insert_review(review).await?;
                }
                tracing::info!(
                    orders = dataset.orders.len(),
                    reviews = dataset.reviews.len(),
                    "Imported dataset from {}",
                    path
                );
            }
            println!("✅ Database ready at {}", config.database_url());
        }
    }

    Ok(())
}

async fn open_store(config: &AppConfig) -> Result<SqliteStore, AnalyticsError> {
    let store = SqliteStore::connect(config.database_url(), config.database.max_connections).await?;
    store.init_schema().await?;
    Ok(store)
}
