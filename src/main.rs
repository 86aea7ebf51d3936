use anyhow::Context;
use celestia_core::config::cli::{Command, OutputFormat};
use celestia_core::core::export::{month_to_csv, month_to_json};
use celestia_core::utils::error::ErrorSeverity;
use celestia_core::utils::{logger, validation::Validate};
use celestia_core::{AppConfig, CelestiaError, CliConfig, EphemerisAggregator, NatalChartResolver};
use chrono::Datelike;
use clap::Parser;

fn load_config(path: Option<&str>) -> celestia_core::Result<AppConfig> {
    let config = match path {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path);
            AppConfig::from_file(path)?
        }
        None => AppConfig::with_defaults(),
    };
    config.validate()?;
    Ok(config)
}

/// Runs the subcommand and returns the rendered document.
async fn run(command: &Command, config: &AppConfig) -> celestia_core::Result<String> {
    match command {
        Command::Moon {
            year,
            month,
            lat,
            lon,
            format,
            ..
        } => {
            let today = chrono::Utc::now().date_naive();
            let year = year.unwrap_or_else(|| today.year());
            let month_index = month.unwrap_or_else(|| today.month()) - 1;

            let aggregator = EphemerisAggregator::from_config(config)?;
            let calendar = match (lat, lon) {
                (None, None) => aggregator.fetch_month_at_default(year, month_index).await?,
                (lat, lon) => {
                    let lat = lat.unwrap_or(config.ephemeris.default_latitude);
                    let lon = lon.unwrap_or(config.ephemeris.default_longitude);
                    aggregator.fetch_month(year, month_index, lat, lon).await?
                }
            };

            match format {
                OutputFormat::Json => month_to_json(&calendar),
                OutputFormat::Csv => month_to_csv(&calendar),
            }
        }
        Command::Chart {
            name,
            date,
            time,
            city,
            ..
        } => {
            let resolver = NatalChartResolver::from_config(config)?;
            let chart = resolver.calculate(name, date, time.as_deref(), city).await?;
            Ok(serde_json::to_string_pretty(&chart)?)
        }
    }
}

fn output_path(command: &Command) -> Option<&str> {
    match command {
        Command::Moon { output, .. } | Command::Chart { output, .. } => output.as_deref(),
    }
}

fn report(e: &CelestiaError) -> i32 {
    tracing::error!(
        "❌ celestia failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting celestia CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => std::process::exit(report(&e).max(1)),
    };

    let rendered = match run(&cli.command, &config).await {
        Ok(rendered) => rendered,
        Err(e) => {
            let exit_code = report(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            return Ok(());
        }
    };

    match output_path(&cli.command) {
        Some(path) => {
            std::fs::write(path, rendered.as_bytes())
                .with_context(|| format!("failed to write output to {}", path))?;
            tracing::info!("📁 Output saved to: {}", path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
