use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use routecast_core::{AppError, Config, ConfigError};
use routecast_weather::{Pipeline, ReportOutcome};

/// Weather along a route: resolve each waypoint, fetch its daily forecast
/// and flag days outside the safe travel ranges.
#[derive(Debug, Parser)]
#[command(name = "routecast", version, about)]
struct Cli {
    /// Start point, optional via points, destination (in travel order).
    #[arg(required = true, num_args = 2..)]
    waypoints: Vec<String>,

    /// Forecast horizon in days (defaults to the configured value).
    #[arg(short, long)]
    days: Option<u32>,

    /// Path to a config file instead of the default location.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Process waypoints concurrently.
    #[arg(long)]
    concurrent: bool,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = routecast_core::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let (mut config, _) = Config::load_validated(cli.config.as_deref()).map_err(config_error)?;
    if cli.concurrent {
        config.route.concurrent = true;
    }

    let days = config
        .route
        .check_horizon(cli.days.unwrap_or(config.route.default_horizon_days))?;

    let pipeline = Pipeline::from_config(&config)?;
    tracing::info!(
        "Building report for {} waypoints over {} days",
        cli.waypoints.len(),
        days
    );

    let result = tokio::select! {
        result = pipeline.aggregator.build_report(&cli.waypoints, days) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, abandoning route request");
            return Err(anyhow::anyhow!("interrupted").into());
        }
    };

    let outcome = ReportOutcome::from(result);
    if let Some(report) = outcome.report() {
        for bad in report.bad_days() {
            tracing::info!("{} on {}: {:?}", bad.place, bad.date, bad.flags);
        }
    }

    println!("{}", render(outcome, cli.pretty)?);
    Ok(())
}

/// JSON for a ready report; a failed outcome becomes the error to show.
fn render(outcome: ReportOutcome, pretty: bool) -> Result<String, AppError> {
    match outcome {
        ReportOutcome::Ready { report } => {
            let json = if pretty {
                serde_json::to_string_pretty(&*report)
            } else {
                serde_json::to_string(&*report)
            };
            json.map_err(|e| AppError::Other(e.into()))
        }
        ReportOutcome::Failed { message, .. } => Err(AppError::Route {
            message: message.clone(),
            user_message: message,
        }),
    }
}

/// Keep configuration failures typed so the user sees a specific message.
fn config_error(err: anyhow::Error) -> AppError {
    match err.downcast::<ConfigError>() {
        Ok(e) => AppError::Config(e),
        Err(other) => AppError::Other(other),
    }
}
