//! skytiled - weather panel daemon
//!
//! This binary coordinates:
//! - Position acquisition (WiFi/IP geolocation with a static fallback)
//! - Weather fetching and 3-day aggregation
//! - Publishing to the selected presenter on a fixed cadence

mod net;
mod scheduler;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skytile_config::AppConfig;
use skytile_core::{Presenter, WeatherSource};
use skytile_display::{ConsolePresenter, JsonlPresenter};
use skytile_locate::{GeoLocator, Positioner, StaticPositioner};
use skytile_weather::OwmClient;

use crate::scheduler::{Scheduler, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skytile daemon");

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Configuration rejected")?;

    let units = config.units();
    let api_key = config
        .openweather_key()
        .context("openweather_key missing after validation")?;
    let source = Box::new(OwmClient::new(api_key, units)?) as Box<dyn WeatherSource>;

    let positioner: Box<dyn Positioner> = match config.geolocation_key() {
        Some(key) => Box::new(GeoLocator::new(key)?),
        None => {
            let coordinate = config
                .fallback_coordinate()
                .context("no geolocation key and no fallback coordinate")?;
            Box::new(StaticPositioner::new(coordinate))
        }
    };
    info!("Position source: {}", positioner.name());

    let presenter: Box<dyn Presenter> = match config.presenter().as_str() {
        "jsonl" => Box::new(JsonlPresenter::new(config.data_dir())?),
        _ => Box::new(ConsolePresenter::stdout(units)),
    };

    let mut scheduler = Scheduler::new(
        positioner,
        source,
        presenter,
        Settings {
            update_interval: std::time::Duration::from_secs(config.update_interval_secs()),
            threshold_km: config.location_threshold_km(),
            fallback: config.fallback_coordinate(),
        },
    );

    let shutdown = setup_shutdown_handler();

    info!("Daemon running - press Ctrl+C to stop");

    tokio::select! {
        result = scheduler.run() => {
            if let Err(e) = result {
                error!("Scheduler error: {}", e);
                return Err(e);
            }
        }
        _ = shutdown => {
            info!("Shutdown signal received");
        }
    }

    info!("Skytile daemon stopped");
    Ok(())
}

/// Setup graceful shutdown handler
async fn setup_shutdown_handler() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to setup signal handler");
}
