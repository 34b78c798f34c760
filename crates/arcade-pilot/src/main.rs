use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use arcade_pilot::{CONFIG_ENV, Pilot, PilotConfig, config_path};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let path = config_path(std::env::args().nth(1), std::env::var(CONFIG_ENV).ok());
    let config = match PilotConfig::load(&path).await {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "cannot start");
            return ExitCode::FAILURE;
        }
    };

    match Pilot::new(config).run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "arcade pilot stopped");
            ExitCode::FAILURE
        }
    }
}
