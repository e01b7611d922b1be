pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod media;
pub mod state;
pub mod storage;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use crate::{config::Config, error::Result, state::AppState};

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("DARSA_LOG"))
        .init();

    let config = Config::load()?;
    let app = AppState::init(&config).await?;

    api::run_server(app, &config.listen).await
}
