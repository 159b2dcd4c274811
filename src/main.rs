use dotenvy::dotenv;
use log::{error, info};

use crmserver::config::AppConfig;
use crmserver::main_module::{build_state, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::from_env()?;
    info!(
        "Starting crmserver {} on {}:{}",
        env!("CARGO_PKG_VERSION"),
        config.server.host,
        config.server.port
    );

    let state = match build_state(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Startup failed: {e:#}");
            return Err(e);
        }
    };

    run_server(state).await?;
    info!("Server stopped");
    Ok(())
}
