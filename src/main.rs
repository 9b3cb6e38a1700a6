use anyhow::Result;
use bluegreen_probe::{config::Config, server, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let cfg = Config::load()?;
    server::serve(&cfg, telemetry::shutdown_signal()).await
}
