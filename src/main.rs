use anyhow::{Context, Result};
use dslstat::{logging, AppConfig, Service};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("unable to load configuration from environment")?;

    logging::init(&config)?;

    Service::new(config).run().await
}
