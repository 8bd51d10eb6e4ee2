use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::influx::{InfluxWriter, WriteOutcome};
use crate::modem::ModemSession;
use crate::parser;

/// Runs one poll cycle: login, fetch, parse, write. The first failing stage ends
/// the cycle; nothing is retried.
pub async fn run_cycle(config: &AppConfig, writer: &InfluxWriter) -> Result<WriteOutcome> {
    let session = ModemSession::login(&config.modem)
        .await
        .context("modem login failed")?;
    let body = session
        .fetch_status()
        .await
        .context("status fetch failed")?;
    let stats = parser::parse_status(&body).context("status page parse failed")?;
    if let Ok(json) = serde_json::to_string(&stats) {
        tracing::debug!(stats = %json, "status page parsed");
    }
    writer.write(&stats).await.context("metrics write failed")
}
