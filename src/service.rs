use anyhow::{Context, Result};
use std::future::Future;
use tokio::{
    signal,
    time::{interval_at, Duration, Instant, MissedTickBehavior},
};

use crate::config::AppConfig;
use crate::influx::{InfluxWriter, WriteOutcome};
use crate::pipeline;

pub struct Service {
    config: AppConfig,
}

impl Service {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Polls until SIGINT (or SIGTERM on Unix) arrives.
    pub async fn run(self) -> Result<()> {
        let writer = InfluxWriter::new(&self.config.influx).context("prepare metrics writer")?;
        let writer = &writer;
        let config = &self.config;
        let location = config.influx.location.as_str();

        tracing::info!(
            location = %location,
            modem = %config.modem.uri,
            endpoint = %writer.endpoint(),
            interval_secs = config.poll_interval_seconds,
            "dsl collector starting"
        );

        // installed before the first cycle so an early ctrl-c waits for it to finish
        let signals = ShutdownSignal::install().context("install signal handlers")?;
        let shutdown = async move {
            signals.recv().await;
            tracing::info!(location = %location, "shutdown signal received");
        };

        let cycles = schedule(config.poll_interval(), shutdown, || async move {
            match pipeline::run_cycle(config, writer).await {
                Ok(WriteOutcome::Written { .. }) => {
                    tracing::debug!(location = %location, "poll cycle complete");
                }
                Ok(WriteOutcome::Skipped) => {
                    tracing::warn!(location = %location, "poll cycle produced no statistics");
                }
                Err(err) => {
                    tracing::error!(location = %location, error = %format!("{err:#}"), "poll cycle aborted");
                }
            }
        })
        .await;

        tracing::info!(location = %location, cycles, "dsl collector stopped");
        Ok(())
    }
}

/// Runs `cycle` once right away, then once per `period` until `shutdown` resolves.
/// The period is measured from the end of the first cycle. Each cycle is awaited
/// before the next wait, so cycles never overlap and a shutdown that fires
/// mid-cycle takes effect once the cycle returns.
///
/// Returns the number of cycles that ran.
pub async fn schedule<S, F, Fut>(period: Duration, shutdown: S, mut cycle: F) -> usize
where
    S: Future<Output = ()>,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    cycle().await;
    let mut cycles = 1;

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                cycle().await;
                cycles += 1;
            }
        }
    }
    cycles
}

/// SIGINT and SIGTERM on Unix, ctrl-c elsewhere. Handlers are registered when
/// this is built, not when it is first awaited.
struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: signal::unix::Signal,
    #[cfg(unix)]
    terminate: signal::unix::Signal,
    #[cfg(windows)]
    ctrl_c: signal::windows::CtrlC,
}

impl ShutdownSignal {
    #[cfg(unix)]
    fn install() -> Result<Self> {
        use signal::unix::{signal as unix_signal, SignalKind};
        Ok(Self {
            interrupt: unix_signal(SignalKind::interrupt()).context("register SIGINT handler")?,
            terminate: unix_signal(SignalKind::terminate()).context("register SIGTERM handler")?,
        })
    }

    #[cfg(windows)]
    fn install() -> Result<Self> {
        Ok(Self {
            ctrl_c: signal::windows::ctrl_c().context("register ctrl-c handler")?,
        })
    }

    #[cfg(unix)]
    async fn recv(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {}
            _ = self.terminate.recv() => {}
        }
    }

    #[cfg(windows)]
    async fn recv(mut self) {
        self.ctrl_c.recv().await;
    }
}
