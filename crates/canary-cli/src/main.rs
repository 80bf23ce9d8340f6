use std::time::Duration;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use canary_core::app::{FailureCounters, ProbeSupervisor, WorkerGroup};
use canary_core::config::CanaryConfig;
use canary_http::HttpGatewayFactory;

/// How often the failure counters are written to the log.
const STATUS_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn log_status(counters: &FailureCounters, workers: &WorkerGroup) {
    let snapshot = counters.snapshot();
    info!(
        failed_creates = snapshot.creates,
        failed_reads = snapshot.reads,
        failed_deletes = snapshot.deletes,
        running_workers = workers.running(),
        total_workers = workers.len(),
        "canary status"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env は任意
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = CanaryConfig::from_env().context("loading canary configuration")?;
    let supervisor = ProbeSupervisor::new(config);
    let counters = supervisor.counters();
    let mut workers = supervisor
        .start(&HttpGatewayFactory::new())
        .context("starting canary workers")?;

    let mut status = tokio::time::interval(STATUS_INTERVAL);
    // 最初の tick は即時なので読み捨てる
    status.tick().await;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!(error = %e, "cannot listen for shutdown signal");
                }
                info!("shutdown requested");
                workers.abort_all();
                break;
            }
            exit = workers.next_exit() => match exit {
                Some(exit) => error!(
                    worker = %exit.worker,
                    running_workers = workers.running(),
                    "canary worker stopped: {}",
                    exit.termination
                ),
                None => {
                    error!("every canary worker has stopped");
                    break;
                }
            },
            _ = status.tick() => log_status(&counters, &workers),
        }
    }

    log_status(&counters, &workers);
    Ok(())
}
