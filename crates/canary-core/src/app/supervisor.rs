//! ProbeSupervisor - 起動時のワイヤリング
//!
//! # フロー
//! 1. 戦略ごと（OAuth, Basic）に gateway を 1 つずつ構築
//! 2. 戦略ごとに `concurrent_tasks` 本のワーカーを起動（合計 2 × concurrent_tasks）
//! 3. 全ワーカーが同じ FailureCounters を共有
//!
//! gateway を 1 つでも構築できなければ起動失敗（ワーカーは 1 本も起動しない）。
//! 起動後のワーカーを再起動・リトライすることはありません。

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::counters::FailureCounters;
use super::cycle::ProbeCycle;
use super::timings::ProbeTimings;
use super::worker_loop::{ProbeWorker, WorkerGroup, WorkerInfo};
use crate::config::{CanaryConfig, MAX_CONCURRENT_TASKS};
use crate::domain::{AuthStrategy, GatewayError};
use crate::ports::{GatewayFactory, IdGenerator, RegistryGateway, UuidGenerator};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("cannot build the {strategy} registry gateway")]
    Gateway {
        strategy: AuthStrategy,
        #[source]
        source: GatewayError,
    },

    #[error("{per_strategy} workers per strategy is more than can be launched")]
    TooManyWorkers { per_strategy: usize },
}

pub struct ProbeSupervisor {
    config: CanaryConfig,
    timings: ProbeTimings,
    counters: Arc<FailureCounters>,
    ids: Arc<dyn IdGenerator>,
}

impl ProbeSupervisor {
    /// Creates the single `FailureCounters` instance for the process.
    pub fn new(config: CanaryConfig) -> Self {
        Self {
            config,
            timings: ProbeTimings::default(),
            counters: Arc::new(FailureCounters::new()),
            ids: Arc::new(UuidGenerator::new()),
        }
    }

    pub fn with_timings(mut self, timings: ProbeTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Counters shared by every worker (for the metrics exporter / status log).
    pub fn counters(&self) -> Arc<FailureCounters> {
        Arc::clone(&self.counters)
    }

    pub fn config(&self) -> &CanaryConfig {
        &self.config
    }

    /// Build one gateway per strategy and launch the worker pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, factory: &dyn GatewayFactory) -> Result<WorkerGroup, SupervisorError> {
        let mut gateways: Vec<(AuthStrategy, Arc<dyn RegistryGateway>)> = Vec::new();
        for strategy in AuthStrategy::ALL {
            let gateway = factory
                .build(strategy, &self.config)
                .map_err(|source| SupervisorError::Gateway { strategy, source })?;
            gateways.push((strategy, gateway));
        }

        let cycle = ProbeCycle::new(Arc::clone(&self.counters))
            .with_id_generator(Arc::clone(&self.ids))
            .with_settle_delay(self.timings.settle_delay);

        let per_strategy = self.config.concurrent_tasks;
        let total = per_strategy
            .checked_mul(gateways.len())
            .filter(|_| per_strategy <= MAX_CONCURRENT_TASKS)
            .ok_or(SupervisorError::TooManyWorkers { per_strategy })?;
        let mut workers = Vec::with_capacity(total);
        // OAuth / Basic を交互に並べる
        for _ in 0..per_strategy {
            for (strategy, gateway) in &gateways {
                let info = WorkerInfo {
                    id: workers.len(),
                    strategy: *strategy,
                };
                let worker = ProbeWorker::new(info, Arc::clone(gateway), cycle.clone())
                    .with_cycle_pause(self.timings.cycle_pause);
                workers.push(worker);
            }
        }

        info!(
            concurrent_tasks = per_strategy,
            workers = workers.len(),
            registry_url = %self.config.registry_url,
            "launching canary workers"
        );
        Ok(WorkerGroup::spawn(workers))
    }
}
