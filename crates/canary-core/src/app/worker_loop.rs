//! WorkerLoop - ProbeCycle を永久に繰り返すワーカー
//!
//! # フロー
//! 1. ProbeCycle::run_once（失敗は cycle の中で数えられ、ここには来ない）
//! 2. cycle_pause だけ待つ（成功・失敗に関係なく）
//! 3. 1 に戻る
//!
//! 内部に停止条件はありません。止まるのはプロセスが終わるか、
//! `WorkerGroup::abort_all` されるか、gateway 呼び出しの外でタスクが panic したときだけです。

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{Instrument, debug, error, info, info_span};

use super::cycle::ProbeCycle;
use super::timings::DEFAULT_CYCLE_PAUSE;
use crate::domain::{AuthStrategy, CycleReport, panic_message};
use crate::ports::RegistryGateway;

/// Who a worker is: its slot number and the strategy it probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerInfo {
    pub id: usize,
    pub strategy: AuthStrategy,
}

impl fmt::Display for WorkerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-worker-{}", self.strategy, self.id)
    }
}

/// One probe slot bound to one gateway.
pub struct ProbeWorker {
    info: WorkerInfo,
    gateway: Arc<dyn RegistryGateway>,
    cycle: ProbeCycle,
    cycle_pause: Duration,
}

impl ProbeWorker {
    pub fn new(
        info: WorkerInfo,
        gateway: Arc<dyn RegistryGateway>,
        cycle: ProbeCycle,
    ) -> Self {
        Self {
            info,
            gateway,
            cycle,
            cycle_pause: DEFAULT_CYCLE_PAUSE,
        }
    }

    pub fn with_cycle_pause(mut self, cycle_pause: Duration) -> Self {
        self.cycle_pause = cycle_pause;
        self
    }

    pub fn info(&self) -> WorkerInfo {
        self.info
    }

    /// Repeat cycles forever.
    pub async fn run(self) -> Infallible {
        let span = info_span!(
            "probe_worker",
            worker = self.info.id,
            strategy = %self.info.strategy
        );
        self.drive().instrument(span).await
    }

    /// Run exactly `cycles` iterations (including their pauses).
    pub async fn run_cycles(&self, cycles: usize) -> Vec<CycleReport> {
        let mut reports = Vec::with_capacity(cycles);
        for _ in 0..cycles {
            reports.push(self.iterate().await);
        }
        reports
    }

    async fn drive(&self) -> Infallible {
        info!("starting {}-based registry monitoring", self.info.strategy);
        loop {
            self.iterate().await;
        }
    }

    async fn iterate(&self) -> CycleReport {
        let report = self.cycle.run_once(self.gateway.as_ref()).await;
        tokio::time::sleep(self.cycle_pause).await;
        report
    }
}

/// How a worker stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerTermination {
    /// The task panicked; carries the panic message.
    Panicked(String),
    /// The task was aborted through its handle.
    Aborted,
}

impl fmt::Display for WorkerTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerTermination::Panicked(msg) => write!(f, "panicked: {msg}"),
            WorkerTermination::Aborted => f.write_str("aborted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerExit {
    pub worker: WorkerInfo,
    pub termination: WorkerTermination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Running,
    Exited,
}

/// Handles for every spawned worker.
///
/// - 誰も join しない（fire-and-forget）が、ハンドルは保持しておく
/// - `next_exit()` でワーカーの終了（panic / abort）を観測できる
/// - `abort_all()` で全ワーカーを止められる（協調的な停止ではない）
#[derive(Debug)]
pub struct WorkerGroup {
    workers: Vec<(WorkerInfo, AbortHandle)>,
    exits: mpsc::UnboundedReceiver<WorkerExit>,
}

impl WorkerGroup {
    /// Spawn every worker onto the current tokio runtime.
    pub fn spawn(workers: Vec<ProbeWorker>) -> Self {
        let (exit_tx, exits) = mpsc::unbounded_channel();

        let mut handles = Vec::with_capacity(workers.len());
        for worker in workers {
            let info = worker.info();
            let join = tokio::spawn(worker.run());
            handles.push((info, join.abort_handle()));

            let exit_tx = exit_tx.clone();
            tokio::spawn(async move {
                let termination = match join.await {
                    Ok(never) => match never {},
                    Err(e) if e.is_panic() => WorkerTermination::Panicked(panic_message(e.into_panic())),
                    Err(_) => WorkerTermination::Aborted,
                };
                match &termination {
                    WorkerTermination::Panicked(_) => {
                        error!(worker = %info, "probe worker terminated: {termination}")
                    }
                    WorkerTermination::Aborted => debug!(worker = %info, "probe worker aborted"),
                }
                // receiver may already be dropped
                let _ = exit_tx.send(WorkerExit {
                    worker: info,
                    termination,
                });
            });
        }

        Self {
            workers: handles,
            exits,
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn workers(&self) -> Vec<WorkerInfo> {
        self.workers.iter().map(|(info, _)| *info).collect()
    }

    pub fn statuses(&self) -> Vec<(WorkerInfo, WorkerStatus)> {
        self.workers
            .iter()
            .map(|(info, handle)| {
                let status = if handle.is_finished() {
                    WorkerStatus::Exited
                } else {
                    WorkerStatus::Running
                };
                (*info, status)
            })
            .collect()
    }

    pub fn running(&self) -> usize {
        self.workers
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .count()
    }

    /// Wait for the next worker to stop.
    ///
    /// Pending forever while all workers are healthy.
    pub async fn next_exit(&mut self) -> Option<WorkerExit> {
        self.exits.recv().await
    }

    /// Non-blocking variant of `next_exit`.
    pub fn try_next_exit(&mut self) -> Option<WorkerExit> {
        self.exits.try_recv().ok()
    }

    pub fn abort_all(&self) {
        for (_, handle) in &self.workers {
            handle.abort();
        }
    }
}
