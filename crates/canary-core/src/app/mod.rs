//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **FailureCounters**: 失敗回数（create / read / delete）の共有カウンタ
//! - **ProbeCycle**: create → 待機 → read → delete を 1 回
//! - **ProbeWorker / WorkerGroup**: cycle を永久に繰り返すワーカーとそのハンドル
//! - **ProbeSupervisor**: gateway の構築とワーカーの起動

pub mod counters;
pub mod cycle;
pub mod timings;
pub mod worker_loop;
pub mod supervisor;

// 主要な型を再エクスポート
pub use self::counters::{CounterSnapshot, FailureCounters};
pub use self::cycle::ProbeCycle;
pub use self::timings::ProbeTimings;
pub use self::worker_loop::{
    ProbeWorker, WorkerExit, WorkerGroup, WorkerInfo, WorkerStatus, WorkerTermination,
};
pub use self::supervisor::{ProbeSupervisor, SupervisorError};
