//! canary-core
//!
//! Core building blocks for the registry canary.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, payload, metadata, errors, report）
//! - **ports**: 抽象化レイヤー（RegistryGateway, GatewayFactory, IdGenerator, Clock）
//! - **app**: アプリケーションロジック（counters, cycle, worker_loop, supervisor）
//! - **config**: 環境変数からの設定読み込み
//! - **impls**: 実装（InMemoryRegistryGateway など開発用・テスト用）
//!
//! HTTP 経由の本番 gateway は `canary-http` クレートにあります。

pub mod domain;
pub mod ports;
pub mod app;
pub mod config;
pub mod impls;

#[cfg(test)]
mod testing;

pub use crate::app::{FailureCounters, ProbeCycle, ProbeSupervisor, ProbeWorker, WorkerGroup};
pub use crate::config::CanaryConfig;
