//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! registry への HTTP 呼び出しや ID 生成、時刻取得を trait の後ろに隠し、
//! app 層（cycle, worker, supervisor）はこれらの trait だけを見ます。
//!
//! # 設計原則
//! - registry は外部システム（失敗しうる create/read/delete の能力）
//! - gateway は戦略ごとに 1 つ、構築後は読み取り専用で共有
//! - テストでは InMemoryRegistryGateway / 固定 ID / 固定時刻に差し替える

pub mod gateway;
pub mod clock;
pub mod id_generator;

// 主要な trait を再エクスポート
pub use self::gateway::{GatewayFactory, RegistryGateway};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UuidGenerator};
