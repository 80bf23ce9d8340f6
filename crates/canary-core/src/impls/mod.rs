//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryRegistryGateway**: 失敗注入できる registry
//! - **InMemoryGatewayFactory**: 戦略ごとに用意した gateway を返す factory
//!
//! # 本番用実装
//! 本番用の実装は別クレートに配置します：
//! - `canary-http`: HttpRegistryGateway / HttpGatewayFactory

pub mod inmem_gateway;
pub mod inmem_factory;

pub use self::inmem_gateway::{CallLog, FailureMode, InMemoryRegistryGateway};
pub use self::inmem_factory::InMemoryGatewayFactory;
