//! canary-http
//!
//! `RegistryGateway` over the registry's REST API v2 (reqwest), with
//! anonymous, HTTP Basic and OAuth2 client-credentials authentication.

pub mod auth;
pub mod gateway;
pub mod factory;

#[cfg(test)]
mod testing;

pub use crate::auth::{Credentials, TokenSource};
pub use crate::factory::HttpGatewayFactory;
pub use crate::gateway::HttpRegistryGateway;
