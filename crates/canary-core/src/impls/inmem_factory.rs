use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::CanaryConfig;
use crate::domain::{AuthStrategy, GatewayError};
use crate::ports::{GatewayFactory, RegistryGateway};

/// Hands out pre-built gateways per strategy and remembers what was asked for.
///
/// A strategy with no registered gateway fails construction, which is how
/// tests exercise the "cannot build a gateway" startup path.
#[derive(Default)]
pub struct InMemoryGatewayFactory {
    gateways: HashMap<AuthStrategy, Arc<dyn RegistryGateway>>,
    requested: Mutex<Vec<AuthStrategy>>,
}

impl InMemoryGatewayFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gateway(mut self, strategy: AuthStrategy, gateway: Arc<dyn RegistryGateway>) -> Self {
        self.gateways.insert(strategy, gateway);
        self
    }

    /// Strategies `build` was called for, in call order.
    pub fn requested(&self) -> Vec<AuthStrategy> {
        self.requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl GatewayFactory for InMemoryGatewayFactory {
    fn build(
        &self,
        strategy: AuthStrategy,
        _config: &CanaryConfig,
    ) -> Result<Arc<dyn RegistryGateway>, GatewayError> {
        self.requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(strategy);
        self.gateways
            .get(&strategy)
            .cloned()
            .ok_or_else(|| GatewayError::Construction(format!("no gateway for {strategy}")))
    }
}
