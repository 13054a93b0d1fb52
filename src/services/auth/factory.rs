/// Factory: build the shared `AuthGate` from application `Config`.
use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::services::auth::AuthGate;

pub fn build_auth_gate(config: &Config) -> Result<Arc<AuthGate>, ConfigError> {
    let gate = AuthGate::from_config(&config.gate)?;

    Ok(Arc::new(gate))
}
