//! Resolution of the gate configuration into a closed authentication mode.
//!
//! The numeric `authLevel` is decoded exactly once, here. Everything after
//! construction works with [`AuthMode`] and never looks at the raw value again.

use serde::Serialize;

use crate::config::{ConfigError, GateConfig};

/// Decoded `authLevel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthLevel {
    OfflineSignature,
    OnlineEndpoint,
    Unknown(String),
}

impl AuthLevel {
    /// Only the JSON numbers 1 and 2 select a strategy. `"1"`, `0`, `null` and
    /// anything else are unknown.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value.as_f64() {
            Some(level) if level == 1.0 => Self::OfflineSignature,
            Some(level) if level == 2.0 => Self::OnlineEndpoint,
            _ => Self::Unknown(value.to_string()),
        }
    }
}

/// The authentication mode a gate runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    Disabled,
    OfflineSignature { public_key: String },
    OnlineEndpoint { endpoint: String },
}

impl AuthMode {
    /// `enabled: false` wins over everything else, including an unknown level
    /// or missing key material.
    pub fn resolve(config: &GateConfig) -> Result<Self, ConfigError> {
        if !config.enabled {
            return Ok(Self::Disabled);
        }

        match AuthLevel::from_value(&config.auth_level) {
            AuthLevel::OfflineSignature => {
                let public_key = usable(config.openid_public_key.as_deref())
                    .ok_or(ConfigError::MissingPublicKey)?;
                Ok(Self::OfflineSignature {
                    public_key: public_key.to_string(),
                })
            }
            AuthLevel::OnlineEndpoint => {
                let endpoint = usable(config.openid_endpoint.as_deref())
                    .ok_or(ConfigError::MissingEndpoint)?;
                Ok(Self::OnlineEndpoint {
                    endpoint: endpoint.to_string(),
                })
            }
            AuthLevel::Unknown(raw) => Err(ConfigError::UnknownAuthLevel(raw)),
        }
    }

    pub fn method(&self) -> AuthMethod {
        match self {
            Self::Disabled => AuthMethod::Disabled,
            Self::OfflineSignature { .. } => AuthMethod::OfflineSignature,
            Self::OnlineEndpoint { .. } => AuthMethod::OnlineEndpoint,
        }
    }
}

/// How an admitted request was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Disabled,
    OfflineSignature,
    OnlineEndpoint,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::OfflineSignature => "offline_signature",
            Self::OnlineEndpoint => "online_endpoint",
        }
    }
}

/// Empty strings and the literal `undefined` / `null` count as "not set".
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == "undefined" || value == "null"
}

fn usable(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_placeholder(v))
}
