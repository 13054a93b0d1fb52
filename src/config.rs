/*
 * Responsibility
 * - 環境変数の読み込み (PORT, APP_ENV, AUTH_GATE_CONFIG など)
 * - Gate 設定 (JSON payload) の構造的パース
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::net::SocketAddr;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed gate configuration: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown authLevel: {0}")]
    UnknownAuthLevel(String),
    #[error("openidPublicKey is required when authLevel is 1")]
    MissingPublicKey,
    #[error("invalid openidPublicKey: {0}")]
    InvalidPublicKey(String),
    #[error("openidEndpoint is required when authLevel is 2")]
    MissingEndpoint,
    #[error("invalid openidEndpoint: {0}")]
    InvalidEndpoint(String),
    #[error("failed to build identity endpoint client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// How semantic configuration faults are reported.
///
/// `Startup` refuses to build a gate. `PerRequest` builds a gate that answers
/// every request with the legacy 400/500 body instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigFaults {
    #[default]
    Startup,
    PerRequest,
}

fn default_endpoint_timeout_seconds() -> u64 {
    10
}

/// Gate configuration payload.
///
/// Read once when the gate is constructed and never mutated afterwards.
/// `authLevel` stays a raw JSON value so that anything other than the numbers
/// 1 and 2 (strings, nulls, other numbers) is treated as unknown.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub auth_level: serde_json::Value,
    #[serde(default)]
    pub openid_public_key: Option<String>,
    #[serde(default)]
    pub openid_endpoint: Option<String>,

    // Optional extra claim checks for the offline strategy.
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub leeway_seconds: u64,

    #[serde(default = "default_endpoint_timeout_seconds")]
    pub endpoint_timeout_seconds: u64,
    // Legacy parity only: accept any certificate from the identity endpoint.
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,

    #[serde(default)]
    pub config_faults: ConfigFaults,
}

impl GateConfig {
    /// Parse a JSON payload. A JSON string whose content is itself the
    /// configuration object is accepted as well.
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(payload)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        match value {
            serde_json::Value::String(encoded) => Ok(serde_json::from_str(&encoded)?),
            other => Ok(serde_json::from_value(other)?),
        }
    }
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub http_timeout_seconds: u64,
    pub http_body_limit_bytes: usize,

    pub gate: GateConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let http_timeout_seconds = std::env::var("HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let http_body_limit_bytes = std::env::var("HTTP_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let gate = GateConfig::from_json(&gate_payload_from_env()?)?;

        Ok(Self {
            addr,
            app_env,
            http_timeout_seconds,
            http_body_limit_bytes,
            gate,
        })
    }
}

// AUTH_GATE_CONFIG wins over AUTH_GATE_CONFIG_FILE.
fn gate_payload_from_env() -> Result<String, ConfigError> {
    if let Ok(inline) = std::env::var("AUTH_GATE_CONFIG") {
        return Ok(inline);
    }

    let path = std::env::var("AUTH_GATE_CONFIG_FILE")
        .map_err(|_| ConfigError::Missing("AUTH_GATE_CONFIG"))?;

    std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })
}
