// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RPC_URL` | JSON-RPC endpoint of the chain | `https://rpc.testnet.dailycrypto.net` |
//! | `PRIVATE_KEY` | Signing key (hex or PEM) | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `RPC_TIMEOUT_SECS` | Timeout applied to every RPC call | `10` |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS with `TLS_KEY_PATH` | Optional |
//! | `TLS_KEY_PATH` | PEM private key for HTTPS | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fmt, net::SocketAddr, path::PathBuf, time::Duration};

pub const RPC_URL_ENV: &str = "RPC_URL";
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const RPC_TIMEOUT_ENV: &str = "RPC_TIMEOUT_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_RPC_URL: &str = "https://rpc.testnet.dailycrypto.net";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Errors that prevent the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is missing. Set it in the environment.")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    /// Read `LOG_FORMAT` from the process environment.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// TLS certificate and key locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Service configuration.
#[derive(Clone)]
pub struct Config {
    pub rpc_url: String,
    pub private_key: String,
    pub bind_addr: SocketAddr,
    pub rpc_timeout: Duration,
    pub tls: Option<TlsPaths>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("tls", &self.tls)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let private_key = non_empty(PRIVATE_KEY_ENV).ok_or(ConfigError::Missing(PRIVATE_KEY_ENV))?;

        let rpc_url = non_empty(RPC_URL_ENV).unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        url::Url::parse(&rpc_url).map_err(|e| ConfigError::Invalid {
            name: RPC_URL_ENV,
            reason: e.to_string(),
        })?;

        let host = non_empty(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match non_empty(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let timeout_secs = match non_empty(RPC_TIMEOUT_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: RPC_TIMEOUT_ENV,
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: RPC_TIMEOUT_ENV,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_RPC_TIMEOUT_SECS,
        };

        let tls = match (non_empty(TLS_CERT_PATH_ENV), non_empty(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            rpc_url,
            private_key,
            bind_addr,
            rpc_timeout: Duration::from_secs(timeout_secs),
            tls,
        })
    }
}
