// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SECRET_KEY` | HS256 token signing secret | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime | `1800` (30 min) |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token lifetime | `604800` (7 days) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `SMTP_HOST` | SMTP relay host (enables outbound mail) | Optional |
//! | `SMTP_PORT` | SMTP relay port | `587` |
//! | `SMTP_USERNAME` | SMTP credentials | Required with `SMTP_HOST` |
//! | `SMTP_PASSWORD` | SMTP credentials | Required with `SMTP_HOST` |
//! | `SMTP_FROM` | From address for outbound mail | Required with `SMTP_HOST` |

use std::env;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// SMTP relay settings; present only when outbound mail is configured.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

/// Service configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub secret_key: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub log_format: LogFormat,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret_key =
            env::var("SECRET_KEY").map_err(|_| ConfigError::MissingVar("SECRET_KEY"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("PORT", 8080)?;
        let access_token_ttl_secs = parse_var("ACCESS_TOKEN_TTL_SECS", 1800)?;
        let refresh_token_ttl_secs = parse_var("REFRESH_TOKEN_TTL_SECS", 604_800)?;

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let smtp = match env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                port: parse_var("SMTP_PORT", 587)?,
                username: env::var("SMTP_USERNAME")
                    .map_err(|_| ConfigError::MissingVar("SMTP_USERNAME"))?,
                password: env::var("SMTP_PASSWORD")
                    .map_err(|_| ConfigError::MissingVar("SMTP_PASSWORD"))?,
                from_address: env::var("SMTP_FROM")
                    .map_err(|_| ConfigError::MissingVar("SMTP_FROM"))?,
            }),
            Err(_) => None,
        };

        Ok(Self {
            host,
            port,
            secret_key,
            access_token_ttl_secs,
            refresh_token_ttl_secs,
            log_format,
            smtp,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidVar { var, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_uses_default_when_unset() {
        assert_eq!(parse_var::<u16>("NO_SUCH_VAR_12345", 42).unwrap(), 42);
    }
}
