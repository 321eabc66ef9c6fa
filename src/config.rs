// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Loaded once from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the ledger database | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `SIGNER_KEY_PATH` | PEM private key that stamps bond issuers | `$DATA_DIR/signer.pem` |
//! | `CONTRACT_ADDRESS` | Contract address bound into decryption challenges | zero address |
//! | `CHAIN_ID` | Chain id of the signer | `43113` (Avalanche Fuji) |
//! | `DECRYPT_WINDOW_DAYS` | Challenge validity window | `30` |
//! | `SIGNATURE_TIMEOUT_SECS` | Auto-cancel a pending signature after this long | unset (no timeout) |
//! | `RECORD_CACHE_SIZE` | Bond records kept in the LRU cache | `1024` |
//!
//! Unparseable numeric values, and a zero `DECRYPT_WINDOW_DAYS`, fall back to
//! the default with a warning.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::decryption::DEFAULT_WINDOW_DAYS;
use crate::logging::LogFormat;

pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const SIGNER_KEY_PATH_ENV: &str = "SIGNER_KEY_PATH";
pub const CONTRACT_ADDRESS_ENV: &str = "CONTRACT_ADDRESS";
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";
pub const DECRYPT_WINDOW_DAYS_ENV: &str = "DECRYPT_WINDOW_DAYS";
pub const SIGNATURE_TIMEOUT_SECS_ENV: &str = "SIGNATURE_TIMEOUT_SECS";
pub const RECORD_CACHE_SIZE_ENV: &str = "RECORD_CACHE_SIZE";

pub const DEFAULT_DATA_DIR: &str = "/data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
/// Avalanche Fuji testnet.
pub const DEFAULT_CHAIN_ID: u64 = 43113;
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
pub const DEFAULT_RECORD_CACHE_SIZE: usize = 1024;

/// Ledger database file name inside `DATA_DIR`.
pub const LEDGER_FILE: &str = "ledger.redb";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub signer_key_path: PathBuf,
    pub contract_address: String,
    pub chain_id: u64,
    pub decrypt_window_days: u32,
    pub signature_timeout: Option<Duration>,
    pub record_cache_size: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = PathBuf::from(var(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.into()));
        let signer_key_path = var(SIGNER_KEY_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("signer.pem"));

        Self {
            host: var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.into()),
            port: parse_or(PORT_ENV, var(PORT_ENV), DEFAULT_PORT),
            log_format: var(LOG_FORMAT_ENV)
                .map(|v| LogFormat::from_str_lossy(&v))
                .unwrap_or(LogFormat::Pretty),
            signer_key_path,
            contract_address: var(CONTRACT_ADDRESS_ENV)
                .unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.into()),
            chain_id: parse_or(CHAIN_ID_ENV, var(CHAIN_ID_ENV), DEFAULT_CHAIN_ID),
            decrypt_window_days: positive_or(
                DECRYPT_WINDOW_DAYS_ENV,
                parse_or(
                    DECRYPT_WINDOW_DAYS_ENV,
                    var(DECRYPT_WINDOW_DAYS_ENV),
                    DEFAULT_WINDOW_DAYS,
                ),
                DEFAULT_WINDOW_DAYS,
            ),
            signature_timeout: Some(parse_or(
                SIGNATURE_TIMEOUT_SECS_ENV,
                var(SIGNATURE_TIMEOUT_SECS_ENV),
                0u64,
            ))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
            record_cache_size: parse_or(
                RECORD_CACHE_SIZE_ENV,
                var(RECORD_CACHE_SIZE_ENV),
                DEFAULT_RECORD_CACHE_SIZE,
            ),
            data_dir,
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(variable = name, value = %raw, "Invalid numeric setting, using default");
                default
            }
        },
    }
}

/// A zero-day window would expire the instant it opens.
fn positive_or(name: &str, value: u32, default: u32) -> u32 {
    if value == 0 {
        tracing::warn!(variable = name, "Setting must be positive, using default");
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = Config::default();
        assert_eq!(c.data_dir, PathBuf::from("/data"));
        assert_eq!(c.bind_address(), "0.0.0.0:8080");
        assert_eq!(c.log_format, LogFormat::Pretty);
        assert_eq!(c.signer_key_path, PathBuf::from("/data/signer.pem"));
        assert_eq!(c.ledger_path(), PathBuf::from("/data/ledger.redb"));
        assert_eq!(c.chain_id, 43113);
        assert_eq!(c.decrypt_window_days, 30);
        assert_eq!(c.signature_timeout, None);
        assert_eq!(c.record_cache_size, 1024);
    }

    #[test]
    fn reads_every_variable() {
        let c = config(&[
            ("DATA_DIR", "/srv/bonds"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("LOG_FORMAT", "JSON"),
            ("SIGNER_KEY_PATH", "/keys/issuer.pem"),
            ("CONTRACT_ADDRESS", "0xabc"),
            ("CHAIN_ID", "11155111"),
            ("DECRYPT_WINDOW_DAYS", "7"),
            ("SIGNATURE_TIMEOUT_SECS", "90"),
            ("RECORD_CACHE_SIZE", "16"),
        ]);
        assert_eq!(c.ledger_path(), PathBuf::from("/srv/bonds/ledger.redb"));
        assert_eq!(c.bind_address(), "127.0.0.1:9000");
        assert_eq!(c.log_format, LogFormat::Json);
        assert_eq!(c.signer_key_path, PathBuf::from("/keys/issuer.pem"));
        assert_eq!(c.contract_address, "0xabc");
        assert_eq!(c.chain_id, 11155111);
        assert_eq!(c.decrypt_window_days, 7);
        assert_eq!(c.signature_timeout, Some(Duration::from_secs(90)));
        assert_eq!(c.record_cache_size, 16);
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let c = config(&[
            ("PORT", "eighty"),
            ("CHAIN_ID", "-1"),
            ("DECRYPT_WINDOW_DAYS", "1.5"),
            ("SIGNATURE_TIMEOUT_SECS", "soon"),
        ]);
        assert_eq!(c.port, DEFAULT_PORT);
        assert_eq!(c.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(c.decrypt_window_days, DEFAULT_WINDOW_DAYS);
        assert_eq!(c.signature_timeout, None);
    }

    #[test]
    fn zero_timeout_means_none() {
        let c = config(&[("SIGNATURE_TIMEOUT_SECS", "0")]);
        assert_eq!(c.signature_timeout, None);
    }

    #[test]
    fn zero_day_window_falls_back() {
        let c = config(&[("DECRYPT_WINDOW_DAYS", "0")]);
        assert_eq!(c.decrypt_window_days, DEFAULT_WINDOW_DAYS);
    }
}
