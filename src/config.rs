use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{Decimal, PayoutRule, Side};

/// Shortest auto-play tick accepted from the environment or a request.
pub const MIN_AUTOPLAY_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub bind_addr: IpAddr,
    pub default_base_unit: Decimal,
    pub payout: PayoutRule,
    pub oracle_seed: Option<u64>,
    pub autoplay_interval: Duration,
    /// Upper bound on rounds observed by one auto-play run.
    pub autoplay_max_rounds: usize,
    /// Display hint only. Returned with each resolution, never awaited.
    pub reveal_delay_ms: u64,
    pub max_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            default_base_unit: Decimal::one(),
            payout: PayoutRule::default(),
            oracle_seed: None,
            autoplay_interval: Duration::from_millis(1000),
            autoplay_max_rounds: 10_000,
            reveal_delay_ms: 1200,
            max_sessions: 256,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue(key.to_string(), reason.into())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let get = |key: &str| env_map.get(key).map(|s| s.trim()).filter(|s| !s.is_empty());

        let port = match get("PORT") {
            Some(s) => s
                .parse::<u16>()
                .map_err(|_| invalid("PORT", "must be a valid u16"))?,
            None => defaults.port,
        };

        let bind_addr = match get("BIND_ADDR") {
            Some(s) => s
                .parse::<IpAddr>()
                .map_err(|_| invalid("BIND_ADDR", format!("not an IP address: {}", s)))?,
            None => defaults.bind_addr,
        };

        let default_base_unit = match get("DEFAULT_BASE_UNIT") {
            Some(s) => {
                let unit = Decimal::from_str_canonical(s)
                    .map_err(|_| invalid("DEFAULT_BASE_UNIT", "must be a decimal"))?;
                if !unit.is_positive() {
                    return Err(invalid("DEFAULT_BASE_UNIT", "must be positive"));
                }
                unit
            }
            None => defaults.default_base_unit,
        };

        let commission_rate = match get("COMMISSION_RATE") {
            Some(s) => {
                let rate = Decimal::from_str_canonical(s)
                    .map_err(|_| invalid("COMMISSION_RATE", "must be a decimal"))?;
                PayoutRule::new(None, rate)
                    .validate()
                    .map_err(|e| invalid("COMMISSION_RATE", e.to_string()))?;
                rate
            }
            None => defaults.payout.commission_rate,
        };

        let commission_side = match get("COMMISSION_SIDE").map(|s| s.to_ascii_lowercase()) {
            None => defaults.payout.commission_side,
            Some(s) => match s.as_str() {
                "a" => Some(Side::A),
                "b" => Some(Side::B),
                "none" => None,
                other => {
                    return Err(invalid(
                        "COMMISSION_SIDE",
                        format!("must be a, b, or none, got {}", other),
                    ))
                }
            },
        };

        let oracle_seed = get("ORACLE_SEED")
            .map(|s| {
                s.parse::<u64>()
                    .map_err(|_| invalid("ORACLE_SEED", "must be a valid u64"))
            })
            .transpose()?;

        let autoplay_interval = match get("AUTOPLAY_INTERVAL_MS") {
            Some(s) => match s.parse::<u64>() {
                Ok(ms) if ms >= MIN_AUTOPLAY_INTERVAL_MS => Duration::from_millis(ms),
                _ => {
                    return Err(invalid(
                        "AUTOPLAY_INTERVAL_MS",
                        format!("must be an integer >= {}", MIN_AUTOPLAY_INTERVAL_MS),
                    ))
                }
            },
            None => defaults.autoplay_interval,
        };

        let autoplay_max_rounds = match get("AUTOPLAY_MAX_ROUNDS") {
            Some(s) => match s.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("AUTOPLAY_MAX_ROUNDS", "must be a positive integer")),
            },
            None => defaults.autoplay_max_rounds,
        };

        let reveal_delay_ms = match get("REVEAL_DELAY_MS") {
            Some(s) => s
                .parse::<u64>()
                .map_err(|_| invalid("REVEAL_DELAY_MS", "must be a valid u64"))?,
            None => defaults.reveal_delay_ms,
        };

        let max_sessions = match get("MAX_SESSIONS") {
            Some(s) => match s.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("MAX_SESSIONS", "must be a positive integer")),
            },
            None => defaults.max_sessions,
        };

        Ok(Config {
            port,
            bind_addr,
            default_base_unit,
            payout: PayoutRule::new(commission_side, commission_rate),
            oracle_seed,
            autoplay_interval,
            autoplay_max_rounds,
            reveal_delay_ms,
            max_sessions,
        })
    }
}
