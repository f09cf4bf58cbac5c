// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the document submitter.
//!
//! Defaults reproduce the registry's published quota of five document
//! submissions per minute.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the document submitter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Registry endpoint configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Outgoing request rate configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Where and how documents are posted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Document creation endpoint
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Per-request HTTP timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Outgoing rate: `request_limit` submissions per one `time_unit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per window (default: 5)
    #[serde(default = "default_request_limit")]
    pub request_limit: u32,

    /// Window length, one unit of this (default: minutes)
    #[serde(default)]
    pub time_unit: TimeUnit,

    /// Give up waiting for a slot after this many milliseconds (default: wait forever)
    #[serde(default)]
    pub max_wait_ms: Option<u64>,
}

/// Unit of time whose single unit forms one rate window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    #[default]
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of one unit.
    pub fn as_duration(self) -> Duration {
        match self {
            Self::Nanoseconds => Duration::from_nanos(1),
            Self::Microseconds => Duration::from_micros(1),
            Self::Milliseconds => Duration::from_millis(1),
            Self::Seconds => Duration::from_secs(1),
            Self::Minutes => Duration::from_secs(60),
            Self::Hours => Duration::from_secs(60 * 60),
            Self::Days => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nanoseconds => "nanoseconds",
            Self::Microseconds => "microseconds",
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        };
        f.write_str(name)
    }
}

/// Unrecognised time unit name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time unit: {0}")]
pub struct UnknownTimeUnit(pub String);

impl FromStr for TimeUnit {
    type Err = UnknownTimeUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ns" | "nanoseconds" => Ok(Self::Nanoseconds),
            "us" | "microseconds" => Ok(Self::Microseconds),
            "ms" | "milliseconds" => Ok(Self::Milliseconds),
            "s" | "seconds" => Ok(Self::Seconds),
            "m" | "minutes" => Ok(Self::Minutes),
            "h" | "hours" => Ok(Self::Hours),
            "d" | "days" => Ok(Self::Days),
            _ => Err(UnknownTimeUnit(s.to_string())),
        }
    }
}

// Default value functions
fn default_registry_url() -> String {
    "https://ismp.crpt.ru/api/v3/lk/documents/create".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_request_limit() -> u32 {
    5
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            request_limit: default_request_limit(),
            time_unit: TimeUnit::default(),
            max_wait_ms: None,
        }
    }
}

impl RegistryConfig {
    /// Get the HTTP request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        self.time_unit.as_duration()
    }

    /// Get the maximum time to wait for a slot, if bounded
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_ms.map(Duration::from_millis)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `REGISTRY_URL`: document creation endpoint
    /// - `REQUEST_TIMEOUT_SECS`: HTTP timeout (default: 30)
    /// - `REQUEST_LIMIT`: submissions per window (default: 5)
    /// - `TIME_UNIT`: window unit, e.g. `seconds`, `minutes` (default: minutes)
    /// - `MAX_WAIT_MS`: maximum wait for a slot (default: unbounded)
    ///
    /// Values that fail to parse fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            registry: RegistryConfig {
                url: lookup("REGISTRY_URL").unwrap_or(defaults.registry.url),
                request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.registry.request_timeout_secs),
            },
            rate_limit: RateLimitConfig {
                request_limit: lookup("REQUEST_LIMIT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.rate_limit.request_limit),
                time_unit: lookup("TIME_UNIT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.rate_limit.time_unit),
                max_wait_ms: lookup("MAX_WAIT_MS").and_then(|v| v.parse().ok()),
            },
        }
    }
}
