/*
 * config.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of openml-client, a synchronized client for the OpenML REST API.
 *
 * openml-client is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * openml-client is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with openml-client.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Connection settings: endpoint identity, API key, user agent and transport timeouts.
//! Defaults point at the production OpenML service; `from_env` layers `OPENML_*`
//! environment variables on top so deployments and CI can redirect traffic without code changes.

use std::env;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_HOST: &str = "www.openml.org";
pub const TEST_HOST: &str = "test.openml.org";
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_PREFIX: &str = "/api/v1/json";
pub const DEFAULT_USER_AGENT: &str = concat!("openml-client/", env!("CARGO_PKG_VERSION"));

const ENV_HOST: &str = "OPENML_HOST";
const ENV_PORT: &str = "OPENML_PORT";
const ENV_PREFIX: &str = "OPENML_PREFIX";
const ENV_API_KEY: &str = "OPENML_API_KEY";
const ENV_TEST_MODE: &str = "OPENML_TEST_MODE";
const ENV_READ_TIMEOUT: &str = "OPENML_READ_TIMEOUT_SECS";

/// Remote host, port and URL path prefix of the REST API. Replaced as a whole, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    /// Path prefix prepended to every request path; empty or `/segment[/segment...]` without trailing slash.
    pub prefix: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16, prefix: impl AsRef<str>) -> Self {
        Self {
            host: host.into(),
            port,
            prefix: normalize_prefix(prefix.as_ref()),
        }
    }

    /// www.openml.org:443/api/v1/json
    pub fn production() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PREFIX)
    }

    /// test.openml.org:443/api/v1/json
    pub fn test_server() -> Self {
        Self::new(TEST_HOST, DEFAULT_PORT, DEFAULT_PREFIX)
    }

    /// Host header value: IPv6 literals are bracketed, the port is omitted when it is the
    /// scheme default (80 or 443).
    pub fn authority(&self) -> String {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if self.port == 443 || self.port == 80 {
            host
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::production()
    }
}

/// Ensure a single leading slash and no trailing slash; empty stays empty.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Everything needed to build a `Connection`.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub endpoint: Endpoint,
    /// Target of `Connection::enable_test_mode`.
    pub test_endpoint: Endpoint,
    pub api_key: Option<String>,
    pub user_agent: String,
    /// Read timeout for the default transports. `None` blocks until data, EOF or error.
    pub read_timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::production(),
            test_endpoint: Endpoint::test_server(),
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            read_timeout: None,
        }
    }
}

impl ConnectionConfig {
    /// Defaults overridden by `OPENML_HOST`, `OPENML_PORT`, `OPENML_PREFIX`, `OPENML_API_KEY`,
    /// `OPENML_TEST_MODE` (1/true/yes) and `OPENML_READ_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env` with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if truthy(lookup(ENV_TEST_MODE).as_deref()) {
            config.endpoint = config.test_endpoint.clone();
        }
        if let Some(host) = non_empty(lookup(ENV_HOST)) {
            config.endpoint.host = host;
        }
        if let Some(port) = non_empty(lookup(ENV_PORT)) {
            config.endpoint.port = port.trim().parse::<u16>().map_err(|_| {
                ClientError::Config(format!("{} is not a valid port: {:?}", ENV_PORT, port))
            })?;
        }
        if let Some(prefix) = lookup(ENV_PREFIX) {
            config.endpoint.prefix = normalize_prefix(&prefix);
        }
        config.api_key = non_empty(lookup(ENV_API_KEY));
        if let Some(secs) = non_empty(lookup(ENV_READ_TIMEOUT)) {
            let secs = secs.trim().parse::<u64>().map_err(|_| {
                ClientError::Config(format!("{} is not a number of seconds: {:?}", ENV_READ_TIMEOUT, secs))
            })?;
            config.read_timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}
