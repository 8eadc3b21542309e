// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Service configuration.
//!
//! Every setting can be given through an environment variable; unset variables fall back to the
//! defaults of [`ServiceConfig::default`]. A JSON file with the same field names can be used
//! instead of the environment.

use std::{fmt, path::PathBuf, time::Duration};

use serde::{Deserialize, Deserializer};

/// Host of the SCION daemon.
pub const ENV_DAEMON_HOST: &str = "SCION_DAEMON_HOST";
/// Port of the SCION daemon.
pub const ENV_DAEMON_PORT: &str = "SCION_DAEMON_PORT";
/// Host of the bootstrap server.
pub const ENV_BOOTSTRAP_HOST: &str = "SCION_BOOTSTRAP_HOST";
/// NAPTR name used to discover the bootstrap server.
pub const ENV_BOOTSTRAP_NAPTR_NAME: &str = "SCION_BOOTSTRAP_NAPTR_NAME";
/// Path of a local topology file.
pub const ENV_BOOTSTRAP_TOPO_FILE: &str = "SCION_BOOTSTRAP_TOPO_FILE";
/// Margin, in seconds, before expiration at which a path is refreshed.
pub const ENV_PATH_EXPIRY_MARGIN: &str = "SCION_PATH_EXPIRY_MARGIN";
/// Static TXT records used instead of DNS, see [`crate::resolver`].
pub const ENV_MOCK_DNS_TXT: &str = "SCION_DEBUG_MOCK_DNS_TXT";

/// Default daemon host.
pub const DEFAULT_DAEMON_HOST: &str = "localhost";
/// Default daemon port.
pub const DEFAULT_DAEMON_PORT: u16 = 30255;
/// Default path expiry margin.
pub const DEFAULT_PATH_EXPIRY_MARGIN: Duration = Duration::from_secs(10);

/// Configuration of a [`ScionService`](crate::service::ScionService).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Host of the SCION daemon.
    pub daemon_host: String,
    /// Port of the SCION daemon.
    pub daemon_port: u16,
    /// Host (and optional port) of a bootstrap server.
    pub bootstrap_host: Option<String>,
    /// NAPTR name under which the bootstrap server is announced.
    pub bootstrap_naptr_name: Option<String>,
    /// Local topology file.
    pub bootstrap_topo_file: Option<PathBuf>,
    /// Paths expiring within this margin are refreshed.
    #[serde(deserialize_with = "seconds")]
    pub path_expiry_margin: Duration,
    /// Static TXT records, `host="scion=<ia>,<ip>";...`.
    pub mock_dns_txt: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            daemon_host: DEFAULT_DAEMON_HOST.to_owned(),
            daemon_port: DEFAULT_DAEMON_PORT,
            bootstrap_host: None,
            bootstrap_naptr_name: None,
            bootstrap_topo_file: None,
            path_expiry_margin: DEFAULT_PATH_EXPIRY_MARGIN,
            mock_dns_txt: None,
        }
    }
}

/// Errors while reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// The offending variable.
        var: &'static str,
        /// Its value.
        value: String,
    },
    /// The configuration file cannot be read.
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid JSON for a [`ServiceConfig`].
    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

/// How the service learns about the local AS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapMode {
    /// Read the topology from a local file.
    TopologyFile(PathBuf),
    /// Fetch the topology from a bootstrap server.
    BootstrapHost(String),
    /// Discover the bootstrap server through a NAPTR record.
    Naptr(String),
    /// Ask the local SCION daemon.
    Daemon {
        /// Daemon host.
        host: String,
        /// Daemon port.
        port: u16,
    },
}

impl fmt::Display for BootstrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopologyFile(path) => write!(f, "topology file {}", path.display()),
            Self::BootstrapHost(host) => write!(f, "bootstrap server {host}"),
            Self::Naptr(name) => write!(f, "NAPTR name {name}"),
            Self::Daemon { host, port } => write!(f, "daemon {host}:{port}"),
        }
    }
}

impl ServiceConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration from `lookup`, which maps variable names to values.
    ///
    /// Unset and empty variables keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get(ENV_DAEMON_HOST) {
            config.daemon_host = host;
        }
        if let Some(port) = get(ENV_DAEMON_PORT) {
            config.daemon_port = parse_value(ENV_DAEMON_PORT, port)?;
        }
        config.bootstrap_host = get(ENV_BOOTSTRAP_HOST);
        config.bootstrap_naptr_name = get(ENV_BOOTSTRAP_NAPTR_NAME);
        config.bootstrap_topo_file = get(ENV_BOOTSTRAP_TOPO_FILE).map(PathBuf::from);
        if let Some(margin) = get(ENV_PATH_EXPIRY_MARGIN) {
            config.path_expiry_margin =
                Duration::from_secs(parse_value(ENV_PATH_EXPIRY_MARGIN, margin)?);
        }
        config.mock_dns_txt = get(ENV_MOCK_DNS_TXT);
        Ok(config)
    }

    /// Reads the configuration from a JSON file. Missing fields keep their default.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The bootstrap mode, in order of priority: topology file, bootstrap server, NAPTR name,
    /// daemon.
    pub fn mode(&self) -> BootstrapMode {
        if let Some(file) = &self.bootstrap_topo_file {
            BootstrapMode::TopologyFile(file.clone())
        } else if let Some(host) = &self.bootstrap_host {
            BootstrapMode::BootstrapHost(host.clone())
        } else if let Some(name) = &self.bootstrap_naptr_name {
            BootstrapMode::Naptr(name.clone())
        } else {
            BootstrapMode::Daemon {
                host: self.daemon_host.clone(),
                port: self.daemon_port,
            }
        }
    }
}

fn parse_value<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value })
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.daemon_port, 30255);
        assert_eq!(config.path_expiry_margin, Duration::from_secs(10));
        assert_eq!(
            config.mode(),
            BootstrapMode::Daemon {
                host: "localhost".into(),
                port: 30255
            }
        );
    }

    #[test]
    fn reads_variables() {
        let config = from_vars(&[
            (ENV_DAEMON_HOST, "10.0.0.1"),
            (ENV_DAEMON_PORT, "31000"),
            (ENV_PATH_EXPIRY_MARGIN, " 30 "),
            (ENV_MOCK_DNS_TXT, "a.ch=\"scion=1-ff00:0:110,10.0.0.2\""),
        ])
        .unwrap();
        assert_eq!(config.daemon_host, "10.0.0.1");
        assert_eq!(config.daemon_port, 31000);
        assert_eq!(config.path_expiry_margin, Duration::from_secs(30));
        assert!(config.mock_dns_txt.is_some());
    }

    #[test]
    fn empty_variables_are_unset() {
        let config = from_vars(&[(ENV_BOOTSTRAP_HOST, ""), (ENV_DAEMON_HOST, "  ")]).unwrap();
        assert_eq!(config.bootstrap_host, None);
        assert_eq!(config.daemon_host, DEFAULT_DAEMON_HOST);
    }

    #[test]
    fn invalid_port() {
        let err = from_vars(&[(ENV_DAEMON_PORT, "70000")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: ENV_DAEMON_PORT, ref value } if value == "70000"
        ));
    }

    #[test]
    fn mode_priority() {
        let all = [
            (ENV_BOOTSTRAP_TOPO_FILE, "/etc/scion/topology.json"),
            (ENV_BOOTSTRAP_HOST, "bootstrap.example.org:8041"),
            (ENV_BOOTSTRAP_NAPTR_NAME, "example.org"),
        ];
        assert_eq!(
            from_vars(&all).unwrap().mode(),
            BootstrapMode::TopologyFile("/etc/scion/topology.json".into())
        );
        assert_eq!(
            from_vars(&all[1..]).unwrap().mode(),
            BootstrapMode::BootstrapHost("bootstrap.example.org:8041".into())
        );
        assert_eq!(
            from_vars(&all[2..]).unwrap().mode(),
            BootstrapMode::Naptr("example.org".into())
        );
    }

    #[test]
    fn json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{"daemon_port": 40000, "path_expiry_margin": 5}"#,
        )
        .unwrap();
        let config = ServiceConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.daemon_port, 40000);
        assert_eq!(config.path_expiry_margin, Duration::from_secs(5));
        assert_eq!(config.daemon_host, DEFAULT_DAEMON_HOST);
    }
}
