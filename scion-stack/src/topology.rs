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

//! Bootstrap topology of the local AS.
//!
//! The topology is read from a `topology.json` file as written by the SCION control plane:
//!
//! ```json
//! {
//!   "isd_as": "1-ff00:0:110",
//!   "mtu": 1472,
//!   "attributes": ["core"],
//!   "border_routers": {
//!     "br1-ff00_0_110-1": {
//!       "internal_addr": "127.0.0.9:31002",
//!       "interfaces": {
//!         "1": { "underlay": { "public": "127.0.0.4:50000", "remote": "127.0.0.5:50000" } }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Packets leaving the AS through an interface are sent to the internal address of the border
//! router owning it. Routers without an internal address are reached on the interface's local or
//! public underlay address.

use std::{
    collections::{BTreeMap, HashMap},
    net,
};

use scion_proto::{address::IsdAsn, path::LocalTopology};
use serde::Deserialize;
use tracing::debug;

/// Attribute marking a core AS.
const CORE_ATTRIBUTE: &str = "core";

/// Errors while loading a topology.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// The topology file cannot be read.
    #[error("cannot read topology file: {0}")]
    Io(#[from] std::io::Error),
    /// The topology is not valid JSON or misses required fields.
    #[error("invalid topology: {0}")]
    Json(#[from] serde_json::Error),
    /// An interface has no usable underlay address.
    #[error("no address for interface {interface}: {address:?}")]
    InvalidAddress {
        /// The interface ID.
        interface: u16,
        /// The address found, if any.
        address: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct TopologyFile {
    isd_as: IsdAsn,
    mtu: u16,
    #[serde(default)]
    attributes: Vec<String>,
    #[serde(default)]
    border_routers: HashMap<String, BorderRouterEntry>,
}

#[derive(Debug, Deserialize)]
struct BorderRouterEntry {
    internal_addr: Option<String>,
    #[serde(default)]
    interfaces: BTreeMap<u16, InterfaceEntry>,
}

#[derive(Debug, Deserialize)]
struct InterfaceEntry {
    #[serde(default)]
    underlay: UnderlayEntry,
}

#[derive(Debug, Default, Deserialize)]
struct UnderlayEntry {
    public: Option<String>,
    local: Option<String>,
}

/// The local AS as seen by an endhost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    isd_as: IsdAsn,
    mtu: u16,
    core: bool,
    border_routers: BTreeMap<u16, net::SocketAddr>,
}

impl Topology {
    /// Creates a topology without border routers.
    pub fn new(isd_as: IsdAsn, mtu: u16, core: bool) -> Self {
        Self {
            isd_as,
            mtu,
            core,
            border_routers: BTreeMap::new(),
        }
    }

    /// Adds the border router reachable at `address` for `interface`.
    pub fn with_border_router(mut self, interface: u16, address: net::SocketAddr) -> Self {
        self.border_routers.insert(interface, address);
        self
    }

    /// Reads a topology file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, TopologyError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses the content of a topology file.
    pub fn from_json(content: &str) -> Result<Self, TopologyError> {
        let file: TopologyFile = serde_json::from_str(content)?;
        let mut border_routers = BTreeMap::new();
        for (name, router) in file.border_routers {
            for (interface, entry) in router.interfaces {
                let address = router
                    .internal_addr
                    .as_ref()
                    .or(entry.underlay.local.as_ref())
                    .or(entry.underlay.public.as_ref());
                let parsed = address
                    .and_then(|address| address.parse().ok())
                    .ok_or_else(|| TopologyError::InvalidAddress {
                        interface,
                        address: address.cloned(),
                    })?;
                debug!(router = %name, interface, address = %parsed, "Border router interface");
                border_routers.insert(interface, parsed);
            }
        }
        Ok(Self {
            isd_as: file.isd_as,
            mtu: file.mtu,
            core: file.attributes.iter().any(|a| a == CORE_ATTRIBUTE),
            border_routers,
        })
    }

    /// The interfaces of all border routers of the AS.
    pub fn interfaces(&self) -> impl Iterator<Item = u16> + '_ {
        self.border_routers.keys().copied()
    }
}

impl LocalTopology for Topology {
    fn local_isd_as(&self) -> IsdAsn {
        self.isd_as
    }

    fn local_mtu(&self) -> u16 {
        self.mtu
    }

    fn is_local_as_core(&self) -> bool {
        self.core
    }

    fn border_router_address(&self, interface: u16) -> Option<net::SocketAddr> {
        self.border_routers.get(&interface).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: &str = r#"{
        "isd_as": "1-ff00:0:111",
        "mtu": 1400,
        "attributes": [],
        "border_routers": {
            "br1-ff00_0_111-1": {
                "internal_addr": "127.0.0.17:31010",
                "interfaces": {
                    "41": {
                        "underlay": { "public": "127.0.0.4:50000", "remote": "127.0.0.5:50000" },
                        "isd_as": "1-ff00:0:110",
                        "link_to": "parent",
                        "mtu": 1280
                    }
                }
            },
            "br1-ff00_0_111-2": {
                "interfaces": {
                    "42": { "underlay": { "local": "[::1]:50001" } }
                }
            }
        }
    }"#;

    #[test]
    fn parses_topology() {
        let topology = Topology::from_json(TOPOLOGY).unwrap();
        assert_eq!(topology.local_isd_as(), "1-ff00:0:111".parse().unwrap());
        assert_eq!(topology.local_mtu(), 1400);
        assert!(!topology.is_local_as_core());
        assert_eq!(
            topology.border_router_address(41),
            Some("127.0.0.17:31010".parse().unwrap())
        );
        assert_eq!(
            topology.border_router_address(42),
            Some("[::1]:50001".parse().unwrap())
        );
        assert_eq!(topology.border_router_address(1), None);
        assert_eq!(topology.interfaces().collect::<Vec<_>>(), vec![41, 42]);
    }

    #[test]
    fn core_attribute() {
        let topology = Topology::from_json(
            r#"{"isd_as": "1-ff00:0:110", "mtu": 1472, "attributes": ["core"]}"#,
        )
        .unwrap();
        assert!(topology.is_local_as_core());
        assert_eq!(topology.interfaces().count(), 0);
    }

    #[test]
    fn missing_address() {
        let err = Topology::from_json(
            r#"{"isd_as": "1-ff00:0:110", "mtu": 1472,
                "border_routers": {"br": {"interfaces": {"3": {"underlay": {}}}}}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TopologyError::InvalidAddress {
                interface: 3,
                address: None
            }
        ));
    }

    #[test]
    fn invalid_isd_as() {
        let err = Topology::from_json(r#"{"isd_as": "1-ff00:0", "mtu": 1472}"#).unwrap_err();
        assert!(matches!(err, TopologyError::Json(_)));
    }
}
