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

use std::{collections::HashMap, path::Path};

use scion_proto::{address::IsdAsn, path::PathInterface};
use scion_stack::{
    config::{ENV_BOOTSTRAP_TOPO_FILE, ENV_MOCK_DNS_TXT, ServiceConfig},
    resolver::TxtLookup,
    segments::SegmentStore,
    service::ScionService,
};

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
        }
    }
}"#;

fn as_entry(local: &str, next: &str, mtu: u32, ingress: u16, egress: u16) -> serde_json::Value {
    serde_json::json!({
        "local": local,
        "next": next,
        "mtu": mtu,
        "hop_entry": {
            "ingress_mtu": 1280,
            "hop_field": {
                "exp_time": 63,
                "cons_ingress": ingress,
                "cons_egress": egress,
                "mac": [1, 2, 3, 4, 5, 6]
            }
        },
        "peer_entries": [],
        "signed": { "header_and_body": [1], "signature": [2] }
    })
}

fn segment_file() -> String {
    serde_json::json!([
        {
            "src": "1-ff00:0:111",
            "dst": "1-0",
            "type": "up",
            "segments": [{
                "info": { "timestamp": "2025-01-01T00:00:00Z", "segment_id": 4660 },
                "as_entries": [
                    as_entry("1-ff00:0:110", "1-ff00:0:111", 1472, 0, 1),
                    as_entry("1-ff00:0:111", "0-0", 1472, 41, 0)
                ]
            }]
        },
        {
            "src": "1-0",
            "dst": "1-ff00:0:112",
            "type": "down",
            "segments": [{
                "info": { "timestamp": "2025-01-01T00:10:00Z", "segment_id": 22136 },
                "as_entries": [
                    as_entry("1-ff00:0:110", "1-ff00:0:112", 1472, 0, 2),
                    as_entry("1-ff00:0:112", "0-0", 1350, 1, 0)
                ]
            }]
        }
    ])
    .to_string()
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn bootstrap(dir: &Path) -> ScionService<SegmentStore> {
    let topology = write(dir, "topology.json", TOPOLOGY);
    let segments = write(dir, "segments.json", &segment_file());
    let vars = HashMap::from([
        (ENV_BOOTSTRAP_TOPO_FILE, topology),
        (
            ENV_MOCK_DNS_TXT,
            r#"server.example="scion=1-ff00:0:112,10.0.12.1""#.to_string(),
        ),
    ]);
    let config = ServiceConfig::from_lookup(|var| vars.get(var).cloned()).unwrap();
    let store = SegmentStore::from_json_file(segments).unwrap();
    ScionService::bootstrap(config, store).unwrap()
}

#[test_log::test]
fn bootstrap_from_topology_file() {
    let dir = tempfile::tempdir().unwrap();
    let service = bootstrap(dir.path());
    assert_eq!(service.local_isd_as(), "1-ff00:0:111".parse().unwrap());
}

#[test_log::test]
fn up_and_down_path_to_host() {
    let dir = tempfile::tempdir().unwrap();
    let service = bootstrap(dir.path());

    let paths = service.get_paths_for_host("server.example", 8080).unwrap();
    assert_eq!(paths.len(), 1);
    let path = &paths[0];
    assert_eq!(
        path.destination(),
        "[1-ff00:0:112,10.0.12.1]:8080".parse().unwrap()
    );
    assert_eq!(path.first_hop(), "127.0.0.17:31010".parse().unwrap());
    assert_eq!(path.mtu(), 1350);
    // Meta header, two info fields and four hop fields.
    assert_eq!(path.raw().len(), 4 + 2 * 8 + 4 * 12);

    let interfaces: Vec<PathInterface> = [
        "1-ff00:0:111#41",
        "1-ff00:0:110#1",
        "1-ff00:0:110#2",
        "1-ff00:0:112#1",
    ]
    .iter()
    .map(|s| s.parse().unwrap())
    .collect();
    assert_eq!(path.interfaces(), interfaces.as_slice());
    // The up segment was created first and expires first.
    assert_eq!(
        path.expiration(),
        "2025-01-01T06:00:00Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap()
    );
}

struct StaticDns;

impl TxtLookup for StaticDns {
    fn txt_records(&self, host: &str) -> Vec<String> {
        match host {
            "dns.example" => vec![
                "v=spf1 -all".to_string(),
                "\"scion=1-ff00:0:112,10.0.12.9\"".to_string(),
            ],
            _ => Vec::new(),
        }
    }
}

#[test_log::test]
fn host_resolved_through_dns() {
    let dir = tempfile::tempdir().unwrap();
    let service = bootstrap(dir.path()).with_dns(StaticDns);

    assert_eq!(
        service.resolve("dns.example").unwrap(),
        "[1-ff00:0:112,10.0.12.9]".parse().unwrap()
    );
    // Static records still take precedence.
    assert_eq!(
        service.resolve("server.example").unwrap(),
        "[1-ff00:0:112,10.0.12.1]".parse().unwrap()
    );

    let paths = service.get_paths_for_host("dns.example", 443).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(
        paths[0].destination(),
        "[1-ff00:0:112,10.0.12.9]:443".parse().unwrap()
    );
    assert!(service.resolve("unknown.example").is_err());
}

#[test_log::test]
fn local_host_uses_local_path() {
    let dir = tempfile::tempdir().unwrap();
    let service = bootstrap(dir.path());
    let paths = service.get_paths_for_host("127.0.0.1", 8080).unwrap();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].is_local());
    assert_eq!(paths[0].first_hop(), "127.0.0.1:8080".parse().unwrap());
}

#[test_log::test]
fn unreachable_isd_has_no_paths() {
    let dir = tempfile::tempdir().unwrap();
    let service = bootstrap(dir.path());
    let dst: IsdAsn = "2-ff00:0:210".parse().unwrap();
    let paths = service
        .get_paths(dst, "10.2.0.1:8080".parse().unwrap())
        .unwrap();
    assert!(paths.is_empty());
}

#[test_log::test]
fn missing_topology_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let config = ServiceConfig {
        bootstrap_topo_file: Some(missing),
        ..ServiceConfig::default()
    };
    let err = ScionService::bootstrap(config, SegmentStore::new()).unwrap_err();
    assert!(format!("{err:#}").contains("loading topology from"));
}
