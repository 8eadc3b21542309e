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

//! Beaconing over a small in-memory AS graph, used to produce path segments in tests.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    address::IsdAsn,
    path::{AsEntry, HopEntry, PathSegment, SegmentHopField, SignedMessage},
};

/// The timestamp carried by every segment produced by [`Graph::beacon`].
pub const BEACON_TIMESTAMP: i64 = 1_700_000_000;

/// The AS MTU announced by every AS entry.
pub const AS_MTU: u32 = 1472;

#[derive(Debug, Clone, Copy)]
struct Link {
    b: IsdAsn,
    b_ifid: u16,
}

/// A graph of ASes connected through numbered interfaces.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    ases: BTreeSet<IsdAsn>,
    links: BTreeMap<IsdAsn, BTreeMap<u16, Link>>,
    mtus: BTreeMap<IsdAsn, u32>,
}

/// Errors raised while beaconing over the [`Graph`].
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("AS {0} not in graph")]
    AsNotInGraph(IsdAsn),
    #[error("cannot create empty segment")]
    EmptySegment,
    #[error("unknown interface id {0}")]
    UnknownIfId(u16),
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link between interface `a_if` of `a` and interface `b_if` of `b`.
    pub fn add_link(&mut self, a: IsdAsn, a_if: u16, b: IsdAsn, b_if: u16) {
        self.ases.insert(a);
        self.ases.insert(b);
        self.links
            .entry(a)
            .or_default()
            .insert(a_if, Link { b, b_ifid: b_if });
        self.links
            .entry(b)
            .or_default()
            .insert(b_if, Link { b: a, b_ifid: a_if });
    }

    /// Overrides the MTU announced by `ia`.
    pub fn set_mtu(&mut self, ia: IsdAsn, mtu: u32) {
        self.mtus.insert(ia, mtu);
    }

    /// Constructs a segment that starts at `start_ia` and leaves each AS through the next of
    /// `egress_ifs`. The last AS entry has egress interface 0.
    ///
    /// For example, with start_ia = 1-1, egress_ifs = [1, 2] and the links
    /// 1-1#1 -> 1-2#1 and 1-2#2 -> 1-3#1, the segment traverses
    /// 1-1#1, 1-2#1, 1-2#2, 1-3#1.
    pub fn beacon(&self, start_ia: IsdAsn, egress_ifs: &[u16]) -> Result<PathSegment, GraphError> {
        if egress_ifs.is_empty() {
            return Err(GraphError::EmptySegment);
        }
        if !self.ases.contains(&start_ia) {
            return Err(GraphError::AsNotInGraph(start_ia));
        }

        let mut as_entries = Vec::with_capacity(egress_ifs.len() + 1);
        let mut curr_ia = start_ia;
        let mut ingress = 0u16;

        for (i, egress) in egress_ifs.iter().chain(std::iter::once(&0)).enumerate() {
            let (next_ia, next_ingress) = if *egress != 0 {
                let link = self
                    .links
                    .get(&curr_ia)
                    .ok_or(GraphError::AsNotInGraph(curr_ia))?
                    .get(egress)
                    .ok_or(GraphError::UnknownIfId(*egress))?;
                (link.b, link.b_ifid)
            } else {
                (IsdAsn::WILDCARD, 0)
            };

            as_entries.push(AsEntry {
                local: curr_ia,
                next: next_ia,
                mtu: self.mtus.get(&curr_ia).copied().unwrap_or(AS_MTU),
                hop_entry: HopEntry {
                    ingress_mtu: 1280,
                    hop_field: SegmentHopField {
                        exp_time: 63,
                        cons_ingress: ingress,
                        cons_egress: *egress,
                        mac: test_mac(curr_ia, i),
                    },
                },
                peer_entries: Vec::new(),
                signed: Some(SignedMessage {
                    header_and_body: curr_ia.to_be_bytes().to_vec(),
                    signature: vec![0xaa; 4],
                }),
            });

            ingress = next_ingress;
            curr_ia = next_ia;
        }

        let segment_id = egress_ifs
            .iter()
            .fold(start_ia.asn().to_u64() as u16, |acc, ifid| acc.rotate_left(3) ^ ifid);
        Ok(PathSegment::new(beacon_timestamp(), segment_id, as_entries))
    }
}

/// The timestamp of all test segments.
pub fn beacon_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(BEACON_TIMESTAMP, 0).unwrap()
}

fn test_mac(ia: IsdAsn, index: usize) -> [u8; 6] {
    let asn = ia.asn().to_u64().to_be_bytes();
    [asn[6], asn[7], index as u8, 0x5c, 0x10, ia.isd().to_u16() as u8]
}

/// ASes of the default test graph.
pub mod ases {
    use crate::address::IsdAsn;

    pub const CORE_110: IsdAsn = IsdAsn(0x0001_ff00_0000_0110);
    pub const LEAF_111: IsdAsn = IsdAsn(0x0001_ff00_0000_0111);
    pub const LEAF_112: IsdAsn = IsdAsn(0x0001_ff00_0000_0112);
    pub const CORE_120: IsdAsn = IsdAsn(0x0001_ff00_0000_0120);
    pub const LEAF_121: IsdAsn = IsdAsn(0x0001_ff00_0000_0121);
    pub const CORE_210: IsdAsn = IsdAsn(0x0002_ff00_0000_0210);
    pub const LEAF_211: IsdAsn = IsdAsn(0x0002_ff00_0000_0211);
}

/// Returns the default test graph.
///
/// ```text
///   ISD 1                                          ISD 2
///   110#10 ---- 10#120 #30 ------------------- 30# 210
///   #1   #2         #21                            #1
///   |     \          |                              |
///   41#  1#          1#                             1#
///   111  112         121                            211
/// ```
pub fn default_graph() -> Graph {
    use ases::*;

    let mut graph = Graph::new();
    graph.add_link(CORE_110, 1, LEAF_111, 41);
    graph.add_link(CORE_110, 2, LEAF_112, 1);
    graph.add_link(CORE_110, 10, CORE_120, 10);
    graph.add_link(CORE_120, 21, LEAF_121, 1);
    graph.add_link(CORE_120, 30, CORE_210, 30);
    graph.add_link(CORE_210, 1, LEAF_211, 1);
    graph
}

#[cfg(test)]
mod tests {
    use super::{ases::*, *};

    #[test]
    fn beacon_follows_links() {
        let segment = default_graph().beacon(CORE_110, &[10, 30]).unwrap();

        let locals: Vec<_> = segment.as_entries.iter().map(|e| e.local).collect();
        assert_eq!(locals, [CORE_110, CORE_120, CORE_210]);

        let hops: Vec<_> = segment
            .as_entries
            .iter()
            .map(|e| (e.hop_entry.hop_field.cons_ingress, e.hop_entry.hop_field.cons_egress))
            .collect();
        assert_eq!(hops, [(0, 10), (10, 30), (30, 0)]);
        assert!(segment.is_signed());
    }

    #[test]
    fn beacon_unknown_interface() {
        assert!(matches!(
            default_graph().beacon(CORE_110, &[99]),
            Err(GraphError::UnknownIfId(99))
        ));
    }
}
