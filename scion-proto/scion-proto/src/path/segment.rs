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

//! SCION path segment types.
//!
//! Path segments are produced by beaconing and handed out by the path lookup service. A segment
//! is undirected until it is oriented against a source or destination, see
//! [`combinator`][super::combinator].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::standard::exp_time_to_duration;
use crate::{address::IsdAsn, proto::SegmentType};

/// Segments returned by a single lookup, grouped by segment type.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SegmentsResponse {
    /// One collection per segment type present in the response.
    pub collections: Vec<(SegmentType, Vec<PathSegment>)>,
}

impl SegmentsResponse {
    /// Creates a response holding a single collection.
    pub fn new(segment_type: SegmentType, segments: Vec<PathSegment>) -> Self {
        Self {
            collections: vec![(segment_type, segments)],
        }
    }

    /// Returns true if the response contains no segments at all.
    pub fn is_empty(&self) -> bool {
        self.collections
            .iter()
            .all(|(_, segments)| segments.is_empty())
    }

    /// Iterates over all segments regardless of their type.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.collections
            .iter()
            .flat_map(|(_, segments)| segments.iter())
    }
}

impl fmt::Display for SegmentsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segments[")?;
        for (i, (segment_type, segments)) in self.collections.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let shown = segments
                .iter()
                .take(10)
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "{segment_type:?}: [{shown}")?;
            if segments.len() > 10 {
                write!(f, ", {} more...", segments.len() - 10)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

/// A SCION control plane path segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathSegment {
    /// Segment information.
    pub info: Info,
    /// AS entries of the segment in construction direction.
    pub as_entries: Vec<AsEntry>,
}

/// A hash of a path segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId([u8; 32]);

impl SegmentId {
    fn logging_id(&self) -> String {
        self.0[0..12]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()
    }
}

impl PathSegment {
    /// Creates a new path segment with the given timestamp and segment ID.
    pub fn new(timestamp: DateTime<Utc>, segment_id: u16, as_entries: Vec<AsEntry>) -> Self {
        Self {
            info: Info {
                timestamp,
                segment_id,
            },
            as_entries,
        }
    }

    /// Returns a hash of the segment covering all hops.
    pub fn id(&self) -> SegmentId {
        let mut hasher = Sha256::new();
        for ase in &self.as_entries {
            hasher.update(ase.local.to_be_bytes());
            hasher.update(ase.hop_entry.hop_field.cons_ingress.to_be_bytes());
            hasher.update(ase.hop_entry.hop_field.cons_egress.to_be_bytes());
        }
        SegmentId(hasher.finalize().into())
    }

    /// Returns the first IA in the path segment.
    pub fn first_ia(&self) -> Option<IsdAsn> {
        self.as_entries.first().map(|entry| entry.local)
    }

    /// Returns the last IA in the path segment.
    pub fn last_ia(&self) -> Option<IsdAsn> {
        self.as_entries.last().map(|entry| entry.local)
    }

    /// Returns the number of AS entries in the path segment.
    pub fn len(&self) -> usize {
        self.as_entries.len()
    }

    /// Returns true if the path segment has no AS entries.
    pub fn is_empty(&self) -> bool {
        self.as_entries.is_empty()
    }

    /// Returns true if all AS entries carry their signed message.
    pub fn is_signed(&self) -> bool {
        self.as_entries.iter().all(|entry| entry.signed.is_some())
    }

    /// The smallest relative expiry time over all hop entries.
    pub fn min_exp_time(&self) -> Option<u8> {
        self.as_entries
            .iter()
            .map(|entry| entry.hop_entry.hop_field.exp_time)
            .min()
    }

    /// Returns the time at which the first hop field of the segment expires.
    pub fn min_expiry(&self) -> Option<DateTime<Utc>> {
        self.min_exp_time()
            .map(|exp_time| self.info.timestamp + exp_time_to_duration(exp_time))
    }

    fn hops_description(&self) -> String {
        let mut interfaces = Vec::new();
        for e in &self.as_entries {
            if e.hop_entry.hop_field.cons_ingress > 0 {
                interfaces.push(format!("{}#{}", e.local, e.hop_entry.hop_field.cons_ingress));
            }
            if e.hop_entry.hop_field.cons_egress > 0 {
                interfaces.push(format!("{}#{}", e.local, e.hop_entry.hop_field.cons_egress));
            }
        }
        interfaces.join(", ")
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PathSegment[id: {} ts:{} hops: {}]",
            self.id().logging_id(),
            self.info.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.hops_description()
        )
    }
}

/// One AS entry in a path segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AsEntry {
    /// ISD-AS of the AS corresponding to this entry.
    pub local: IsdAsn,
    /// ISD-AS of the downstream AS.
    pub next: IsdAsn,
    /// AS internal MTU.
    pub mtu: u32,
    /// Hop entry to create regular data plane paths.
    pub hop_entry: HopEntry,
    /// List of entries to create peering data plane paths.
    pub peer_entries: Vec<PeerEntry>,
    /// The signed message this entry was decoded from.
    ///
    /// Path construction requires every entry to be signed.
    pub signed: Option<SignedMessage>,
}

impl fmt::Display for AsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ASEntry[local: {}, next: {}, mtu: {}, hop: {}, peers: {}]",
            self.local,
            self.next,
            self.mtu,
            self.hop_entry,
            self.peer_entries.len()
        )
    }
}

/// Info contains the immutable parts of a path segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Info {
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Segment identifier.
    pub segment_id: u16,
}

/// HopEntry defines an AS hop entry in the path segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HopEntry {
    /// Ingress MTU of the hop.
    pub ingress_mtu: u16,
    /// The hop field.
    pub hop_field: SegmentHopField,
}

impl fmt::Display for HopEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HopEntry[ingress_mtu: {}, {}]",
            self.ingress_mtu, self.hop_field
        )
    }
}

/// PeerEntry defines a peering entry at a specific AS hop in a path segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeerEntry {
    /// The peer's ISD-AS identifier.
    pub peer: IsdAsn,
    /// The peer's ingress interface identifier.
    pub peer_interface: u16,
    /// The peer's MTU.
    pub peer_mtu: u16,
    /// The hop field.
    pub hop_field: SegmentHopField,
}

/// Control plane representation of a hop field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SegmentHopField {
    /// Expiration time of the hop field.
    pub exp_time: u8,
    /// Ingress interface ID.
    pub cons_ingress: u16,
    /// Egress interface ID.
    pub cons_egress: u16,
    /// MAC of the hop field.
    pub mac: [u8; 6],
}

impl fmt::Display for SegmentHopField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HopField[ingress: {}, egress: {}, exp_time: {}, mac: {:02x?}]",
            self.cons_ingress, self.cons_egress, self.exp_time, self.mac
        )
    }
}

/// Signed message containing header, body, and signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignedMessage {
    /// The header and body of the message.
    pub header_and_body: Vec<u8>,
    /// The signature of the message.
    pub signature: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parse;

    fn entry(local: &str, exp_time: u8, ingress: u16, egress: u16) -> AsEntry {
        AsEntry {
            local: local.parse().unwrap(),
            next: IsdAsn::WILDCARD,
            mtu: 1400,
            hop_entry: HopEntry {
                ingress_mtu: 0,
                hop_field: SegmentHopField {
                    exp_time,
                    cons_ingress: ingress,
                    cons_egress: egress,
                    mac: [1, 2, 3, 4, 5, 6],
                },
            },
            peer_entries: vec![],
            signed: None,
        }
    }

    fn segment() -> PathSegment {
        PathSegment::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            17889,
            vec![
                entry("1-ff00:0:110", 63, 0, 1),
                entry("1-ff00:0:111", 10, 41, 0),
            ],
        )
    }

    #[test]
    fn endpoints() {
        let segment = segment();
        assert_eq!(segment.first_ia(), Some(parse!("1-ff00:0:110")));
        assert_eq!(segment.last_ia(), Some(parse!("1-ff00:0:111")));
        let empty = PathSegment::new(DateTime::<Utc>::UNIX_EPOCH, 0, vec![]);
        assert_eq!(empty.first_ia(), None);
    }

    #[test]
    fn min_expiry_uses_smallest_exp_time() {
        let segment = segment();
        assert_eq!(segment.min_exp_time(), Some(10));
        assert_eq!(
            segment.min_expiry(),
            DateTime::from_timestamp(1_700_000_000 + 11 * 86_400 / 256, 0)
        );
    }

    #[test]
    fn display_lists_interfaces() {
        let text = segment().to_string();
        assert!(text.contains("1-ff00:0:110#1, 1-ff00:0:111#41"), "{text}");
    }
}
