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

//! Control-plane protobuf messages exchanged with the path lookup service.
//!
//! Only the messages required to request and decode path segments are declared. Field numbers
//! follow the SCION control-plane definitions (`proto/control_plane/v1/seg.proto` and
//! `proto/crypto/v1/signed.proto`).

use std::collections::HashMap;

/// Segment type tags used as keys in [`SegmentsResponse::segments`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SegmentType {
    /// Unknown segment type.
    Unspecified = 0,
    /// Up segment.
    Up = 1,
    /// Down segment.
    Down = 2,
    /// Core segment.
    Core = 3,
}

/// Request for all segments between two ISD-AS numbers, either of which may be a wildcard.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SegmentsRequest {
    /// Source ISD-AS of the segments.
    #[prost(uint64, tag = "1")]
    pub src_isd_as: u64,
    /// Destination ISD-AS of the segments.
    #[prost(uint64, tag = "2")]
    pub dst_isd_as: u64,
}

/// Response to a [`SegmentsRequest`], keyed by [`SegmentType`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct SegmentsResponse {
    /// The segments by type.
    #[prost(map = "int32, message", tag = "1")]
    pub segments: HashMap<i32, Segments>,
}

/// A list of segments of the same type.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Segments {
    /// The segments.
    #[prost(message, repeated, tag = "1")]
    pub segments: Vec<PathSegment>,
}

/// A path segment as disseminated by beaconing.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PathSegment {
    /// Encoded [`SegmentInformation`].
    #[prost(bytes = "vec", tag = "1")]
    pub segment_info: Vec<u8>,
    /// The AS entries in construction direction.
    #[prost(message, repeated, tag = "2")]
    pub as_entries: Vec<AsEntry>,
}

/// Immutable segment metadata.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SegmentInformation {
    /// Creation time of the segment in Unix seconds.
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    /// Segment ID used for MAC chaining.
    #[prost(uint32, tag = "2")]
    pub segment_id: u32,
}

/// An AS entry; the signed part carries an encoded [`AsEntrySignedBody`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct AsEntry {
    /// Signed header and body.
    #[prost(message, optional, tag = "1")]
    pub signed: Option<SignedMessage>,
}

/// A signed message.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SignedMessage {
    /// Encoded [`HeaderAndBodyInternal`].
    #[prost(bytes = "vec", tag = "1")]
    pub header_and_body: Vec<u8>,
    /// Signature over `header_and_body`.
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

/// Header and body of a [`SignedMessage`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct HeaderAndBodyInternal {
    /// Encoded signature header.
    #[prost(bytes = "vec", tag = "1")]
    pub header: Vec<u8>,
    /// Encoded body.
    #[prost(bytes = "vec", tag = "2")]
    pub body: Vec<u8>,
}

/// The signed body of an AS entry.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AsEntrySignedBody {
    /// ISD-AS of the AS that created the entry.
    #[prost(uint64, tag = "1")]
    pub isd_as: u64,
    /// ISD-AS of the downstream AS.
    #[prost(uint64, tag = "2")]
    pub next_isd_as: u64,
    /// AS internal MTU.
    #[prost(uint32, tag = "3")]
    pub mtu: u32,
    /// Entry used for regular paths.
    #[prost(message, optional, tag = "4")]
    pub hop_entry: Option<HopEntry>,
    /// Entries used for peering paths.
    #[prost(message, repeated, tag = "5")]
    pub peer_entries: Vec<PeerEntry>,
}

/// A hop entry.
#[derive(Clone, PartialEq, prost::Message)]
pub struct HopEntry {
    /// The hop field.
    #[prost(message, optional, tag = "1")]
    pub hop_field: Option<HopField>,
    /// MTU of the ingress link.
    #[prost(uint32, tag = "2")]
    pub ingress_mtu: u32,
}

/// A peer entry.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PeerEntry {
    /// ISD-AS of the peer.
    #[prost(uint64, tag = "1")]
    pub peer_isd_as: u64,
    /// Interface ID on the peer side.
    #[prost(uint64, tag = "2")]
    pub peer_interface: u64,
    /// MTU of the peering link.
    #[prost(uint32, tag = "3")]
    pub peer_mtu: u32,
    /// The hop field.
    #[prost(message, optional, tag = "4")]
    pub hop_field: Option<HopField>,
}

/// A control-plane hop field.
#[derive(Clone, PartialEq, prost::Message)]
pub struct HopField {
    /// Ingress interface ID.
    #[prost(uint64, tag = "1")]
    pub ingress: u64,
    /// Egress interface ID.
    #[prost(uint64, tag = "2")]
    pub egress: u64,
    /// Relative expiry time.
    #[prost(uint32, tag = "3")]
    pub exp_time: u32,
    /// The 6-byte MAC.
    #[prost(bytes = "vec", tag = "4")]
    pub mac: Vec<u8>,
}
