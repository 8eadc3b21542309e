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

//! Combination of path segments into forwarding paths.
//!
//! Segments are stored in construction direction. Before they can be used they are oriented
//! against the source of the path: each segment must start or end at the AS where the previous
//! one left off. Segments traversed against construction direction have their hop fields
//! written in reverse and the segment identifier of their info field updated with the MACs of
//! all hops but the first.

use std::{collections::HashMap, net};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{
    lookup::LocalTopology,
    meta_header::MetaHeader,
    metadata::{Metadata, PathInterface},
    segment::{PathSegment, SegmentsResponse},
    standard::{HopField, InfoField},
};
use crate::{
    address::IsdAsn,
    packet::layout::InfoFieldLayout,
    wire_encoding::WireEncode,
};

/// A forwarding path assembled from one to three segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedPath {
    /// The encoded standard path, empty for AS-local paths.
    pub raw: Bytes,
    /// The border router of the first interface, `None` for AS-local paths.
    pub first_hop: Option<net::SocketAddr>,
    /// Metadata collected while combining the segments.
    pub metadata: Metadata,
}

impl CombinedPath {
    /// Creates the empty path used between two hosts in the same AS.
    pub fn local(mtu: u16, now: DateTime<Utc>) -> Self {
        Self {
            raw: Bytes::new(),
            first_hop: None,
            metadata: Metadata {
                mtu,
                expiration: now,
                interfaces: Vec::new(),
            },
        }
    }
}

/// Errors raised while combining segments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathCombinationError {
    #[error("unsigned AS entry in segment")]
    UnsignedEntry,
    #[error("segment has no AS entries")]
    EmptySegment,
    #[error("relevant IA is not an ending IA: {0}")]
    NotAnEndingIa(IsdAsn),
    #[error("multiple segment collections in a single response")]
    MultipleSegmentCollections,
    #[error("too many segments or hops to encode")]
    TooManyHops,
    #[error("path has no interfaces")]
    NoInterfaces,
    #[error("no border router for interface {0}")]
    UnknownBorderRouter(u16),
    #[error("segment timestamp {0} does not fit the info field")]
    InvalidTimestamp(DateTime<Utc>),
}

/// Combines the segments of one, two or three responses into paths from `src` to `dst`.
///
/// With two responses, the first holds the segments leaving `src` and the second those arriving
/// at `dst`. With three responses, they hold up, core and down segments in that order.
pub fn combine_segments<T>(
    responses: &[SegmentsResponse],
    src: IsdAsn,
    dst: IsdAsn,
    topology: &T,
) -> Result<Vec<CombinedPath>, PathCombinationError>
where
    T: LocalTopology + ?Sized,
{
    let paths = match responses {
        [single] => combine_one(single, src, topology)?,
        [first, second] => combine_two(first, second, src, dst, topology)?,
        [up, core, down] => combine_three(up, core, down, src, dst, topology)?,
        _ => Vec::new(),
    };
    tracing::debug!(
        responses = responses.len(),
        paths = paths.len(),
        %src,
        %dst,
        "Combined segments"
    );
    Ok(paths)
}

/// Builds one path per segment.
pub fn combine_one<T>(
    response: &SegmentsResponse,
    src: IsdAsn,
    topology: &T,
) -> Result<Vec<CombinedPath>, PathCombinationError>
where
    T: LocalTopology + ?Sized,
{
    response
        .segments()
        .map(|segment| build_path(&[segment], src, topology))
        .collect()
}

/// Joins every segment of `first` with every segment of `second` that meets it in the same AS.
pub fn combine_two<T>(
    first: &SegmentsResponse,
    second: &SegmentsResponse,
    src: IsdAsn,
    dst: IsdAsn,
    topology: &T,
) -> Result<Vec<CombinedPath>, PathCombinationError>
where
    T: LocalTopology + ?Sized,
{
    let arriving = segments_by_other_end(second, dst)?;
    let mut paths = Vec::new();
    for segment in first.segments() {
        let Some(middle) = other_end(segment, src)? else {
            continue;
        };
        for next in arriving.get(&middle).into_iter().flatten() {
            paths.push(build_path(&[segment, next], src, topology)?);
        }
    }
    Ok(paths)
}

/// Joins up, core and down segments through the two core ASes at the ends of each core segment.
pub fn combine_three<T>(
    up: &SegmentsResponse,
    core: &SegmentsResponse,
    down: &SegmentsResponse,
    src: IsdAsn,
    dst: IsdAsn,
    topology: &T,
) -> Result<Vec<CombinedPath>, PathCombinationError>
where
    T: LocalTopology + ?Sized,
{
    let ups = segments_by_other_end(up, src)?;
    let downs = segments_by_other_end(down, dst)?;
    let mut paths = Vec::new();
    for core_segment in core.segments() {
        let (first, last) = ending_ias(core_segment)?;
        let pair = match (ups.get(&first), downs.get(&last)) {
            (Some(ups), Some(downs)) => Some((ups, downs)),
            _ => match (ups.get(&last), downs.get(&first)) {
                (Some(ups), Some(downs)) => Some((ups, downs)),
                _ => None,
            },
        };
        let Some((ups, downs)) = pair else {
            continue;
        };
        for up_segment in ups {
            for down_segment in downs {
                paths.push(build_path(
                    &[up_segment, core_segment, down_segment],
                    src,
                    topology,
                )?);
            }
        }
    }
    Ok(paths)
}

/// Reports whether `a` and `b` appear as an ending AS of any segment in the response.
pub fn contains_isd_as(
    response: &SegmentsResponse,
    a: IsdAsn,
    b: IsdAsn,
) -> Result<(bool, bool), PathCombinationError> {
    let mut found = (false, false);
    for segment in response.segments() {
        let (first, last) = ending_ias(segment)?;
        found.0 |= first == a || last == a;
        found.1 |= first == b || last == b;
    }
    Ok(found)
}

/// Encodes the given segments, oriented from `src`, into a standard path.
pub fn build_path<T>(
    segments: &[&PathSegment],
    src: IsdAsn,
    topology: &T,
) -> Result<CombinedPath, PathCombinationError>
where
    T: LocalTopology + ?Sized,
{
    if segments.len() > 3 {
        return Err(PathCombinationError::TooManyHops);
    }
    let mut lengths = [0usize; 3];
    for (length, segment) in lengths.iter_mut().zip(segments) {
        *length = segment.len();
    }
    let meta = MetaHeader::with_segment_lengths(lengths)
        .map_err(|_| PathCombinationError::TooManyHops)?;

    let reversed = orientations(segments, src)?;

    let mut raw = Vec::with_capacity(meta.encoded_path_length());
    meta.encode_to_unchecked(&mut raw);
    for (segment, &is_reversed) in segments.iter().zip(&reversed) {
        let timestamp = segment.info.timestamp;
        let timestamp_epoch = u32::try_from(timestamp.timestamp())
            .map_err(|_| PathCombinationError::InvalidTimestamp(timestamp))?;
        InfoField {
            peer: false,
            cons_dir: !is_reversed,
            seg_id: segment.info.segment_id,
            timestamp_epoch,
        }
        .encode_to_unchecked(&mut raw);
    }

    let mut mtu = topology.local_mtu();
    let mut expiration: Option<DateTime<Utc>> = None;
    let mut interfaces = Vec::new();

    for (index, (segment, &is_reversed)) in segments.iter().zip(&reversed).enumerate() {
        let segment_id_offset =
            MetaHeader::info_field_offset(index) + InfoFieldLayout::SEGMENT_ID_BYTES;
        let count = segment.as_entries.len();
        for i in 0..count {
            let position = if is_reversed { count - 1 - i } else { i };
            let entry = &segment.as_entries[position];
            let hop = &entry.hop_entry.hop_field;

            HopField {
                ingress_router_alert: false,
                egress_router_alert: false,
                exp_time: hop.exp_time,
                cons_ingress: hop.cons_ingress,
                cons_egress: hop.cons_egress,
                mac: hop.mac,
            }
            .encode_to_unchecked(&mut raw);

            if is_reversed && i > 0 {
                raw[segment_id_offset] ^= hop.mac[0];
                raw[segment_id_offset + 1] ^= hop.mac[1];
            }

            mtu = mtu.min(u16::try_from(entry.mtu).unwrap_or(u16::MAX));

            let has_next = if is_reversed {
                position > 0
            } else {
                position + 1 < count
            };
            if has_next {
                let neighbor = if is_reversed {
                    &segment.as_entries[position - 1]
                } else {
                    &segment.as_entries[position + 1]
                };
                let neighbor_hop = &neighbor.hop_entry.hop_field;
                let (egress, ingress) = if is_reversed {
                    (hop.cons_ingress, neighbor_hop.cons_egress)
                } else {
                    (hop.cons_egress, neighbor_hop.cons_ingress)
                };
                interfaces.push(PathInterface::new(entry.local, egress));
                interfaces.push(PathInterface::new(neighbor.local, ingress));
            }
        }

        if let Some(segment_expiry) = segment.min_expiry() {
            expiration = Some(match expiration {
                Some(current) => current.min(segment_expiry),
                None => segment_expiry,
            });
        }
    }

    let first_interface = interfaces
        .first()
        .ok_or(PathCombinationError::NoInterfaces)?
        .id;
    let first_hop = topology
        .border_router_address(first_interface)
        .ok_or(PathCombinationError::UnknownBorderRouter(first_interface))?;

    Ok(CombinedPath {
        raw: Bytes::from(raw),
        first_hop: Some(first_hop),
        metadata: Metadata {
            mtu,
            expiration: expiration.ok_or(PathCombinationError::EmptySegment)?,
            interfaces,
        },
    })
}

/// Determines for each segment whether it is traversed against construction direction.
fn orientations(
    segments: &[&PathSegment],
    src: IsdAsn,
) -> Result<Vec<bool>, PathCombinationError> {
    let mut start = src;
    let mut reversed = Vec::with_capacity(segments.len());
    for segment in segments {
        let (first, last) = ending_ias(segment)?;
        if first == start {
            reversed.push(false);
            start = last;
        } else if last == start {
            reversed.push(true);
            start = first;
        } else {
            return Err(PathCombinationError::NotAnEndingIa(start));
        }
    }
    Ok(reversed)
}

/// Groups the segments that have `known` at one end by the IA at their other end.
fn segments_by_other_end(
    response: &SegmentsResponse,
    known: IsdAsn,
) -> Result<HashMap<IsdAsn, Vec<&PathSegment>>, PathCombinationError> {
    let mut map: HashMap<IsdAsn, Vec<&PathSegment>> = HashMap::new();
    for segment in response.segments() {
        if let Some(other) = other_end(segment, known)? {
            map.entry(other).or_default().push(segment);
        }
    }
    Ok(map)
}

fn other_end(segment: &PathSegment, known: IsdAsn) -> Result<Option<IsdAsn>, PathCombinationError> {
    let (first, last) = ending_ias(segment)?;
    Ok(if first == known {
        Some(last)
    } else if last == known {
        Some(first)
    } else {
        None
    })
}

fn ending_ias(segment: &PathSegment) -> Result<(IsdAsn, IsdAsn), PathCombinationError> {
    let (first, last) = match (segment.as_entries.first(), segment.as_entries.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(PathCombinationError::EmptySegment),
    };
    if first.signed.is_none() || last.signed.is_none() {
        return Err(PathCombinationError::UnsignedEntry);
    }
    Ok((first.local, last.local))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        path::StandardPath,
        proto::SegmentType,
        test::{
            graph::{ases::*, beacon_timestamp, default_graph},
            network::{LOCAL_MTU, TestTopology},
        },
    };

    fn beacon(start: IsdAsn, egress_ifs: &[u16]) -> PathSegment {
        default_graph().beacon(start, egress_ifs).unwrap()
    }

    fn response(segments: Vec<PathSegment>) -> SegmentsResponse {
        SegmentsResponse::new(SegmentType::Up, segments)
    }

    #[test]
    fn reversed_up_segment() {
        let topology = TestTopology::new(LEAF_111, false);
        let up = beacon(CORE_110, &[1]);
        assert_eq!(up.info.segment_id, 0x0881);

        let path = build_path(&[&up], LEAF_111, &topology).unwrap();

        #[rustfmt::skip]
        let expected: [u8; 36] = [
            0x00, 0x00, 0x20, 0x00,
            0x00, 0x00, 0x09, 0x91, 0x65, 0x53, 0xf1, 0x00,
            0x00, 0x3f, 0x00, 0x29, 0x00, 0x00, 0x01, 0x11, 0x01, 0x5c, 0x10, 0x01,
            0x00, 0x3f, 0x00, 0x00, 0x00, 0x01, 0x01, 0x10, 0x00, 0x5c, 0x10, 0x01,
        ];
        assert_eq!(path.raw.as_ref(), expected);
        assert_eq!(path.first_hop, Some(TestTopology::router(41)));
        assert_eq!(path.metadata.mtu, LOCAL_MTU);
        assert_eq!(
            path.metadata.expiration,
            beacon_timestamp() + Duration::from_secs(21_600)
        );
        assert_eq!(
            path.metadata.interfaces,
            [
                PathInterface::new(LEAF_111, 41),
                PathInterface::new(CORE_110, 1)
            ]
        );
    }

    #[test]
    fn reversed_segment_accumulates_macs_in_segment_id() {
        let topology = TestTopology::new(CORE_210, true);
        let core = beacon(CORE_110, &[10, 30]);

        let path = build_path(&[&core], CORE_210, &topology).unwrap();
        let decoded = StandardPath::decode_raw(&path.raw).unwrap();

        let expected_id = core.info.segment_id
            ^ u16::from_be_bytes([0x01, 0x20])
            ^ u16::from_be_bytes([0x01, 0x10]);
        assert_eq!(decoded.info_fields[0].seg_id, expected_id);
        assert!(!decoded.info_fields[0].cons_dir);
        assert_eq!(decoded.hop_fields[0].cons_ingress, 30);
        assert_eq!(decoded.hop_fields[2].cons_egress, 10);
    }

    #[test]
    fn forward_segment_keeps_segment_id() {
        let topology = TestTopology::new(CORE_110, true);
        let core = beacon(CORE_110, &[10, 30]);

        let path = build_path(&[&core], CORE_110, &topology).unwrap();
        let decoded = StandardPath::decode_raw(&path.raw).unwrap();

        assert_eq!(decoded.info_fields[0].seg_id, core.info.segment_id);
        assert!(decoded.info_fields[0].cons_dir);
        assert_eq!(decoded.hop_fields[0].cons_egress, 10);
        assert_eq!(path.first_hop, Some(TestTopology::router(10)));
        assert_eq!(decoded.encode_to_bytes(), path.raw);
    }

    #[test]
    fn expiration_and_mtu_are_minimums() {
        let mut graph = default_graph();
        graph.set_mtu(CORE_110, 1300);
        let topology = TestTopology::new(LEAF_111, false);
        let up = graph.beacon(CORE_110, &[1]).unwrap();
        let mut down = graph.beacon(CORE_110, &[2]).unwrap();
        down.as_entries[1].hop_entry.hop_field.exp_time = 0;

        let path = build_path(&[&up, &down], LEAF_111, &topology).unwrap();

        assert_eq!(path.metadata.mtu, 1300);
        assert_eq!(
            path.metadata.expiration,
            beacon_timestamp() + Duration::from_secs(337)
        );
    }

    #[test]
    fn combine_three_in_either_core_orientation() {
        let topology = TestTopology::new(LEAF_111, false);
        let up = response(vec![beacon(CORE_110, &[1])]);
        let down = response(vec![beacon(CORE_120, &[21])]);
        let cores = response(vec![beacon(CORE_120, &[10]), beacon(CORE_110, &[10])]);

        let paths = combine_three(&up, &cores, &down, LEAF_111, LEAF_121, &topology).unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].metadata.interfaces, paths[1].metadata.interfaces);
        let flags: Vec<bool> = paths
            .iter()
            .map(|p| StandardPath::decode_raw(&p.raw).unwrap().info_fields[1].cons_dir)
            .collect();
        assert_eq!(flags, [false, true]);
    }

    #[test]
    fn combine_two_skips_unconnected_segments() {
        let topology = TestTopology::new(LEAF_111, false);
        let up = response(vec![beacon(CORE_110, &[1])]);
        let down = response(vec![beacon(CORE_120, &[21]), beacon(CORE_110, &[2])]);

        let paths = combine_two(&up, &down, LEAF_111, LEAF_112, &topology).unwrap();
        assert_eq!(paths.len(), 1);

        let paths = combine_two(&up, &down, LEAF_111, LEAF_121, &topology).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn combine_segments_without_responses() {
        let topology = TestTopology::new(LEAF_111, false);
        assert_eq!(combine_segments(&[], LEAF_111, LEAF_112, &topology), Ok(vec![]));
    }

    #[test]
    fn contains_checks_ending_ases_only() {
        let core = response(vec![beacon(CORE_110, &[10, 30])]);

        assert_eq!(contains_isd_as(&core, CORE_110, CORE_210), Ok((true, true)));
        assert_eq!(contains_isd_as(&core, CORE_120, LEAF_111), Ok((false, false)));
    }

    #[test]
    fn timestamp_outside_info_field_range_is_rejected() {
        let topology = TestTopology::new(LEAF_111, false);
        for timestamp in [
            DateTime::<Utc>::from_timestamp(-1, 0).unwrap(),
            DateTime::<Utc>::from_timestamp(i64::from(u32::MAX) + 1, 0).unwrap(),
        ] {
            let mut up = beacon(CORE_110, &[1]);
            up.info.timestamp = timestamp;
            assert_eq!(
                build_path(&[&up], LEAF_111, &topology),
                Err(PathCombinationError::InvalidTimestamp(timestamp))
            );
        }

        let mut up = beacon(CORE_110, &[1]);
        up.info.timestamp = DateTime::<Utc>::from_timestamp(i64::from(u32::MAX), 0).unwrap();
        assert!(build_path(&[&up], LEAF_111, &topology).is_ok());
    }

    #[test]
    fn unsigned_entry_is_rejected() {
        let mut segment = beacon(CORE_110, &[1]);
        segment.as_entries[0].signed = None;

        assert_eq!(
            contains_isd_as(&response(vec![segment]), LEAF_111, CORE_110),
            Err(PathCombinationError::UnsignedEntry)
        );
    }

    #[test]
    fn source_must_be_an_ending_as() {
        let topology = TestTopology::new(LEAF_111, false);
        let down = beacon(CORE_120, &[21]);

        assert_eq!(
            build_path(&[&down], LEAF_111, &topology),
            Err(PathCombinationError::NotAnEndingIa(LEAF_111))
        );
    }

    #[test]
    fn single_entry_segment_has_no_interfaces() {
        let topology = TestTopology::new(CORE_110, true);
        let mut segment = beacon(CORE_110, &[1]);
        segment.as_entries.truncate(1);

        assert_eq!(
            build_path(&[&segment], CORE_110, &topology),
            Err(PathCombinationError::NoInterfaces)
        );
    }

    #[test]
    fn missing_border_router() {
        let mut topology = TestTopology::new(LEAF_111, false);
        topology.missing_routers.push(41);
        let up = beacon(CORE_110, &[1]);

        assert_eq!(
            build_path(&[&up], LEAF_111, &topology),
            Err(PathCombinationError::UnknownBorderRouter(41))
        );
    }

    #[test]
    fn at_most_three_segments() {
        let topology = TestTopology::new(LEAF_111, false);
        let up = beacon(CORE_110, &[1]);

        assert_eq!(
            build_path(&[&up, &up, &up, &up], LEAF_111, &topology),
            Err(PathCombinationError::TooManyHops)
        );
    }
}
