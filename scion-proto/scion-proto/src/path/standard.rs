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
//! Standard SCION path.
//!
//! [`StandardPath`] is the structured form of a path header, used for inspection and to build
//! paths field by field. [`reverse_in_place`] reverses a raw path directly within a packet buffer.

use std::time::Duration;

use bytes::{Buf, BufMut};
use chrono::{DateTime, Utc};

use super::{DataPlanePathErrorKind, MetaHeader};
use crate::{
    packet::{
        DecodeError, InadequateBufferSize,
        byte_field::{read_u32, read_u64, write_u32, write_u64},
        layout::{HopFieldLayout, InfoFieldLayout},
    },
    wire_encoding::{WireDecode, WireEncode},
};

/// A fully decoded data plane path.
///
/// An empty path (used within a single AS) has no meta header on the wire and is represented with
/// all segment lengths set to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardPath {
    /// Path meta data.
    pub path_meta: MetaHeader,
    /// Info fields of the path.
    pub info_fields: Vec<InfoField>,
    /// Hop fields of the path.
    pub hop_fields: Vec<HopField>,
}

impl StandardPath {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the path has no hop fields.
    pub fn is_empty(&self) -> bool {
        self.hop_fields.is_empty()
    }

    /// Add a segment to the path.
    pub fn add_segment(
        &mut self,
        info_field: InfoField,
        hop_fields: Vec<HopField>,
    ) -> Result<(), DataPlanePathErrorKind> {
        let index = self.info_fields.len();
        if index >= 3 {
            return Err(DataPlanePathErrorKind::InvalidSegmentLengths);
        }
        let mut lengths = self.path_meta.segment_lengths.map(|length| length.length());
        lengths[index] = hop_fields.len();
        self.path_meta = MetaHeader::with_segment_lengths(lengths)?;
        self.info_fields.push(info_field);
        self.hop_fields.extend(hop_fields);
        Ok(())
    }

    /// Decodes a path from its raw bytes, which must contain exactly one path.
    pub fn decode_raw(raw: &[u8]) -> Result<Self, DecodeError> {
        if raw.is_empty() {
            return Ok(Self::new());
        }
        let mut data = raw;
        let path = Self::decode(&mut data)?;
        if data.has_remaining() {
            return Err(DecodeError::InconsistentPathLength);
        }
        Ok(path)
    }

    /// Returns the reversed path, see [`reverse_in_place`].
    pub fn to_reversed(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        Self {
            path_meta: self.path_meta.to_reversed(),
            info_fields: self
                .info_fields
                .iter()
                .rev()
                .map(|info| InfoField {
                    cons_dir: !info.cons_dir,
                    ..*info
                })
                .collect(),
            hop_fields: self.hop_fields.iter().rev().cloned().collect(),
        }
    }

    /// The earliest expiry time over all hop fields, if the path has any.
    pub fn expiry_time(&self) -> Option<DateTime<Utc>> {
        let mut hops = self.hop_fields.iter();
        self.path_meta
            .segment_lengths
            .iter()
            .zip(self.info_fields.iter())
            .flat_map(|(length, info)| {
                hops.by_ref()
                    .take(length.length())
                    .map(|hop| hop.expiry_time(info))
                    .collect::<Vec<_>>()
            })
            .min()
    }
}

impl WireEncode for StandardPath {
    type Error = InadequateBufferSize;

    fn encoded_length(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.path_meta.encoded_length()
            + self.info_fields.len() * InfoField::ENCODED_SIZE
            + self.hop_fields.len() * HopField::ENCODED_SIZE
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        if self.is_empty() {
            return;
        }
        self.path_meta.encode_to_unchecked(buffer);
        for info in self.info_fields.iter() {
            info.encode_to_unchecked(buffer);
        }
        for hop in self.hop_fields.iter() {
            hop.encode_to_unchecked(buffer);
        }
    }
}

impl<T: Buf> WireDecode<T> for StandardPath {
    type Error = DecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        let meta_header = MetaHeader::decode(data)?;
        if data.remaining() < meta_header.encoded_path_length() - MetaHeader::LENGTH {
            return Err(DecodeError::PacketEmptyOrTruncated);
        }

        let info_fields = (0..meta_header.info_fields_count())
            .map(|_| InfoField::decode(data))
            .collect::<Result<_, _>>()?;
        let hop_fields = (0..meta_header.hop_fields_count())
            .map(|_| HopField::decode(data))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            path_meta: meta_header,
            info_fields,
            hop_fields,
        })
    }
}

/// Reverses a raw standard path within its buffer.
///
/// The meta header gets its non-empty segment lengths in reverse order and both indices reset to
/// zero. The info fields are permuted accordingly and have their construction direction flag
/// flipped. Finally, the order of all hop fields is reversed.
///
/// Empty paths and paths without hop fields are left untouched. Applying the function twice
/// restores the original path apart from the current indices.
pub fn reverse_in_place(path: &mut [u8]) -> Result<(), DecodeError> {
    if path.is_empty() {
        return Ok(());
    }
    if path.len() < MetaHeader::LENGTH {
        return Err(DecodeError::PacketEmptyOrTruncated);
    }
    let meta = MetaHeader::from_u32(read_u32(path, 0));
    if meta.hop_fields_count() == 0 {
        return Ok(());
    }
    let [seg0, seg1, seg2] = meta.segment_lengths.map(|length| length.get());
    if seg0 == 0 || seg1 == 0 && seg2 > 0 {
        return Err(DataPlanePathErrorKind::InvalidSegmentLengths.into());
    }
    if path.len() < meta.encoded_path_length() {
        return Err(DecodeError::PacketEmptyOrTruncated);
    }

    write_u32(path, 0, meta.to_reversed().as_u32());

    let info_count = meta.info_fields_count();
    let info_start = MetaHeader::info_field_offset(0);
    reverse_chunks(
        &mut path[info_start..MetaHeader::info_field_offset(info_count)],
        InfoField::ENCODED_SIZE,
    );
    for index in 0..info_count {
        let offset = MetaHeader::info_field_offset(index);
        let flipped = read_u64(path, offset) ^ InfoFieldLayout::CONSTRUCTION_DIR_MASK;
        write_u64(path, offset, flipped);
    }

    let hop_start = meta.hop_field_offset(0);
    reverse_chunks(
        &mut path[hop_start..meta.hop_field_offset(meta.hop_fields_count())],
        HopField::ENCODED_SIZE,
    );
    Ok(())
}

/// Reverses the order of the `chunk_size` sized chunks in `data`.
fn reverse_chunks(data: &mut [u8], chunk_size: usize) {
    let count = data.len() / chunk_size;
    for i in 0..count / 2 {
        let (head, tail) = data.split_at_mut((count - 1 - i) * chunk_size);
        head[i * chunk_size..(i + 1) * chunk_size].swap_with_slice(&mut tail[..chunk_size]);
    }
}

/// InfoField is the InfoField used in the SCION and OneHop path types.
///
/// InfoField has the following format:
///
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |r r r r r r P C|      RSV      |             SegID             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfoField {
    /// Peering flag. Set on paths that use a peering link.
    pub peer: bool,
    /// Construction direction flag. Set if the hop fields of the segment are arranged in the
    /// direction they were constructed during beaconing.
    pub cons_dir: bool,
    /// Segment identifier used for MAC chaining.
    pub seg_id: u16,
    /// Creation time of the beacon in Unix seconds.
    pub timestamp_epoch: u32,
}

impl InfoField {
    /// The encoded size of an InfoField.
    pub const ENCODED_SIZE: usize = 8;

    /// Returns the info field timestamp as [`DateTime<Utc>`].
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(i64::from(self.timestamp_epoch), 0).unwrap_or_default()
    }
}

impl WireEncode for InfoField {
    type Error = InadequateBufferSize;

    fn encoded_length(&self) -> usize {
        Self::ENCODED_SIZE
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        let mut word = InfoFieldLayout::PEERING_FLAG.pack(0, self.peer.into());
        word = InfoFieldLayout::CONSTRUCTION_DIR_FLAG.pack(word, self.cons_dir.into());
        word = InfoFieldLayout::SEGMENT_ID.pack(word, self.seg_id.into());
        buffer.put_u32(word);
        buffer.put_u32(self.timestamp_epoch);
    }
}

impl<T: Buf> WireDecode<T> for InfoField {
    type Error = DecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        if data.remaining() < Self::ENCODED_SIZE {
            return Err(Self::Error::PacketEmptyOrTruncated);
        }
        let word = data.get_u32();
        Ok(Self {
            peer: InfoFieldLayout::PEERING_FLAG.unpack(word) != 0,
            cons_dir: InfoFieldLayout::CONSTRUCTION_DIR_FLAG.unpack(word) != 0,
            seg_id: InfoFieldLayout::SEGMENT_ID.unpack(word) as u16,
            timestamp_epoch: data.get_u32(),
        })
    }
}

/// HopField is the HopField used in the SCION and OneHop path types.
///
/// The Hop Field has the following format:
///
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |r r r r r r I E|    ExpTime    |           ConsIngress         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |        ConsEgress             |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
/// |                              MAC                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HopField {
    /// If set, the ingress router (in construction direction) processes the L4 payload.
    pub ingress_router_alert: bool,
    /// If set, the egress router (in construction direction) processes the L4 payload.
    pub egress_router_alert: bool,
    /// Relative expiry time of the hop field.
    ///
    /// The absolute expiry is `timestamp + (1 + exp_time) * 24h / 256` with the timestamp of the
    /// corresponding info field.
    pub exp_time: u8,
    /// Ingress interface ID in construction direction.
    pub cons_ingress: u16,
    /// Egress interface ID in construction direction.
    pub cons_egress: u16,
    /// The 6-byte MAC authenticating the hop field.
    pub mac: [u8; 6],
}

impl HopField {
    /// The encoded size of a HopField.
    pub const ENCODED_SIZE: usize = 12;

    /// Returns the interfaces of the hop field in traversal direction as (ingress, egress).
    pub fn interfaces(&self, is_construction_dir: bool) -> (u16, u16) {
        if is_construction_dir {
            (self.cons_ingress, self.cons_egress)
        } else {
            (self.cons_egress, self.cons_ingress)
        }
    }

    /// Returns the time span after the info field timestamp at which the hop field expires.
    pub fn expiry_offset(&self) -> Duration {
        exp_time_to_duration(self.exp_time)
    }

    /// Returns the absolute expiry time of the hop field.
    pub fn expiry_time(&self, info_field: &InfoField) -> DateTime<Utc> {
        info_field.timestamp() + self.expiry_offset()
    }
}

/// Relative expiry of a hop field with the given `exp_time`, in whole seconds.
///
/// The full 24h hop field lifetime is split into 256 units; a value of 0 still grants one unit.
pub fn exp_time_to_duration(exp_time: u8) -> Duration {
    Duration::from_secs((1 + u64::from(exp_time)) * 86_400 / 256)
}

impl WireEncode for HopField {
    type Error = InadequateBufferSize;

    fn encoded_length(&self) -> usize {
        Self::ENCODED_SIZE
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        let mut word = HopFieldLayout::INGRESS_ROUTER_ALERT.pack(0, self.ingress_router_alert.into());
        word = HopFieldLayout::EGRESS_ROUTER_ALERT.pack(word, self.egress_router_alert.into());
        word = HopFieldLayout::EXP_TIME.pack(word, self.exp_time.into());
        word = HopFieldLayout::CONS_INGRESS.pack(word, self.cons_ingress.into());
        buffer.put_u32(word);
        buffer.put_u16(self.cons_egress);
        buffer.put_slice(&self.mac);
    }
}

impl<T: Buf> WireDecode<T> for HopField {
    type Error = DecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        if data.remaining() < Self::ENCODED_SIZE {
            return Err(Self::Error::PacketEmptyOrTruncated);
        }
        let word = data.get_u32();
        let cons_egress = data.get_u16();
        let mut mac = [0; 6];
        data.copy_to_slice(&mut mac);

        Ok(Self {
            ingress_router_alert: HopFieldLayout::INGRESS_ROUTER_ALERT.unpack(word) != 0,
            egress_router_alert: HopFieldLayout::EGRESS_ROUTER_ALERT.unpack(word) != 0,
            exp_time: HopFieldLayout::EXP_TIME.unpack(word) as u8,
            cons_ingress: HopFieldLayout::CONS_INGRESS.unpack(word) as u16,
            cons_egress,
            mac,
        })
    }
}
