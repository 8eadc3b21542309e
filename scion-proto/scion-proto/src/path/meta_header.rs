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

use std::mem;

use bytes::{Buf, BufMut};

use super::DataPlanePathErrorKind;
use crate::{
    packet::{DecodeError, InadequateBufferSize, layout::PathMetaHeaderLayout as Layout},
    wire_encoding::{self, WireDecode, WireEncode},
};

wire_encoding::bounded_uint! {
    /// A 2-bit index into the info fields.
    #[derive(Default)]
    pub struct InfoFieldIndex(u8 : 2);
}

wire_encoding::bounded_uint! {
    /// A 6-bit index into the hop fields.
    #[derive(Default)]
    pub struct HopFieldIndex(u8 : 6);
}

wire_encoding::bounded_uint! {
    /// A 6-bit count of the number of hop fields in a path segment.
    #[derive(Default)]
    pub struct SegmentLength(u8 : 6);
}

impl SegmentLength {
    /// Gets the indicated length of the segment as a usize.
    pub const fn length(&self) -> usize {
        self.0 as usize
    }
}

wire_encoding::bounded_uint! {
    /// A 6-bit reserved field within the [`MetaHeader`].
    #[derive(Default)]
    pub struct MetaReserved(u8 : 6);
}

/// Meta information about the SCION path contained in a [`StandardPath`][super::StandardPath].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetaHeader {
    /// An index to the current info field for the packet on its way through the network.
    ///
    /// This must be smaller than [`Self::info_fields_count`].
    pub current_info_field: InfoFieldIndex,

    /// An index to the current hop field.
    ///
    /// This must be smaller than [`Self::hop_fields_count`] and point at a hop field of the
    /// segment selected by the current info field.
    pub current_hop_field: HopFieldIndex,

    /// Unused bits in the path meta header.
    pub reserved: MetaReserved,

    /// The number of hop fields in a given segment.
    ///
    /// The lengths at indices 1 and 2 are non-zero only if all preceding lengths are non-zero.
    pub segment_lengths: [SegmentLength; 3],
}

impl MetaHeader {
    /// The length of a path meta header in bytes.
    pub const LENGTH: usize = 4;
    /// The length of an info field in bytes.
    pub const INFO_FIELD_LENGTH: usize = 8;
    /// The length of a hop field in bytes.
    pub const HOP_FIELD_LENGTH: usize = 12;

    /// Creates a meta header at the start of a path with the given segment lengths.
    ///
    /// Fails if a segment is longer than 63 hops.
    pub fn with_segment_lengths(lengths: [usize; 3]) -> Result<Self, DataPlanePathErrorKind> {
        let mut segment_lengths = [SegmentLength::default(); 3];
        for (length, target) in lengths.into_iter().zip(segment_lengths.iter_mut()) {
            *target = u8::try_from(length)
                .ok()
                .and_then(SegmentLength::new)
                .ok_or(DataPlanePathErrorKind::TooManyHops)?;
        }
        Ok(Self {
            segment_lengths,
            ..Self::default()
        })
    }

    /// The number of info fields.
    pub const fn info_fields_count(&self) -> usize {
        match &self.segment_lengths {
            [SegmentLength(0), ..] => 0,
            [_, SegmentLength(0), _] => 1,
            [.., SegmentLength(0)] => 2,
            _ => 3,
        }
    }

    /// Returns the index of the current info field.
    pub fn info_field_index(&self) -> usize {
        self.current_info_field.get().into()
    }

    /// The number of hop fields.
    pub const fn hop_fields_count(&self) -> usize {
        self.segment_lengths[0].length()
            + self.segment_lengths[1].length()
            + self.segment_lengths[2].length()
    }

    /// Returns the index of the current hop field.
    pub fn hop_field_index(&self) -> usize {
        self.current_hop_field.get().into()
    }

    /// Returns index of segment that contains the current hop field.
    ///
    /// If hop is out of range, this returns None.
    pub fn segment_index(&self) -> Option<usize> {
        let hop_index = self.hop_field_index();
        let seg0 = self.segment_lengths[0].length();
        let seg1 = self.segment_lengths[1].length();
        let seg2 = self.segment_lengths[2].length();

        if hop_index < seg0 {
            Some(0)
        } else if hop_index < seg0 + seg1 {
            Some(1)
        } else if hop_index < seg0 + seg1 + seg2 {
            Some(2)
        } else {
            None
        }
    }

    /// Returns the offset in bytes of the given info field.
    pub const fn info_field_offset(info_field_index: usize) -> usize {
        Self::LENGTH + Self::INFO_FIELD_LENGTH * info_field_index
    }

    /// Returns the offset in bytes of the given hop field.
    pub const fn hop_field_offset(&self, hop_field_index: usize) -> usize {
        Self::LENGTH
            + Self::INFO_FIELD_LENGTH * self.info_fields_count()
            + Self::HOP_FIELD_LENGTH * hop_field_index
    }

    /// Encodes the header as a `u32`.
    pub const fn as_u32(&self) -> u32 {
        let mut word = Layout::CURRENT_INFO_FIELD.pack(0, self.current_info_field.get() as u32);
        word = Layout::CURRENT_HOP_FIELD.pack(word, self.current_hop_field.get() as u32);
        word = Layout::RESERVED.pack(word, self.reserved.get() as u32);
        word = Layout::SEGMENT_LENGTHS[0].pack(word, self.segment_lengths[0].get() as u32);
        word = Layout::SEGMENT_LENGTHS[1].pack(word, self.segment_lengths[1].get() as u32);
        Layout::SEGMENT_LENGTHS[2].pack(word, self.segment_lengths[2].get() as u32)
    }

    /// Decodes the header from a `u32` without any consistency checks.
    pub const fn from_u32(word: u32) -> Self {
        Self {
            current_info_field: InfoFieldIndex::new_truncated(
                Layout::CURRENT_INFO_FIELD.unpack(word) as u8,
            ),
            current_hop_field: HopFieldIndex::new_truncated(
                Layout::CURRENT_HOP_FIELD.unpack(word) as u8
            ),
            reserved: MetaReserved::new_truncated(Layout::RESERVED.unpack(word) as u8),
            segment_lengths: [
                SegmentLength::new_truncated(Layout::SEGMENT_LENGTHS[0].unpack(word) as u8),
                SegmentLength::new_truncated(Layout::SEGMENT_LENGTHS[1].unpack(word) as u8),
                SegmentLength::new_truncated(Layout::SEGMENT_LENGTHS[2].unpack(word) as u8),
            ],
        }
    }

    /// The length of the path described by this header, including the header itself.
    pub const fn encoded_path_length(&self) -> usize {
        Self::LENGTH
            + self.info_fields_count() * Self::INFO_FIELD_LENGTH
            + self.hop_fields_count() * Self::HOP_FIELD_LENGTH
    }

    /// Creates the meta header of the reversed path.
    ///
    /// The non-empty segments are put in reverse order and both indices point at the start of the
    /// reversed path.
    pub fn to_reversed(&self) -> Self {
        Self {
            current_info_field: InfoFieldIndex::default(),
            current_hop_field: HopFieldIndex::default(),
            reserved: MetaReserved::default(),
            segment_lengths: match self.segment_lengths {
                [SegmentLength(0), ..] => [SegmentLength(0); 3],
                [s1, SegmentLength(0), ..] => [s1, SegmentLength(0), SegmentLength(0)],
                [s1, s2, SegmentLength(0)] => [s2, s1, SegmentLength(0)],
                [s1, s2, s3] => [s3, s2, s1],
            },
        }
    }

    /// Checks the segment lengths and the current indices for consistency.
    pub fn check(&self) -> Result<(), DataPlanePathErrorKind> {
        let [seg0, seg1, seg2] = self.segment_lengths.map(|length| length.get());
        if seg0 == 0 || seg1 == 0 && seg2 > 0 {
            return Err(DataPlanePathErrorKind::InvalidSegmentLengths);
        }
        if self.info_field_index() >= self.info_fields_count() {
            return Err(DataPlanePathErrorKind::InfoFieldOutOfRange);
        }
        if self.segment_index() != Some(self.info_field_index()) {
            return Err(DataPlanePathErrorKind::HopFieldOutOfRange);
        }
        Ok(())
    }
}

impl WireEncode for MetaHeader {
    type Error = InadequateBufferSize;

    #[inline]
    fn encoded_length(&self) -> usize {
        Self::LENGTH
    }

    #[inline]
    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        buffer.put_u32(self.as_u32());
    }
}

impl<T: Buf> WireDecode<T> for MetaHeader {
    type Error = DecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        if data.remaining() < mem::size_of::<u32>() {
            return Err(Self::Error::PacketEmptyOrTruncated);
        }
        let meta = Self::from_u32(data.get_u32());
        meta.check()?;
        Ok(meta)
    }
}
