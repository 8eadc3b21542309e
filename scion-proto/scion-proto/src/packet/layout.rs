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

//! Field layouts of the SCION headers.
//!
//! Every field is described by a [`BitField`]: the byte offset of the 32-bit word that contains
//! it, relative to the start of its header, and a bit window inside that word. Reads and writes
//! go through [`byte_field`][super::byte_field].

use super::byte_field::{read_bits, read_u32, write_bits, write_u32};

/// A bit window inside a big-endian 32-bit word of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Byte offset of the containing word, relative to the header start.
    pub word: usize,
    /// Offset in bits from the MSB of the word.
    pub offset: u32,
    /// Width in bits.
    pub width: u32,
}

impl BitField {
    const fn new(word: usize, offset: u32, width: u32) -> Self {
        Self {
            word,
            offset,
            width,
        }
    }

    /// Offset of the field in bits relative to the header start.
    pub const fn bit_offset(&self) -> usize {
        self.word * 8 + self.offset as usize
    }

    /// Reads the field from the header starting at `base`.
    ///
    /// # Panics
    ///
    /// Panics if the containing word lies outside of `buffer`.
    #[inline]
    pub fn read(&self, buffer: &[u8], base: usize) -> u32 {
        read_bits(read_u32(buffer, base + self.word), self.offset, self.width)
    }

    /// Writes the field of the header starting at `base`, leaving all other bits untouched.
    ///
    /// # Panics
    ///
    /// Panics if the containing word lies outside of `buffer`.
    #[inline]
    pub fn write(&self, buffer: &mut [u8], base: usize, value: u32) {
        let word = read_u32(buffer, base + self.word);
        write_u32(
            buffer,
            base + self.word,
            write_bits(word, self.offset, self.width, value),
        );
    }

    /// Packs `value` into `word`, used when assembling a header word in a register.
    #[inline]
    pub const fn pack(&self, word: u32, value: u32) -> u32 {
        write_bits(word, self.offset, self.width, value)
    }

    /// Extracts the field from an already loaded word.
    #[inline]
    pub const fn unpack(&self, word: u32) -> u32 {
        read_bits(word, self.offset, self.width)
    }
}

/// Common header layout.
pub struct CommonHeaderLayout;
impl CommonHeaderLayout {
    //  0                   1                   2                   3
    //  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |Version| TrafficClass  |                FlowID                 |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |    NextHdr    |    HdrLen     |          PayloadLen           |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |    PathType   |DT |DL |ST |SL |              RSV              |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

    /// Length of the common header in bytes.
    pub const LENGTH: usize = 12;

    pub const VERSION: BitField = BitField::new(0, 0, 4);
    pub const TRAFFIC_CLASS: BitField = BitField::new(0, 4, 8);
    pub const FLOW_ID: BitField = BitField::new(0, 12, 20);
    pub const NEXT_HEADER: BitField = BitField::new(4, 0, 8);
    pub const HEADER_LENGTH: BitField = BitField::new(4, 8, 8);
    pub const PAYLOAD_LENGTH: BitField = BitField::new(4, 16, 16);
    pub const PATH_TYPE: BitField = BitField::new(8, 0, 8);
    pub const DST_ADDR_TYPE: BitField = BitField::new(8, 8, 2);
    pub const DST_ADDR_LEN: BitField = BitField::new(8, 10, 2);
    pub const SRC_ADDR_TYPE: BitField = BitField::new(8, 12, 2);
    pub const SRC_ADDR_LEN: BitField = BitField::new(8, 14, 2);
    /// Type and length of the destination address as one 4-bit value.
    pub const DST_ADDR_INFO: BitField = BitField::new(8, 8, 4);
    /// Type and length of the source address as one 4-bit value.
    pub const SRC_ADDR_INFO: BitField = BitField::new(8, 12, 4);
    pub const RESERVED: BitField = BitField::new(8, 16, 16);
}

/// Address header layout, relative to the start of the packet.
pub struct AddressHeaderLayout;
impl AddressHeaderLayout {
    //  0                   1                   2                   3
    //  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |            DstISD             |                               |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
    // |                             DstAS                             |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |            SrcISD             |                               |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
    // |                             SrcAS                             |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |                    DstHostAddr (variable Len)                 |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |                    SrcHostAddr (variable Len)                 |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

    /// Byte offset of the destination ISD-AS.
    pub const DST_ISD_AS: usize = CommonHeaderLayout::LENGTH;
    /// Byte offset of the source ISD-AS.
    pub const SRC_ISD_AS: usize = Self::DST_ISD_AS + 8;
    /// Byte offset of the destination host address.
    pub const DST_HOST: usize = Self::SRC_ISD_AS + 8;
    /// Length of the fixed (ISD-AS) part of the address header.
    pub const STATIC_LENGTH: usize = 16;

    /// Length of a host address in bytes for the given 2-bit length code.
    pub const fn host_length(length_code: u32) -> usize {
        (length_code as usize + 1) * 4
    }

    /// Byte offset of the source host address.
    pub const fn src_host(dst_length_code: u32) -> usize {
        Self::DST_HOST + Self::host_length(dst_length_code)
    }

    /// Byte offset of the first byte after the address header, i.e. the start of the path.
    pub const fn end(dst_length_code: u32, src_length_code: u32) -> usize {
        Self::src_host(dst_length_code) + Self::host_length(src_length_code)
    }
}

/// Path meta header layout.
pub struct PathMetaHeaderLayout;
impl PathMetaHeaderLayout {
    //  0                   1                   2                   3
    //  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // | C |  CurrHF   |    RSV    |  Seg0Len  |  Seg1Len  |  Seg2Len  |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

    pub const CURRENT_INFO_FIELD: BitField = BitField::new(0, 0, 2);
    pub const CURRENT_HOP_FIELD: BitField = BitField::new(0, 2, 6);
    pub const RESERVED: BitField = BitField::new(0, 8, 6);
    pub const SEGMENT_LENGTHS: [BitField; 3] = [
        BitField::new(0, 14, 6),
        BitField::new(0, 20, 6),
        BitField::new(0, 26, 6),
    ];
}

/// Info field layout.
pub struct InfoFieldLayout;
impl InfoFieldLayout {
    //  0                   1                   2                   3
    //  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |r r r r r r P C|      RSV      |             SegID             |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |                           Timestamp                           |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

    pub const PEERING_FLAG: BitField = BitField::new(0, 6, 1);
    pub const CONSTRUCTION_DIR_FLAG: BitField = BitField::new(0, 7, 1);
    pub const RESERVED: BitField = BitField::new(0, 8, 8);
    pub const SEGMENT_ID: BitField = BitField::new(0, 16, 16);
    /// Byte offset of the 32-bit timestamp.
    pub const TIMESTAMP: usize = 4;
    /// Byte offset of the segment ID.
    pub const SEGMENT_ID_BYTES: usize = 2;
    /// The construction direction flag as a mask over the whole 8-byte field.
    pub const CONSTRUCTION_DIR_MASK: u64 = 1 << 56;
}

/// Hop field layout.
pub struct HopFieldLayout;
impl HopFieldLayout {
    //  0                   1                   2                   3
    //  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |r r r r r r I E|    ExpTime    |           ConsIngress         |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |        ConsEgress             |                               |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
    // |                              MAC                              |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

    pub const INGRESS_ROUTER_ALERT: BitField = BitField::new(0, 6, 1);
    pub const EGRESS_ROUTER_ALERT: BitField = BitField::new(0, 7, 1);
    pub const EXP_TIME: BitField = BitField::new(0, 8, 8);
    pub const CONS_INGRESS: BitField = BitField::new(0, 16, 16);
    pub const CONS_EGRESS: BitField = BitField::new(4, 0, 16);
    /// Byte offset of the 6-byte MAC.
    pub const MAC: usize = 6;
}

/// UDP overlay header layout.
pub struct UdpLayout;
impl UdpLayout {
    //  0                   1                   2                   3
    //  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |            SrcPort            |            DstPort            |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |            Length             |           Checksum            |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

    /// Length of the UDP overlay header in bytes.
    pub const LENGTH: usize = 8;

    pub const SRC_PORT: BitField = BitField::new(0, 0, 16);
    pub const DST_PORT: BitField = BitField::new(0, 16, 16);
    pub const DATAGRAM_LENGTH: BitField = BitField::new(4, 0, 16);
    pub const CHECKSUM: BitField = BitField::new(4, 16, 16);
}
