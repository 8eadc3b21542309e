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

use bytes::{Buf, BufMut};

use super::ByEndpoint;
use crate::{
    packet::{
        DecodeError, EncodeError, InadequateBufferSize,
        layout::{AddressHeaderLayout, CommonHeaderLayout as Layout, UdpLayout},
    },
    utils::encoded_type,
    wire_encoding::{self, WireDecode, WireEncode},
};

wire_encoding::bounded_uint! {
    /// A 4-bit SCION header version.
    #[derive(Default)]
    pub struct Version(u8 : 4);
}

wire_encoding::bounded_uint! {
    /// A 20-bit flow identifier.
    pub struct FlowId(u32 : 20);
}

impl Default for FlowId {
    /// Endhosts that do not distinguish flows use flow ID 1.
    fn default() -> Self {
        Self(1)
    }
}

wire_encoding::bounded_uint! {
    /// The 4-bit type (upper 2 bits) and length (lower 2 bits) of a host address.
    pub struct AddressInfo(u8 : 4);
}

impl AddressInfo {
    /// An IPv4 host address.
    pub const IPV4: Self = Self(0b0000);
    /// An IPv6 host address.
    pub const IPV6: Self = Self(0b0011);

    /// Returns the 2-bit address type.
    pub const fn address_type(&self) -> u8 {
        self.0 >> 2
    }

    /// Returns the 2-bit length code.
    pub const fn length_code(&self) -> u8 {
        self.0 & 0b11
    }

    /// Returns the length of the host address in bytes.
    pub const fn host_length(&self) -> usize {
        AddressHeaderLayout::host_length(self.length_code() as u32)
    }

    /// Returns true for the IPv4 and IPv6 host addresses handled by endhosts.
    pub const fn is_ip(&self) -> bool {
        self.0 == Self::IPV4.0 || self.0 == Self::IPV6.0
    }
}

encoded_type!(
    /// SCION path types that may be encountered in a packet.
    pub enum PathType(u8){
        /// The empty path type.
        Empty = 0,
        /// The standard SCION path type.
        Scion = 1,
        /// One-hop paths between neighboring border routers.
        OneHop = 2,
        /// Experimental Epic path type.
        Epic = 3,
        /// Experimental Colibri path type.
        Colibri = 4;
        /// Other, unrecognized path types.
        Other = _,
    }
);

encoded_type!(
    /// Protocol numbers of the header following the SCION headers.
    pub enum NextHeader(u8){
        /// UDP.
        Udp = 17,
        /// Hop-by-hop extension header.
        HopByHop = 200,
        /// End-to-end extension header.
        EndToEnd = 201,
        /// SCION control message protocol.
        Scmp = 202;
        /// Other protocol numbers.
        Other = _,
    }
);

/// The fixed 12-byte header at the start of every SCION packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonHeader {
    /// The header version, only version 0 is defined.
    pub version: Version,
    /// The traffic class.
    pub traffic_class: u8,
    /// The flow identifier.
    pub flow_id: FlowId,
    /// The protocol of the header following the SCION headers.
    pub next_header: NextHeader,
    /// The length of common, address and path header in units of 4 bytes.
    pub header_length_words: u8,
    /// The number of bytes following the SCION headers.
    pub payload_length: u16,
    /// The type of the path header.
    pub path_type: PathType,
    /// Type and length of the source and destination host addresses.
    pub address_info: ByEndpoint<AddressInfo>,
    /// Reserved, must be zero.
    pub reserved: u16,
}

impl CommonHeader {
    /// The length of the common header in bytes.
    pub const LENGTH: usize = Layout::LENGTH;
    /// The header length field counts units of this many bytes.
    pub const HEADER_LENGTH_MULTIPLICAND: usize = 4;

    /// Creates the common header of a UDP packet on a standard SCION path.
    ///
    /// `path_length` is the length of the raw path and `udp_payload_length` the number of user
    /// bytes that follow the UDP overlay header.
    pub fn new_udp(
        address_info: ByEndpoint<AddressInfo>,
        path_length: usize,
        udp_payload_length: usize,
    ) -> Result<Self, EncodeError> {
        let header_length = Self::LENGTH
            + AddressHeaderLayout::STATIC_LENGTH
            + address_info.destination.host_length()
            + address_info.source.host_length()
            + path_length;
        let header_length_words = header_length.div_ceil(Self::HEADER_LENGTH_MULTIPLICAND);

        Ok(Self {
            version: Version::default(),
            traffic_class: 0,
            flow_id: FlowId::default(),
            next_header: NextHeader::Udp,
            header_length_words: header_length_words
                .try_into()
                .map_err(|_| EncodeError::HeaderTooLarge)?,
            payload_length: (udp_payload_length + UdpLayout::LENGTH)
                .try_into()
                .map_err(|_| EncodeError::PayloadTooLarge)?,
            path_type: PathType::Scion,
            address_info,
            reserved: 0,
        })
    }

    /// The length of all SCION headers (common, address and path) in bytes.
    pub const fn header_length(&self) -> usize {
        self.header_length_words as usize * Self::HEADER_LENGTH_MULTIPLICAND
    }

    /// The length of the address header in bytes.
    pub const fn address_header_length(&self) -> usize {
        AddressHeaderLayout::STATIC_LENGTH
            + self.address_info.destination.host_length()
            + self.address_info.source.host_length()
    }

    /// The length of the path header in bytes as implied by the header length.
    ///
    /// Returns `None` if the header length is too small to contain the address header.
    pub const fn path_length(&self) -> Option<usize> {
        self.header_length()
            .checked_sub(Self::LENGTH + self.address_header_length())
    }

    /// The total length of the packet according to header and payload length.
    pub const fn total_length(&self) -> usize {
        self.header_length() + self.payload_length as usize
    }

    fn words(&self) -> [u32; 3] {
        let word0 = Layout::VERSION.pack(0, self.version.get().into());
        let word0 = Layout::TRAFFIC_CLASS.pack(word0, self.traffic_class.into());
        let word0 = Layout::FLOW_ID.pack(word0, self.flow_id.get());

        let word1 = Layout::NEXT_HEADER.pack(0, u8::from(self.next_header).into());
        let word1 = Layout::HEADER_LENGTH.pack(word1, self.header_length_words.into());
        let word1 = Layout::PAYLOAD_LENGTH.pack(word1, self.payload_length.into());

        let word2 = Layout::PATH_TYPE.pack(0, u8::from(self.path_type).into());
        let word2 = Layout::DST_ADDR_INFO.pack(word2, self.address_info.destination.get().into());
        let word2 = Layout::SRC_ADDR_INFO.pack(word2, self.address_info.source.get().into());
        let word2 = Layout::RESERVED.pack(word2, self.reserved.into());

        [word0, word1, word2]
    }
}

impl WireEncode for CommonHeader {
    type Error = InadequateBufferSize;

    #[inline]
    fn encoded_length(&self) -> usize {
        Self::LENGTH
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        for word in self.words() {
            buffer.put_u32(word);
        }
    }
}

impl<T: Buf> WireDecode<T> for CommonHeader {
    type Error = DecodeError;

    /// Decodes the common header without any semantic checks beyond the field widths.
    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        if data.remaining() < Self::LENGTH {
            return Err(DecodeError::PacketEmptyOrTruncated);
        }
        let word0 = data.get_u32();
        let word1 = data.get_u32();
        let word2 = data.get_u32();

        // The unpacked values fit their targets by construction of the bit windows.
        Ok(Self {
            version: Version::new_truncated(Layout::VERSION.unpack(word0) as u8),
            traffic_class: Layout::TRAFFIC_CLASS.unpack(word0) as u8,
            flow_id: FlowId::new_truncated(Layout::FLOW_ID.unpack(word0)),
            next_header: NextHeader::from(Layout::NEXT_HEADER.unpack(word1) as u8),
            header_length_words: Layout::HEADER_LENGTH.unpack(word1) as u8,
            payload_length: Layout::PAYLOAD_LENGTH.unpack(word1) as u16,
            path_type: PathType::from(Layout::PATH_TYPE.unpack(word2) as u8),
            address_info: ByEndpoint {
                destination: AddressInfo::new_truncated(Layout::DST_ADDR_INFO.unpack(word2) as u8),
                source: AddressInfo::new_truncated(Layout::SRC_ADDR_INFO.unpack(word2) as u8),
            },
            reserved: Layout::RESERVED.unpack(word2) as u16,
        })
    }
}
