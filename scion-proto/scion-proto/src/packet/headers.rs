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

//! SCION common and address headers.
//!
//! Besides the structured [`CommonHeader`] and [`AddressHeader`], this module offers the byte
//! level operations used on the hot path: [`read_headers`], [`write_headers`], and the in-place
//! [`reverse_addresses`].

mod common_header;
pub use common_header::{AddressInfo, CommonHeader, FlowId, NextHeader, PathType, Version};

mod address_header;
pub use address_header::AddressHeader;

use bytes::{Buf, BufMut};

use super::{
    DecodeError, EncodeError,
    layout::{AddressHeaderLayout, CommonHeaderLayout},
};
use crate::{
    address::EndhostAddr,
    wire_encoding::{WireDecode, WireEncode},
};

/// Reads the common and address header from the start of `buffer`.
///
/// Returns both headers and the number of bytes consumed. No semantic validation is performed
/// apart from requiring IP host addresses, see [`validate`][super::validate] for that.
pub fn read_headers(buffer: &[u8]) -> Result<(CommonHeader, AddressHeader, usize), DecodeError> {
    let mut data = buffer;
    let common = CommonHeader::decode(&mut data)?;
    let address = AddressHeader::decode(&mut data, common.address_info)?;
    let consumed = buffer.len() - data.remaining();
    Ok((common, address, consumed))
}

/// Writes the common and address header of a UDP packet on a standard SCION path.
///
/// `udp_payload_length` is the number of user bytes following the UDP overlay header and
/// `path_length` the length of the raw path that the caller writes right after the headers.
/// Returns the written common header.
pub fn write_headers<B: BufMut>(
    buffer: &mut B,
    udp_payload_length: usize,
    path_length: usize,
    source: EndhostAddr,
    destination: EndhostAddr,
) -> Result<CommonHeader, EncodeError> {
    let address = AddressHeader::from(ByEndpoint {
        source,
        destination,
    });
    let common = CommonHeader::new_udp(address.address_info(), path_length, udp_payload_length)?;
    common.encode_to(buffer)?;
    address.encode_to(buffer)?;
    Ok(common)
}

/// Swaps source and destination of the common and address header in place.
///
/// The address types and lengths are swapped in the common header, the ISD-AS numbers and host
/// addresses in the address header. Host addresses of different lengths are handled by rotating
/// the host address block.
pub fn reverse_addresses(packet: &mut [u8]) -> Result<(), DecodeError> {
    if packet.len() < CommonHeaderLayout::LENGTH {
        return Err(DecodeError::PacketEmptyOrTruncated);
    }
    let dst_info = CommonHeaderLayout::DST_ADDR_INFO.read(packet, 0);
    let src_info = CommonHeaderLayout::SRC_ADDR_INFO.read(packet, 0);
    let dst_length_code = CommonHeaderLayout::DST_ADDR_LEN.read(packet, 0);
    let src_length_code = CommonHeaderLayout::SRC_ADDR_LEN.read(packet, 0);
    let end = AddressHeaderLayout::end(dst_length_code, src_length_code);
    if packet.len() < end {
        return Err(DecodeError::PacketEmptyOrTruncated);
    }

    CommonHeaderLayout::DST_ADDR_INFO.write(packet, 0, src_info);
    CommonHeaderLayout::SRC_ADDR_INFO.write(packet, 0, dst_info);
    packet[AddressHeaderLayout::DST_ISD_AS..AddressHeaderLayout::DST_HOST].rotate_left(8);
    packet[AddressHeaderLayout::DST_HOST..end]
        .rotate_left(AddressHeaderLayout::host_length(dst_length_code));
    Ok(())
}

/// Instances of an object associated with both a source and destination endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct ByEndpoint<T> {
    /// The value for the source
    pub source: T,
    /// The value for the destination
    pub destination: T,
}

impl<T> ByEndpoint<T> {
    /// Swaps source and destination.
    pub fn into_reversed(self) -> Self {
        Self {
            source: self.destination,
            destination: self.source,
        }
    }

    /// Applies the `function` to both source and destination
    pub fn map<U, F>(&self, function: F) -> ByEndpoint<U>
    where
        F: Fn(&T) -> U,
    {
        ByEndpoint {
            destination: function(&self.destination),
            source: function(&self.source),
        }
    }
}

impl<T: Clone> ByEndpoint<T> {
    /// Create a new instance where both the source and destination have the same value.
    pub fn with_cloned(source_and_destination: T) -> Self {
        Self {
            destination: source_and_destination.clone(),
            source: source_and_destination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parse;

    fn write(source: &str, destination: &str, path_length: usize) -> Vec<u8> {
        let mut buffer = Vec::new();
        write_headers(
            &mut buffer,
            10,
            path_length,
            source.parse().unwrap(),
            destination.parse().unwrap(),
        )
        .unwrap();
        buffer.resize(buffer.len() + path_length, 0);
        buffer
    }

    #[test]
    fn header_length_invariant() {
        for (src, dst, host_bytes) in [
            ("[1-1,10.0.0.1]", "[1-2,10.0.0.2]", 8),
            ("[1-1,::1]", "[1-2,10.0.0.2]", 20),
            ("[1-1,10.0.0.1]", "[1-2,::2]", 20),
            ("[1-1,::1]", "[1-2,::2]", 32),
        ] {
            for path_length in [0, 36, 4 + 8 * 3 + 12 * 10] {
                let packet = write(src, dst, path_length);
                let (common, _, consumed) = read_headers(&packet).unwrap();
                assert_eq!(common.header_length(), 12 + 16 + host_bytes + path_length);
                assert_eq!(common.header_length() % 4, 0);
                assert_eq!(consumed, 12 + 16 + host_bytes);
                assert_eq!(common.payload_length, 18);
            }
        }
    }

    #[test]
    fn write_then_read() {
        let packet = write("[1-ff00:0:110,10.0.0.1]", "[1-ff00:0:112,fd00::7]", 36);
        let (common, address, _) = read_headers(&packet).unwrap();
        assert_eq!(common.version.get(), 0);
        assert_eq!(common.traffic_class, 0);
        assert_eq!(common.flow_id.get(), 1);
        assert_eq!(common.next_header, NextHeader::Udp);
        assert_eq!(common.path_type, PathType::Scion);
        assert_eq!(common.reserved, 0);
        assert_eq!(address.source(), parse!("[1-ff00:0:110,10.0.0.1]"));
        assert_eq!(address.destination(), parse!("[1-ff00:0:112,fd00::7]"));
    }

    #[test]
    fn reverse_mixed_lengths() {
        let mut packet = write("[1-ff00:0:110,10.0.0.1]", "[1-ff00:0:112,fd00::7]", 0);
        reverse_addresses(&mut packet).unwrap();
        let (common, address, _) = read_headers(&packet).unwrap();
        assert_eq!(common.address_info.source, AddressInfo::IPV6);
        assert_eq!(common.address_info.destination, AddressInfo::IPV4);
        assert_eq!(address.source(), parse!("[1-ff00:0:112,fd00::7]"));
        assert_eq!(address.destination(), parse!("[1-ff00:0:110,10.0.0.1]"));

        reverse_addresses(&mut packet).unwrap();
        assert_eq!(packet, write("[1-ff00:0:110,10.0.0.1]", "[1-ff00:0:112,fd00::7]", 0));
    }

    #[test]
    fn reverse_truncated() {
        let mut packet = write("[1-1,10.0.0.1]", "[1-2,::2]", 0);
        packet.truncate(40);
        assert_eq!(
            reverse_addresses(&mut packet),
            Err(DecodeError::PacketEmptyOrTruncated)
        );
    }
}
