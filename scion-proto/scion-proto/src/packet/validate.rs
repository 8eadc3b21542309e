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

//! Validation of inbound SCION/UDP packets.
//!
//! [`validate`] performs all semantic checks that a receiver applies before handing a packet to
//! the application. Failures are reported as values so that a receive loop can drop the packet
//! and continue.

use super::{
    byte_field::read_u32,
    layout::{AddressHeaderLayout, CommonHeaderLayout as Layout, UdpLayout},
};

/// The smallest possible SCION/UDP packet: common header, address header with two IPv4 hosts and
/// the UDP overlay header.
pub const MIN_PACKET_LENGTH: usize = Layout::LENGTH + AddressHeaderLayout::STATIC_LENGTH + 8;

/// Reasons for rejecting an inbound packet.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("SCION packet validation failed: Invalid packet length: packet too short: {0}")]
    PacketTooShort(usize),
    #[error("SCION packet validation failed: version: expected 0, got {0}")]
    UnsupportedVersion(u8),
    #[error("SCION packet validation failed: nextHeader: expected 17, got {0}")]
    UnsupportedNextHeader(u8),
    #[error(
        "SCION packet validation failed: Invalid packet length: length = {actual}, header says \
         {expected}"
    )]
    LengthMismatch { actual: usize, expected: usize },
    #[error("SCION packet validation failed: Invalid path type: expected 1, got {0}")]
    UnsupportedPathType(u8),
    #[error(
        "SCION packet validation failed: Invalid destination address type: expected 0b000 or \
         0b111, got {0:b}"
    )]
    DestinationAddressType(u8),
    #[error(
        "SCION packet validation failed: Invalid source address type: expected 0b000 or 0b111, \
         got {0:b}"
    )]
    SourceAddressType(u8),
    #[error(
        "SCION packet validation failed: Invalid reserved field: expected \
         '0b0000_0000_0000_0000', got {0:b}"
    )]
    Reserved(u16),
    #[error(
        "SCION packet validation failed: Invalid header length: {header_length} bytes do not \
         cover the address header and the UDP overlay"
    )]
    HeaderTooShort { header_length: usize },
    #[error("SCION packet validation failed: Invalid source port: 0")]
    SourcePortZero,
    #[error("SCION packet validation failed: Invalid destination port: 0")]
    DestinationPortZero,
}

/// Checks that `packet` is a well-formed SCION/UDP packet on a standard SCION path with IP host
/// addresses.
///
/// The checks are applied in a fixed order and the first violation is reported.
pub fn validate(packet: &[u8]) -> Result<(), ValidationError> {
    if packet.len() < MIN_PACKET_LENGTH {
        return Err(ValidationError::PacketTooShort(packet.len()));
    }
    let word0 = read_u32(packet, 0);
    let word1 = read_u32(packet, 4);
    let word2 = read_u32(packet, 8);

    let version = Layout::VERSION.unpack(word0) as u8;
    if version != 0 {
        return Err(ValidationError::UnsupportedVersion(version));
    }
    let next_header = Layout::NEXT_HEADER.unpack(word1) as u8;
    if next_header != 17 {
        return Err(ValidationError::UnsupportedNextHeader(next_header));
    }
    let header_length = Layout::HEADER_LENGTH.unpack(word1) as usize * 4;
    let expected = header_length + Layout::PAYLOAD_LENGTH.unpack(word1) as usize;
    if expected != packet.len() {
        return Err(ValidationError::LengthMismatch {
            actual: packet.len(),
            expected,
        });
    }
    let path_type = Layout::PATH_TYPE.unpack(word2) as u8;
    if path_type != 1 {
        return Err(ValidationError::UnsupportedPathType(path_type));
    }
    let destination_info = Layout::DST_ADDR_INFO.unpack(word2) as u8;
    if !is_ip_address_info(destination_info) {
        return Err(ValidationError::DestinationAddressType(destination_info));
    }
    let source_info = Layout::SRC_ADDR_INFO.unpack(word2) as u8;
    if !is_ip_address_info(source_info) {
        return Err(ValidationError::SourceAddressType(source_info));
    }
    let reserved = Layout::RESERVED.unpack(word2) as u16;
    if reserved != 0 {
        return Err(ValidationError::Reserved(reserved));
    }

    // With IP address info verified, the host addresses are valid 4 or 16 byte addresses as long
    // as they lie within the header and the UDP overlay follows it.
    let address_end = AddressHeaderLayout::end(
        Layout::DST_ADDR_LEN.unpack(word2),
        Layout::SRC_ADDR_LEN.unpack(word2),
    );
    if header_length < address_end || header_length + UdpLayout::LENGTH > packet.len() {
        return Err(ValidationError::HeaderTooShort { header_length });
    }

    if UdpLayout::SRC_PORT.read(packet, header_length) == 0 {
        return Err(ValidationError::SourcePortZero);
    }
    if UdpLayout::DST_PORT.read(packet, header_length) == 0 {
        return Err(ValidationError::DestinationPortZero);
    }
    Ok(())
}

const fn is_ip_address_info(info: u8) -> bool {
    matches!(info, 0b0000 | 0b0011)
}
