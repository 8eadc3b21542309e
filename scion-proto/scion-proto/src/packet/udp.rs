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

//! SCION/UDP packets on the byte level.
//!
//! Outgoing packets are written with [`build_packet`], inbound ones are checked and decoded with
//! [`parse_packet`] or queried with the `read_*` functions. [`reverse_packet`] turns a received
//! packet into the headers of its reply in place.

use bytes::{BufMut, Bytes};

use super::{
    ByEndpoint, DecodeError, EncodeError, InadequateBufferSize,
    headers::{AddressHeader, CommonHeader, read_headers, reverse_addresses, write_headers},
    layout::{CommonHeaderLayout, UdpLayout},
    validate::{ValidationError, validate},
};
use crate::{
    address::SocketAddr,
    path::{Path, ResponsePath, StandardPath, reverse_in_place},
};

/// Writes a complete SCION/UDP packet carrying `payload` from `source` along `path`.
pub fn build_packet<B: BufMut>(
    buffer: &mut B,
    payload: &[u8],
    path: &Path,
    source: SocketAddr,
) -> Result<(), EncodeError> {
    let destination = path.destination();
    let raw_path = path.raw();
    write_headers(
        buffer,
        payload.len(),
        raw_path.len(),
        source.endhost(),
        destination.endhost(),
    )?;
    if buffer.remaining_mut() < raw_path.len() + UdpLayout::LENGTH + payload.len() {
        return Err(InadequateBufferSize.into());
    }
    buffer.put_slice(raw_path);
    write_udp_overlay(buffer, payload.len(), source.port(), destination.port())?;
    buffer.put_slice(payload);
    Ok(())
}

/// Writes the UDP overlay header. The checksum is left at zero.
pub fn write_udp_overlay<B: BufMut>(
    buffer: &mut B,
    payload_length: usize,
    source_port: u16,
    destination_port: u16,
) -> Result<(), EncodeError> {
    let length = u16::try_from(payload_length + UdpLayout::LENGTH)
        .map_err(|_| EncodeError::PayloadTooLarge)?;
    if buffer.remaining_mut() < UdpLayout::LENGTH {
        return Err(InadequateBufferSize.into());
    }
    buffer.put_u16(source_port);
    buffer.put_u16(destination_port);
    buffer.put_u16(length);
    buffer.put_u16(0);
    Ok(())
}

/// Returns the user data following the UDP overlay header.
pub fn read_user_data(packet: &[u8]) -> Result<&[u8], DecodeError> {
    let start = udp_offset(packet)? + UdpLayout::LENGTH;
    Ok(&packet[start..])
}

/// Reads the sender of a packet together with the reversed path to reach it.
///
/// `first_hop` is the underlay address the packet was received from, i.e., the border router
/// of the local AS or the sender itself if it is in the local AS.
pub fn read_remote_socket_address(
    packet: &[u8],
    first_hop: std::net::SocketAddr,
) -> Result<ResponsePath, DecodeError> {
    let (_, address, consumed) = read_headers(packet)?;
    let udp = udp_offset(packet)?;
    if consumed > udp {
        return Err(DecodeError::InconsistentPathLength);
    }

    let mut raw_path = packet[consumed..udp].to_vec();
    reverse_in_place(&mut raw_path)?;

    let ports = read_ports(packet, udp);
    let remote = SocketAddr::new(address.source(), ports.source);
    let local = SocketAddr::new(address.destination(), ports.destination);
    Ok(ResponsePath::new(
        Path::new(Bytes::from(raw_path), remote, first_hop),
        local,
    ))
}

/// Reads the destination host address and UDP port of a packet.
pub fn read_destination_socket_address(
    packet: &[u8],
) -> Result<std::net::SocketAddr, DecodeError> {
    let (_, address, _) = read_headers(packet)?;
    let udp = udp_offset(packet)?;
    let port = read_ports(packet, udp).destination;
    Ok(std::net::SocketAddr::new(
        address.destination().local_address(),
        port,
    ))
}

/// Turns a received packet into the headers of its reply, in place.
///
/// Source and destination addresses are swapped, the path is reversed and the UDP ports are
/// swapped. The payload is left untouched. On error the packet is not modified.
pub fn reverse_packet(packet: &mut [u8]) -> Result<(), DecodeError> {
    let (_, _, consumed) = read_headers(packet)?;
    let udp = udp_offset(packet)?;
    if consumed > udp {
        return Err(DecodeError::InconsistentPathLength);
    }
    reverse_in_place(&mut packet[consumed..udp])?;
    reverse_addresses(packet)?;
    packet[udp..udp + 4].rotate_left(2);
    Ok(())
}

/// A validated SCION/UDP packet.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPacket {
    pub common: CommonHeader,
    pub address: AddressHeader,
    pub path: StandardPath,
    pub ports: ByEndpoint<u16>,
    /// Offset of the user data in the packet.
    pub payload_offset: usize,
}

impl ParsedPacket {
    /// The sender of the packet.
    pub fn source(&self) -> SocketAddr {
        SocketAddr::new(self.address.source(), self.ports.source)
    }

    /// The receiver of the packet.
    pub fn destination(&self) -> SocketAddr {
        SocketAddr::new(self.address.destination(), self.ports.destination)
    }

    /// The user data of `packet`, which must be the packet this was parsed from.
    pub fn payload<'a>(&self, packet: &'a [u8]) -> &'a [u8] {
        packet.get(self.payload_offset..).unwrap_or_default()
    }
}

/// Error returned by [`parse_packet`].
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum ParseError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("failed to decode packet: {0}")]
    Decode(#[from] DecodeError),
}

/// Validates and decodes a SCION/UDP packet.
pub fn parse_packet(packet: &[u8]) -> Result<ParsedPacket, ParseError> {
    validate(packet)?;
    let (common, address, consumed) = read_headers(packet)?;
    let udp = common.header_length();
    if consumed > udp {
        return Err(DecodeError::InconsistentPathLength.into());
    }
    let path = StandardPath::decode_raw(&packet[consumed..udp])?;
    Ok(ParsedPacket {
        common,
        address,
        path,
        ports: read_ports(packet, udp),
        payload_offset: udp + UdpLayout::LENGTH,
    })
}

/// Returns the offset of the UDP overlay header, checking that the header is present.
fn udp_offset(packet: &[u8]) -> Result<usize, DecodeError> {
    if packet.len() < CommonHeaderLayout::LENGTH {
        return Err(DecodeError::PacketEmptyOrTruncated);
    }
    let header_length = CommonHeaderLayout::HEADER_LENGTH.read(packet, 0) as usize * 4;
    if packet.len() < header_length + UdpLayout::LENGTH {
        return Err(DecodeError::PacketEmptyOrTruncated);
    }
    Ok(header_length)
}

fn read_ports(packet: &[u8], udp: usize) -> ByEndpoint<u16> {
    ByEndpoint {
        source: UdpLayout::SRC_PORT.read(packet, udp) as u16,
        destination: UdpLayout::DST_PORT.read(packet, udp) as u16,
    }
}
