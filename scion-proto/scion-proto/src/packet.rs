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

//! Representation of SCION packets and their constituent types.
//!
//! This module contains the SCION header codecs, the validation of inbound packets and the
//! byte-level operations on SCION/UDP packets used by sockets.
//!
//! For paths useable in a SCION packet, see the [path module][`crate::path`].

pub mod byte_field;
pub mod layout;

mod error;
pub use error::{DecodeError, EncodeError, InadequateBufferSize};

mod headers;
pub use headers::{
    AddressHeader, AddressInfo, ByEndpoint, CommonHeader, FlowId, NextHeader, PathType, Version,
    read_headers, reverse_addresses, write_headers,
};

mod validate;
pub use validate::{MIN_PACKET_LENGTH, ValidationError, validate};

pub mod udp;
pub use udp::{
    ParseError, ParsedPacket, build_packet, parse_packet, read_destination_socket_address,
    read_remote_socket_address, read_user_data, reverse_packet, write_udp_overlay,
};

pub mod scmp;
pub use scmp::{
    ScmpCode, ScmpDecodeError, ScmpEcho, ScmpMessage, ScmpTraceroute, ScmpType, UnknownScmpCode,
};
