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

//! SCMP message types, codes and messages.
//!
//! The tables provide lookups by type and by type and code, and the descriptive text of each
//! entry. Unknown values are rejected. [`ScmpMessage`] decodes and encodes the SCMP payload of a
//! packet; echo and traceroute messages are decoded into their fields, error messages keep their
//! body opaque. The checksum is carried as-is and not verified.

use std::fmt;

use bytes::{Buf, BufMut, Bytes};

use crate::{
    address::IsdAsn,
    packet::InadequateBufferSize,
    wire_encoding::{WireDecode, WireEncode},
};

/// Error returned for SCMP types and codes that are not assigned.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum UnknownScmpCode {
    #[error("unknown SCMP type: {0}")]
    Type(u8),
    #[error("unknown SCMP type/code: {0}/{1}")]
    Code(u8, u8),
}

macro_rules! scmp_table {
    (
        $(#[$outer:meta])*
        pub enum $name:ident => $lookup:ident($($key:ident: $key_type:ty),+) {
            $($(#[$doc:meta])* $variant:ident = ($($value:literal),+) => $text:literal,)*
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$doc])* $variant,)*
        }

        impl $name {
            /// Looks up the entry with the given numeric value.
            #[allow(unused_parens)]
            pub const fn $lookup($($key: $key_type),+) -> Result<Self, UnknownScmpCode> {
                match ($($key),+) {
                    $(($($value),+) => Ok(Self::$variant),)*
                    ($($key),+) => Err(scmp_table!(@error $($key),+)),
                }
            }

            /// The descriptive text of the entry.
            pub const fn text(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }
        }
    };
    (@error $type:ident) => { UnknownScmpCode::Type($type) };
    (@error $type:ident, $code:ident) => { UnknownScmpCode::Code($type, $code) };
}

scmp_table! {
    /// The type of an SCMP message. Types below 128 are errors, the others informational.
    pub enum ScmpType => from_code(code: u8) {
        DestinationUnreachable = (1) => "Destination Unreachable",
        PacketTooBig = (2) => "Packet Too Big",
        NotAssigned = (3) => "(not assigned)",
        ParameterProblem = (4) => "Parameter Problem",
        ExternalInterfaceDown = (5) => "External Interface Down",
        InternalConnectivityDown = (6) => "Internal Connectivity Down",
        ErrorExperimentation100 = (100) => "Private Experimentation",
        ErrorExperimentation101 = (101) => "Private Experimentation",
        ErrorReserved = (127) => "Reserved for expansion of SCMP error messages",
        EchoRequest = (128) => "Echo Request",
        EchoReply = (129) => "Echo Reply",
        TracerouteRequest = (130) => "Traceroute Request",
        TracerouteReply = (131) => "Traceroute Reply",
        InfoExperimentation200 = (200) => "Private Experimentation",
        InfoExperimentation201 = (201) => "Private Experimentation",
        InfoReserved = (255) => "Reserved for expansion of SCMP informational messages",
    }
}

impl ScmpType {
    /// The numeric value of the type.
    pub const fn code(self) -> u8 {
        match self {
            Self::DestinationUnreachable => 1,
            Self::PacketTooBig => 2,
            Self::NotAssigned => 3,
            Self::ParameterProblem => 4,
            Self::ExternalInterfaceDown => 5,
            Self::InternalConnectivityDown => 6,
            Self::ErrorExperimentation100 => 100,
            Self::ErrorExperimentation101 => 101,
            Self::ErrorReserved => 127,
            Self::EchoRequest => 128,
            Self::EchoReply => 129,
            Self::TracerouteRequest => 130,
            Self::TracerouteReply => 131,
            Self::InfoExperimentation200 => 200,
            Self::InfoExperimentation201 => 201,
            Self::InfoReserved => 255,
        }
    }

    /// Returns true for error messages.
    pub const fn is_error(self) -> bool {
        self.code() < 128
    }
}

impl fmt::Display for ScmpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:'{}'", self.code(), self.text())
    }
}

scmp_table! {
    /// The code of an SCMP message, qualified by its type.
    pub enum ScmpCode => from_codes(scmp_type: u8, code: u8) {
        NoRoute = (1, 0) => "No route to destination",
        AdministrativelyDenied = (1, 1) => "Communication administratively denied",
        BeyondScope = (1, 2) => "Beyond scope of source address",
        AddressUnreachable = (1, 3) => "Address unreachable",
        PortUnreachable = (1, 4) => "Port unreachable",
        FailedPolicy = (1, 5) => "Source address failed ingress/egress policy",
        RejectRoute = (1, 6) => "Reject route to destination",
        PacketTooBig = (2, 0) => "",
        NotAssigned = (3, 0) => "",
        ErroneousHeaderField = (4, 0) => "Erroneous header field",
        UnknownNextHeader = (4, 1) => "Unknown NextHdr type",
        Unassigned = (4, 2) => "(unassigned)",
        InvalidCommonHeader = (4, 16) => "Invalid common header",
        UnknownVersion = (4, 17) => "Unknown SCION version",
        FlowIdRequired = (4, 18) => "FlowID required",
        InvalidPacketSize = (4, 19) => "Invalid packet size",
        UnknownPathType = (4, 20) => "Unknown path type",
        UnknownAddressFormat = (4, 21) => "Unknown address format",
        InvalidAddressHeader = (4, 32) => "Invalid address header",
        InvalidSourceAddress = (4, 33) => "Invalid source address",
        InvalidDestinationAddress = (4, 34) => "Invalid destination address",
        NonLocalDelivery = (4, 35) => "Non-local delivery",
        InvalidPath = (4, 48) => "Invalid path",
        UnknownConsIngress = (4, 49) => "Unknown hop field cons ingress interface",
        UnknownConsEgress = (4, 50) => "Unknown hop field cons egress interface",
        InvalidMac = (4, 51) => "Invalid hop field MAC",
        PathExpired = (4, 52) => "Path expired",
        InvalidSegmentChange = (4, 53) => "Invalid segment change",
        InvalidExtensionHeader = (4, 64) => "Invalid extension header",
        UnknownHopByHopOption = (4, 65) => "Unknown hop-by-hop option",
        UnknownEndToEndOption = (4, 66) => "Unknown end-to-end option",
        ExternalInterfaceDown = (5, 0) => "",
        InternalConnectivityDown = (6, 0) => "",
        EchoRequest = (128, 0) => "",
        EchoReply = (129, 0) => "",
        TracerouteRequest = (130, 0) => "",
        TracerouteReply = (131, 0) => "",
    }
}

impl ScmpCode {
    /// The type this code belongs to.
    pub const fn scmp_type(self) -> ScmpType {
        match self {
            Self::NoRoute
            | Self::AdministrativelyDenied
            | Self::BeyondScope
            | Self::AddressUnreachable
            | Self::PortUnreachable
            | Self::FailedPolicy
            | Self::RejectRoute => ScmpType::DestinationUnreachable,
            Self::PacketTooBig => ScmpType::PacketTooBig,
            Self::NotAssigned => ScmpType::NotAssigned,
            Self::ExternalInterfaceDown => ScmpType::ExternalInterfaceDown,
            Self::InternalConnectivityDown => ScmpType::InternalConnectivityDown,
            Self::EchoRequest => ScmpType::EchoRequest,
            Self::EchoReply => ScmpType::EchoReply,
            Self::TracerouteRequest => ScmpType::TracerouteRequest,
            Self::TracerouteReply => ScmpType::TracerouteReply,
            _ => ScmpType::ParameterProblem,
        }
    }

    /// The numeric value of the code within its type.
    pub const fn code(self) -> u8 {
        match self {
            Self::NoRoute => 0,
            Self::AdministrativelyDenied => 1,
            Self::BeyondScope => 2,
            Self::AddressUnreachable => 3,
            Self::PortUnreachable => 4,
            Self::FailedPolicy => 5,
            Self::RejectRoute => 6,
            Self::UnknownNextHeader => 1,
            Self::Unassigned => 2,
            Self::InvalidCommonHeader => 16,
            Self::UnknownVersion => 17,
            Self::FlowIdRequired => 18,
            Self::InvalidPacketSize => 19,
            Self::UnknownPathType => 20,
            Self::UnknownAddressFormat => 21,
            Self::InvalidAddressHeader => 32,
            Self::InvalidSourceAddress => 33,
            Self::InvalidDestinationAddress => 34,
            Self::NonLocalDelivery => 35,
            Self::InvalidPath => 48,
            Self::UnknownConsIngress => 49,
            Self::UnknownConsEgress => 50,
            Self::InvalidMac => 51,
            Self::PathExpired => 52,
            Self::InvalidSegmentChange => 53,
            Self::InvalidExtensionHeader => 64,
            Self::UnknownHopByHopOption => 65,
            Self::UnknownEndToEndOption => 66,
            _ => 0,
        }
    }
}

impl fmt::Display for ScmpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:'{}'",
            self.scmp_type().code(),
            self.code(),
            self.text()
        )
    }
}

/// Errors raised when decoding an SCMP message.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum ScmpDecodeError {
    #[error("SCMP message is truncated")]
    Truncated,
    #[error(transparent)]
    Unknown(#[from] UnknownScmpCode),
}

/// An SCMP echo request or reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmpEcho {
    /// Either [`ScmpCode::EchoRequest`] or [`ScmpCode::EchoReply`].
    pub code: ScmpCode,
    pub identifier: u16,
    pub sequence_number: u16,
    /// The data echoed back by the responder.
    pub data: Bytes,
}

impl ScmpEcho {
    /// Creates an echo request.
    pub fn request(identifier: u16, sequence_number: u16, data: Bytes) -> Self {
        Self {
            code: ScmpCode::EchoRequest,
            identifier,
            sequence_number,
            data,
        }
    }

    /// Creates the reply to this request, echoing its data.
    pub fn to_reply(&self) -> Self {
        Self {
            code: ScmpCode::EchoReply,
            ..self.clone()
        }
    }
}

/// An SCMP traceroute request or reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmpTraceroute {
    /// Either [`ScmpCode::TracerouteRequest`] or [`ScmpCode::TracerouteReply`].
    pub code: ScmpCode,
    pub identifier: u16,
    pub sequence_number: u16,
    /// The AS of the router that answered, zero in requests.
    pub isd_asn: IsdAsn,
    /// The interface of the router that answered, zero in requests.
    pub interface: u64,
}

impl ScmpTraceroute {
    /// Creates a traceroute request.
    pub fn request(identifier: u16, sequence_number: u16) -> Self {
        Self {
            code: ScmpCode::TracerouteRequest,
            identifier,
            sequence_number,
            isd_asn: IsdAsn(0),
            interface: 0,
        }
    }
}

/// A decoded SCMP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScmpMessage {
    Echo(ScmpEcho),
    Traceroute(ScmpTraceroute),
    /// An error or other message whose body is kept as-is.
    Other { code: ScmpCode, body: Bytes },
}

impl ScmpMessage {
    /// Length of the type, code and checksum fields.
    pub const HEADER_LENGTH: usize = 4;
    const ECHO_LENGTH: usize = 4;
    const TRACEROUTE_LENGTH: usize = 20;

    /// The type and code of the message.
    pub fn code(&self) -> ScmpCode {
        match self {
            Self::Echo(echo) => echo.code,
            Self::Traceroute(traceroute) => traceroute.code,
            Self::Other { code, .. } => *code,
        }
    }

    /// The identifier of echo and traceroute messages.
    pub fn identifier(&self) -> Option<u16> {
        match self {
            Self::Echo(echo) => Some(echo.identifier),
            Self::Traceroute(traceroute) => Some(traceroute.identifier),
            Self::Other { .. } => None,
        }
    }

    /// The sequence number of echo and traceroute messages.
    pub fn sequence_number(&self) -> Option<u16> {
        match self {
            Self::Echo(echo) => Some(echo.sequence_number),
            Self::Traceroute(traceroute) => Some(traceroute.sequence_number),
            Self::Other { .. } => None,
        }
    }
}

impl<T: Buf> WireDecode<T> for ScmpMessage {
    type Error = ScmpDecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        if data.remaining() < Self::HEADER_LENGTH {
            return Err(ScmpDecodeError::Truncated);
        }
        let scmp_type = data.get_u8();
        let code = ScmpCode::from_codes(scmp_type, data.get_u8())?;
        let _checksum = data.get_u16();

        match code {
            ScmpCode::EchoRequest | ScmpCode::EchoReply => {
                if data.remaining() < Self::ECHO_LENGTH {
                    return Err(ScmpDecodeError::Truncated);
                }
                Ok(Self::Echo(ScmpEcho {
                    code,
                    identifier: data.get_u16(),
                    sequence_number: data.get_u16(),
                    data: data.copy_to_bytes(data.remaining()),
                }))
            }
            ScmpCode::TracerouteRequest | ScmpCode::TracerouteReply => {
                if data.remaining() < Self::TRACEROUTE_LENGTH {
                    return Err(ScmpDecodeError::Truncated);
                }
                Ok(Self::Traceroute(ScmpTraceroute {
                    code,
                    identifier: data.get_u16(),
                    sequence_number: data.get_u16(),
                    isd_asn: IsdAsn(data.get_u64()),
                    interface: data.get_u64(),
                }))
            }
            code => Ok(Self::Other {
                code,
                body: data.copy_to_bytes(data.remaining()),
            }),
        }
    }
}

impl WireEncode for ScmpMessage {
    type Error = InadequateBufferSize;

    fn encoded_length(&self) -> usize {
        Self::HEADER_LENGTH
            + match self {
                Self::Echo(echo) => Self::ECHO_LENGTH + echo.data.len(),
                Self::Traceroute(_) => Self::TRACEROUTE_LENGTH,
                Self::Other { body, .. } => body.len(),
            }
    }

    /// Writes the message with a zero checksum.
    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        let code = self.code();
        buffer.put_u8(code.scmp_type().code());
        buffer.put_u8(code.code());
        buffer.put_u16(0);
        match self {
            Self::Echo(echo) => {
                buffer.put_u16(echo.identifier);
                buffer.put_u16(echo.sequence_number);
                buffer.put_slice(&echo.data);
            }
            Self::Traceroute(traceroute) => {
                buffer.put_u16(traceroute.identifier);
                buffer.put_u16(traceroute.sequence_number);
                buffer.put_u64(traceroute.isd_asn.0);
                buffer.put_u64(traceroute.interface);
            }
            Self::Other { body, .. } => buffer.put_slice(body),
        }
    }
}
