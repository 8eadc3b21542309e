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

//! Errors raised when encoding or decoding SCION packets.

use crate::path::DataPlanePathErrorKind;

/// Errors raised when failing to decode SCION headers or one of their constituents.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum DecodeError {
    #[error("the provided bytes did not include the full packet")]
    PacketEmptyOrTruncated,
    #[error("the path type and length do not correspond")]
    InconsistentPathLength,
    #[error("unsupported host address type/length {0:#06b}")]
    UnsupportedAddressInfo(u8),
    #[error("invalid path header: {0}")]
    InvalidPath(DataPlanePathErrorKind),
}

impl From<DataPlanePathErrorKind> for DecodeError {
    fn from(value: DataPlanePathErrorKind) -> Self {
        Self::InvalidPath(value)
    }
}

/// Errors raised when failing to encode a SCION packet.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum EncodeError {
    /// The payload is too large to be properly encoded in a SCION packet.
    #[error("packet payload is too large")]
    PayloadTooLarge,
    /// The overall header is too large.
    ///
    /// This is most likely due to a too long path.
    #[error("packet header is too large")]
    HeaderTooLarge,
    /// The output buffer cannot hold the packet.
    #[error(transparent)]
    InadequateBufferSize(#[from] InadequateBufferSize),
}

/// Raised if the buffer does not have sufficient capacity for encoding the SCION headers.
///
/// As the headers can be a maximum of 1020 bytes in length, it is advisable to have at
/// least that amount of remaining space plus the payload length.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy, Default)]
#[error("the provided buffer did not have sufficient size")]
pub struct InadequateBufferSize;
