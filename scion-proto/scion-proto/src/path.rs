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

//! SCION path types.
//!
//! This module contains types for SCION paths and metadata as well as encoding and decoding
//! functions.
//!
//! # Organisation
//!
//! - [`Path`] is the path handed to sockets: raw path bytes, the destination and the underlay
//!   address of the first border router. [`RequestPath`] adds the [`Metadata`] computed while
//!   combining segments; [`ResponsePath`] adds the local address of the packet being answered.
//!
//! - [`StandardPath`] is a structured representation of the SCION path header that can be used
//!   to inspect or construct paths. [`reverse_in_place`] reverses a raw path for replies.
//!
//! - [`PathSegment`] and [`SegmentsResponse`] model the control-plane segments, which are combined
//!   into paths by the [`combinator`] and requested through [`lookup`].

use std::{fmt, net, ops::Deref, time::Duration};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::address::{IsdAsn, SocketAddr};

mod error;
pub use error::DataPlanePathErrorKind;

mod meta_header;
pub use meta_header::{HopFieldIndex, InfoFieldIndex, MetaHeader, MetaReserved, SegmentLength};

pub mod standard;
pub use standard::{HopField, InfoField, StandardPath, exp_time_to_duration, reverse_in_place};

pub mod segment;
pub use segment::*;

pub mod convert;

mod metadata;
pub use metadata::{Metadata, PathInterface, PathInterfaceParseError};

pub mod combinator;
pub use combinator::{CombinedPath, PathCombinationError};

pub mod lookup;
pub use lookup::{GetPathsError, LocalTopology, LookupError, SegmentLookup, get_paths};

/// A resolved end-to-end path to a destination socket.
///
/// The path is immutable. An expired path is replaced by requesting a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: Bytes,
    destination: SocketAddr,
    first_hop: net::SocketAddr,
}

impl Path {
    /// Creates a new path.
    ///
    /// For AS-local paths, `raw` is empty and `first_hop` is the destination itself.
    pub fn new(raw: Bytes, destination: SocketAddr, first_hop: net::SocketAddr) -> Self {
        Self {
            raw,
            destination,
            first_hop,
        }
    }

    /// The raw path header.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// The destination socket address.
    pub const fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// The ISD-AS of the destination.
    pub const fn destination_isd_as(&self) -> IsdAsn {
        self.destination.isd_asn()
    }

    /// The underlay address packets on this path are sent to.
    pub const fn first_hop(&self) -> net::SocketAddr {
        self.first_hop
    }

    /// Returns true if the path stays inside the local AS.
    pub fn is_local(&self) -> bool {
        self.raw.is_empty()
    }
}

impl AsRef<Path> for Path {
    fn as_ref(&self) -> &Path {
        self
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dst: {}, first hop: {}, path: {} bytes",
            self.destination,
            self.first_hop,
            self.raw.len()
        )
    }
}

/// A path obtained from a path lookup, used to send requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    path: Path,
    metadata: Metadata,
}

impl RequestPath {
    /// Creates a new request path.
    pub fn new(path: Path, metadata: Metadata) -> Self {
        Self { path, metadata }
    }

    /// Binds a combined path to a destination.
    ///
    /// A combined path without first hop is AS-local and sends directly to the destination.
    pub fn from_combined(combined: CombinedPath, destination: SocketAddr) -> Self {
        let first_hop = combined.first_hop.unwrap_or_else(|| destination.to_std());
        Self {
            path: Path::new(combined.raw, destination, first_hop),
            metadata: combined.metadata,
        }
    }

    /// The path without metadata.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The metadata of the path.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The MTU of the path.
    pub fn mtu(&self) -> u16 {
        self.metadata.mtu
    }

    /// The time at which the path expires.
    pub fn expiration(&self) -> DateTime<Utc> {
        self.metadata.expiration
    }

    /// The traversed interfaces, see [`Metadata::interfaces`].
    pub fn interfaces(&self) -> &[PathInterface] {
        &self.metadata.interfaces
    }

    /// Returns true if the path has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.metadata.expiration
    }

    /// Returns true if the path expires within `margin` of `now`.
    ///
    /// AS-local paths never expire.
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        !self.path.is_local() && now + margin >= self.metadata.expiration
    }
}

impl Deref for RequestPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for RequestPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, mtu: {}, expires: {}, interfaces: ",
            self.path, self.metadata.mtu, self.metadata.expiration
        )?;
        self.metadata.format_interfaces(f)
    }
}

/// A path extracted from a received packet, used to answer it.
///
/// The destination of the path is the sender of the packet, `local` is the address the packet was
/// sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePath {
    path: Path,
    local: SocketAddr,
}

impl ResponsePath {
    /// Creates a new response path.
    pub fn new(path: Path, local: SocketAddr) -> Self {
        Self { path, local }
    }

    /// The path without the local address.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The remote socket address, i.e., the sender of the packet being answered.
    pub const fn remote(&self) -> SocketAddr {
        self.path.destination
    }

    /// The local socket address the answered packet was sent to.
    pub const fn local(&self) -> SocketAddr {
        self.local
    }
}

impl Deref for ResponsePath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for ResponsePath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ResponsePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, local: {}", self.path, self.local)
    }
}
