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

//! SCION addresses for ISDs, ASes, hosts, and sockets.
//!
//! - An [`IsdAsn`] globally identifies an AS within the SCION network, and consists of an ISD
//!   identifier ([`Isd`]) and AS number ([`Asn`]).
//! - An [`EndhostAddr`] is an IPv4 or IPv6 host inside a given AS.
//! - A [`SocketAddr`] is an [`EndhostAddr`] with an associated UDP port.

mod asn;
pub use asn::Asn;

mod isd;
pub use isd::Isd;

mod ia;
pub use ia::IsdAsn;

mod endhost_address;
pub use endhost_address::EndhostAddr;

mod socket_address;
pub use socket_address::SocketAddr;

mod error;
pub use error::{AddressKind, AddressParseError};
