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

use std::{fmt::Display, net, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{AddressKind, AddressParseError, EndhostAddr, IsdAsn};

/// A SCION socket address: an [`EndhostAddr`] together with a UDP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
pub struct SocketAddr {
    endhost: EndhostAddr,
    port: u16,
}

impl SocketAddr {
    /// Creates a new socket address.
    pub const fn new(endhost: EndhostAddr, port: u16) -> Self {
        Self { endhost, port }
    }

    /// Creates a socket address from an ISD-AS and an IP socket address.
    pub const fn from_std(isd_asn: IsdAsn, addr: net::SocketAddr) -> Self {
        Self::new(EndhostAddr::new(isd_asn, addr.ip()), addr.port())
    }

    /// Returns the endhost address.
    pub const fn endhost(&self) -> EndhostAddr {
        self.endhost
    }

    /// Returns the ISD-AS number.
    pub const fn isd_asn(&self) -> IsdAsn {
        self.endhost.isd_asn()
    }

    /// Returns the host (IP) address.
    pub const fn local_address(&self) -> net::IpAddr {
        self.endhost.local_address()
    }

    /// Returns the port.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the IP socket address, dropping the ISD-AS.
    pub const fn to_std(&self) -> net::SocketAddr {
        net::SocketAddr::new(self.local_address(), self.port)
    }
}

impl Display for SocketAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.endhost, self.port)
    }
}

impl FromStr for SocketAddr {
    type Err = AddressParseError;

    /// Parses `[isd-as,ip]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (endhost, port) = s.rsplit_once("]:").ok_or(AddressKind::Socket)?;
        let endhost = format!("{endhost}]");
        Ok(Self {
            endhost: endhost.parse().map_err(|_| AddressKind::Socket)?,
            port: port.parse().map_err(|_| AddressKind::Socket)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parse;

    #[test]
    fn parse_and_display() {
        let addr: SocketAddr = parse!("[1-ff00:0:110,10.0.0.1]:8080");
        assert_eq!(addr.port(), 8080);
        assert_eq!(addr.to_std(), "10.0.0.1:8080".parse::<net::SocketAddr>().unwrap());
        assert_eq!(addr.to_string(), "[1-ff00:0:110,10.0.0.1]:8080");

        let addr: SocketAddr = parse!("[1-ff00:0:112,::1]:12345");
        assert_eq!(addr.local_address(), "::1".parse::<net::IpAddr>().unwrap());
        assert_eq!(addr.to_string(), "[1-ff00:0:112,::1]:12345");
    }

    #[test]
    fn rejects_invalid() {
        for text in ["[1-1,10.0.0.1]", "[1-1,10.0.0.1]:", "[1-1,10.0.0.1]:65536", "1-1:80"] {
            assert_eq!(
                text.parse::<SocketAddr>(),
                Err(AddressParseError(AddressKind::Socket)),
                "{text}"
            );
        }
    }
}
