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

use super::{AddressKind, AddressParseError, IsdAsn};

/// A SCION endhost address: the AS the host resides in and its IPv4 or IPv6 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
pub struct EndhostAddr {
    isd_asn: IsdAsn,
    host: net::IpAddr,
}

impl Display for EndhostAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.isd_asn, self.host)
    }
}

impl EndhostAddr {
    /// Creates a new SCION endhost address.
    pub const fn new(isd_asn: IsdAsn, host: net::IpAddr) -> Self {
        Self { isd_asn, host }
    }

    /// Returns the host (IP) address.
    pub const fn local_address(&self) -> net::IpAddr {
        self.host
    }

    /// Returns the ISD-AS number.
    pub const fn isd_asn(&self) -> IsdAsn {
        self.isd_asn
    }

    /// Returns the 2-bit address length code used in the common header.
    ///
    /// The encoded host address is `(code + 1) * 4` bytes long.
    pub const fn address_length_code(&self) -> u8 {
        match self.host {
            net::IpAddr::V4(_) => 0,
            net::IpAddr::V6(_) => 3,
        }
    }

    /// Returns the length of the encoded host address in bytes.
    pub const fn host_length(&self) -> usize {
        (self.address_length_code() as usize + 1) * 4
    }
}

impl AsRef<IsdAsn> for EndhostAddr {
    fn as_ref(&self) -> &IsdAsn {
        &self.isd_asn
    }
}

impl FromStr for EndhostAddr {
    type Err = AddressParseError;

    /// Parses `[isd-as,ip]`, the brackets are optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(s);
        let (isd_asn, host) = inner.split_once(',').ok_or(AddressKind::Host)?;
        Ok(Self {
            isd_asn: isd_asn.parse().map_err(|_| AddressKind::Host)?,
            host: host.parse().map_err(|_| AddressKind::Host)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parse;

    #[test]
    fn parse_and_display() {
        let addr: EndhostAddr = parse!("[1-ff00:0:110,10.0.0.1]");
        assert_eq!(addr.isd_asn(), parse!("1-ff00:0:110"));
        assert_eq!(addr.local_address(), "10.0.0.1".parse::<net::IpAddr>().unwrap());
        assert_eq!(addr.to_string(), "[1-ff00:0:110,10.0.0.1]");

        let addr: EndhostAddr = parse!("1-ff00:0:112,::1");
        assert_eq!(addr.to_string(), "[1-ff00:0:112,::1]");
    }

    #[test]
    fn length_codes() {
        let v4: EndhostAddr = parse!("[1-1,127.0.0.1]");
        let v6: EndhostAddr = parse!("[1-1,fd00::1]");
        assert_eq!((v4.address_length_code(), v4.host_length()), (0, 4));
        assert_eq!((v6.address_length_code(), v6.host_length()), (3, 16));
    }

    #[test]
    fn rejects_invalid() {
        for text in ["[1-1]", "[1-1,10.0.0.256]", "[,10.0.0.1]"] {
            assert_eq!(
                text.parse::<EndhostAddr>(),
                Err(AddressParseError(AddressKind::Host))
            );
        }
    }
}
