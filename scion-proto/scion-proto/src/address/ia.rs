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

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use super::{AddressKind, AddressParseError, Asn, Isd};

/// The combined ISD and AS identifier of a SCION AS.
///
/// The top 16 bits hold the [`Isd`], the remaining 48 bits the [`Asn`]. An identifier whose AS
/// bits are all zero is the wildcard for its ISD, i.e. "any (core) AS in this ISD".
///
/// # Examples
///
/// ```
/// # use scion_proto::address::{Asn, Isd, IsdAsn};
/// let ia: IsdAsn = "1-ff00:0:110".parse().unwrap();
/// assert_eq!(ia.isd(), Isd::new(1));
/// assert_eq!(ia.asn(), "ff00:0:110".parse::<Asn>().unwrap());
/// assert_eq!(ia.to_wildcard().to_string(), "1-0");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct IsdAsn(pub u64);

impl IsdAsn {
    /// The wildcard for both ISD and AS.
    pub const WILDCARD: Self = Self(0);

    /// Creates a new identifier from its ISD and AS components.
    pub const fn new(isd: Isd, asn: Asn) -> Self {
        Self(((isd.to_u16() as u64) << Asn::BITS) | asn.to_u64())
    }

    /// Returns the ISD component.
    pub const fn isd(&self) -> Isd {
        Isd::new((self.0 >> Asn::BITS) as u16)
    }

    /// Returns the AS component.
    pub const fn asn(&self) -> Asn {
        Asn::new(self.0)
    }

    /// Returns the wildcard identifier of this identifier's ISD (AS bits set to zero).
    pub const fn to_wildcard(&self) -> Self {
        Self((self.0 >> Asn::BITS) << Asn::BITS)
    }

    /// Returns true if the AS bits are all zero.
    pub const fn is_wildcard(&self) -> bool {
        self.asn().is_wildcard()
    }

    /// Returns the identifier as big-endian bytes, as it appears on the wire.
    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl Display for IsdAsn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.isd(), self.asn())
    }
}

impl FromStr for IsdAsn {
    type Err = AddressParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let (isd, asn) = string.split_once('-').ok_or(AddressKind::IsdAsn)?;
        let isd = Isd::from_str(isd).map_err(|_| AddressKind::IsdAsn)?;
        let asn = Asn::from_str(asn).map_err(|_| AddressKind::IsdAsn)?;
        Ok(Self::new(isd, asn))
    }
}

impl From<u64> for IsdAsn {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<IsdAsn> for u64 {
    fn from(value: IsdAsn) -> Self {
        value.0
    }
}

impl Serialize for IsdAsn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IsdAsn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parse;

    #[test]
    fn components() {
        let ia: IsdAsn = parse!("1-ff00:0:110");
        assert_eq!(ia.0, 0x0001_ff00_0000_0110);
        assert_eq!(ia.isd(), Isd::new(1));
        assert_eq!(ia.asn(), Asn::new(0xff00_0000_0110));
    }

    #[test]
    fn wildcard() {
        let ia: IsdAsn = parse!("64-2:0:9");
        assert!(!ia.is_wildcard());
        assert_eq!(ia.to_wildcard(), IsdAsn::new(Isd::new(64), Asn::WILDCARD));
        assert!(ia.to_wildcard().is_wildcard());
        assert_eq!(ia.to_wildcard().to_string(), "64-0");
    }

    #[test]
    fn display_round_trips() {
        for text in ["1-ff00:0:110", "64-2:0:9", "0-0", "65535-ffff:ffff:ffff", "71-20965"] {
            assert_eq!(text.parse::<IsdAsn>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn rejects_invalid() {
        for text in ["1", "1-", "-ff00:0:110", "1-ff00:0:110:1", "x-1", "1_ff00:0:110"] {
            assert_eq!(
                text.parse::<IsdAsn>(),
                Err(AddressParseError(AddressKind::IsdAsn)),
                "{text}"
            );
        }
    }

    #[test]
    fn serde_uses_text_form() {
        let ia: IsdAsn = parse!("1-ff00:0:111");
        let json = serde_json::to_string(&ia).unwrap();
        assert_eq!(json, "\"1-ff00:0:111\"");
        assert_eq!(serde_json::from_str::<IsdAsn>(&json).unwrap(), ia);
    }
}
