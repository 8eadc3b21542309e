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

use serde::{Deserialize, Serialize};

use super::{AddressKind, AddressParseError};

/// A 48-bit SCION autonomous system (AS) number.
///
/// AS numbers below 2^32 are written in decimal (BGP style), all others as three colon-separated
/// groups of 16-bit hexadecimal values, e.g. `ff00:0:110`.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Asn(u64);

impl Asn {
    /// The AS number representing the wildcard AS.
    pub const WILDCARD: Self = Self(0);

    /// The number of bits in a SCION AS number.
    pub const BITS: u32 = 48;

    /// The largest valid AS number.
    pub const MAX: Self = Self((1 << Self::BITS) - 1);

    const BGP_ASN_MAX: u64 = u32::MAX as u64;
    const GROUP_BITS: u32 = 16;
    const GROUP_MAX: u64 = (1 << Self::GROUP_BITS) - 1;

    /// Creates a new AS number, keeping only the lowest 48 bits of `id`.
    pub const fn new(id: u64) -> Self {
        Self(id & Self::MAX.0)
    }

    /// Returns the AS number as a `u64`.
    pub const fn to_u64(&self) -> u64 {
        self.0
    }

    /// Returns true for the wildcard AS number.
    pub const fn is_wildcard(&self) -> bool {
        self.0 == Self::WILDCARD.0
    }
}

impl Display for Asn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 <= Self::BGP_ASN_MAX {
            return write!(f, "{}", self.0);
        }
        write!(
            f,
            "{:x}:{:x}:{:x}",
            (self.0 >> (2 * Self::GROUP_BITS)) & Self::GROUP_MAX,
            (self.0 >> Self::GROUP_BITS) & Self::GROUP_MAX,
            self.0 & Self::GROUP_MAX,
        )
    }
}

impl FromStr for Asn {
    type Err = AddressParseError;

    fn from_str(asn_string: &str) -> Result<Self, Self::Err> {
        if !asn_string.contains(':') {
            return match u64::from_str(asn_string) {
                Ok(value) if value <= Self::BGP_ASN_MAX => Ok(Asn(value)),
                _ => Err(AddressKind::Asn.into()),
            };
        }

        let mut groups = asn_string.split(':');
        let mut value = 0u64;
        for _ in 0..3 {
            let group = groups.next().ok_or(AddressKind::Asn)?;
            if group.is_empty() || group.len() > 4 {
                return Err(AddressKind::Asn.into());
            }
            let group = u64::from_str_radix(group, 16).map_err(|_| AddressKind::Asn)?;
            value = (value << Self::GROUP_BITS) | group;
        }
        if groups.next().is_some() {
            return Err(AddressKind::Asn.into());
        }

        Ok(Asn(value))
    }
}

impl From<Asn> for u64 {
    fn from(value: Asn) -> Self {
        value.0
    }
}
