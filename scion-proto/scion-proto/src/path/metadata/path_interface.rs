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

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::address::{AddressParseError, IsdAsn};

/// SCION interface with the AS's ISD-ASN and the interface's ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathInterface {
    /// The ISD-ASN of the AS where the interface is located
    pub isd_asn: IsdAsn,
    /// The AS-local interface ID
    pub id: u16,
}

impl PathInterface {
    /// Creates a new interface.
    pub const fn new(isd_asn: IsdAsn, id: u16) -> Self {
        Self { isd_asn, id }
    }
}

impl fmt::Display for PathInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.isd_asn, self.id)
    }
}

#[allow(missing_docs)]
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PathInterfaceParseError {
    #[error("invalid ISD-ASN")]
    IsdAsn(#[from] AddressParseError),
    #[error("invalid interface ID")]
    InterfaceId(#[from] std::num::ParseIntError),
    #[error("invalid delimiter, expected exactly one '#'")]
    Delimiter,
}

impl FromStr for PathInterface {
    type Err = PathInterfaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (isd_asn, id) = s
            .split_once('#')
            .ok_or(PathInterfaceParseError::Delimiter)?;
        Ok(PathInterface {
            isd_asn: isd_asn.parse()?,
            id: id.parse()?,
        })
    }
}
