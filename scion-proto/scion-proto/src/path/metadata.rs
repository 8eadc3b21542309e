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

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod path_interface;
pub use path_interface::{PathInterface, PathInterfaceParseError};

/// Metadata of a path computed while combining its segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// The MTU of the path, the minimum over all traversed ASes and the local AS.
    pub mtu: u16,
    /// The time at which the first hop field of the path expires.
    pub expiration: DateTime<Utc>,
    /// The traversed inter-AS interfaces in order of traversal.
    pub interfaces: Vec<PathInterface>,
}

impl Metadata {
    /// Writes the interfaces as `ia#id>ia#id ...`, pairing egress and ingress of each link.
    pub fn format_interfaces(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interfaces.is_empty() {
            return write!(f, "<local>");
        }
        for (i, pair) in self.interfaces.chunks(2).enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match pair {
                [egress, ingress] => write!(f, "{egress}>{ingress}")?,
                [single] => write!(f, "{single}")?,
                _ => {}
            }
        }
        Ok(())
    }
}
