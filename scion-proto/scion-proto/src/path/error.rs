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

//! Errors encountered when parsing SCION paths.

use std::fmt::Display;

#[non_exhaustive]
#[allow(missing_docs)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Error kinds for data plane paths.
pub enum DataPlanePathErrorKind {
    InvalidSegmentLengths,
    InfoFieldOutOfRange,
    HopFieldOutOfRange,
    TooManyHops,
}

impl Display for DataPlanePathErrorKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = match self {
            DataPlanePathErrorKind::InvalidSegmentLengths => {
                "the sequence of segment lengths are invalid"
            }
            DataPlanePathErrorKind::InfoFieldOutOfRange => {
                "the current info field index is too large"
            }
            DataPlanePathErrorKind::HopFieldOutOfRange => {
                "the current hop field index is outside the range of the current info field"
            }
            DataPlanePathErrorKind::TooManyHops => "a segment has more than 63 hop fields",
        };
        fmt.write_str(description)
    }
}
