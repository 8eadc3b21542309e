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

//! Path lookup: requesting segments for a source and destination and combining them.
//!
//! The segments requested depend on where the source and destination are located:
//!
//! - both in the same AS: a single empty path;
//! - the destination is an ending AS of an up segment of the source: the up segment alone;
//! - both in the same ISD: up/core/down segments as needed, trying a direct lookup first;
//! - in different ISDs: up segments, core segments to the destination ISD, and down segments
//!   unless a core segment already ends at the destination.

use std::net;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{
    combinator::{
        CombinedPath, PathCombinationError, combine_one, combine_segments, contains_isd_as,
    },
    segment::SegmentsResponse,
};
use crate::address::IsdAsn;

/// gRPC status code for unknown errors.
pub const STATUS_UNKNOWN: i32 = 2;
/// gRPC status code for an unavailable service.
pub const STATUS_UNAVAILABLE: i32 = 14;

/// Bootstrap information about the local AS.
pub trait LocalTopology {
    /// The ISD-AS of the local AS.
    fn local_isd_as(&self) -> IsdAsn;
    /// The MTU inside the local AS.
    fn local_mtu(&self) -> u16;
    /// Whether the local AS is a core AS.
    fn is_local_as_core(&self) -> bool;
    /// The underlay address of the border router owning `interface`.
    fn border_router_address(&self, interface: u16) -> Option<net::SocketAddr>;
}

/// Access to the path segments of a path lookup service.
pub trait SegmentLookup {
    /// Requests the segments between `src` and `dst`; either may be a wildcard.
    fn segments(&self, src: IsdAsn, dst: IsdAsn) -> Result<SegmentsResponse, LookupError>;
}

/// Failure of the path lookup service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown src/dst ISD-AS: {src} / {dst}")]
    UnknownIsdAs { src: IsdAsn, dst: IsdAsn },
    #[error("cannot connect to SCION network")]
    Unavailable,
    #[error("error while getting segment info: {0}")]
    Other(String),
}

impl LookupError {
    /// Maps a failed lookup RPC with the given status code and message.
    pub fn from_status(code: i32, message: &str, src: IsdAsn, dst: IsdAsn) -> Self {
        match code {
            STATUS_UNKNOWN if message.contains("TRC not found") => Self::UnknownIsdAs { src, dst },
            STATUS_UNAVAILABLE => Self::Unavailable,
            _ => Self::Other(message.to_owned()),
        }
    }
}

/// Error returned by [`get_paths`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GetPathsError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Combination(#[from] PathCombinationError),
}

/// Returns all paths from `src` to `dst`.
///
/// An empty result is not an error: it means that the segments did not combine into a path.
#[tracing::instrument(skip(lookup, topology, now))]
pub fn get_paths<L, T>(
    lookup: &L,
    topology: &T,
    src: IsdAsn,
    dst: IsdAsn,
    now: DateTime<Utc>,
) -> Result<Vec<CombinedPath>, GetPathsError>
where
    L: SegmentLookup + ?Sized,
    T: LocalTopology + ?Sized,
{
    if src == dst {
        return Ok(vec![CombinedPath::local(topology.local_mtu(), now)]);
    }

    let src_wildcard = src.to_wildcard();
    let dst_wildcard = dst.to_wildcard();
    let mut from = src;
    let mut segments = Vec::with_capacity(3);

    if !topology.is_local_as_core() {
        let up = get_segments(lookup, src, src_wildcard)?;
        if contains_isd_as(&up, src, dst)?.1 {
            return Ok(combine_one(&up, src, topology)?);
        }
        segments.push(up);
        from = src_wildcard;
    }

    if src.isd() == dst.isd() {
        let direct = get_segments(lookup, from, dst)?;
        if !direct.is_empty() {
            segments.push(direct);
            let paths = combine_segments(&segments, src, dst, topology)?;
            if !paths.is_empty() {
                return Ok(paths);
            }
            let direct = segments.pop();
            segments.push(get_segments(lookup, from, dst_wildcard)?);
            segments.extend(direct);
            return Ok(combine_segments(&segments, src, dst, topology)?);
        }

        let core = get_segments(lookup, from, dst_wildcard)?;
        let reaches_dst = contains_isd_as(&core, from, dst)?.1;
        segments.push(core);
        if !reaches_dst {
            segments.push(get_segments(lookup, dst_wildcard, dst)?);
        }
        return Ok(combine_segments(&segments, src, dst, topology)?);
    }

    let core = get_segments(lookup, from, dst_wildcard)?;
    let reaches_dst = contains_isd_as(&core, src, dst)?.1;
    segments.push(core);
    if !reaches_dst {
        segments.push(get_segments(lookup, dst_wildcard, dst)?);
    }
    Ok(combine_segments(&segments, src, dst, topology)?)
}

/// Requests the segments between `src` and `dst`.
///
/// Returns an empty response without a request if both are the same non-wildcard IA.
pub fn get_segments<L>(
    lookup: &L,
    src: IsdAsn,
    dst: IsdAsn,
) -> Result<SegmentsResponse, GetPathsError>
where
    L: SegmentLookup + ?Sized,
{
    tracing::info!(%src, %dst, "Requesting segments");
    if src == dst && !src.is_wildcard() {
        return Ok(SegmentsResponse::default());
    }
    let response = lookup.segments(src, dst)?;
    if response.collections.len() > 1 {
        return Err(PathCombinationError::MultipleSegmentCollections.into());
    }
    tracing::debug!(%src, %dst, segments = response.segments().count(), "Received segments");
    Ok(response)
}
