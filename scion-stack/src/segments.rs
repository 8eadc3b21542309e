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

//! A local store of path segments.
//!
//! [`SegmentStore`] answers segment lookups from segments registered in memory, loaded from a
//! JSON file or decoded from encoded control-plane responses. It stands in for the path lookup
//! service where no control service is reachable, e.g. in tests and offline tools.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use scion_proto::{
    address::IsdAsn,
    path::{
        LookupError, PathSegment, SegmentLookup, SegmentsResponse, convert::InvalidSegmentError,
    },
    proto::SegmentType,
};
use serde::Deserialize;
use tracing::{debug, trace};

/// Errors while loading segments.
#[derive(Debug, thiserror::Error)]
pub enum SegmentStoreError {
    /// The segment file cannot be read.
    #[error("cannot read segment file: {0}")]
    Io(#[from] std::io::Error),
    /// The segment file is not valid JSON.
    #[error("invalid segment file: {0}")]
    Json(#[from] serde_json::Error),
    /// An encoded response cannot be decoded.
    #[error(transparent)]
    InvalidSegment(#[from] InvalidSegmentError),
}

/// Segment type as written in segment files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Up segment.
    Up,
    /// Down segment.
    Down,
    /// Core segment.
    Core,
}

impl From<SegmentKind> for SegmentType {
    fn from(kind: SegmentKind) -> Self {
        match kind {
            SegmentKind::Up => SegmentType::Up,
            SegmentKind::Down => SegmentType::Down,
            SegmentKind::Core => SegmentType::Core,
        }
    }
}

/// One lookup answer in a segment file.
#[derive(Debug, Deserialize)]
struct SegmentFileEntry {
    src: IsdAsn,
    dst: IsdAsn,
    #[serde(rename = "type")]
    kind: SegmentKind,
    segments: Vec<PathSegment>,
}

type StoredResponse = Result<SegmentsResponse, LookupError>;

/// In-memory segment lookup keyed by source and destination ISD-AS.
///
/// Lookups for pairs without registered segments return an empty response.
#[derive(Debug, Default)]
pub struct SegmentStore {
    responses: RwLock<HashMap<(IsdAsn, IsdAsn), StoredResponse>>,
}

impl SegmentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the response for lookups from `src` to `dst`, replacing any previous one.
    pub fn insert(&self, src: IsdAsn, dst: IsdAsn, response: SegmentsResponse) {
        self.set(src, dst, Ok(response));
    }

    /// Makes lookups from `src` to `dst` fail with `error`.
    pub fn insert_error(&self, src: IsdAsn, dst: IsdAsn, error: LookupError) {
        self.set(src, dst, Err(error));
    }

    /// Registers an encoded control-plane response for lookups from `src` to `dst`.
    pub fn insert_proto(
        &self,
        src: IsdAsn,
        dst: IsdAsn,
        encoded: &[u8],
    ) -> Result<(), SegmentStoreError> {
        let response = SegmentsResponse::decode_proto(encoded)?;
        self.insert(src, dst, response);
        Ok(())
    }

    /// Loads a JSON segment file.
    ///
    /// The file holds a list of `{"src", "dst", "type", "segments"}` objects. Entries with the
    /// same source and destination are merged into one response.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, SegmentStoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses the content of a JSON segment file, see [`Self::from_json_file`].
    pub fn from_json(content: &str) -> Result<Self, SegmentStoreError> {
        let entries: Vec<SegmentFileEntry> = serde_json::from_str(content)?;
        let mut responses: HashMap<(IsdAsn, IsdAsn), StoredResponse> = HashMap::new();
        for entry in entries {
            let response = responses
                .entry((entry.src, entry.dst))
                .or_insert_with(|| Ok(SegmentsResponse::default()));
            if let Ok(response) = response {
                response
                    .collections
                    .push((entry.kind.into(), entry.segments));
            }
        }
        debug!(pairs = responses.len(), "Loaded segment file");
        Ok(Self {
            responses: RwLock::new(responses),
        })
    }

    /// Returns the number of registered source/destination pairs.
    pub fn len(&self) -> usize {
        self.responses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no responses are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set(&self, src: IsdAsn, dst: IsdAsn, response: StoredResponse) {
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((src, dst), response);
    }
}

impl SegmentLookup for SegmentStore {
    fn segments(&self, src: IsdAsn, dst: IsdAsn) -> Result<SegmentsResponse, LookupError> {
        let responses = self.responses.read().unwrap_or_else(PoisonError::into_inner);
        match responses.get(&(src, dst)) {
            Some(response) => response.clone(),
            None => {
                trace!(%src, %dst, "No segments registered");
                Ok(SegmentsResponse::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use scion_proto::{
        path::{AsEntry, HopEntry, SegmentHopField, SignedMessage},
        proto,
    };

    use super::*;

    fn ia(s: &str) -> IsdAsn {
        s.parse().unwrap()
    }

    fn segment() -> PathSegment {
        let entry = |local: &str, next: IsdAsn, ingress, egress| AsEntry {
            local: ia(local),
            next,
            mtu: 1472,
            hop_entry: HopEntry {
                ingress_mtu: 1280,
                hop_field: SegmentHopField {
                    exp_time: 63,
                    cons_ingress: ingress,
                    cons_egress: egress,
                    mac: [1, 2, 3, 4, 5, 6],
                },
            },
            peer_entries: vec![],
            signed: Some(SignedMessage {
                header_and_body: vec![1],
                signature: vec![2],
            }),
        };
        PathSegment::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            7,
            vec![
                entry("1-ff00:0:110", ia("1-ff00:0:111"), 0, 1),
                entry("1-ff00:0:111", IsdAsn::WILDCARD, 41, 0),
            ],
        )
    }

    #[test]
    fn unknown_pair_is_empty() {
        let store = SegmentStore::new();
        assert!(store.is_empty());
        let response = store
            .segments(ia("1-ff00:0:111"), ia("1-0"))
            .unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn insert_and_lookup() {
        let store = SegmentStore::new();
        let response = SegmentsResponse::new(SegmentType::Up, vec![segment()]);
        store.insert(ia("1-ff00:0:111"), ia("1-0"), response.clone());
        assert_eq!(store.segments(ia("1-ff00:0:111"), ia("1-0")), Ok(response));
        assert!(store.segments(ia("1-0"), ia("1-ff00:0:111")).unwrap().is_empty());
    }

    #[test]
    fn stored_error() {
        let store = SegmentStore::new();
        store.insert_error(ia("1-ff00:0:111"), ia("1-0"), LookupError::Unavailable);
        assert_eq!(
            store.segments(ia("1-ff00:0:111"), ia("1-0")),
            Err(LookupError::Unavailable)
        );
    }

    #[test]
    fn encoded_response() {
        use prost::Message;

        let mut unsigned = segment();
        for entry in &mut unsigned.as_entries {
            entry.signed = None;
        }
        let response = SegmentsResponse::new(SegmentType::Core, vec![unsigned]);
        let encoded = proto::SegmentsResponse::from(response).encode_to_vec();
        let store = SegmentStore::new();
        store
            .insert_proto(ia("1-ff00:0:110"), ia("1-ff00:0:111"), &encoded)
            .unwrap();

        let decoded = store
            .segments(ia("1-ff00:0:110"), ia("1-ff00:0:111"))
            .unwrap();
        let segment = decoded.segments().next().unwrap();
        assert_eq!(segment.first_ia(), Some(ia("1-ff00:0:110")));
        assert_eq!(segment.last_ia(), Some(ia("1-ff00:0:111")));
        assert!(segment.is_signed());
        assert!(matches!(
            store.insert_proto(ia("1-ff00:0:110"), ia("1-0"), &[0xff, 0xff]),
            Err(SegmentStoreError::InvalidSegment(_))
        ));
    }

    #[test]
    fn json_file() {
        let segments = serde_json::to_value(vec![segment()]).unwrap();
        let content = serde_json::json!([
            {"src": "1-ff00:0:111", "dst": "1-0", "type": "up", "segments": segments},
            {"src": "1-ff00:0:111", "dst": "1-0", "type": "core", "segments": []},
        ])
        .to_string();
        let store = SegmentStore::from_json(&content).unwrap();
        assert_eq!(store.len(), 1);
        let response = store.segments(ia("1-ff00:0:111"), ia("1-0")).unwrap();
        assert_eq!(response.collections.len(), 2);
        assert_eq!(response.collections[0].0, SegmentType::Up);
        assert_eq!(response.segments().count(), 1);
    }
}
