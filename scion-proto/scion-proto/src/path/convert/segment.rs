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

//! Conversion between path segment model and protobuf.

use prost::Message;

use crate::{
    path::{
        AsEntry, HopEntry, Info, PathSegment, PeerEntry, SegmentHopField, SegmentsResponse,
        SignedMessage,
    },
    proto,
};

/// Invalid segment error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid segment: {0}")]
pub struct InvalidSegmentError(pub &'static str);

impl From<&'static str> for InvalidSegmentError {
    fn from(value: &'static str) -> Self {
        InvalidSegmentError(value)
    }
}

impl SegmentsResponse {
    /// Decodes an encoded [`proto::SegmentsResponse`].
    pub fn decode_proto(data: &[u8]) -> Result<Self, InvalidSegmentError> {
        proto::SegmentsResponse::decode(data)
            .map_err(|_| "failed to decode segments response")?
            .try_into()
    }
}

// Protobuf to Model
//

impl TryFrom<proto::SegmentsResponse> for SegmentsResponse {
    type Error = InvalidSegmentError;

    fn try_from(value: proto::SegmentsResponse) -> Result<Self, Self::Error> {
        let mut collections = Vec::with_capacity(value.segments.len());
        for (segment_type, segments) in value.segments {
            let segment_type = match proto::SegmentType::try_from(segment_type) {
                Ok(t) => t,
                Err(err) => {
                    tracing::debug!(?err, "invalid segment type in SegmentsResponse, skipping...");
                    continue;
                }
            };
            let segments = segments
                .segments
                .into_iter()
                .map(PathSegment::try_from)
                .collect::<Result<_, _>>()?;
            collections.push((segment_type, segments));
        }
        collections.sort_by_key(|(segment_type, _)| *segment_type);
        Ok(Self { collections })
    }
}

impl TryFrom<proto::PathSegment> for PathSegment {
    type Error = InvalidSegmentError;

    fn try_from(segment: proto::PathSegment) -> Result<Self, Self::Error> {
        let segment_info = proto::SegmentInformation::decode(segment.segment_info.as_slice())
            .map_err(|_| "failed to decode segment info")?;

        Ok(Self {
            info: segment_info.try_into()?,
            as_entries: segment
                .as_entries
                .into_iter()
                .map(AsEntry::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<proto::SegmentInformation> for Info {
    type Error = InvalidSegmentError;

    fn try_from(info: proto::SegmentInformation) -> Result<Self, Self::Error> {
        if u32::try_from(info.timestamp).is_err() {
            return Err("timestamp in segment info out of range".into());
        }
        let timestamp = chrono::DateTime::from_timestamp(info.timestamp, 0)
            .ok_or("invalid timestamp in segment info")?;
        let segment_id =
            u16::try_from(info.segment_id).map_err(|_| "segment ID does not fit 16 bits")?;
        Ok(Info {
            timestamp,
            segment_id,
        })
    }
}

impl TryFrom<proto::AsEntry> for AsEntry {
    type Error = InvalidSegmentError;

    fn try_from(entry: proto::AsEntry) -> Result<Self, Self::Error> {
        let signed = entry.signed.ok_or("missing signed message")?;
        let header_and_body =
            proto::HeaderAndBodyInternal::decode(signed.header_and_body.as_slice())
                .map_err(|_| "failed to decode signed header and body")?;
        let body = proto::AsEntrySignedBody::decode(header_and_body.body.as_slice())
            .map_err(|_| "failed to decode AsEntrySignedBody")?;

        Ok(AsEntry {
            local: body.isd_as.into(),
            next: body.next_isd_as.into(),
            mtu: body.mtu,
            hop_entry: body.hop_entry.ok_or("missing hop entry")?.try_into()?,
            peer_entries: body
                .peer_entries
                .into_iter()
                .map(TryFrom::try_from)
                .collect::<Result<_, _>>()?,
            signed: Some(SignedMessage {
                header_and_body: signed.header_and_body,
                signature: signed.signature,
            }),
        })
    }
}

impl TryFrom<proto::PeerEntry> for PeerEntry {
    type Error = InvalidSegmentError;

    fn try_from(entry: proto::PeerEntry) -> Result<Self, Self::Error> {
        Ok(PeerEntry {
            peer: entry.peer_isd_as.into(),
            peer_interface: u16::try_from(entry.peer_interface)
                .map_err(|_| "peer interface ID out of range")?,
            peer_mtu: entry.peer_mtu as u16,
            hop_field: entry
                .hop_field
                .ok_or("missing hop field in peer entry")?
                .try_into()?,
        })
    }
}

impl TryFrom<proto::HopEntry> for HopEntry {
    type Error = InvalidSegmentError;

    fn try_from(entry: proto::HopEntry) -> Result<Self, Self::Error> {
        Ok(HopEntry {
            ingress_mtu: entry.ingress_mtu as u16,
            hop_field: entry
                .hop_field
                .ok_or("missing hop field in hop entry")?
                .try_into()?,
        })
    }
}

impl TryFrom<proto::HopField> for SegmentHopField {
    type Error = InvalidSegmentError;

    fn try_from(hop_field: proto::HopField) -> Result<Self, Self::Error> {
        Ok(SegmentHopField {
            exp_time: u8::try_from(hop_field.exp_time).map_err(|_| "expiry time out of range")?,
            cons_ingress: u16::try_from(hop_field.ingress)
                .map_err(|_| "ingress interface ID out of range")?,
            cons_egress: u16::try_from(hop_field.egress)
                .map_err(|_| "egress interface ID out of range")?,
            mac: hop_field
                .mac
                .get(..6)
                .and_then(|mac| mac.try_into().ok())
                .ok_or("invalid MAC length")?,
        })
    }
}

// Model to Protobuf
//

impl From<SegmentsResponse> for proto::SegmentsResponse {
    fn from(value: SegmentsResponse) -> Self {
        Self {
            segments: value
                .collections
                .into_iter()
                .map(|(segment_type, segments)| {
                    let segments = segments.into_iter().map(Into::into).collect();
                    (segment_type as i32, proto::Segments { segments })
                })
                .collect(),
        }
    }
}

impl From<PathSegment> for proto::PathSegment {
    fn from(value: PathSegment) -> Self {
        Self {
            segment_info: proto::SegmentInformation {
                timestamp: value.info.timestamp.timestamp(),
                segment_id: value.info.segment_id.into(),
            }
            .encode_to_vec(),
            as_entries: value.as_entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Entries without a signed message are encoded with an empty signature so that they can be
/// decoded again; such entries do not pass signature verification.
impl From<AsEntry> for proto::AsEntry {
    fn from(entry: AsEntry) -> Self {
        let signed = match entry.signed {
            Some(signed) => signed,
            None => SignedMessage {
                header_and_body: proto::HeaderAndBodyInternal {
                    header: Vec::new(),
                    body: proto::AsEntrySignedBody {
                        isd_as: entry.local.into(),
                        next_isd_as: entry.next.into(),
                        mtu: entry.mtu,
                        hop_entry: Some(entry.hop_entry.into()),
                        peer_entries: entry.peer_entries.into_iter().map(Into::into).collect(),
                    }
                    .encode_to_vec(),
                }
                .encode_to_vec(),
                signature: Vec::new(),
            },
        };
        Self {
            signed: Some(proto::SignedMessage {
                header_and_body: signed.header_and_body,
                signature: signed.signature,
            }),
        }
    }
}

impl From<HopEntry> for proto::HopEntry {
    fn from(entry: HopEntry) -> Self {
        Self {
            ingress_mtu: entry.ingress_mtu.into(),
            hop_field: Some(entry.hop_field.into()),
        }
    }
}

impl From<PeerEntry> for proto::PeerEntry {
    fn from(entry: PeerEntry) -> Self {
        Self {
            peer_isd_as: entry.peer.into(),
            peer_interface: entry.peer_interface.into(),
            peer_mtu: entry.peer_mtu.into(),
            hop_field: Some(entry.hop_field.into()),
        }
    }
}

impl From<SegmentHopField> for proto::HopField {
    fn from(hop_field: SegmentHopField) -> Self {
        Self {
            exp_time: hop_field.exp_time.into(),
            ingress: hop_field.cons_ingress.into(),
            egress: hop_field.cons_egress.into(),
            mac: hop_field.mac.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::{address::IsdAsn, test_utils::parse};

    fn segment() -> PathSegment {
        let entry = |local: &str, next: IsdAsn, ingress: u16, egress: u16| AsEntry {
            local: local.parse().unwrap(),
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
            signed: None,
        };
        PathSegment::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            31466,
            vec![
                entry("1-ff00:0:110", parse!("1-ff00:0:111"), 0, 1),
                entry("1-ff00:0:111", IsdAsn::WILDCARD, 41, 0),
            ],
        )
    }

    #[test]
    fn response_survives_protobuf_encoding() {
        let response = SegmentsResponse::new(proto::SegmentType::Up, vec![segment()]);
        let encoded = proto::SegmentsResponse::from(response.clone()).encode_to_vec();
        let decoded = SegmentsResponse::decode_proto(&encoded).unwrap();

        assert_eq!(decoded.collections.len(), 1);
        let (segment_type, segments) = &decoded.collections[0];
        assert_eq!(*segment_type, proto::SegmentType::Up);
        let decoded_segment = &segments[0];
        assert_eq!(decoded_segment.info, segment().info);
        assert!(decoded_segment.is_signed());
        for (decoded, original) in decoded_segment.as_entries.iter().zip(&segment().as_entries) {
            assert_eq!(decoded.local, original.local);
            assert_eq!(decoded.next, original.next);
            assert_eq!(decoded.hop_entry, original.hop_entry);
        }
    }

    #[test]
    fn rejects_unsigned_entry() {
        let segment = proto::PathSegment {
            segment_info: proto::SegmentInformation {
                timestamp: 1,
                segment_id: 1,
            }
            .encode_to_vec(),
            as_entries: vec![proto::AsEntry { signed: None }],
        };
        assert_eq!(
            PathSegment::try_from(segment),
            Err(InvalidSegmentError("missing signed message"))
        );
    }

    #[test]
    fn rejects_short_mac() {
        let hop_field = proto::HopField {
            ingress: 1,
            egress: 2,
            exp_time: 3,
            mac: vec![1, 2, 3],
        };
        assert_eq!(
            SegmentHopField::try_from(hop_field),
            Err(InvalidSegmentError("invalid MAC length"))
        );
    }

    #[test]
    fn skips_unknown_segment_types() {
        let mut response = proto::SegmentsResponse::default();
        response
            .segments
            .insert(42, proto::Segments { segments: vec![] });
        let decoded = SegmentsResponse::try_from(response).unwrap();
        assert!(decoded.collections.is_empty());
    }
}
