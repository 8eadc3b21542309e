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

//! Property tests for the SCION header and standard path codecs.
//!
//! 1. Valid address headers and standard paths roundtrip through encode/decode
//! 2. Any 12 bytes decode to a common header that encodes back to the same bytes
//! 3. Reversing a valid path twice restores the original bytes, and the reversed path equals the
//!    structurally reversed one

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use proptest::{
    collection::vec,
    prelude::{BoxedStrategy, ProptestConfig, Strategy, any},
    prop_assert, prop_assert_eq, prop_oneof, proptest,
};
use scion_proto::{
    address::IsdAsn,
    packet::{
        AddressHeader, AddressInfo, ByEndpoint, CommonHeader, DecodeError, read_headers,
        write_headers,
    },
    path::{
        HopField, HopFieldIndex, InfoField, InfoFieldIndex, MetaHeader, MetaReserved,
        StandardPath, reverse_in_place,
    },
    wire_encoding::{WireDecode, WireEncode},
};

fn host() -> BoxedStrategy<IpAddr> {
    prop_oneof![
        any::<[u8; 4]>().prop_map(|octets| IpAddr::V4(Ipv4Addr::from(octets))),
        any::<[u8; 16]>().prop_map(|octets| IpAddr::V6(Ipv6Addr::from(octets))),
    ]
    .boxed()
}

fn address_header() -> BoxedStrategy<AddressHeader> {
    (any::<u64>(), any::<u64>(), host(), host())
        .prop_map(|(src_ia, dst_ia, src_host, dst_host)| AddressHeader {
            ia: ByEndpoint {
                source: IsdAsn(src_ia),
                destination: IsdAsn(dst_ia),
            },
            host: ByEndpoint {
                source: src_host,
                destination: dst_host,
            },
        })
        .boxed()
}

fn info_field() -> BoxedStrategy<InfoField> {
    (any::<bool>(), any::<bool>(), any::<u16>(), any::<u32>())
        .prop_map(|(peer, cons_dir, seg_id, timestamp_epoch)| InfoField {
            peer,
            cons_dir,
            seg_id,
            timestamp_epoch,
        })
        .boxed()
}

fn hop_field() -> BoxedStrategy<HopField> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<u8>(),
        any::<u16>(),
        any::<u16>(),
        any::<[u8; 6]>(),
    )
        .prop_map(
            |(ingress_router_alert, egress_router_alert, exp_time, cons_ingress, cons_egress, mac)| {
                HopField {
                    ingress_router_alert,
                    egress_router_alert,
                    exp_time,
                    cons_ingress,
                    cons_egress,
                    mac,
                }
            },
        )
        .boxed()
}

/// Valid standard paths of one to three segments with 1 to 63 hops each, positioned at the start.
fn standard_path() -> BoxedStrategy<StandardPath> {
    vec(1usize..=63, 1..=3)
        .prop_flat_map(|lengths| {
            lengths
                .into_iter()
                .map(|length| (info_field(), vec(hop_field(), length)))
                .collect::<Vec<_>>()
        })
        .prop_map(|segments| {
            let mut path = StandardPath::new();
            for (info, hops) in segments {
                path.add_segment(info, hops)
                    .expect("segment lengths are within bounds");
            }
            path
        })
        .boxed()
}

/// Valid standard paths with the current hop at an arbitrary position.
fn positioned_path() -> BoxedStrategy<StandardPath> {
    (standard_path(), any::<proptest::sample::Index>(), 0u8..64)
        .prop_map(|(mut path, hop, reserved)| {
            let hop = hop.index(path.hop_fields.len());
            let mut info = 0;
            let mut end = 0;
            for (index, length) in path.path_meta.segment_lengths.iter().enumerate() {
                end += length.length();
                if hop < end {
                    info = index;
                    break;
                }
            }
            path.path_meta.current_hop_field = HopFieldIndex::new_truncated(hop as u8);
            path.path_meta.current_info_field = InfoFieldIndex::new_truncated(info as u8);
            path.path_meta.reserved = MetaReserved::new_truncated(reserved);
            path
        })
        .boxed()
}

#[test]
fn address_headers_roundtrip() {
    proptest!(
        ProptestConfig::with_cases(2_000),
        |(address in address_header(), path_length in 0usize..240, payload in 0usize..1024)| {
            let path_length = path_length * 4;
            let mut buffer = Vec::new();
            let common = write_headers(
                &mut buffer,
                payload,
                path_length,
                address.source(),
                address.destination(),
            )
            .unwrap();
            prop_assert_eq!(buffer.len(), CommonHeader::LENGTH + address.encoded_length());

            let (decoded_common, decoded_address, consumed) = read_headers(&buffer).unwrap();
            prop_assert_eq!(consumed, buffer.len());
            prop_assert_eq!(decoded_common.path_length(), Some(path_length));
            prop_assert_eq!(&decoded_common, &common);
            prop_assert_eq!(decoded_address, address);
        }
    );
}

#[test]
fn non_ip_address_types_are_rejected() {
    proptest!(
        ProptestConfig::with_cases(1_000),
        |(dst in 0u8..16, src in 0u8..16, bytes in vec(any::<u8>(), 48))| {
            let info = ByEndpoint {
                source: AddressInfo::new_truncated(src),
                destination: AddressInfo::new_truncated(dst),
            };
            let result = AddressHeader::decode(&mut bytes.as_slice(), info);
            if info.destination.is_ip() && info.source.is_ip() {
                prop_assert!(result.is_ok());
            } else {
                let unsupported = if info.destination.is_ip() { src } else { dst };
                prop_assert_eq!(result, Err(DecodeError::UnsupportedAddressInfo(unsupported)));
            }
        }
    );
}

#[test]
fn common_header_bytes_roundtrip() {
    proptest!(
        ProptestConfig::with_cases(2_000),
        |(bytes in any::<[u8; 12]>())| {
            let header = CommonHeader::decode(&mut bytes.as_slice()).unwrap();
            let encoded = header.encode_to_bytes();
            prop_assert_eq!(encoded.as_ref(), bytes.as_slice());
        }
    );
}

#[test]
fn standard_paths_roundtrip() {
    proptest!(
        ProptestConfig::with_cases(2_000),
        |(path in positioned_path())| {
            let raw = path.encode_to_bytes();
            prop_assert_eq!(raw.len(), path.path_meta.encoded_path_length());
            prop_assert_eq!(StandardPath::decode_raw(&raw).unwrap(), path);
        }
    );
}

#[test]
fn reversing_twice_restores_the_path() {
    proptest!(
        ProptestConfig::with_cases(2_000),
        |(path in standard_path())| {
            let original = path.encode_to_bytes();
            let mut raw = original.to_vec();

            reverse_in_place(&mut raw).unwrap();
            let reversed = StandardPath::decode_raw(&raw).unwrap();
            prop_assert_eq!(&reversed.path_meta, &path.path_meta.to_reversed());
            prop_assert_eq!(&reversed, &path.to_reversed());
            prop_assert_eq!(
                MetaHeader::decode(&mut &raw[..]).unwrap(),
                path.path_meta.to_reversed()
            );

            reverse_in_place(&mut raw).unwrap();
            prop_assert_eq!(raw.as_slice(), original.as_ref());
        }
    );
}

#[test]
fn reversing_resets_the_current_position() {
    proptest!(
        ProptestConfig::with_cases(1_000),
        |(path in positioned_path())| {
            let mut raw = path.encode_to_bytes().to_vec();
            reverse_in_place(&mut raw).unwrap();
            let reversed = StandardPath::decode_raw(&raw).unwrap();
            prop_assert_eq!(&reversed.path_meta, &path.path_meta.to_reversed());
            prop_assert_eq!(reversed.path_meta.current_hop_field.get(), 0);
            prop_assert_eq!(reversed.path_meta.current_info_field.get(), 0);
            prop_assert_eq!(reversed.hop_fields.len(), path.hop_fields.len());
        }
    );
}
