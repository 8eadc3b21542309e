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

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{Buf, BufMut};

use super::{AddressInfo, ByEndpoint};
use crate::{
    address::{EndhostAddr, IsdAsn},
    packet::{DecodeError, InadequateBufferSize},
    wire_encoding::WireEncode,
};

/// The SCION address header: ISD-AS and host address of both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressHeader {
    /// ISD-AS of source and destination.
    pub ia: ByEndpoint<IsdAsn>,
    /// Host addresses of source and destination.
    pub host: ByEndpoint<IpAddr>,
}

impl AddressHeader {
    /// Returns the source endhost address.
    pub fn source(&self) -> EndhostAddr {
        EndhostAddr::new(self.ia.source, self.host.source)
    }

    /// Returns the destination endhost address.
    pub fn destination(&self) -> EndhostAddr {
        EndhostAddr::new(self.ia.destination, self.host.destination)
    }

    /// Returns the [`AddressInfo`] of both host addresses.
    pub fn address_info(&self) -> ByEndpoint<AddressInfo> {
        self.host.map(address_info)
    }

    /// Decodes the address header given the address info from the common header.
    ///
    /// Only IPv4 and IPv6 host addresses are supported.
    pub fn decode<T: Buf>(
        data: &mut T,
        address_info: ByEndpoint<AddressInfo>,
    ) -> Result<Self, DecodeError> {
        for info in [address_info.destination, address_info.source] {
            if !info.is_ip() {
                return Err(DecodeError::UnsupportedAddressInfo(info.get()));
            }
        }
        let length =
            16 + address_info.destination.host_length() + address_info.source.host_length();
        if data.remaining() < length {
            return Err(DecodeError::PacketEmptyOrTruncated);
        }

        let destination_ia = IsdAsn(data.get_u64());
        let source_ia = IsdAsn(data.get_u64());
        let destination_host = decode_host(data, address_info.destination);
        let source_host = decode_host(data, address_info.source);

        Ok(Self {
            ia: ByEndpoint {
                source: source_ia,
                destination: destination_ia,
            },
            host: ByEndpoint {
                source: source_host,
                destination: destination_host,
            },
        })
    }
}

impl From<ByEndpoint<EndhostAddr>> for AddressHeader {
    fn from(endhosts: ByEndpoint<EndhostAddr>) -> Self {
        Self {
            ia: endhosts.map(EndhostAddr::isd_asn),
            host: endhosts.map(EndhostAddr::local_address),
        }
    }
}

impl WireEncode for AddressHeader {
    type Error = InadequateBufferSize;

    fn encoded_length(&self) -> usize {
        let info = self.address_info();
        16 + info.destination.host_length() + info.source.host_length()
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        buffer.put_u64(self.ia.destination.0);
        buffer.put_u64(self.ia.source.0);
        encode_host(buffer, &self.host.destination);
        encode_host(buffer, &self.host.source);
    }
}

fn address_info(host: &IpAddr) -> AddressInfo {
    match host {
        IpAddr::V4(_) => AddressInfo::IPV4,
        IpAddr::V6(_) => AddressInfo::IPV6,
    }
}

// Callers check `is_ip` and the remaining length beforehand.
fn decode_host<T: Buf>(data: &mut T, info: AddressInfo) -> IpAddr {
    if info == AddressInfo::IPV4 {
        IpAddr::V4(Ipv4Addr::from(data.get_u32()))
    } else {
        IpAddr::V6(Ipv6Addr::from(data.get_u128()))
    }
}

fn encode_host<T: BufMut>(buffer: &mut T, host: &IpAddr) {
    match host {
        IpAddr::V4(host) => buffer.put_slice(&host.octets()),
        IpAddr::V6(host) => buffer.put_slice(&host.octets()),
    }
}
