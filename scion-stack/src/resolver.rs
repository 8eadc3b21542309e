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

//! Resolution of host names to SCION addresses.
//!
//! A SCION host announces its address in a DNS TXT record of the form `"scion=<ia>,<ip>"`, e.g.
//! `"scion=64-2:0:9,129.132.230.98"`. Names are resolved in this order:
//!
//! 1. the static record table from the configuration, matched by host name or by IP address;
//! 2. names of the local host, which are in the local AS;
//! 3. the TXT records of a [`TxtLookup`], if one is installed.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use scion_proto::address::{EndhostAddr, IsdAsn};
use tracing::{debug, trace};

const TXT_KEY: &str = "scion=";

/// Errors while resolving a host name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No SCION TXT record exists for the host.
    #[error("no DNS TXT entry \"scion\" found for host: {0}")]
    NoTxtRecord(String),
    /// A TXT record or table entry is malformed.
    #[error("invalid TXT entry: {0}")]
    InvalidTxtRecord(String),
}

/// A source of DNS TXT records.
pub trait TxtLookup: Send + Sync {
    /// Returns all TXT records of `host`.
    fn txt_records(&self, host: &str) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StaticRecord {
    host: String,
    ip: String,
    address: EndhostAddr,
}

/// Resolves host names to SCION endhost addresses.
pub struct HostResolver {
    local_isd_as: IsdAsn,
    records: Vec<StaticRecord>,
    dns: Option<Box<dyn TxtLookup>>,
}

impl std::fmt::Debug for HostResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostResolver")
            .field("local_isd_as", &self.local_isd_as)
            .field("records", &self.records.len())
            .field("dns", &self.dns.is_some())
            .finish()
    }
}

impl HostResolver {
    /// Creates a resolver for hosts in `local_isd_as`.
    ///
    /// `table` holds static records `host="scion=<ia>,<ip>"` separated by `;`.
    pub fn new(local_isd_as: IsdAsn, table: Option<&str>) -> Result<Self, ResolveError> {
        let records = match table {
            Some(table) => parse_table(table)?,
            None => Vec::new(),
        };
        Ok(Self {
            local_isd_as,
            records,
            dns: None,
        })
    }

    /// Installs a DNS TXT record source, consulted after the static records.
    pub fn with_dns(mut self, dns: impl TxtLookup + 'static) -> Self {
        self.set_dns(dns);
        self
    }

    /// Replaces the DNS TXT record source in place.
    pub fn set_dns(&mut self, dns: impl TxtLookup + 'static) {
        self.dns = Some(Box::new(dns));
    }

    /// Resolves `host` to its SCION address.
    pub fn resolve(&self, host: &str) -> Result<EndhostAddr, ResolveError> {
        if let Some(record) = self
            .records
            .iter()
            .find(|record| record.host == host || record.ip == host)
        {
            trace!(host, address = %record.address, "Resolved from static records");
            return Ok(record.address);
        }

        if let Some(ip) = localhost_address(host) {
            return Ok(EndhostAddr::new(self.local_isd_as, ip));
        }

        if let Some(dns) = &self.dns {
            let records = dns.txt_records(host);
            if let Some(record) = records
                .iter()
                .map(|record| record.trim_matches('"'))
                .find(|record| record.starts_with(TXT_KEY))
            {
                debug!(host, record, "Resolved from DNS");
                return parse_txt_record(record);
            }
        }

        Err(ResolveError::NoTxtRecord(host.to_owned()))
    }

    /// Resolves `host` to the ISD-AS it is located in.
    pub fn resolve_isd_as(&self, host: &str) -> Result<IsdAsn, ResolveError> {
        self.resolve(host).map(|address| address.isd_asn())
    }
}

/// Returns the address of `host` if it names the local host.
fn localhost_address(host: &str) -> Option<IpAddr> {
    match host {
        "localhost" => Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        "ip6-localhost" | "::1" | "0:0:0:0:0:0:0:1" => Some(IpAddr::V6(Ipv6Addr::LOCALHOST)),
        _ if host.starts_with("127.0.0.") => host.parse().ok(),
        _ => None,
    }
}

/// Parses a TXT record `scion=<ia>,<ip>`, optionally quoted.
pub fn parse_txt_record(record: &str) -> Result<EndhostAddr, ResolveError> {
    let invalid = || ResolveError::InvalidTxtRecord(record.to_owned());
    let (isd_as, ip) = record
        .trim_matches('"')
        .strip_prefix(TXT_KEY)
        .and_then(|value| value.split_once(','))
        .ok_or_else(invalid)?;
    let isd_as: IsdAsn = isd_as.trim().parse().map_err(|_| invalid())?;
    let ip: IpAddr = ip.trim().parse().map_err(|_| invalid())?;
    Ok(EndhostAddr::new(isd_as, ip))
}

fn parse_table(table: &str) -> Result<Vec<StaticRecord>, ResolveError> {
    table
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (host, record) = entry
                .split_once('=')
                .ok_or_else(|| ResolveError::InvalidTxtRecord(entry.to_owned()))?;
            if !(record.starts_with('"') && record.ends_with('"') && record.len() > 1) {
                return Err(ResolveError::InvalidTxtRecord(record.to_owned()));
            }
            let address = parse_txt_record(record)?;
            let ip = record
                .trim_matches('"')
                .split_once(',')
                .map(|(_, ip)| ip.trim().to_owned())
                .unwrap_or_default();
            Ok(StaticRecord {
                host: host.trim().to_owned(),
                ip,
                address,
            })
        })
        .collect()
}
