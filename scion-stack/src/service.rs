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

//! The SCION service handle.
//!
//! A [`ScionService`] bundles what an application needs to obtain paths: the topology of the
//! local AS, access to path segments and the resolution of host names. The handle is owned by
//! the caller; it is released with [`ScionService::close`] or when it is dropped. Operations on
//! a closed service fail with [`ServiceError::Closed`].

use std::{
    net,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use scion_proto::{
    address::{EndhostAddr, IsdAsn, SocketAddr},
    path::{self, GetPathsError, LocalTopology, RequestPath, SegmentLookup},
};
use tracing::{debug, info};

use crate::{
    config::{BootstrapMode, ENV_BOOTSTRAP_TOPO_FILE, ServiceConfig},
    resolver::{HostResolver, ResolveError, TxtLookup},
    topology::Topology,
};

/// Errors returned by a [`ScionService`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service has been closed.
    #[error("service is closed")]
    Closed,
    /// The destination host cannot be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Paths cannot be obtained.
    #[error(transparent)]
    Paths(#[from] GetPathsError),
    /// No path to the destination exists.
    #[error("no path to {0}")]
    NoPath(SocketAddr),
}

/// Caller-owned handle to the SCION network.
pub struct ScionService<L, T = Topology> {
    lookup: L,
    topology: T,
    resolver: HostResolver,
    path_expiry_margin: Duration,
    closed: AtomicBool,
}

impl<L, T> std::fmt::Debug for ScionService<L, T>
where
    T: LocalTopology,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScionService")
            .field("local_isd_as", &self.topology.local_isd_as())
            .field("path_expiry_margin", &self.path_expiry_margin)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl<L> ScionService<L, Topology>
where
    L: SegmentLookup,
{
    /// Creates a service from `config`, loading the topology as selected by
    /// [`ServiceConfig::mode`].
    ///
    /// Only topology files are supported for bootstrapping; the other modes need a connection to
    /// a control service.
    pub fn bootstrap(config: ServiceConfig, lookup: L) -> anyhow::Result<Self> {
        let mode = config.mode();
        info!(%mode, "Bootstrapping SCION service");
        let topology = match &mode {
            BootstrapMode::TopologyFile(file) => Topology::from_file(file)
                .with_context(|| format!("loading topology from {}", file.display()))?,
            other => anyhow::bail!(
                "bootstrapping from {other} is not supported, set {ENV_BOOTSTRAP_TOPO_FILE}"
            ),
        };
        Self::new(&config, topology, lookup).context("creating host resolver")
    }
}

impl<L, T> ScionService<L, T>
where
    L: SegmentLookup,
    T: LocalTopology,
{
    /// Creates a service over the given topology and segment lookup.
    pub fn new(config: &ServiceConfig, topology: T, lookup: L) -> Result<Self, ResolveError> {
        let resolver =
            HostResolver::new(topology.local_isd_as(), config.mock_dns_txt.as_deref())?;
        Ok(Self {
            lookup,
            topology,
            resolver,
            path_expiry_margin: config.path_expiry_margin,
            closed: AtomicBool::new(false),
        })
    }

    /// Installs a DNS TXT record source for host name resolution.
    pub fn with_dns(mut self, dns: impl TxtLookup + 'static) -> Self {
        self.resolver.set_dns(dns);
        self
    }

    /// The ISD-AS of the local AS.
    pub fn local_isd_as(&self) -> IsdAsn {
        self.topology.local_isd_as()
    }

    /// The topology of the local AS.
    pub fn topology(&self) -> &T {
        &self.topology
    }

    /// The segment lookup used to find paths.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Resolves a host name to its SCION address.
    pub fn resolve(&self, host: &str) -> Result<EndhostAddr, ServiceError> {
        self.ensure_open()?;
        Ok(self.resolver.resolve(host)?)
    }

    /// Returns all paths from the local AS to `destination` in `dst_isd_as`.
    pub fn get_paths(
        &self,
        dst_isd_as: IsdAsn,
        destination: net::SocketAddr,
    ) -> Result<Vec<RequestPath>, ServiceError> {
        self.get_paths_at(dst_isd_as, destination, Utc::now())
    }

    /// Like [`Self::get_paths`], with an explicit current time.
    #[tracing::instrument(skip(self, now))]
    pub fn get_paths_at(
        &self,
        dst_isd_as: IsdAsn,
        destination: net::SocketAddr,
        now: DateTime<Utc>,
    ) -> Result<Vec<RequestPath>, ServiceError> {
        self.ensure_open()?;
        let destination = SocketAddr::from_std(dst_isd_as, destination);
        let paths = path::get_paths(
            &self.lookup,
            &self.topology,
            self.local_isd_as(),
            dst_isd_as,
            now,
        )?;
        debug!(%destination, count = paths.len(), "Found paths");
        Ok(paths
            .into_iter()
            .map(|combined| RequestPath::from_combined(combined, destination))
            .collect())
    }

    /// Resolves `host` and returns all paths to it.
    pub fn get_paths_for_host(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Vec<RequestPath>, ServiceError> {
        let address = self.resolve(host)?;
        self.get_paths(
            address.isd_asn(),
            net::SocketAddr::new(address.local_address(), port),
        )
    }

    /// Returns `path` if it is valid for longer than the configured expiry margin, and a fresh
    /// path to the same destination otherwise.
    pub fn refresh(&self, path: &RequestPath) -> Result<RequestPath, ServiceError> {
        self.refresh_at(path, Utc::now())
    }

    /// Like [`Self::refresh`], with an explicit current time.
    ///
    /// Among the fresh paths, the first one that is valid beyond the margin is preferred.
    pub fn refresh_at(
        &self,
        path: &RequestPath,
        now: DateTime<Utc>,
    ) -> Result<RequestPath, ServiceError> {
        self.ensure_open()?;
        if !path.expires_within(now, self.path_expiry_margin) {
            return Ok(path.clone());
        }
        let destination = path.destination();
        debug!(%destination, expiration = %path.expiration(), "Refreshing path");
        let mut paths =
            self.get_paths_at(destination.isd_asn(), destination.to_std(), now)?;
        let index = paths
            .iter()
            .position(|path| !path.expires_within(now, self.path_expiry_margin))
            .unwrap_or(0);
        if index >= paths.len() {
            return Err(ServiceError::NoPath(destination));
        }
        Ok(paths.swap_remove(index))
    }

    /// Closes the service. Closing an already closed service has no effect.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(local_isd_as = %self.local_isd_as(), "Closing SCION service");
        }
    }

    /// Returns true if the service has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), ServiceError> {
        if self.is_closed() {
            return Err(ServiceError::Closed);
        }
        Ok(())
    }
}

impl<L, T> Drop for ScionService<L, T> {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("SCION service dropped without close");
        }
    }
}
