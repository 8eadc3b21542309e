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

//! # The SCION endhost service layer.
//!
//! This crate connects the protocol types of `scion_proto` to the outside world:
//!
//! - [config] resolves the [ServiceConfig][config::ServiceConfig] from the environment;
//! - [topology] loads the bootstrap topology of the local AS;
//! - [resolver] maps host names to SCION addresses through TXT records;
//! - [segments] holds path segments for lookups without a control service;
//! - [service] is the caller-owned [ScionService][service::ScionService] handle that hands out
//!   paths; and
//! - [socket] is an asynchronous UDP socket sending and receiving SCION packets.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use scion_stack::{
//!     config::ServiceConfig, segments::SegmentStore, service::ScionService,
//!     socket::ScionUdpSocket,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::from_env()?;
//! let service = ScionService::bootstrap(config, SegmentStore::new())?;
//!
//! let paths = service.get_paths_for_host("localhost", 8080)?;
//! let socket = ScionUdpSocket::bind(service.local_isd_as(), "127.0.0.1:0".parse()?).await?;
//! if let Some(path) = paths.first() {
//!     socket.send_to(b"hello", path).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod resolver;
pub mod segments;
pub mod service;
pub mod socket;
pub mod topology;
