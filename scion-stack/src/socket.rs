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

//! Asynchronous SCION/UDP socket.
//!
//! [`ScionUdpSocket`] wraps a tokio [`UdpSocket`] bound in the local AS. Outgoing packets are
//! sent to the first hop of their path, i.e., the border router of the local AS or, for AS-local
//! paths, the destination itself. Incoming packets are validated; packets that are not valid
//! SCION/UDP packets are dropped.

use std::{borrow::Cow, net};

use bytes::BytesMut;
use scion_proto::{
    address::{IsdAsn, SocketAddr},
    packet::{build_packet, read_remote_socket_address, read_user_data, validate},
    path::{Path, RequestPath, ResponsePath},
};
use tokio::{net::UdpSocket, sync::Mutex};
use tracing::{debug, trace};

/// Size of the buffer packets are received into.
const RECEIVE_BUFFER_SIZE: usize = 65_536;

/// Errors while sending a packet.
#[derive(Debug, thiserror::Error)]
pub enum ScionSocketSendError {
    /// The packet cannot be encoded, e.g. because the payload is too large.
    #[error("invalid packet: {0}")]
    InvalidPacket(Cow<'static, str>),
    /// IO Error from the underlying socket.
    #[error("underlying socket returned an I/O error: {0:?}")]
    IoError(#[from] std::io::Error),
}

/// Errors while receiving a packet.
#[derive(Debug, thiserror::Error)]
pub enum ScionSocketReceiveError {
    /// IO Error from the underlying socket.
    #[error("underlying socket returned an I/O error: {0:?}")]
    IoError(#[from] std::io::Error),
}

/// A UDP socket sending and receiving SCION packets.
///
/// The socket should be bound to a specific IP address: it is used as the source address of all
/// outgoing packets. Concurrent receivers share one receive buffer and are served in turn.
#[derive(Debug)]
pub struct ScionUdpSocket {
    socket: UdpSocket,
    local_addr: SocketAddr,
    recv_buffer: Mutex<BytesMut>,
}

impl ScionUdpSocket {
    /// Binds a socket to `address` in the AS `isd_as`.
    pub async fn bind(isd_as: IsdAsn, address: net::SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(address).await?;
        let local_addr = SocketAddr::from_std(isd_as, socket.local_addr()?);
        debug!(%local_addr, "Bound SCION socket");
        Ok(Self {
            socket,
            local_addr,
            recv_buffer: Mutex::new(BytesMut::zeroed(RECEIVE_BUFFER_SIZE)),
        })
    }

    /// The SCION address of the socket.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Sends `payload` along `path` to its destination. Returns the number of payload bytes sent.
    pub async fn send_to(
        &self,
        payload: &[u8],
        path: &RequestPath,
    ) -> Result<usize, ScionSocketSendError> {
        self.send_on_path(payload, path.path(), self.local_addr)
            .await
    }

    /// Answers a received packet with `payload`.
    ///
    /// The reply is sent from the address the answered packet was sent to.
    pub async fn send_reply(
        &self,
        payload: &[u8],
        path: &ResponsePath,
    ) -> Result<usize, ScionSocketSendError> {
        self.send_on_path(payload, path.path(), path.local()).await
    }

    async fn send_on_path(
        &self,
        payload: &[u8],
        path: &Path,
        source: SocketAddr,
    ) -> Result<usize, ScionSocketSendError> {
        let mut packet = Vec::with_capacity(payload.len() + path.raw().len() + 128);
        build_packet(&mut packet, payload, path, source)
            .map_err(|e| ScionSocketSendError::InvalidPacket(e.to_string().into()))?;
        trace!(
            destination = %path.destination(),
            first_hop = %path.first_hop(),
            length = packet.len(),
            "Sending packet"
        );
        self.socket.send_to(&packet, path.first_hop()).await?;
        Ok(payload.len())
    }

    /// Receives a packet, copying its payload into `buffer`.
    ///
    /// Returns the number of bytes copied and the path to answer the sender. A payload larger
    /// than `buffer` is truncated. Invalid packets are skipped.
    pub async fn recv_from(
        &self,
        buffer: &mut [u8],
    ) -> Result<(usize, ResponsePath), ScionSocketReceiveError> {
        let mut packet = self.recv_buffer.lock().await;
        loop {
            let (length, from) = self.socket.recv_from(&mut packet[..]).await?;
            let packet = &packet[..length];

            if let Err(e) = validate(packet) {
                debug!(error = %e, %from, "Received invalid SCION packet, skipping");
                continue;
            }
            let response_path = match read_remote_socket_address(packet, from) {
                Ok(path) => path,
                Err(e) => {
                    debug!(error = %e, %from, "Received packet with invalid path, skipping");
                    continue;
                }
            };
            let payload = match read_user_data(packet) {
                Ok(payload) => payload,
                Err(e) => {
                    debug!(error = %e, %from, "Received packet without payload, skipping");
                    continue;
                }
            };
            trace!(
                "received packet from {}, length {}",
                response_path.remote(),
                payload.len()
            );

            let max_read = std::cmp::min(buffer.len(), payload.len());
            buffer[..max_read].copy_from_slice(&payload[..max_read]);
            return Ok((max_read, response_path));
        }
    }
}
