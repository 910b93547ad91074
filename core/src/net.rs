/*
 * net.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of openml-client, a synchronized client for the OpenML REST API.
 *
 * openml-client is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * openml-client is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with openml-client.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Byte-stream transports: the `Transport` seam used by `Connection`, with plain TCP and
//! rustls-backed TLS implementations.
//!
//! Transports are blocking. A read blocks until data arrives, the peer closes or the
//! optional read timeout elapses; nothing here retries.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use rustls::client::ClientConfig;
use rustls::pki_types::ServerName;
use rustls::{ClientConnection, RootCertStore, StreamOwned};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Opaque byte channel to one remote host.
///
/// `read` returns `Ok(0)` at end of stream. After `close` (or a failed `connect`)
/// `is_connected` is false and `connect` may be called again.
pub trait Transport: Send {
    fn connect(&mut self, host: &str, port: u16) -> io::Result<()>;
    fn is_connected(&self) -> bool;
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn close(&mut self);
}

/// Build a root certificate store: platform native certs first, then webpki-roots as fallback.
fn build_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    if let Ok(certs) = rustls_native_certs::load_native_certs() {
        for cert in certs {
            let _ = root_store.add(cert);
        }
    }
    if root_store.is_empty() {
        root_store.roots = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
    }
    root_store
}

/// Shared TLS client config: HTTP/1.1 only over ALPN, no client auth.
fn default_client_config() -> Arc<ClientConfig> {
    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            let mut config = ClientConfig::builder()
                .with_root_certificates(build_root_store())
                .with_no_client_auth();
            config.alpn_protocols = vec![b"http/1.1".to_vec()];
            Arc::new(config)
        })
        .clone()
}

/// Resolve and connect with a bounded connect time, trying each resolved address in turn.
fn connect_tcp(host: &str, port: u16, read_timeout: Option<Duration>) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(tcp) => {
                tcp.set_nodelay(true)?;
                tcp.set_read_timeout(read_timeout)?;
                return Ok(tcp);
            }
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("{} resolved to no addresses", host))
    }))
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "transport not connected")
}

/// Plain TCP transport (local servers, tests, plain-HTTP deployments).
#[derive(Default)]
pub struct PlainTransport {
    stream: Option<TcpStream>,
    read_timeout: Option<Duration>,
}

impl PlainTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl Transport for PlainTransport {
    fn connect(&mut self, host: &str, port: u16) -> io::Result<()> {
        self.close();
        self.stream = Some(connect_tcp(host, port, self.read_timeout)?);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        stream.write_all(data)?;
        stream.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.as_mut().ok_or_else(not_connected)?.read(buf)
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// TLS transport (rustls over a blocking TcpStream). The handshake completes inside
/// `connect`, so certificate and protocol failures are connect failures.
pub struct TlsTransport {
    stream: Option<StreamOwned<ClientConnection, TcpStream>>,
    config: Arc<ClientConfig>,
    read_timeout: Option<Duration>,
}

impl TlsTransport {
    pub fn new() -> Self {
        Self::with_config(default_client_config())
    }

    /// Use a caller-supplied rustls config (custom roots, client certificates).
    pub fn with_config(config: Arc<ClientConfig>) -> Self {
        Self {
            stream: None,
            config,
            read_timeout: None,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl Default for TlsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for TlsTransport {
    fn connect(&mut self, host: &str, port: u16) -> io::Result<()> {
        self.close();
        let tcp = connect_tcp(host, port, self.read_timeout)?;
        let server_name = ServerName::try_from(host)
            .map(|name| name.to_owned())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"))?;
        let conn = ClientConnection::new(self.config.clone(), server_name)
            .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
        let mut stream = StreamOwned::new(conn, tcp);
        while stream.conn.is_handshaking() {
            stream.conn.complete_io(&mut stream.sock)?;
        }
        self.stream = Some(stream);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        stream.write_all(data)?;
        stream.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        match stream.read(buf) {
            // Peer closed the TCP stream without close_notify; common for HTTP servers.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
            other => other,
        }
    }

    fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.conn.send_close_notify();
            let _ = stream.flush();
            let _ = stream.sock.shutdown(Shutdown::Both);
        }
    }
}
