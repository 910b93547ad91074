/*
 * connection.rs
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

//! OpenML REST connection: one persistent transport, one read buffer, one lock.
//!
//! Every call holds the session lock from connect through decode, so requests on one
//! `Connection` are fully serialized and never share the socket or buffer. There is no
//! retry anywhere: connect is attempted once per call, failures are returned to the caller.

use std::sync::{Mutex, MutexGuard};

use bytes::BytesMut;
use log::{debug, info, warn};

use crate::config::{ConnectionConfig, Endpoint};
use crate::error::ClientError;
use crate::net::{TlsTransport, Transport};
use crate::protocol::http::h1::{read_response, Received};
use crate::protocol::http::{form, Method, Params, RequestBuilder, Response};
use crate::protocol::openml::Reply;
use crate::uri::request_target;

/// Name of the credential parameter appended to every request when a key is set.
pub const API_KEY_PARAM: &str = "api_key";

/// State guarded by the connection lock.
struct Session {
    endpoint: Endpoint,
    api_key: Option<String>,
    transport: Box<dyn Transport>,
    /// Bytes received but not yet consumed by a response.
    read_buf: BytesMut,
}

impl Session {
    /// Connect if needed. One attempt; false if it failed.
    fn ensure_connected(&mut self) -> bool {
        if self.transport.is_connected() {
            return true;
        }
        self.read_buf.clear();
        match self.transport.connect(&self.endpoint.host, self.endpoint.port) {
            Ok(()) => {
                debug!("connected to {}:{}", self.endpoint.host, self.endpoint.port);
                true
            }
            Err(e) => {
                warn!("connect to {}:{} failed: {}", self.endpoint.host, self.endpoint.port, e);
                self.transport.close();
                false
            }
        }
    }

    fn disconnect(&mut self) {
        self.transport.close();
        self.read_buf.clear();
    }

    fn round_trip(&mut self, request: &RequestBuilder) -> Result<Received, ClientError> {
        self.transport.write_all(&request.head_bytes())?;
        if let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) {
            self.transport.write_all(body)?;
        }
        read_response(self.transport.as_mut(), &mut self.read_buf)
    }
}

/// Synchronized client for the OpenML JSON REST API.
///
/// Share between threads by reference or `Arc`; calls are serialized internally.
/// Not `Clone`: the transport and its buffered bytes have no meaningful duplicate.
pub struct Connection {
    session: Mutex<Session>,
    test_endpoint: Endpoint,
    user_agent: String,
}

impl Connection {
    /// Production endpoint over TLS, no API key.
    pub fn new() -> Self {
        Self::from_config(ConnectionConfig::default())
    }

    /// Given endpoint over TLS, other settings default.
    pub fn for_endpoint(endpoint: Endpoint) -> Self {
        Self::from_config(ConnectionConfig::default().with_endpoint(endpoint))
    }

    /// TLS transport configured from `config`.
    pub fn from_config(config: ConnectionConfig) -> Self {
        let transport = TlsTransport::new().with_read_timeout(config.read_timeout);
        Self::with_transport(config, Box::new(transport))
    }

    /// Caller-supplied transport (plain TCP, test doubles). Nothing connects until the first call.
    pub fn with_transport(config: ConnectionConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            session: Mutex::new(Session {
                endpoint: config.endpoint,
                api_key: config.api_key,
                transport,
                read_buf: BytesMut::with_capacity(8192),
            }),
            test_endpoint: config.test_endpoint,
            user_agent: config.user_agent,
        }
    }

    /// A panic while the lock was held (e.g. inside a caller-supplied transport) may have left
    /// a response half read, so a poisoned session is disconnected before it is reused.
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| {
            warn!("connection lock poisoned by a panic, dropping the transport");
            let mut session = poisoned.into_inner();
            session.disconnect();
            self.session.clear_poison();
            session
        })
    }

    pub fn key(&self) -> Option<String> {
        self.lock().api_key.clone()
    }

    pub fn set_key(&self, api_key: Option<String>) {
        self.lock().api_key = api_key;
    }

    pub fn endpoint(&self) -> Endpoint {
        self.lock().endpoint.clone()
    }

    /// Point at another endpoint. Waits for any in-flight request; the next call reconnects.
    pub fn set_endpoint(&self, endpoint: Endpoint) {
        let mut session = self.lock();
        info!(
            "switching endpoint {}:{}{} -> {}:{}{}",
            session.endpoint.host,
            session.endpoint.port,
            session.endpoint.prefix,
            endpoint.host,
            endpoint.port,
            endpoint.prefix
        );
        session.disconnect();
        session.endpoint = endpoint;
    }

    /// Redirect all traffic to the test server.
    pub fn enable_test_mode(&self) {
        self.set_endpoint(self.test_endpoint.clone());
    }

    pub fn is_connected(&self) -> bool {
        self.lock().transport.is_connected()
    }

    pub fn disconnect(&self) {
        self.lock().disconnect();
    }

    /// GET with URL-encoded parameters.
    pub fn get(&self, request: &str, params: &Params) -> Result<Reply, ClientError> {
        self.call(Method::Get, request, params)
    }

    /// POST with a form body; multipart when any parameter is a file upload (`name|mime[|filename]`).
    pub fn post(&self, request: &str, params: &Params) -> Result<Reply, ClientError> {
        self.call(Method::Post, request, params)
    }

    /// DELETE with URL-encoded parameters.
    pub fn del(&self, request: &str, params: &Params) -> Result<Reply, ClientError> {
        self.call(Method::Delete, request, params)
    }

    /// GET returning the undecoded response (status, headers, raw body), e.g. for file
    /// downloads and caching. `None` when no connection could be established.
    pub fn get_response(&self, request: &str, params: &Params) -> Result<Option<Response>, ClientError> {
        self.exchange(Method::Get, request, params, |response| response)
    }

    fn call(&self, method: Method, request: &str, params: &Params) -> Result<Reply, ClientError> {
        let reply = self.exchange(method, request, params, |response| Reply::from_response(&response))?;
        Ok(reply.unwrap_or(Reply::NotConnected))
    }

    /// One locked request/response cycle; `finish` runs before the lock is released.
    fn exchange<T, F>(&self, method: Method, request: &str, params: &Params, finish: F) -> Result<Option<T>, ClientError>
    where
        F: FnOnce(Response) -> T,
    {
        let mut guard = self.lock();
        let session = &mut *guard;

        // Encoding errors are the caller's; report them before touching the network.
        let req = self.build_request(session, method, request, params)?;
        if !session.ensure_connected() {
            return Ok(None);
        }

        let path = req.target.split('?').next().unwrap_or("");
        debug!("{} {}", method.as_str(), path);
        match session.round_trip(&req) {
            Ok(received) => {
                debug!("{} {} -> {}", method.as_str(), path, received.response.code);
                if received.end_of_stream || received.response.wants_close() {
                    session.disconnect();
                }
                Ok(Some(finish(received.response)))
            }
            Err(e) => {
                warn!("{} {} failed: {}", method.as_str(), path, e);
                session.disconnect();
                Err(e)
            }
        }
    }

    fn build_request(
        &self,
        session: &Session,
        method: Method,
        request: &str,
        params: &Params,
    ) -> Result<RequestBuilder, ClientError> {
        // The path goes into the request line as is.
        if request.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ClientError::InvalidParameter(request.to_string()));
        }
        let mut params = params.clone();
        if let Some(key) = &session.api_key {
            params.push(API_KEY_PARAM, key.as_str());
        }

        let prefix = &session.endpoint.prefix;
        let mut req = if method.sends_body() {
            RequestBuilder::new(method, request_target(prefix, request, ""))
        } else {
            RequestBuilder::new(method, request_target(prefix, request, &form::encode_query(&params)))
        };
        req.header("Host", session.endpoint.authority())
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/json")
            .header("Connection", "keep-alive");
        if method.sends_body() {
            let encoded = form::encode(&params, true)?;
            req.header("Content-Type", encoded.content_type).body(encoded.body);
        }
        Ok(req)
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}
