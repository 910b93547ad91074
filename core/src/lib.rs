/*
 * lib.rs
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

//! Synchronized HTTP/HTTPS client for the OpenML JSON REST API.
//!
//! Layers, leaves first:
//! - `protocol::http::Params`: ordered request parameters (file uploads marked `name|mime[|filename]`).
//! - `protocol::http::form`: URL-encoded and multipart/form-data encoding.
//! - `protocol::http::h1`: HTTP/1.1 response parser and transport read loop.
//! - `protocol::openml::Connection`: lock-serialized `get`/`post`/`del` over one `net::Transport`.

pub mod config;
pub mod error;
pub mod net;
pub mod protocol;
pub mod uri;

pub use config::{ConnectionConfig, Endpoint};
pub use error::ClientError;
pub use net::{PlainTransport, TlsTransport, Transport};
pub use protocol::http::{Params, Response};
pub use protocol::openml::{Connection, Reply};
