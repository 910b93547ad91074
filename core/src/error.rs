/*
 * error.rs
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

//! Client errors.
//!
//! Only framing/transport failures and caller misuse are errors. Connection
//! establishment failures and HTTP-level failures are ordinary replies (see
//! `openml::Reply`).

use std::fmt;
use std::io;

/// Errors from encoding a request or exchanging it with the server.
#[derive(Debug)]
pub enum ClientError {
    /// Transport write/read failed, or the stream ended before the response was complete.
    /// The connection has been closed; the next call reconnects.
    Io(io::Error),
    /// The response could not be framed: bad status line, header line, length or chunk size.
    Protocol(String),
    /// Malformed file-upload parameter name (empty field around `|`, too many fields).
    InvalidParameter(String),
    /// No multipart boundary could be generated that is absent from every part.
    BoundaryCollision,
    /// Invalid configuration value (e.g. a non-numeric port in the environment).
    Config(String),
}

impl ClientError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Io(e) => write!(f, "I/O error: {}", e),
            ClientError::Protocol(m) => write!(f, "HTTP protocol error: {}", m),
            ClientError::InvalidParameter(name) => {
                write!(f, "invalid parameter name: {:?}", name)
            }
            ClientError::BoundaryCollision => {
                write!(f, "could not find a multipart boundary absent from the content")
            }
            ClientError::Config(m) => write!(f, "configuration error: {}", m),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ClientError {
    fn from(e: io::Error) -> Self {
        ClientError::Io(e)
    }
}
