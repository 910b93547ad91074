/*
 * reply.rs
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

//! Three-way result of an OpenML REST call.

use log::debug;
use serde_json::Value;

use crate::protocol::http::Response;

/// Decoded reply: the JSON body, the bare status code, or no connection at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 2xx response with a well-formed JSON body.
    Json(Value),
    /// Non-2xx status, or a 2xx whose body is empty or not JSON.
    Status(u16),
    /// The transport could not be connected.
    NotConnected,
}

impl Reply {
    /// Map a complete response to a reply. Never fails: undecodable bodies fall back to the status.
    pub fn from_response(response: &Response) -> Self {
        if !response.is_success() {
            return Reply::Status(response.code);
        }
        match serde_json::from_slice::<Value>(&response.body) {
            Ok(value) => Reply::Json(value),
            Err(e) => {
                debug!("status {} body is not JSON ({}), replying with status", response.code, e);
                Reply::Status(response.code)
            }
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            Reply::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Reply::Status(code) => Some(*code),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        !matches!(self, Reply::NotConnected)
    }

    /// Single-value form: the body, the status as a JSON number, or JSON null.
    pub fn into_json(self) -> Value {
        match self {
            Reply::Json(v) => v,
            Reply::Status(code) => Value::from(code),
            Reply::NotConnected => Value::Null,
        }
    }
}

impl From<Reply> for Value {
    fn from(reply: Reply) -> Self {
        reply.into_json()
    }
}
