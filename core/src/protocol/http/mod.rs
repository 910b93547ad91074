/*
 * mod.rs
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

//! HTTP/1.1 client pieces: ordered parameters, form/multipart encoding, request
//! serialization and the response reader.
//!
//! Design:
//! - Buffers: `bytes` crate (BytesMut for the shared read buffer, Bytes for the response body).
//! - Response parsing is a push parser (`h1::ResponseParser`) driven by a blocking pull loop
//!   (`h1::read_response`) over any `net::Transport`.
//! - Requests are plain data (`RequestBuilder`) serialized to wire bytes by the caller.

pub mod form;
pub mod h1;
pub mod params;
mod request;
mod response;

pub use form::{decode_query, encode, encode_multipart, encode_multipart_with, encode_query, EncodedBody};
pub use params::{FieldName, Params, FILE_SEPARATOR};
pub use request::{Method, RequestBuilder};
pub use response::Response;
