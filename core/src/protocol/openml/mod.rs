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

//! OpenML REST API client: a single synchronized `Connection` returning `Reply` values.
//!
//! Design:
//! - One `Connection` per process or test scope, passed explicitly to whatever builds on it
//!   (tasks, datasets, runs, file caches).
//! - `get`/`post`/`del` return `Ok(Reply)` for anything the server or network decided
//!   (JSON body, bare status, no connection) and `Err(ClientError)` only for broken framing,
//!   transport I/O failures and caller misuse.
//! - `get_response` exposes the raw response for collaborators that need headers or non-JSON bodies.

mod connection;
mod reply;

pub use connection::{Connection, API_KEY_PARAM};
pub use reply::Reply;
