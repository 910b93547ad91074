/*
 * uri.rs
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

//! Request-target construction and URL component percent-encoding.
//! Components are encoded with the RFC 3986 unreserved set: `A-Z a-z 0-9 - . _ ~` pass
//! through, every other byte of the UTF-8 form becomes `%XX` (space is `%20`, never `+`).

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a query/form name or value.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Decode a percent-encoded component. `+` is accepted as space for form bodies
/// produced by other clients.
pub fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Join prefix and request path into an origin-form target, with an optional query.
/// `request` gets a leading slash if it lacks one; an empty query adds no `?`.
pub fn request_target(prefix: &str, request: &str, query: &str) -> String {
    let mut target = String::with_capacity(prefix.len() + request.len() + query.len() + 2);
    target.push_str(prefix);
    if !request.starts_with('/') {
        target.push('/');
    }
    target.push_str(request);
    if !query.is_empty() {
        target.push('?');
        target.push_str(query);
    }
    target
}
