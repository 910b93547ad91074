/*
 * form.rs
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

//! Request parameter encoding: URL-encoded query strings and form bodies, and
//! `multipart/form-data` bodies when any parameter is a file upload.

use std::io;

use log::debug;

use crate::error::ClientError;
use crate::protocol::http::params::{FieldName, Params};
use crate::uri::{decode_component, encode_component};

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Boundaries tried before giving up with `ClientError::BoundaryCollision`.
pub const MAX_BOUNDARY_ATTEMPTS: usize = 8;

/// Encoded parameters: Content-Type header value and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Encode parameters for the wire.
///
/// `for_upload == false` yields a query string (returned as the body, typed as form data).
/// `for_upload == true` yields a form body, switching to multipart when any name contains `|`.
pub fn encode(params: &Params, for_upload: bool) -> Result<EncodedBody, ClientError> {
    if for_upload && params.has_file_upload() {
        return encode_multipart(params);
    }
    Ok(EncodedBody {
        content_type: FORM_URLENCODED.to_string(),
        body: encode_query(params).into_bytes(),
    })
}

/// `name=value` pairs joined with `&`, in input order, each side percent-encoded.
pub fn encode_query(params: &Params) -> String {
    let mut out = String::new();
    for (name, value) in params.iter() {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&encode_component(name));
        out.push('=');
        out.push_str(&encode_component(value));
    }
    out
}

/// Inverse of `encode_query`. A pair without `=` decodes to an empty value.
pub fn decode_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((n, v)) => (decode_component(n), decode_component(v)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Multipart body with a random boundary.
pub fn encode_multipart(params: &Params) -> Result<EncodedBody, ClientError> {
    encode_multipart_with(params, random_boundary)
}

/// Multipart body with boundaries drawn from `next_boundary`. A boundary that is empty or
/// occurs in any name or value is discarded and another drawn.
pub fn encode_multipart_with<G>(params: &Params, mut next_boundary: G) -> Result<EncodedBody, ClientError>
where
    G: FnMut() -> Result<String, ClientError>,
{
    let fields = params
        .iter()
        .map(|(name, value)| Ok((FieldName::parse(name)?, value)))
        .collect::<Result<Vec<_>, ClientError>>()?;

    for _ in 0..MAX_BOUNDARY_ATTEMPTS {
        let boundary = next_boundary()?;
        if boundary.is_empty() || collides(params, &boundary) {
            debug!("multipart boundary {:?} rejected, drawing another", boundary);
            continue;
        }
        return Ok(EncodedBody {
            content_type: format!("{}; boundary={}", MULTIPART_FORM_DATA, boundary),
            body: write_parts(&fields, &boundary),
        });
    }
    Err(ClientError::BoundaryCollision)
}

fn collides(params: &Params, boundary: &str) -> bool {
    params
        .iter()
        .any(|(name, value)| name.contains(boundary) || value.contains(boundary))
}

fn write_parts(fields: &[(FieldName<'_>, &str)], boundary: &str) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match field {
            FieldName::Plain(name) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", quote(name)).as_bytes(),
                );
            }
            FieldName::File { name, mime_type, filename } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        quote(name),
                        quote(filename)
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {}\r\n", mime_type).as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

/// Escape for a quoted-string disposition parameter.
fn quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `----OpenMLFormBoundary` followed by 32 random hex digits.
fn random_boundary() -> Result<String, ClientError> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes).map_err(|e| {
        ClientError::Io(io::Error::new(io::ErrorKind::Other, format!("getrandom: {}", e)))
    })?;
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    Ok(format!("----OpenMLFormBoundary{}", hex))
}
