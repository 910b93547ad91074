/*
 * reader.rs
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

//! Pull loop around `ResponseParser`: reads from a `Transport` into the shared buffer until
//! one complete response has been assembled.

use std::io;

use bytes::BytesMut;
use log::debug;

use crate::error::ClientError;
use crate::net::Transport;
use crate::protocol::http::h1::parser::{BodyMode, H1ResponseHandler, ParseState, ResponseParser};
use crate::protocol::http::response::Response;

const READ_CHUNK: usize = 8192;

/// A fully read response.
#[derive(Debug)]
pub struct Received {
    pub response: Response,
    /// The body was delimited by end of stream; the transport cannot be reused.
    pub end_of_stream: bool,
}

/// Accumulates parser events into a `Response`.
#[derive(Default)]
struct Collector {
    code: u16,
    reason: Option<String>,
    headers: Vec<(String, String)>,
    body: BytesMut,
}

impl H1ResponseHandler for Collector {
    fn status(&mut self, code: u16, reason: Option<&str>) {
        self.code = code;
        self.reason = reason.map(str::to_string);
    }

    fn header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn body_chunk(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
    }

    fn trailer(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn complete(&mut self) {}
}

impl Collector {
    fn into_response(self) -> Response {
        Response {
            code: self.code,
            reason: self.reason,
            headers: self.headers,
            body: self.body.freeze(),
        }
    }
}

/// Pick the body framing from the status and headers.
///
/// Chunked transfer coding takes precedence over Content-Length (RFC 9112 §6.3).
pub fn body_mode(code: u16, headers: &[(String, String)]) -> Result<BodyMode, ClientError> {
    if (100..200).contains(&code) || code == 204 || code == 304 {
        return Ok(BodyMode::Empty);
    }
    let chunked = headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("transfer-encoding"))
        .flat_map(|(_, v)| v.split(','))
        .last()
        .map(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
        .unwrap_or(false);
    if chunked {
        return Ok(BodyMode::Chunked);
    }
    let mut length: Option<u64> = None;
    for (_, v) in headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("content-length")) {
        let n = v
            .trim()
            .parse::<u64>()
            .map_err(|_| ClientError::protocol(format!("invalid Content-Length: {:?}", v)))?;
        if length.is_some_and(|prev| prev != n) {
            return Err(ClientError::protocol("conflicting Content-Length headers"));
        }
        length = Some(n);
    }
    Ok(match length {
        Some(n) => BodyMode::Length(n),
        None => BodyMode::UntilClose,
    })
}

/// Read one response.
///
/// Bytes already in `buf` are consumed first; bytes past the end of this response are left
/// in `buf`. Interim 1xx responses (other than 101) are skipped.
pub fn read_response(
    transport: &mut dyn Transport,
    buf: &mut BytesMut,
) -> Result<Received, ClientError> {
    let mut parser = ResponseParser::new();
    let mut collector = Collector::default();
    let mut end_of_stream = false;
    let mut tmp = [0u8; READ_CHUNK];
    loop {
        parser.receive(buf, &mut collector)?;
        match parser.state() {
            ParseState::HeadersComplete => {
                let code = collector.code;
                if (100..200).contains(&code) && code != 101 {
                    debug!("skipping interim response {}", code);
                    collector = Collector::default();
                    parser.reset();
                    continue;
                }
                let mode = body_mode(code, &collector.headers)?;
                parser.set_body_mode(mode, &mut collector);
                continue;
            }
            ParseState::Idle => {
                return Ok(Received {
                    response: collector.into_response(),
                    end_of_stream,
                });
            }
            _ => {}
        }
        if end_of_stream {
            // end_of_stream() succeeded only if it moved the parser to Idle
            return Err(ClientError::protocol("parser did not complete at end of stream"));
        }
        let n = match transport.read(&mut tmp) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ClientError::Io(e)),
        };
        if n == 0 {
            end_of_stream = true;
            parser.end_of_stream(&mut collector)?;
            continue;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
}
