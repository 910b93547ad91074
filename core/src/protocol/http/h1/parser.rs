/*
 * parser.rs
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

//! HTTP/1.1 response push parser: status line, headers, body (Content-Length, chunked or until close).
//!
//! The parser consumes only the bytes that belong to the current response; anything after
//! its end stays in the buffer for the next one.

use bytes::Buf;
use bytes::BytesMut;

use crate::error::ClientError;

/// Longest status, header, chunk-size or trailer line accepted.
const MAX_LINE: usize = 64 * 1024;

/// Callback for HTTP/1.1 response events.
pub trait H1ResponseHandler {
    fn status(&mut self, code: u16, reason: Option<&str>);
    fn header(&mut self, name: &str, value: &str);
    fn body_chunk(&mut self, data: &[u8]);
    fn trailer(&mut self, name: &str, value: &str);
    fn complete(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Response complete. `new` and `reset` start in `StatusLine` instead.
    Idle,
    StatusLine,
    Headers,
    /// Headers done; caller must choose the framing with `set_body_mode`.
    HeadersComplete,
    Body,
    ChunkSize,
    ChunkData,
    ChunkTrailer,
}

/// How the body of the current response is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    Empty,
    Length(u64),
    Chunked,
    UntilClose,
}

/// Push parser for one HTTP/1.1 response at a time. Feed bytes via `receive`.
pub struct ResponseParser {
    state: ParseState,
    /// Bytes left in the Content-Length body or the current chunk.
    remaining: u64,
    until_close: bool,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::StatusLine,
            remaining: 0,
            until_close: false,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Index of the first CRLF, or None.
    fn find_crlf(buf: &[u8]) -> Option<usize> {
        buf.windows(2).position(|w| w == b"\r\n")
    }

    /// Split the next CRLF-terminated line off `buf` (without the CRLF).
    fn take_line(buf: &mut BytesMut, what: &str) -> Result<Option<String>, ClientError> {
        match Self::find_crlf(buf) {
            Some(n) => {
                let line = buf.split_to(n + 2);
                let s = std::str::from_utf8(&line[..n])
                    .map_err(|_| ClientError::protocol(format!("invalid {} UTF-8", what)))?;
                Ok(Some(s.to_string()))
            }
            None if buf.len() > MAX_LINE => {
                Err(ClientError::protocol(format!("{} exceeds {} bytes", what, MAX_LINE)))
            }
            None => Ok(None),
        }
    }

    /// `HTTP/1.1 200 OK` or `HTTP/1.1 200`.
    fn parse_status_line(line: &str) -> Result<(u16, Option<&str>), ClientError> {
        let mut parts = line.splitn(3, ' ');
        let version = parts.next().unwrap_or("");
        let code = parts.next().unwrap_or("");
        if !version.starts_with("HTTP/") || code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ClientError::protocol(format!("malformed status line: {:?}", line)));
        }
        let code: u16 = code
            .parse()
            .map_err(|_| ClientError::protocol(format!("malformed status code: {:?}", line)))?;
        let reason = parts.next().map(str::trim).filter(|r| !r.is_empty());
        Ok((code, reason))
    }

    fn split_header(line: &str) -> Result<(&str, &str), ClientError> {
        let colon = line
            .find(':')
            .ok_or_else(|| ClientError::protocol(format!("malformed header line: {:?}", line)))?;
        Ok((line[..colon].trim(), line[colon + 1..].trim()))
    }

    /// Consume and parse as much as possible from buf. Returns when more input is needed,
    /// when headers are complete (state `HeadersComplete`) or when the response is done (`Idle`).
    pub fn receive<H: H1ResponseHandler>(
        &mut self,
        buf: &mut BytesMut,
        handler: &mut H,
    ) -> Result<(), ClientError> {
        loop {
            match self.state {
                ParseState::StatusLine => {
                    let Some(line) = Self::take_line(buf, "status line")? else {
                        return Ok(());
                    };
                    let (code, reason) = Self::parse_status_line(&line)?;
                    handler.status(code, reason);
                    self.state = ParseState::Headers;
                }
                ParseState::Headers => {
                    let Some(line) = Self::take_line(buf, "header line")? else {
                        return Ok(());
                    };
                    if line.is_empty() {
                        self.state = ParseState::HeadersComplete;
                        return Ok(());
                    }
                    let (name, value) = Self::split_header(&line)?;
                    handler.header(name, value);
                }
                ParseState::HeadersComplete | ParseState::Idle => return Ok(()),
                ParseState::Body => {
                    if self.until_close {
                        if !buf.is_empty() {
                            let chunk = buf.split_to(buf.len());
                            handler.body_chunk(&chunk);
                        }
                        return Ok(());
                    }
                    let to_read = buf.len().min(self.remaining as usize);
                    if to_read > 0 {
                        let chunk = buf.split_to(to_read);
                        handler.body_chunk(&chunk);
                        self.remaining -= to_read as u64;
                    }
                    if self.remaining > 0 {
                        return Ok(());
                    }
                    self.finish(handler);
                }
                ParseState::ChunkSize => {
                    let Some(line) = Self::take_line(buf, "chunk size")? else {
                        return Ok(());
                    };
                    let hex_part = line.split(';').next().unwrap_or("").trim();
                    if hex_part.is_empty() || hex_part.len() > 16 {
                        return Err(ClientError::protocol(format!("invalid chunk size: {:?}", line)));
                    }
                    self.remaining = u64::from_str_radix(hex_part, 16)
                        .map_err(|_| ClientError::protocol(format!("invalid chunk size: {:?}", line)))?;
                    self.state = if self.remaining == 0 {
                        ParseState::ChunkTrailer
                    } else {
                        ParseState::ChunkData
                    };
                }
                ParseState::ChunkData => {
                    if self.remaining > 0 {
                        let to_read = buf.len().min(self.remaining as usize);
                        if to_read > 0 {
                            let chunk = buf.split_to(to_read);
                            handler.body_chunk(&chunk);
                            self.remaining -= to_read as u64;
                        }
                        if self.remaining > 0 {
                            return Ok(());
                        }
                    }
                    // Chunk data is followed by CRLF
                    if buf.len() < 2 {
                        return Ok(());
                    }
                    if &buf[..2] != b"\r\n" {
                        return Err(ClientError::protocol("chunk data not terminated by CRLF"));
                    }
                    buf.advance(2);
                    self.state = ParseState::ChunkSize;
                }
                ParseState::ChunkTrailer => {
                    let Some(line) = Self::take_line(buf, "trailer")? else {
                        return Ok(());
                    };
                    if line.is_empty() {
                        self.finish(handler);
                    } else {
                        let (name, value) = Self::split_header(&line)?;
                        handler.trailer(name, value);
                    }
                }
            }
        }
    }

    fn finish<H: H1ResponseHandler>(&mut self, handler: &mut H) {
        handler.complete();
        self.state = ParseState::Idle;
    }

    /// Called after headers are received (state `HeadersComplete`).
    pub fn set_body_mode<H: H1ResponseHandler>(&mut self, mode: BodyMode, handler: &mut H) {
        if self.state != ParseState::HeadersComplete {
            return;
        }
        self.until_close = false;
        self.remaining = 0;
        match mode {
            BodyMode::Empty | BodyMode::Length(0) => self.finish(handler),
            BodyMode::Length(n) => {
                self.remaining = n;
                self.state = ParseState::Body;
            }
            BodyMode::Chunked => self.state = ParseState::ChunkSize,
            BodyMode::UntilClose => {
                self.until_close = true;
                self.state = ParseState::Body;
            }
        }
    }

    /// The transport reported end of stream. Completes a read-until-close body; anywhere else
    /// the response was truncated.
    pub fn end_of_stream<H: H1ResponseHandler>(&mut self, handler: &mut H) -> Result<(), ClientError> {
        match self.state {
            ParseState::Idle => Ok(()),
            ParseState::Body if self.until_close => {
                self.finish(handler);
                Ok(())
            }
            state => Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("connection closed before response was complete ({:?})", state),
            ))),
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}
