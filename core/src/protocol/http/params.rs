/*
 * params.rs
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

//! Ordered request parameters.
//!
//! The OpenML REST API is order-sensitive, so parameters are a list, not a map. A name of
//! the form `name|mime-type` or `name|mime-type|filename` marks a file upload whose value
//! is the raw file content.

use crate::error::ClientError;

/// Separator marking a file-upload parameter name.
pub const FILE_SEPARATOR: char = '|';

/// Ordered `(name, value)` pairs. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, keeping insertion order.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// Builder-style `push`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Append a file upload: `name|mime_type[|filename]` with the raw content as value.
    pub fn push_file(
        &mut self,
        name: &str,
        mime_type: &str,
        filename: Option<&str>,
        content: impl Into<String>,
    ) -> &mut Self {
        let key = match filename {
            Some(f) => format!("{}{}{}{}{}", name, FILE_SEPARATOR, mime_type, FILE_SEPARATOR, f),
            None => format!("{}{}{}", name, FILE_SEPARATOR, mime_type),
        };
        self.push(key, content)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// True if any name carries the file-upload separator.
    pub fn has_file_upload(&self) -> bool {
        self.pairs.iter().any(|(n, _)| n.contains(FILE_SEPARATOR))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<Vec<(N, V)>> for Params {
    fn from(pairs: Vec<(N, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// Parsed form of a parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldName<'a> {
    Plain(&'a str),
    File {
        name: &'a str,
        mime_type: &'a str,
        filename: &'a str,
    },
}

impl<'a> FieldName<'a> {
    /// Split `name[|mime-type[|filename]]`. Empty fields around a separator, more than
    /// three fields, or control characters (CR, LF, ...) anywhere are rejected: the fields
    /// end up verbatim in multipart part headers.
    pub fn parse(raw: &'a str) -> Result<Self, ClientError> {
        if raw.chars().any(char::is_control) {
            return Err(ClientError::InvalidParameter(raw.to_string()));
        }
        if !raw.contains(FILE_SEPARATOR) {
            return Ok(FieldName::Plain(raw));
        }
        let fields: Vec<&str> = raw.split(FILE_SEPARATOR).collect();
        if fields.len() > 3 || fields.iter().any(|f| f.is_empty()) {
            return Err(ClientError::InvalidParameter(raw.to_string()));
        }
        Ok(FieldName::File {
            name: fields[0],
            mime_type: fields[1],
            filename: fields.get(2).copied().unwrap_or(fields[0]),
        })
    }
}
