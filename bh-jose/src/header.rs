// Copyright (C) 2020-2025  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use bherror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error, Result,
};
use serde_json::{Map, Value};

use crate::{json, Base64Url, ParseError};

/// `"alg"` header parameter name.
pub const HEADER_ALGORITHM: &str = "alg";
/// `"enc"` header parameter name.
pub const HEADER_ENCRYPTION: &str = "enc";
/// `"kid"` header parameter name.
pub const HEADER_KEY_ID: &str = "kid";
/// `"typ"` header parameter name.
pub const HEADER_TYPE: &str = "typ";
/// `"jwk"` header parameter name.
pub const HEADER_JWK: &str = "jwk";
/// `"jku"` header parameter name.
pub const HEADER_JWK_SET_URL: &str = "jku";
/// `"x5u"` header parameter name.
pub const HEADER_X509_URL: &str = "x5u";

/// The protected header of a JWS or JWE.
///
/// The header is kept in its encoded form, so a token whose header was never
/// touched serializes to the exact bytes it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Header {
    encoded: Base64Url,
}

impl Header {
    /// Wraps an encoded header.
    pub fn new(encoded: Base64Url) -> Self {
        Self { encoded }
    }

    /// Encodes the given header text as is.
    pub fn from_text(text: &str) -> Self {
        Self::new(Base64Url::encode(text))
    }

    /// Encodes a JSON object as compact JSON, keeping its member order.
    pub fn from_json(json: Map<String, Value>) -> Self {
        Self::from_text(&Value::Object(json).to_string())
    }

    /// The encoded header.
    pub fn encoded(&self) -> &Base64Url {
        &self.encoded
    }

    /// The decoded header text.
    pub fn decoded(&self) -> String {
        self.encoded.decode_to_string()
    }

    /// Parses the header as a JSON object.
    pub fn json(&self) -> Result<Map<String, Value>, ParseError> {
        let text = self.encoded.decode_utf8()?;
        let value: Value = serde_json::from_str(text)
            .match_foreign_err(|error| ParseError::InvalidJson(error.to_string()))?;

        match value {
            Value::Object(object) => Ok(object),
            other => Err(Error::root(ParseError::UnexpectedJsonType(
                "header is not a JSON object".to_owned(),
            )))
            .ctx(|| format!("header value: {other}")),
        }
    }

    fn string_member(&self, name: &str) -> Option<String> {
        self.json()
            .ok()?
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    /// The `alg` member, or an empty string if it is absent or the header is
    /// not a JSON object.
    pub fn algorithm(&self) -> String {
        self.string_member(HEADER_ALGORITHM).unwrap_or_default()
    }

    /// The `kid` member, if present.
    pub fn key_id(&self) -> Option<String> {
        self.string_member(HEADER_KEY_ID)
    }

    /// Returns `true` if the header text contains no insignificant whitespace,
    /// i.e. pretty printing and compacting it again reproduces it exactly.
    ///
    /// Only compact headers may be replaced by a re-rendered version of
    /// themselves without changing the signed bytes.
    pub fn is_compact(&self) -> bool {
        let decoded = self.decoded();
        json::pretty_print_json(&decoded)
            .and_then(|pretty| json::compact_json(&pretty))
            .is_ok_and(|compact| compact == decoded)
    }

    /// The header text for display: pretty printed when the header is compact,
    /// verbatim otherwise.
    pub fn display_text(&self) -> String {
        let decoded = self.decoded();
        if self.is_compact() {
            json::pretty_print_or_original(&decoded)
        } else {
            decoded
        }
    }

    /// Returns a new header with the given members inserted.
    ///
    /// Existing members keep their position, new members are appended. A
    /// header that is not a JSON object is treated as an empty object.
    pub fn with_members<I>(&self, members: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut json = self.json().unwrap_or_default();
        json.extend(members);
        Self::from_json(json)
    }

    /// Returns a new header with the member `name` set to `value`.
    pub fn with_member(&self, name: &str, value: Value) -> Self {
        self.with_members([(name.to_owned(), value)])
    }

    /// Returns a new header with the `alg` member set to `algorithm`.
    pub fn with_algorithm(&self, algorithm: &str) -> Self {
        self.with_member(HEADER_ALGORITHM, Value::String(algorithm.to_owned()))
    }
}

impl From<Base64Url> for Header {
    fn from(encoded: Base64Url) -> Self {
        Self::new(encoded)
    }
}
