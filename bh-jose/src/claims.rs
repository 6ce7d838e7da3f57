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

use serde_json::{Map, Value};

use crate::{json, Base64Url, TimeClaim};

/// The kind of content carried by a JWS payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimsType {
    /// The payload is a JSON object, i.e. a JWT claims set.
    Json,
    /// Anything else.
    Text,
}

/// The payload of a JWS.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    encoded: Base64Url,
    claims_type: ClaimsType,
    time_claims: Vec<TimeClaim>,
}

impl Claims {
    /// Wraps an encoded payload, detecting its type and time claims.
    pub fn new(encoded: Base64Url) -> Self {
        let object = json_object(&encoded);
        let claims_type = if object.is_some() {
            ClaimsType::Json
        } else {
            ClaimsType::Text
        };
        let time_claims = object
            .as_ref()
            .map(TimeClaim::from_claims)
            .unwrap_or_default();

        Self {
            encoded,
            claims_type,
            time_claims,
        }
    }

    /// Encodes the given payload text.
    pub fn from_text(text: &str) -> Self {
        Self::new(Base64Url::encode(text))
    }

    /// The encoded payload.
    pub fn encoded(&self) -> &Base64Url {
        &self.encoded
    }

    /// The decoded payload text.
    pub fn decoded(&self) -> String {
        self.encoded.decode_to_string()
    }

    /// Whether the payload is a JSON object.
    pub fn claims_type(&self) -> ClaimsType {
        self.claims_type
    }

    /// The `exp`, `nbf` and `iat` claims found in a JSON payload.
    pub fn time_claims(&self) -> &[TimeClaim] {
        &self.time_claims
    }

    /// The payload for display: compact JSON is pretty printed, anything else
    /// is shown verbatim.
    pub fn display_text(&self) -> String {
        let decoded = self.decoded();
        match self.claims_type {
            ClaimsType::Json if json::is_json_compact(&decoded) => {
                json::pretty_print_or_original(&decoded)
            }
            _ => decoded,
        }
    }
}

impl From<Base64Url> for Claims {
    fn from(encoded: Base64Url) -> Self {
        Self::new(encoded)
    }
}

fn json_object(encoded: &Base64Url) -> Option<Map<String, Value>> {
    match serde_json::from_slice(encoded.decoded()) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}
