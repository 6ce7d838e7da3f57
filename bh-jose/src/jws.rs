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

use bherror::Result;
use chrono::Utc;

use crate::{
    jose_object::split_compact, json, Base64Url, Claims, ClaimsType, Header, Information,
    JoseObject, ParseError,
};

/// Create the signing input of a `JWS`, given its encoded header and payload.
///
/// The input is constructed by concatenating the header and payload by the `.`
/// character, i.e. `<header>.<payload>`, as defined [here].
///
/// [here]: https://www.rfc-editor.org/rfc/rfc7515.html#section-5.1
pub fn construct_jws_signing_input(header: &str, payload: &str) -> String {
    format!("{header}.{payload}")
}

/// A JSON Web Signature in compact serialization, as defined in [RFC7515].
///
/// A `Jws` is immutable; signing or attacking one produces a new value.
///
/// [RFC7515]: https://datatracker.ietf.org/doc/html/rfc7515#section-7.1
#[derive(Debug, Clone, PartialEq)]
pub struct Jws {
    header: Header,
    claims: Claims,
    signature: Base64Url,
}

impl Jws {
    /// Parses a compact serialization.
    ///
    /// The payload does not have to be JSON.
    pub fn parse(compact: &str) -> Result<Self, ParseError> {
        let [header, payload, signature]: [Base64Url; 3] = split_compact(compact, 3)?
            .try_into()
            .map_err(|parts: Vec<Base64Url>| {
                bherror::Error::root(ParseError::InvalidPartCount(3, parts.len()))
            })?;

        Ok(Self::from_parts(header, payload, signature))
    }

    /// Builds a JWS from its encoded components.
    pub fn from_parts(header: Base64Url, payload: Base64Url, signature: Base64Url) -> Self {
        Self {
            header: Header::new(header),
            claims: Claims::new(payload),
            signature,
        }
    }

    /// The protected header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The payload.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// The signature.
    pub fn signature(&self) -> &Base64Url {
        &self.signature
    }

    /// The bytes covered by the signature: the encoded header and payload as
    /// they appear in the serialization.
    pub fn signing_input(&self) -> String {
        construct_jws_signing_input(
            self.header.encoded().as_encoded(),
            self.claims.encoded().as_encoded(),
        )
    }

    /// The token in compact serialization.
    pub fn serialize(&self) -> String {
        format!(
            "{}.{}.{}",
            self.header.encoded(),
            self.claims.encoded(),
            self.signature
        )
    }

    /// One item per time claim, flagged as a warning when the claim makes the
    /// token unusable right now.
    pub fn information(&self) -> Vec<Information> {
        let now = Utc::now();
        self.claims
            .time_claims()
            .iter()
            .map(|time_claim| Information::from_time_claim(time_claim, now))
            .collect()
    }

    /// A summary of the token, as shown in token listings.
    pub fn summary(&self) -> TokenSummary {
        let claims = match self.claims.claims_type() {
            ClaimsType::Json => json::pretty_print_or_original(&self.claims.decoded()),
            ClaimsType::Text => self.claims.decoded(),
        };

        TokenSummary {
            algorithm: self.header.algorithm(),
            key_id: self.header.key_id(),
            claims,
        }
    }
}

impl JoseObject for Jws {
    fn header(&self) -> &Header {
        &self.header
    }

    fn serialize(&self) -> String {
        Jws::serialize(self)
    }

    fn information(&self) -> Vec<Information> {
        Jws::information(self)
    }
}

/// The parts of a JWS shown when listing tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSummary {
    /// The `alg` header member, empty if absent.
    pub algorithm: String,
    /// The `kid` header member.
    pub key_id: Option<String>,
    /// The payload, pretty printed if it is JSON.
    pub claims: String,
}
