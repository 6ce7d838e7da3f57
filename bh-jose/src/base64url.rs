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

use std::fmt;

use base64::{
    alphabet,
    engine::{general_purpose::URL_SAFE_NO_PAD, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use bherror::{traits::ForeignError as _, Result};

use crate::ParseError;

/// Decoder accepting `base64url` text as it appears in captured traffic:
/// padding is optional and non-canonical trailing bits are tolerated.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Returns the `base64url`-encoded string **without padding** of the given
/// `input`.
pub fn base64_url_encode<T: AsRef<[u8]>>(input: T) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Decodes the given `base64url`-encoded `payload` into bytes.
///
/// Unlike the encoder, the decoder is lenient: both padded and unpadded input
/// is accepted.
pub fn base64_url_decode<T: AsRef<[u8]>>(payload: T) -> Result<Vec<u8>, ParseError> {
    let payload = payload.as_ref();
    LENIENT_URL_SAFE
        .decode(payload)
        .match_foreign_err(|error| ParseError::InvalidBase64(error.to_string()))
}

/// An immutable `base64url` value.
///
/// The value keeps the exact text it was parsed from next to the decoded
/// bytes, so re-serializing an untouched token reproduces it bit for bit even
/// when the original encoding was padded or otherwise non-canonical.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Base64Url {
    encoded: String,
    decoded: Vec<u8>,
}

impl Base64Url {
    /// Encode `bytes` into a new canonical (unpadded) value.
    pub fn encode<T: AsRef<[u8]>>(bytes: T) -> Self {
        let decoded = bytes.as_ref().to_vec();
        Self {
            encoded: base64_url_encode(&decoded),
            decoded,
        }
    }

    /// Parse already encoded text.
    pub fn parse(encoded: &str) -> Result<Self, ParseError> {
        let decoded = base64_url_decode(encoded)?;
        Ok(Self {
            encoded: encoded.to_owned(),
            decoded,
        })
    }

    /// The empty value.
    pub fn empty() -> Self {
        Self::encode([])
    }

    /// The encoded text.
    pub fn as_encoded(&self) -> &str {
        &self.encoded
    }

    /// The decoded bytes.
    pub fn decoded(&self) -> &[u8] {
        &self.decoded
    }

    /// The decoded bytes as text, replacing invalid UTF-8 sequences.
    pub fn decode_to_string(&self) -> String {
        String::from_utf8_lossy(&self.decoded).into_owned()
    }

    /// The decoded bytes as text, failing if they are not valid UTF-8.
    pub fn decode_utf8(&self) -> Result<&str, ParseError> {
        std::str::from_utf8(&self.decoded).foreign_err(|| ParseError::InvalidUtf8)
    }

    /// Returns `true` if the value decodes to no bytes.
    pub fn is_empty(&self) -> bool {
        self.decoded.is_empty()
    }
}

impl fmt::Display for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl fmt::Debug for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Base64Url").field(&self.encoded).finish()
    }
}
