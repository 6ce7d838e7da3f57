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

use crate::{jose_object::split_compact, Base64Url, Header, Information, JoseObject, ParseError};

/// A JSON Web Encryption in compact serialization, as defined in [RFC7516].
///
/// The encrypted key is empty when the content encryption key is agreed
/// directly (`dir` and `ECDH-ES`).
///
/// [RFC7516]: https://datatracker.ietf.org/doc/html/rfc7516#section-7.1
#[derive(Debug, Clone, PartialEq)]
pub struct Jwe {
    header: Header,
    encrypted_key: Base64Url,
    iv: Base64Url,
    ciphertext: Base64Url,
    tag: Base64Url,
}

impl Jwe {
    /// Parses a compact serialization.
    pub fn parse(compact: &str) -> Result<Self, ParseError> {
        let parts: [Base64Url; 5] = split_compact(compact, 5)?
            .try_into()
            .map_err(|parts: Vec<Base64Url>| {
                bherror::Error::root(ParseError::InvalidPartCount(5, parts.len()))
            })?;
        let [header, encrypted_key, iv, ciphertext, tag] = parts;

        Ok(Self::from_parts(header, encrypted_key, iv, ciphertext, tag))
    }

    /// Builds a JWE from its encoded components.
    pub fn from_parts(
        header: Base64Url,
        encrypted_key: Base64Url,
        iv: Base64Url,
        ciphertext: Base64Url,
        tag: Base64Url,
    ) -> Self {
        Self {
            header: Header::new(header),
            encrypted_key,
            iv,
            ciphertext,
            tag,
        }
    }

    /// The protected header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The encrypted content encryption key.
    pub fn encrypted_key(&self) -> &Base64Url {
        &self.encrypted_key
    }

    /// The initialization vector.
    pub fn iv(&self) -> &Base64Url {
        &self.iv
    }

    /// The ciphertext.
    pub fn ciphertext(&self) -> &Base64Url {
        &self.ciphertext
    }

    /// The authentication tag.
    pub fn tag(&self) -> &Base64Url {
        &self.tag
    }

    /// The token in compact serialization.
    pub fn serialize(&self) -> String {
        format!(
            "{}.{}.{}.{}.{}",
            self.header.encoded(),
            self.encrypted_key,
            self.iv,
            self.ciphertext,
            self.tag
        )
    }
}

impl JoseObject for Jwe {
    fn header(&self) -> &Header {
        &self.header
    }

    fn serialize(&self) -> String {
        Jwe::serialize(self)
    }

    fn information(&self) -> Vec<Information> {
        Vec::new()
    }
}
