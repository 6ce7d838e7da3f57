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

use super::{JoseKey, KeyMaterial};
use crate::{
    crypto::KeyManagementKey,
    jwk::{bytes_member, Jwk},
    ContentEncryptionMethod, CryptoError, HmacSigner, JwsAlgorithm, KeyEncryptionAlgorithm,
    KeyError, Provider, SignatureVerifier, Signer,
};

/// A symmetric key, the JWK `"oct"` key type.
///
/// Every symmetric key signs with all HMAC algorithms regardless of its size.
/// The key management algorithms depend on the size: AES key wrapping needs
/// a key of exactly the AES key size, and direct encryption needs a key of
/// exactly the size of the content encryption key.
#[derive(Clone)]
pub struct OctJwk {
    id: String,
    jwk: Jwk,
    secret: Vec<u8>,
}

impl OctJwk {
    pub(crate) fn from_jwk(id: String, jwk: Jwk) -> Result<Self, KeyError> {
        let secret = bytes_member(&jwk, "k")?;

        Ok(Self { id, jwk, secret })
    }

    /// The size of the key in bits.
    pub fn bits(&self) -> usize {
        self.secret.len() * 8
    }

    pub(crate) fn jwk(&self) -> &Jwk {
        &self.jwk
    }
}

impl JoseKey for OctJwk {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> String {
        format!("OCT {}", self.bits())
    }

    fn is_public(&self) -> bool {
        false
    }

    fn has_private(&self) -> bool {
        true
    }

    fn can_sign(&self) -> bool {
        true
    }

    fn can_verify(&self) -> bool {
        true
    }

    fn can_encrypt(&self) -> bool {
        true
    }

    fn signing_algorithms(&self) -> Vec<JwsAlgorithm> {
        JwsAlgorithm::HMAC.to_vec()
    }

    fn key_encryption_algorithms(&self) -> Vec<KeyEncryptionAlgorithm> {
        match self.bits() {
            128 => vec![
                KeyEncryptionAlgorithm::Dir,
                KeyEncryptionAlgorithm::A128Kw,
                KeyEncryptionAlgorithm::A128GcmKw,
            ],
            192 => vec![
                KeyEncryptionAlgorithm::Dir,
                KeyEncryptionAlgorithm::A192Kw,
                KeyEncryptionAlgorithm::A192GcmKw,
            ],
            256 => vec![
                KeyEncryptionAlgorithm::Dir,
                KeyEncryptionAlgorithm::A256Kw,
                KeyEncryptionAlgorithm::A256GcmKw,
            ],
            384 | 512 => vec![KeyEncryptionAlgorithm::Dir],
            _ => Vec::new(),
        }
    }

    fn content_encryption_methods(
        &self,
        algorithm: KeyEncryptionAlgorithm,
    ) -> Vec<ContentEncryptionMethod> {
        if algorithm != KeyEncryptionAlgorithm::Dir {
            return ContentEncryptionMethod::ALL.to_vec();
        }

        // the CBC-HMAC methods split their key into a MAC half and an AES half
        ContentEncryptionMethod::ALL
            .into_iter()
            .filter(|method| method.key_length() == self.secret.len())
            .collect()
    }
}

impl KeyMaterial for OctJwk {
    fn signer(
        &self,
        algorithm: JwsAlgorithm,
        _provider: Provider,
    ) -> Result<Box<dyn Signer>, CryptoError> {
        Ok(Box::new(HmacSigner::new(&self.secret, algorithm)?))
    }

    fn verifier(
        &self,
        algorithm: JwsAlgorithm,
        _provider: Provider,
    ) -> Result<Box<dyn SignatureVerifier>, CryptoError> {
        Ok(Box::new(HmacSigner::new(&self.secret, algorithm)?))
    }

    fn key_management_key(
        &self,
        _provider: Provider,
        _error: fn(String) -> CryptoError,
    ) -> Result<KeyManagementKey, CryptoError> {
        Ok(KeyManagementKey::Symmetric(self.secret.clone()))
    }
}

/// The JWK of a symmetric key.
pub(crate) fn jwk(id: &str, secret: &[u8]) -> Jwk {
    bh_jose::json_object!({
        "kty": "oct",
        "kid": id,
        "k": bh_jose::base64_url_encode(secret),
    })
}
