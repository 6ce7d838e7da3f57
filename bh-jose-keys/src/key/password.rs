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


use bherror::{traits::ErrorContext as _, Error, Result};
use serde_json::{Map, Value};

use super::{JoseKey, KeyMaterial};
use crate::{
    crypto::KeyManagementKey, ContentEncryptionMethod, CryptoError, JwsAlgorithm,
    KeyEncryptionAlgorithm, KeyError, Provider, SignatureVerifier, Signer,
};

const KEY_ID: &str = "key_id";
const PASSWORD: &str = "password";
const SALT_LENGTH: &str = "salt_length";
const ITERATIONS: &str = "iterations";

/// The shortest PBES2 salt, in bytes, accepted for encryption.
pub const PBES2_MINIMUM_SALT_LENGTH: usize = 8;
/// The lowest PBES2 iteration count accepted for encryption.
pub const PBES2_MINIMUM_ITERATIONS: usize = 1000;
/// The highest PBES2 iteration count accepted, both for encryption and in
/// the `"p2c"` header of a token being decrypted.
pub const PBES2_MAXIMUM_ITERATIONS: usize = 1_000_000;

/// A password from which PBES2 derives key encryption keys, together with
/// the salt length and iteration count used when encrypting.
///
/// Password keys never sign.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordKey {
    id: String,
    password: String,
    salt_length: usize,
    iterations: usize,
}

impl PasswordKey {
    /// Creates a password key.
    pub fn new(id: &str, password: &str, salt_length: usize, iterations: usize) -> Self {
        Self {
            id: id.to_owned(),
            password: password.to_owned(),
            salt_length,
            iterations,
        }
    }

    /// The salt length in bytes.
    pub fn salt_length(&self) -> usize {
        self.salt_length
    }

    /// The PBES2 iteration count.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub(crate) fn is_password_object(json: &Map<String, Value>) -> bool {
        [KEY_ID, PASSWORD, SALT_LENGTH, ITERATIONS]
            .iter()
            .all(|member| json.contains_key(*member))
    }

    pub(crate) fn from_json(json: &Map<String, Value>) -> Result<Self, KeyError> {
        let string = |name: &str| {
            json.get(name).and_then(Value::as_str).ok_or_else(|| {
                Error::root(KeyError::InvalidPasswordKey(format!(
                    "\"{name}\" must be a string"
                )))
            })
        };
        let count = |name: &str| {
            json.get(name)
                .and_then(Value::as_u64)
                .and_then(|count| usize::try_from(count).ok())
                .ok_or_else(|| {
                    Error::root(KeyError::InvalidPasswordKey(format!(
                        "\"{name}\" must be a non-negative integer"
                    )))
                })
                .ctx(|| format!("value of \"{name}\" was {:?}", json.get(name)))
        };

        Ok(Self::new(
            string(KEY_ID)?,
            string(PASSWORD)?,
            count(SALT_LENGTH)?,
            count(ITERATIONS)?,
        ))
    }

    pub(crate) fn to_json(&self) -> Map<String, Value> {
        bh_jose::json_object!({
            PASSWORD: self.password,
            KEY_ID: self.id,
            SALT_LENGTH: self.salt_length,
            ITERATIONS: self.iterations,
        })
    }
}

impl JoseKey for PasswordKey {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> String {
        "Password".to_owned()
    }

    fn is_public(&self) -> bool {
        false
    }

    fn has_private(&self) -> bool {
        true
    }

    fn can_sign(&self) -> bool {
        false
    }

    fn can_verify(&self) -> bool {
        false
    }

    fn can_encrypt(&self) -> bool {
        !self.password.is_empty()
            && self.salt_length >= PBES2_MINIMUM_SALT_LENGTH
            && (PBES2_MINIMUM_ITERATIONS..=PBES2_MAXIMUM_ITERATIONS).contains(&self.iterations)
    }

    fn signing_algorithms(&self) -> Vec<JwsAlgorithm> {
        Vec::new()
    }

    fn key_encryption_algorithms(&self) -> Vec<KeyEncryptionAlgorithm> {
        vec![
            KeyEncryptionAlgorithm::Pbes2Hs256A128Kw,
            KeyEncryptionAlgorithm::Pbes2Hs384A192Kw,
            KeyEncryptionAlgorithm::Pbes2Hs512A256Kw,
        ]
    }

    fn content_encryption_methods(
        &self,
        _algorithm: KeyEncryptionAlgorithm,
    ) -> Vec<ContentEncryptionMethod> {
        ContentEncryptionMethod::ALL.to_vec()
    }
}

impl KeyMaterial for PasswordKey {
    fn signer(
        &self,
        algorithm: JwsAlgorithm,
        _provider: Provider,
    ) -> Result<Box<dyn Signer>, CryptoError> {
        Err(Error::root(CryptoError::UnsupportedAlgorithm(format!(
            "{algorithm} with a password"
        ))))
    }

    fn verifier(
        &self,
        algorithm: JwsAlgorithm,
        _provider: Provider,
    ) -> Result<Box<dyn SignatureVerifier>, CryptoError> {
        Err(Error::root(CryptoError::UnsupportedAlgorithm(format!(
            "{algorithm} with a password"
        ))))
    }

    fn key_management_key(
        &self,
        _provider: Provider,
        _error: fn(String) -> CryptoError,
    ) -> Result<KeyManagementKey, CryptoError> {
        Ok(KeyManagementKey::Password {
            password: self.password.clone(),
            salt_length: self.salt_length,
            iterations: self.iterations,
        })
    }
}
