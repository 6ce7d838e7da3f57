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

/// Error that occurs when a key cannot be constructed, converted or stored.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum KeyError {
    /// The key is of a type or on a curve that is not supported.
    #[strum(to_string = "Unsupported key: {0}")]
    UnsupportedKey(String),
    /// A JWK is missing required members or holds invalid values.
    #[strum(to_string = "Invalid JWK: {0}")]
    InvalidJwk(String),
    /// A PEM document could not be parsed as a key.
    #[strum(to_string = "Invalid PEM: {0}")]
    InvalidPem(String),
    /// A password key object is missing members or holds invalid values.
    #[strum(to_string = "Invalid password key: {0}")]
    InvalidPasswordKey(String),
    /// The key cannot be represented in the requested format.
    #[strum(to_string = "Key conversion failed: {0}")]
    ConversionFailed(String),
    /// The persisted key store is not a JSON array of keys.
    #[strum(to_string = "Invalid key store: {0}")]
    InvalidKeyStore(String),
}

impl bherror::BhError for KeyError {}

/// Error that occurs when a cryptographic operation on a token fails.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum CryptoError {
    /// Producing a signature failed.
    #[strum(to_string = "Signing failed: {0}")]
    SigningFailed(String),
    /// Checking a signature could not be carried out.
    ///
    /// A signature that is merely wrong is not an error, see
    /// [`verify_jws`](crate::verify_jws).
    #[strum(to_string = "Verification failed: {0}")]
    VerificationFailed(String),
    /// Encrypting a token failed.
    #[strum(to_string = "Encryption failed: {0}")]
    EncryptionFailed(String),
    /// Decrypting a token failed.
    #[strum(to_string = "Decryption failed: {0}")]
    DecryptionFailed(String),
    /// The algorithm is unknown, or not usable with the chosen key.
    #[strum(to_string = "Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// The token could not be parsed.
    #[strum(to_string = "Malformed token: {0}")]
    MalformedToken(String),
}

impl bherror::BhError for CryptoError {}
