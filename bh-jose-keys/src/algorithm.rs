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

use std::str::FromStr;

use bherror::Error;
use openssl::hash::MessageDigest;

use crate::CryptoError;

/// JWS `"alg"` header parameter value for **HMAC using SHA-256**, as specified
/// in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.1
pub const SIGNING_ALG_HS256: &str = "HS256";
/// JWS `"alg"` header parameter value for **HMAC using SHA-384**.
pub const SIGNING_ALG_HS384: &str = "HS384";
/// JWS `"alg"` header parameter value for **HMAC using SHA-512**.
pub const SIGNING_ALG_HS512: &str = "HS512";
/// JWS `"alg"` header parameter value for **RSASSA-PKCS1-v1_5 using SHA-256**.
pub const SIGNING_ALG_RS256: &str = "RS256";
/// JWS `"alg"` header parameter value for **RSASSA-PKCS1-v1_5 using SHA-384**.
pub const SIGNING_ALG_RS384: &str = "RS384";
/// JWS `"alg"` header parameter value for **RSASSA-PKCS1-v1_5 using SHA-512**.
pub const SIGNING_ALG_RS512: &str = "RS512";
/// JWS `"alg"` header parameter value for **RSASSA-PSS using SHA-256 and MGF1
/// with SHA-256**.
pub const SIGNING_ALG_PS256: &str = "PS256";
/// JWS `"alg"` header parameter value for **RSASSA-PSS using SHA-384 and MGF1
/// with SHA-384**.
pub const SIGNING_ALG_PS384: &str = "PS384";
/// JWS `"alg"` header parameter value for **RSASSA-PSS using SHA-512 and MGF1
/// with SHA-512**.
pub const SIGNING_ALG_PS512: &str = "PS512";
/// JWS `"alg"` header parameter value for **ECDSA using P-256 and SHA-256**.
pub const SIGNING_ALG_ES256: &str = "ES256";
/// JWS `"alg"` header parameter value for **ECDSA using secp256k1 and
/// SHA-256**, as specified in [RFC8812].
///
/// [RFC8812]: https://datatracker.ietf.org/doc/html/rfc8812#section-3.2
pub const SIGNING_ALG_ES256K: &str = "ES256K";
/// JWS `"alg"` header parameter value for **ECDSA using P-384 and SHA-384**.
pub const SIGNING_ALG_ES384: &str = "ES384";
/// JWS `"alg"` header parameter value for **ECDSA using P-521 and SHA-512**.
pub const SIGNING_ALG_ES512: &str = "ES512";
/// JWS `"alg"` header parameter value for **EdDSA**, as specified in
/// [RFC8037].
///
/// [RFC8037]: https://datatracker.ietf.org/doc/html/rfc8037#section-3.1
pub const SIGNING_ALG_EDDSA: &str = "EdDSA";

/// JWS signature algorithms.
///
/// Unlike a verifier, this enumeration deliberately includes weak algorithms
/// and key sizes, since tokens using them still need to be inspected and
/// re-signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JwsAlgorithm {
    /// HMAC with SHA-256
    Hs256,
    /// HMAC with SHA-384
    Hs384,
    /// HMAC with SHA-512
    Hs512,
    /// RSASSA-PKCS1-v1_5 with SHA-256
    Rs256,
    /// RSASSA-PKCS1-v1_5 with SHA-384
    Rs384,
    /// RSASSA-PKCS1-v1_5 with SHA-512
    Rs512,
    /// RSASSA-PSS with SHA-256 and MGF1 with SHA-256
    Ps256,
    /// RSASSA-PSS with SHA-384 and MGF1 with SHA-384
    Ps384,
    /// RSASSA-PSS with SHA-512 and MGF1 with SHA-512
    Ps512,
    /// ECDSA over P-256 with SHA-256
    Es256,
    /// ECDSA over secp256k1 with SHA-256
    Es256K,
    /// ECDSA over P-384 with SHA-384
    Es384,
    /// ECDSA over P-521 with SHA-512
    Es512,
    /// EdDSA over Ed25519 or Ed448
    EdDsa,
}

impl JwsAlgorithm {
    /// The HMAC algorithms, weakest first.
    pub const HMAC: [Self; 3] = [Self::Hs256, Self::Hs384, Self::Hs512];

    /// The ECDSA algorithms over NIST curves, weakest first.
    pub const ECDSA: [Self; 3] = [Self::Es256, Self::Es384, Self::Es512];

    /// Returns `true` for `HS256`, `HS384` and `HS512`.
    pub fn is_hmac(&self) -> bool {
        Self::HMAC.contains(self)
    }

    /// Returns `true` for the ECDSA algorithms, including `ES256K`.
    pub fn is_ecdsa(&self) -> bool {
        matches!(self, Self::Es256 | Self::Es256K | Self::Es384 | Self::Es512)
    }

    /// The digest the algorithm hashes the signing input with.
    ///
    /// `EdDSA` hashes internally; `None` is returned for it.
    pub(crate) fn message_digest(&self) -> Option<MessageDigest> {
        match self {
            Self::Hs256 | Self::Rs256 | Self::Ps256 | Self::Es256 | Self::Es256K => {
                Some(MessageDigest::sha256())
            }
            Self::Hs384 | Self::Rs384 | Self::Ps384 | Self::Es384 => Some(MessageDigest::sha384()),
            Self::Hs512 | Self::Rs512 | Self::Ps512 | Self::Es512 => Some(MessageDigest::sha512()),
            Self::EdDsa => None,
        }
    }
}

impl FromStr for JwsAlgorithm {
    type Err = Error<CryptoError>;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            SIGNING_ALG_HS256 => Ok(Self::Hs256),
            SIGNING_ALG_HS384 => Ok(Self::Hs384),
            SIGNING_ALG_HS512 => Ok(Self::Hs512),
            SIGNING_ALG_RS256 => Ok(Self::Rs256),
            SIGNING_ALG_RS384 => Ok(Self::Rs384),
            SIGNING_ALG_RS512 => Ok(Self::Rs512),
            SIGNING_ALG_PS256 => Ok(Self::Ps256),
            SIGNING_ALG_PS384 => Ok(Self::Ps384),
            SIGNING_ALG_PS512 => Ok(Self::Ps512),
            SIGNING_ALG_ES256 => Ok(Self::Es256),
            SIGNING_ALG_ES256K => Ok(Self::Es256K),
            SIGNING_ALG_ES384 => Ok(Self::Es384),
            SIGNING_ALG_ES512 => Ok(Self::Es512),
            SIGNING_ALG_EDDSA => Ok(Self::EdDsa),
            _ => Err(Error::root(CryptoError::UnsupportedAlgorithm(
                value.to_string(),
            ))),
        }
    }
}

impl std::fmt::Display for JwsAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Self::Hs256 => SIGNING_ALG_HS256,
            Self::Hs384 => SIGNING_ALG_HS384,
            Self::Hs512 => SIGNING_ALG_HS512,
            Self::Rs256 => SIGNING_ALG_RS256,
            Self::Rs384 => SIGNING_ALG_RS384,
            Self::Rs512 => SIGNING_ALG_RS512,
            Self::Ps256 => SIGNING_ALG_PS256,
            Self::Ps384 => SIGNING_ALG_PS384,
            Self::Ps512 => SIGNING_ALG_PS512,
            Self::Es256 => SIGNING_ALG_ES256,
            Self::Es256K => SIGNING_ALG_ES256K,
            Self::Es384 => SIGNING_ALG_ES384,
            Self::Es512 => SIGNING_ALG_ES512,
            Self::EdDsa => SIGNING_ALG_EDDSA,
        };
        write!(f, "{}", name)
    }
}

/// JWE `"alg"` header parameter value for **RSAES-PKCS1-v1_5**, as specified
/// in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-4.1
pub const KEY_ALG_RSA1_5: &str = "RSA1_5";
/// JWE `"alg"` header parameter value for **RSAES OAEP using default
/// parameters**.
pub const KEY_ALG_RSA_OAEP: &str = "RSA-OAEP";
/// JWE `"alg"` header parameter value for **RSAES OAEP using SHA-256 and MGF1
/// with SHA-256**.
pub const KEY_ALG_RSA_OAEP_256: &str = "RSA-OAEP-256";
/// JWE `"alg"` header parameter value for **ECDH-ES using Concat KDF**.
pub const KEY_ALG_ECDH_ES: &str = "ECDH-ES";
/// JWE `"alg"` header parameter value for **ECDH-ES using Concat KDF and CEK
/// wrapped with "A128KW"**.
pub const KEY_ALG_ECDH_ES_A128KW: &str = "ECDH-ES+A128KW";
/// JWE `"alg"` header parameter value for **ECDH-ES using Concat KDF and CEK
/// wrapped with "A192KW"**.
pub const KEY_ALG_ECDH_ES_A192KW: &str = "ECDH-ES+A192KW";
/// JWE `"alg"` header parameter value for **ECDH-ES using Concat KDF and CEK
/// wrapped with "A256KW"**.
pub const KEY_ALG_ECDH_ES_A256KW: &str = "ECDH-ES+A256KW";
/// JWE `"alg"` header parameter value for **direct use of a shared symmetric
/// key as the CEK**.
pub const KEY_ALG_DIR: &str = "dir";
/// JWE `"alg"` header parameter value for **AES Key Wrap with default initial
/// value using 128-bit key**.
pub const KEY_ALG_A128KW: &str = "A128KW";
/// JWE `"alg"` header parameter value for **AES Key Wrap using 192-bit key**.
pub const KEY_ALG_A192KW: &str = "A192KW";
/// JWE `"alg"` header parameter value for **AES Key Wrap using 256-bit key**.
pub const KEY_ALG_A256KW: &str = "A256KW";
/// JWE `"alg"` header parameter value for **Key wrapping with AES GCM using
/// 128-bit key**.
pub const KEY_ALG_A128GCMKW: &str = "A128GCMKW";
/// JWE `"alg"` header parameter value for **Key wrapping with AES GCM using
/// 192-bit key**.
pub const KEY_ALG_A192GCMKW: &str = "A192GCMKW";
/// JWE `"alg"` header parameter value for **Key wrapping with AES GCM using
/// 256-bit key**.
pub const KEY_ALG_A256GCMKW: &str = "A256GCMKW";
/// JWE `"alg"` header parameter value for **PBES2 with HMAC SHA-256 and
/// "A128KW" wrapping**.
pub const KEY_ALG_PBES2_HS256_A128KW: &str = "PBES2-HS256+A128KW";
/// JWE `"alg"` header parameter value for **PBES2 with HMAC SHA-384 and
/// "A192KW" wrapping**.
pub const KEY_ALG_PBES2_HS384_A192KW: &str = "PBES2-HS384+A192KW";
/// JWE `"alg"` header parameter value for **PBES2 with HMAC SHA-512 and
/// "A256KW" wrapping**.
pub const KEY_ALG_PBES2_HS512_A256KW: &str = "PBES2-HS512+A256KW";

/// JWE key management algorithms, i.e. the ways the content encryption key is
/// protected or agreed upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEncryptionAlgorithm {
    /// RSAES-PKCS1-v1_5
    Rsa1_5,
    /// RSAES OAEP with SHA-1
    RsaOaep,
    /// RSAES OAEP with SHA-256
    RsaOaep256,
    /// ECDH-ES key agreement, the agreed key is the CEK
    EcdhEs,
    /// ECDH-ES key agreement with 128-bit AES key wrap
    EcdhEsA128Kw,
    /// ECDH-ES key agreement with 192-bit AES key wrap
    EcdhEsA192Kw,
    /// ECDH-ES key agreement with 256-bit AES key wrap
    EcdhEsA256Kw,
    /// The symmetric key is the CEK
    Dir,
    /// 128-bit AES key wrap
    A128Kw,
    /// 192-bit AES key wrap
    A192Kw,
    /// 256-bit AES key wrap
    A256Kw,
    /// 128-bit AES GCM key wrap
    A128GcmKw,
    /// 192-bit AES GCM key wrap
    A192GcmKw,
    /// 256-bit AES GCM key wrap
    A256GcmKw,
    /// PBES2 with HMAC SHA-256 and 128-bit AES key wrap
    Pbes2Hs256A128Kw,
    /// PBES2 with HMAC SHA-384 and 192-bit AES key wrap
    Pbes2Hs384A192Kw,
    /// PBES2 with HMAC SHA-512 and 256-bit AES key wrap
    Pbes2Hs512A256Kw,
}

impl KeyEncryptionAlgorithm {
    /// Length in bytes of the AES key wrapping the CEK, for the algorithms
    /// that wrap it with AES.
    pub(crate) fn wrapping_key_length(&self) -> Option<usize> {
        match self {
            Self::EcdhEsA128Kw
            | Self::A128Kw
            | Self::A128GcmKw
            | Self::Pbes2Hs256A128Kw => Some(16),
            Self::EcdhEsA192Kw
            | Self::A192Kw
            | Self::A192GcmKw
            | Self::Pbes2Hs384A192Kw => Some(24),
            Self::EcdhEsA256Kw
            | Self::A256Kw
            | Self::A256GcmKw
            | Self::Pbes2Hs512A256Kw => Some(32),
            Self::Rsa1_5 | Self::RsaOaep | Self::RsaOaep256 | Self::EcdhEs | Self::Dir => None,
        }
    }

    /// Returns `true` if the algorithm produces no encrypted key, i.e. the
    /// CEK is the shared or agreed key itself.
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Dir | Self::EcdhEs)
    }
}

impl FromStr for KeyEncryptionAlgorithm {
    type Err = Error<CryptoError>;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            KEY_ALG_RSA1_5 => Ok(Self::Rsa1_5),
            KEY_ALG_RSA_OAEP => Ok(Self::RsaOaep),
            KEY_ALG_RSA_OAEP_256 => Ok(Self::RsaOaep256),
            KEY_ALG_ECDH_ES => Ok(Self::EcdhEs),
            KEY_ALG_ECDH_ES_A128KW => Ok(Self::EcdhEsA128Kw),
            KEY_ALG_ECDH_ES_A192KW => Ok(Self::EcdhEsA192Kw),
            KEY_ALG_ECDH_ES_A256KW => Ok(Self::EcdhEsA256Kw),
            KEY_ALG_DIR => Ok(Self::Dir),
            KEY_ALG_A128KW => Ok(Self::A128Kw),
            KEY_ALG_A192KW => Ok(Self::A192Kw),
            KEY_ALG_A256KW => Ok(Self::A256Kw),
            KEY_ALG_A128GCMKW => Ok(Self::A128GcmKw),
            KEY_ALG_A192GCMKW => Ok(Self::A192GcmKw),
            KEY_ALG_A256GCMKW => Ok(Self::A256GcmKw),
            KEY_ALG_PBES2_HS256_A128KW => Ok(Self::Pbes2Hs256A128Kw),
            KEY_ALG_PBES2_HS384_A192KW => Ok(Self::Pbes2Hs384A192Kw),
            KEY_ALG_PBES2_HS512_A256KW => Ok(Self::Pbes2Hs512A256Kw),
            _ => Err(Error::root(CryptoError::UnsupportedAlgorithm(
                value.to_string(),
            ))),
        }
    }
}

impl std::fmt::Display for KeyEncryptionAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Self::Rsa1_5 => KEY_ALG_RSA1_5,
            Self::RsaOaep => KEY_ALG_RSA_OAEP,
            Self::RsaOaep256 => KEY_ALG_RSA_OAEP_256,
            Self::EcdhEs => KEY_ALG_ECDH_ES,
            Self::EcdhEsA128Kw => KEY_ALG_ECDH_ES_A128KW,
            Self::EcdhEsA192Kw => KEY_ALG_ECDH_ES_A192KW,
            Self::EcdhEsA256Kw => KEY_ALG_ECDH_ES_A256KW,
            Self::Dir => KEY_ALG_DIR,
            Self::A128Kw => KEY_ALG_A128KW,
            Self::A192Kw => KEY_ALG_A192KW,
            Self::A256Kw => KEY_ALG_A256KW,
            Self::A128GcmKw => KEY_ALG_A128GCMKW,
            Self::A192GcmKw => KEY_ALG_A192GCMKW,
            Self::A256GcmKw => KEY_ALG_A256GCMKW,
            Self::Pbes2Hs256A128Kw => KEY_ALG_PBES2_HS256_A128KW,
            Self::Pbes2Hs384A192Kw => KEY_ALG_PBES2_HS384_A192KW,
            Self::Pbes2Hs512A256Kw => KEY_ALG_PBES2_HS512_A256KW,
        };
        write!(f, "{}", name)
    }
}

/// JWE `"enc"` header parameter value for **AES GCM using 128-bit key**, as
/// specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-5.1
pub const CONTENT_ENC_A128GCM: &str = "A128GCM";
/// JWE `"enc"` header parameter value for **AES GCM using 192-bit key**.
pub const CONTENT_ENC_A192GCM: &str = "A192GCM";
/// JWE `"enc"` header parameter value for **AES GCM using 256-bit key**.
pub const CONTENT_ENC_A256GCM: &str = "A256GCM";
/// JWE `"enc"` header parameter value for **AES_128_CBC_HMAC_SHA_256**.
pub const CONTENT_ENC_A128CBC_HS256: &str = "A128CBC-HS256";
/// JWE `"enc"` header parameter value for **AES_192_CBC_HMAC_SHA_384**.
pub const CONTENT_ENC_A192CBC_HS384: &str = "A192CBC-HS384";
/// JWE `"enc"` header parameter value for **AES_256_CBC_HMAC_SHA_512**.
pub const CONTENT_ENC_A256CBC_HS512: &str = "A256CBC-HS512";

/// JWE content encryption methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncryptionMethod {
    /// AES GCM with a 128-bit key
    A128Gcm,
    /// AES GCM with a 192-bit key
    A192Gcm,
    /// AES GCM with a 256-bit key
    A256Gcm,
    /// AES CBC with a 128-bit key and HMAC SHA-256
    A128CbcHs256,
    /// AES CBC with a 192-bit key and HMAC SHA-384
    A192CbcHs384,
    /// AES CBC with a 256-bit key and HMAC SHA-512
    A256CbcHs512,
}

impl ContentEncryptionMethod {
    /// Every method, in the order they are offered.
    pub const ALL: [Self; 6] = [
        Self::A128Gcm,
        Self::A192Gcm,
        Self::A256Gcm,
        Self::A128CbcHs256,
        Self::A192CbcHs384,
        Self::A256CbcHs512,
    ];

    /// Length in bytes of the content encryption key.
    ///
    /// The CBC-HMAC methods use a key twice the AES key size, the first half
    /// being the MAC key.
    pub fn key_length(&self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A192Gcm => 24,
            Self::A256Gcm | Self::A128CbcHs256 => 32,
            Self::A192CbcHs384 => 48,
            Self::A256CbcHs512 => 64,
        }
    }
}

impl FromStr for ContentEncryptionMethod {
    type Err = Error<CryptoError>;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            CONTENT_ENC_A128GCM => Ok(Self::A128Gcm),
            CONTENT_ENC_A192GCM => Ok(Self::A192Gcm),
            CONTENT_ENC_A256GCM => Ok(Self::A256Gcm),
            CONTENT_ENC_A128CBC_HS256 => Ok(Self::A128CbcHs256),
            CONTENT_ENC_A192CBC_HS384 => Ok(Self::A192CbcHs384),
            CONTENT_ENC_A256CBC_HS512 => Ok(Self::A256CbcHs512),
            _ => Err(Error::root(CryptoError::UnsupportedAlgorithm(
                value.to_string(),
            ))),
        }
    }
}

impl std::fmt::Display for ContentEncryptionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Self::A128Gcm => CONTENT_ENC_A128GCM,
            Self::A192Gcm => CONTENT_ENC_A192GCM,
            Self::A256Gcm => CONTENT_ENC_A256GCM,
            Self::A128CbcHs256 => CONTENT_ENC_A128CBC_HS256,
            Self::A192CbcHs384 => CONTENT_ENC_A192CBC_HS384,
            Self::A256CbcHs512 => CONTENT_ENC_A256CBC_HS512,
        };
        write!(f, "{}", name)
    }
}
