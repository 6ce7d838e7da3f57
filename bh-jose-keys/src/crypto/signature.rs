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
    traits::{ForeignError as _, PropagateError as _},
    Error, Result,
};
use openssl::{
    bn::BigNum,
    ecdsa::EcdsaSig,
    hash::{hash, MessageDigest},
    memcmp,
    pkey::{PKey, Private, Public},
    rsa::Padding,
    sign::{self, RsaPssSaltlen},
};

use crate::{CryptoError, JwsAlgorithm};

/// HMAC keys shorter than this many bytes are padded with trailing zeros.
///
/// Zero padding up to the hash block size does not change the MAC value, so
/// the padded key produces the same signatures as the original one while
/// passing minimum key length checks.
pub const HMAC_MINIMUM_KEY_LENGTH: usize = 64;

/// A signing backend bound to a key, producing JWS signatures.
///
/// The output of the signer, regardless of the algorithm, must be a valid
/// **JWS signature**, not yet base64url-encoded. See step 5 in [section 5.1 of
/// RFC7515](https://www.rfc-editor.org/rfc/rfc7515.html#section-5.1).
pub trait Signer {
    /// The algorithm this signer uses. Must be a constant function.
    fn algorithm(&self) -> JwsAlgorithm;

    /// Produce a JWS signature over the signing input `message`.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// A verification backend bound to a key.
pub trait SignatureVerifier {
    /// The algorithm this verifier checks. Must be a constant function.
    fn algorithm(&self) -> JwsAlgorithm;

    /// Checks `signature` over the signing input `message`.
    ///
    /// Returns `Ok(false)` for a signature that does not match; an error means
    /// the check itself could not be carried out.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, CryptoError>;
}

/// [`Signer`] and [`SignatureVerifier`] for the HMAC algorithms.
pub struct HmacSigner {
    secret: Vec<u8>,
    algorithm: JwsAlgorithm,
}

impl HmacSigner {
    /// Create an HMAC signer for `algorithm` using `secret` as the MAC key.
    ///
    /// The secret may be empty; see [`HMAC_MINIMUM_KEY_LENGTH`] for how short
    /// secrets are handled.
    pub fn new(secret: &[u8], algorithm: JwsAlgorithm) -> Result<Self, CryptoError> {
        if !algorithm.is_hmac() {
            return Err(Error::root(CryptoError::UnsupportedAlgorithm(
                algorithm.to_string(),
            )));
        }

        let mut secret = secret.to_vec();
        if secret.len() < HMAC_MINIMUM_KEY_LENGTH {
            secret.resize(HMAC_MINIMUM_KEY_LENGTH, 0);
        }

        Ok(Self { secret, algorithm })
    }

    fn mac(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let digest = message_digest(self.algorithm)?;
        let key = PKey::hmac(&self.secret)
            .foreign_err(|| CryptoError::SigningFailed("invalid HMAC key".to_owned()))?;
        let mut signer = sign::Signer::new(digest, &key)
            .foreign_err(|| CryptoError::SigningFailed("HMAC unavailable".to_owned()))?;
        signer
            .sign_oneshot_to_vec(message)
            .foreign_err(|| CryptoError::SigningFailed("HMAC computation failed".to_owned()))
    }
}

impl Signer for HmacSigner {
    fn algorithm(&self) -> JwsAlgorithm {
        self.algorithm
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.mac(message)
    }
}

impl SignatureVerifier for HmacSigner {
    fn algorithm(&self) -> JwsAlgorithm {
        self.algorithm
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        let expected = self.mac(message).with_err(|| {
            CryptoError::VerificationFailed("HMAC computation failed".to_owned())
        })?;

        // `memcmp::eq` requires equal lengths
        Ok(expected.len() == signature.len() && memcmp::eq(&expected, signature))
    }
}

/// [`Signer`] implementation for the RSA, ECDSA and EdDSA algorithms.
///
/// The caller is responsible for pairing the algorithm with a key of the
/// matching type and curve.
pub struct AsymmetricSigner {
    key: PKey<Private>,
    algorithm: JwsAlgorithm,
}

impl AsymmetricSigner {
    /// Create a signer for `algorithm` using the private `key`.
    pub fn new(key: PKey<Private>, algorithm: JwsAlgorithm) -> Result<Self, CryptoError> {
        if algorithm.is_hmac() {
            return Err(Error::root(CryptoError::UnsupportedAlgorithm(
                algorithm.to_string(),
            )));
        }

        Ok(Self { key, algorithm })
    }
}

impl Signer for AsymmetricSigner {
    fn algorithm(&self) -> JwsAlgorithm {
        self.algorithm
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let error = |message: &str| CryptoError::SigningFailed(message.to_owned());

        match self.algorithm {
            JwsAlgorithm::EdDsa => sign::Signer::new_without_digest(&self.key)
                .and_then(|mut signer| signer.sign_oneshot_to_vec(message))
                .foreign_err(|| error("EdDSA signing failed")),
            algorithm if algorithm.is_ecdsa() => {
                let digest = hash(message_digest(algorithm)?, message)
                    .foreign_err(|| error("hashing failed"))?;
                let ec_key = self
                    .key
                    .ec_key()
                    .foreign_err(|| error("not an EC key"))?;
                let signature = EcdsaSig::sign(&digest, &ec_key)
                    .foreign_err(|| error("ECDSA signing failed"))?;

                let length = ecdsa_coordinate_length(algorithm);
                let mut jws_signature = signature
                    .r()
                    .to_vec_padded(length as i32)
                    .foreign_err(|| error("invalid ECDSA signature"))?;
                jws_signature.extend(
                    signature
                        .s()
                        .to_vec_padded(length as i32)
                        .foreign_err(|| error("invalid ECDSA signature"))?,
                );
                Ok(jws_signature)
            }
            algorithm => {
                let mut signer = sign::Signer::new(message_digest(algorithm)?, &self.key)
                    .foreign_err(|| error("not an RSA key"))?;
                configure_rsa_padding(algorithm, &mut signer)
                    .foreign_err(|| error("RSA padding unavailable"))?;
                signer
                    .sign_oneshot_to_vec(message)
                    .foreign_err(|| error("RSA signing failed"))
            }
        }
    }
}

/// [`SignatureVerifier`] implementation for the RSA, ECDSA and EdDSA
/// algorithms.
pub struct AsymmetricVerifier {
    key: PKey<Public>,
    algorithm: JwsAlgorithm,
}

impl AsymmetricVerifier {
    /// Create a verifier for `algorithm` using the public `key`.
    pub fn new(key: PKey<Public>, algorithm: JwsAlgorithm) -> Result<Self, CryptoError> {
        if algorithm.is_hmac() {
            return Err(Error::root(CryptoError::UnsupportedAlgorithm(
                algorithm.to_string(),
            )));
        }

        Ok(Self { key, algorithm })
    }
}

impl SignatureVerifier for AsymmetricVerifier {
    fn algorithm(&self) -> JwsAlgorithm {
        self.algorithm
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        let error = |message: &str| CryptoError::VerificationFailed(message.to_owned());

        match self.algorithm {
            JwsAlgorithm::EdDsa => sign::Verifier::new_without_digest(&self.key)
                .and_then(|mut verifier| verifier.verify_oneshot(signature, message))
                .foreign_err(|| error("EdDSA verification failed")),
            algorithm if algorithm.is_ecdsa() => {
                let length = ecdsa_coordinate_length(algorithm);
                if signature.len() != 2 * length {
                    return Ok(false);
                }

                let (r, s) = signature.split_at(length);
                let r = BigNum::from_slice(r).foreign_err(|| error("invalid r"))?;
                let s = BigNum::from_slice(s).foreign_err(|| error("invalid s"))?;
                let signature = EcdsaSig::from_private_components(r, s)
                    .foreign_err(|| error("invalid ECDSA signature"))?;

                let digest = hash(message_digest(algorithm)?, message)
                    .foreign_err(|| error("hashing failed"))?;
                let ec_key = self.key.ec_key().foreign_err(|| error("not an EC key"))?;

                signature
                    .verify(&digest, &ec_key)
                    .foreign_err(|| error("ECDSA verification failed"))
            }
            algorithm => {
                let mut verifier = sign::Verifier::new(message_digest(algorithm)?, &self.key)
                    .foreign_err(|| error("not an RSA key"))?;
                configure_rsa_verifier_padding(algorithm, &mut verifier)
                    .foreign_err(|| error("RSA padding unavailable"))?;
                verifier
                    .verify_oneshot(signature, message)
                    .foreign_err(|| error("RSA verification failed"))
            }
        }
    }
}

fn message_digest(algorithm: JwsAlgorithm) -> Result<MessageDigest, CryptoError> {
    algorithm
        .message_digest()
        .ok_or_else(|| Error::root(CryptoError::UnsupportedAlgorithm(algorithm.to_string())))
}

/// Size in bytes of each of `r` and `s` in a JWS ECDSA signature.
fn ecdsa_coordinate_length(algorithm: JwsAlgorithm) -> usize {
    match algorithm {
        JwsAlgorithm::Es384 => 48,
        JwsAlgorithm::Es512 => 66,
        _ => 32,
    }
}

fn is_pss(algorithm: JwsAlgorithm) -> bool {
    matches!(
        algorithm,
        JwsAlgorithm::Ps256 | JwsAlgorithm::Ps384 | JwsAlgorithm::Ps512
    )
}

fn configure_rsa_padding(
    algorithm: JwsAlgorithm,
    signer: &mut sign::Signer,
) -> std::result::Result<(), openssl::error::ErrorStack> {
    if is_pss(algorithm) {
        signer.set_rsa_padding(Padding::PKCS1_PSS)?;
        signer.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)?;
    } else {
        signer.set_rsa_padding(Padding::PKCS1)?;
    }
    Ok(())
}

fn configure_rsa_verifier_padding(
    algorithm: JwsAlgorithm,
    verifier: &mut sign::Verifier,
) -> std::result::Result<(), openssl::error::ErrorStack> {
    if is_pss(algorithm) {
        verifier.set_rsa_padding(Padding::PKCS1_PSS)?;
        verifier.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)?;
    } else {
        verifier.set_rsa_padding(Padding::PKCS1)?;
    }
    Ok(())
}
