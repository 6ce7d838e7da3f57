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


use bh_jose::base64_url_encode;
use bherror::{traits::ForeignError as _, Error, Result};
use openssl::pkey::{HasPrivate, HasPublic, PKey, PKeyRef, Private, Public};

use super::{JoseKey, KeyMaterial};
use crate::{
    crypto::{AgreementCurve, KeyManagementKey},
    jwk::{bytes_member, string_member, Jwk, JWK_CURVE},
    AsymmetricSigner, AsymmetricVerifier, ContentEncryptionMethod, CryptoError, JwsAlgorithm,
    KeyEncryptionAlgorithm, KeyError, OkpCurve, Provider, SignatureVerifier, Signer,
};

/// An octet key pair as defined in [RFC8037], public or private.
///
/// Keys on `Ed25519` and `Ed448` sign, keys on `X25519` and `X448` encrypt.
///
/// [RFC8037]: https://datatracker.ietf.org/doc/html/rfc8037#section-2
#[derive(Clone)]
pub struct OkpJwk {
    id: String,
    jwk: Jwk,
    curve: OkpCurve,
    public: PKey<Public>,
    private: Option<PKey<Private>>,
}

impl OkpJwk {
    pub(crate) fn from_jwk(id: String, jwk: Jwk) -> Result<Self, KeyError> {
        let curve: OkpCurve = string_member(&jwk, JWK_CURVE)?.parse()?;
        let x = bytes_member(&jwk, "x")?;
        let public = PKey::public_key_from_raw_bytes(&x, curve.id())
            .foreign_err(|| KeyError::InvalidJwk(format!("invalid {curve} public key")))?;

        let private = if jwk.contains_key("d") {
            let d = bytes_member(&jwk, "d")?;
            let private = PKey::private_key_from_raw_bytes(&d, curve.id())
                .foreign_err(|| KeyError::InvalidJwk(format!("invalid {curve} private key")))?;
            if raw_public_key(&private)? != x {
                return Err(Error::root(KeyError::InvalidJwk(
                    "private key does not match the public key".to_owned(),
                )));
            }
            Some(private)
        } else {
            None
        };

        Ok(Self {
            id,
            jwk,
            curve,
            public,
            private,
        })
    }

    /// The curve the key is on.
    pub fn curve(&self) -> OkpCurve {
        self.curve
    }

    pub(crate) fn jwk(&self) -> &Jwk {
        &self.jwk
    }

    pub(crate) fn public_key(&self) -> &PKey<Public> {
        &self.public
    }

    pub(crate) fn private_key(&self) -> Option<&PKey<Private>> {
        self.private.as_ref()
    }
}

impl JoseKey for OkpJwk {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> String {
        self.curve.name().to_owned()
    }

    fn is_public(&self) -> bool {
        true
    }

    fn has_private(&self) -> bool {
        self.private.is_some()
    }

    fn can_sign(&self) -> bool {
        self.curve.is_signing_curve() && self.has_private()
    }

    fn can_verify(&self) -> bool {
        self.curve.is_signing_curve()
    }

    fn can_encrypt(&self) -> bool {
        !self.curve.is_signing_curve()
    }

    fn signing_algorithms(&self) -> Vec<JwsAlgorithm> {
        if self.curve.is_signing_curve() {
            vec![JwsAlgorithm::EdDsa]
        } else {
            Vec::new()
        }
    }

    fn key_encryption_algorithms(&self) -> Vec<KeyEncryptionAlgorithm> {
        if self.can_encrypt() {
            vec![KeyEncryptionAlgorithm::EcdhEs]
        } else {
            Vec::new()
        }
    }

    fn content_encryption_methods(
        &self,
        _algorithm: KeyEncryptionAlgorithm,
    ) -> Vec<ContentEncryptionMethod> {
        ContentEncryptionMethod::ALL.to_vec()
    }
}

impl KeyMaterial for OkpJwk {
    fn signer(
        &self,
        algorithm: JwsAlgorithm,
        _provider: Provider,
    ) -> Result<Box<dyn Signer>, CryptoError> {
        let private = self.private.clone().ok_or_else(|| {
            Error::root(CryptoError::SigningFailed("OKP private key required".to_owned()))
        })?;

        Ok(Box::new(AsymmetricSigner::new(private, algorithm)?))
    }

    fn verifier(
        &self,
        algorithm: JwsAlgorithm,
        _provider: Provider,
    ) -> Result<Box<dyn SignatureVerifier>, CryptoError> {
        Ok(Box::new(AsymmetricVerifier::new(
            self.public.clone(),
            algorithm,
        )?))
    }

    fn key_management_key(
        &self,
        _provider: Provider,
        _error: fn(String) -> CryptoError,
    ) -> Result<KeyManagementKey, CryptoError> {
        Ok(KeyManagementKey::Ecdh {
            curve: AgreementCurve::Okp(self.curve),
            public: self.public.clone(),
            private: self.private.clone(),
        })
    }
}

fn raw_public_key<T: HasPublic>(key: &PKeyRef<T>) -> Result<Vec<u8>, KeyError> {
    key.raw_public_key()
        .foreign_err(|| KeyError::ConversionFailed("OKP public key".to_owned()))
}

fn raw_private_key<T: HasPrivate>(key: &PKeyRef<T>) -> Result<Vec<u8>, KeyError> {
    key.raw_private_key()
        .foreign_err(|| KeyError::ConversionFailed("OKP private key".to_owned()))
}

/// The public JWK of an octet key pair.
pub(crate) fn public_jwk<T: HasPublic>(
    id: &str,
    key: &PKeyRef<T>,
    curve: OkpCurve,
) -> Result<Jwk, KeyError> {
    Ok(bh_jose::json_object!({
        "kty": "OKP",
        "crv": curve.name(),
        "kid": id,
        "x": base64_url_encode(raw_public_key(key)?),
    }))
}

/// The private JWK of an octet key pair.
pub(crate) fn private_jwk(
    id: &str,
    key: &PKeyRef<Private>,
    curve: OkpCurve,
) -> Result<Jwk, KeyError> {
    Ok(bh_jose::json_object!({
        "kty": "OKP",
        "d": base64_url_encode(raw_private_key(key)?),
        "crv": curve.name(),
        "kid": id,
        "x": base64_url_encode(raw_public_key(key)?),
    }))
}
