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


use bherror::{traits::ForeignError as _, Error, Result};
use openssl::{
    ec::{EcGroup, EcKey, EcKeyRef},
    pkey::{HasPublic, PKey, Private, Public},
};

use super::{JoseKey, KeyMaterial};
use crate::{
    crypto::{AgreementCurve, KeyManagementKey},
    jwk::{
        affine_coordinates, bignum_member, ec_public_key_from_jwk, string_member, Jwk, JWK_CURVE,
    },
    AsymmetricSigner, AsymmetricVerifier, ContentEncryptionMethod, CryptoError, EcCurve,
    JwsAlgorithm, KeyEncryptionAlgorithm, KeyError, Provider, SignatureVerifier, Signer,
};

/// An elliptic curve key, public or private.
#[derive(Clone)]
pub struct EcJwk {
    id: String,
    jwk: Jwk,
    curve: EcCurve,
    public: PKey<Public>,
    private: Option<PKey<Private>>,
}

impl EcJwk {
    pub(crate) fn from_jwk(id: String, jwk: Jwk) -> Result<Self, KeyError> {
        let error = || KeyError::InvalidJwk("invalid EC key".to_owned());

        let curve: EcCurve = string_member(&jwk, JWK_CURVE)?.parse()?;
        let public_key = ec_public_key_from_jwk(&jwk, curve)?;

        let private = if jwk.contains_key("d") {
            let group = EcGroup::from_curve_name(curve.nid()).foreign_err(error)?;
            let d = bignum_member(&jwk, "d")?;
            let private = EcKey::from_private_components(&group, &d, public_key.public_key())
                .foreign_err(error)?;
            private.check_key().foreign_err(|| {
                KeyError::InvalidJwk("private key does not match the public key".to_owned())
            })?;
            Some(PKey::from_ec_key(private).foreign_err(error)?)
        } else {
            None
        };

        Ok(Self {
            id,
            jwk,
            curve,
            public: PKey::from_ec_key(public_key).foreign_err(error)?,
            private,
        })
    }

    /// The curve the key is on.
    pub fn curve(&self) -> EcCurve {
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

    /// Keys on curves outside of the default provider need the extended one.
    fn check_provider(
        &self,
        provider: Provider,
        error: fn(String) -> CryptoError,
    ) -> Result<(), CryptoError> {
        if provider.supports_curve(self.curve.nid()) {
            Ok(())
        } else {
            Err(Error::root(error(format!(
                "{} keys are not supported by the {provider:?} provider",
                self.curve
            ))))
        }
    }
}

impl JoseKey for EcJwk {
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
        self.has_private()
    }

    fn can_verify(&self) -> bool {
        true
    }

    fn can_encrypt(&self) -> bool {
        self.curve != EcCurve::Secp256k1
    }

    fn signing_algorithms(&self) -> Vec<JwsAlgorithm> {
        vec![self.curve.signing_algorithm()]
    }

    fn key_encryption_algorithms(&self) -> Vec<KeyEncryptionAlgorithm> {
        if !self.can_encrypt() {
            return Vec::new();
        }

        vec![
            KeyEncryptionAlgorithm::EcdhEs,
            KeyEncryptionAlgorithm::EcdhEsA128Kw,
            KeyEncryptionAlgorithm::EcdhEsA192Kw,
            KeyEncryptionAlgorithm::EcdhEsA256Kw,
        ]
    }

    fn content_encryption_methods(
        &self,
        _algorithm: KeyEncryptionAlgorithm,
    ) -> Vec<ContentEncryptionMethod> {
        ContentEncryptionMethod::ALL.to_vec()
    }
}

impl KeyMaterial for EcJwk {
    fn signer(
        &self,
        algorithm: JwsAlgorithm,
        provider: Provider,
    ) -> Result<Box<dyn Signer>, CryptoError> {
        self.check_provider(provider, CryptoError::SigningFailed)?;
        let private = self.private.clone().ok_or_else(|| {
            Error::root(CryptoError::SigningFailed("EC private key required".to_owned()))
        })?;

        Ok(Box::new(AsymmetricSigner::new(private, algorithm)?))
    }

    fn verifier(
        &self,
        algorithm: JwsAlgorithm,
        provider: Provider,
    ) -> Result<Box<dyn SignatureVerifier>, CryptoError> {
        self.check_provider(provider, CryptoError::VerificationFailed)?;

        Ok(Box::new(AsymmetricVerifier::new(
            self.public.clone(),
            algorithm,
        )?))
    }

    fn key_management_key(
        &self,
        provider: Provider,
        error: fn(String) -> CryptoError,
    ) -> Result<KeyManagementKey, CryptoError> {
        self.check_provider(provider, error)?;

        Ok(KeyManagementKey::Ecdh {
            curve: AgreementCurve::Ec(self.curve),
            public: self.public.clone(),
            private: self.private.clone(),
        })
    }
}

/// The supported curve the key is on.
pub(crate) fn curve_of<T: HasPublic>(key: &EcKeyRef<T>) -> Result<EcCurve, KeyError> {
    key.group()
        .curve_name()
        .and_then(EcCurve::from_nid)
        .ok_or_else(|| Error::root(KeyError::UnsupportedKey("EC curve".to_owned())))
}

/// The public JWK of an EC key.
pub(crate) fn public_jwk<T: HasPublic>(
    id: &str,
    key: &EcKeyRef<T>,
    curve: EcCurve,
) -> Result<Jwk, KeyError> {
    let (x, y) = affine_coordinates(key, curve)?;

    Ok(bh_jose::json_object!({
        "kty": "EC",
        "crv": curve.name(),
        "kid": id,
        "x": bh_jose::base64_url_encode(x),
        "y": bh_jose::base64_url_encode(y),
    }))
}

/// The private JWK of an EC key, `"d"` padded to the size of the curve order.
pub(crate) fn private_jwk(
    id: &str,
    key: &EcKeyRef<Private>,
    curve: EcCurve,
) -> Result<Jwk, KeyError> {
    let (x, y) = affine_coordinates(key, curve)?;
    let d = key
        .private_key()
        .to_vec_padded(curve.coordinate_length() as i32)
        .foreign_err(|| KeyError::ConversionFailed("EC private key".to_owned()))?;

    Ok(bh_jose::json_object!({
        "kty": "EC",
        "d": bh_jose::base64_url_encode(d),
        "crv": curve.name(),
        "kid": id,
        "x": bh_jose::base64_url_encode(x),
        "y": bh_jose::base64_url_encode(y),
    }))
}
