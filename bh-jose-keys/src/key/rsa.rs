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
    pkey::{HasPublic, PKey, Private, Public},
    rsa::{Rsa, RsaRef},
};

use super::{JoseKey, KeyMaterial};
use crate::{
    crypto::KeyManagementKey,
    jwk::{bignum_member, encode_bignum, Jwk},
    AsymmetricSigner, AsymmetricVerifier, ContentEncryptionMethod, CryptoError, JwsAlgorithm,
    KeyEncryptionAlgorithm, KeyError, Provider, SignatureVerifier, Signer,
};

/// Moduli of at least this many bits can encrypt.
const FULL_MODULUS_BITS: u32 = 2048;

/// An RSA key, public or private.
#[derive(Clone)]
pub struct RsaJwk {
    id: String,
    jwk: Jwk,
    public: PKey<Public>,
    private: Option<PKey<Private>>,
}

impl RsaJwk {
    /// A private JWK needs its CRT parameters in addition to `"d"`.
    pub(crate) fn from_jwk(id: String, jwk: Jwk) -> Result<Self, KeyError> {
        let error = || KeyError::InvalidJwk("invalid RSA key".to_owned());

        let public = Rsa::from_public_components(bignum_member(&jwk, "n")?, bignum_member(&jwk, "e")?)
            .foreign_err(error)?;
        let public = PKey::from_rsa(public).foreign_err(error)?;

        let private = if jwk.contains_key("d") {
            let rsa = Rsa::from_private_components(
                bignum_member(&jwk, "n")?,
                bignum_member(&jwk, "e")?,
                bignum_member(&jwk, "d")?,
                bignum_member(&jwk, "p")?,
                bignum_member(&jwk, "q")?,
                bignum_member(&jwk, "dp")?,
                bignum_member(&jwk, "dq")?,
                bignum_member(&jwk, "qi")?,
            )
            .foreign_err(error)?;
            if !rsa.check_key().foreign_err(error)? {
                return Err(Error::root(KeyError::InvalidJwk(
                    "RSA private key is inconsistent".to_owned(),
                )));
            }
            Some(PKey::from_rsa(rsa).foreign_err(error)?)
        } else {
            None
        };

        Ok(Self {
            id,
            jwk,
            public,
            private,
        })
    }

    /// The size of the modulus in bits.
    pub fn bits(&self) -> u32 {
        self.public.bits()
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

impl JoseKey for RsaJwk {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> String {
        format!("RSA {}", self.bits())
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
        self.bits() >= FULL_MODULUS_BITS
    }

    fn signing_algorithms(&self) -> Vec<JwsAlgorithm> {
        // only the two short standard sizes are restricted
        match self.bits() {
            512 => vec![JwsAlgorithm::Rs256],
            1024 => vec![
                JwsAlgorithm::Rs256,
                JwsAlgorithm::Rs384,
                JwsAlgorithm::Rs512,
                JwsAlgorithm::Ps256,
                JwsAlgorithm::Ps384,
            ],
            _ => vec![
                JwsAlgorithm::Rs256,
                JwsAlgorithm::Rs384,
                JwsAlgorithm::Rs512,
                JwsAlgorithm::Ps256,
                JwsAlgorithm::Ps384,
                JwsAlgorithm::Ps512,
            ],
        }
    }

    fn key_encryption_algorithms(&self) -> Vec<KeyEncryptionAlgorithm> {
        vec![
            KeyEncryptionAlgorithm::Rsa1_5,
            KeyEncryptionAlgorithm::RsaOaep,
            KeyEncryptionAlgorithm::RsaOaep256,
        ]
    }

    fn content_encryption_methods(
        &self,
        _algorithm: KeyEncryptionAlgorithm,
    ) -> Vec<ContentEncryptionMethod> {
        ContentEncryptionMethod::ALL.to_vec()
    }
}

impl KeyMaterial for RsaJwk {
    fn signer(
        &self,
        algorithm: JwsAlgorithm,
        _provider: Provider,
    ) -> Result<Box<dyn Signer>, CryptoError> {
        let private = self.private.clone().ok_or_else(|| {
            Error::root(CryptoError::SigningFailed("RSA private key required".to_owned()))
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
        Ok(KeyManagementKey::Rsa {
            public: self.public.clone(),
            private: self.private.clone(),
        })
    }
}

/// The public JWK of an RSA key.
pub(crate) fn public_jwk<T: HasPublic>(id: &str, rsa: &RsaRef<T>) -> Jwk {
    bh_jose::json_object!({
        "kty": "RSA",
        "e": encode_bignum(rsa.e()),
        "kid": id,
        "n": encode_bignum(rsa.n()),
    })
}

/// The private JWK of an RSA key, CRT parameters included.
pub(crate) fn private_jwk(id: &str, rsa: &RsaRef<Private>) -> Result<Jwk, KeyError> {
    let missing = |name: &str| {
        Error::root(KeyError::ConversionFailed(format!(
            "RSA key has no \"{name}\" parameter"
        )))
    };

    Ok(bh_jose::json_object!({
        "p": encode_bignum(rsa.p().ok_or_else(|| missing("p"))?),
        "kty": "RSA",
        "q": encode_bignum(rsa.q().ok_or_else(|| missing("q"))?),
        "d": encode_bignum(rsa.d()),
        "e": encode_bignum(rsa.e()),
        "kid": id,
        "qi": encode_bignum(rsa.iqmp().ok_or_else(|| missing("qi"))?),
        "dp": encode_bignum(rsa.dmp1().ok_or_else(|| missing("dp"))?),
        "dq": encode_bignum(rsa.dmq1().ok_or_else(|| missing("dq"))?),
        "n": encode_bignum(rsa.n()),
    }))
}
