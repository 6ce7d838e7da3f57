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


//! The keys tokens are signed, verified, encrypted and decrypted with.

mod ec;
mod oct;
mod okp;
mod password;
mod rsa;

use bherror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error, Result,
};
use openssl::pkey::{Id, PKey, Private, Public};
use serde_json::{Map, Value};

pub use ec::EcJwk;
pub use oct::OctJwk;
pub use okp::OkpJwk;
pub use password::{
    PasswordKey, PBES2_MAXIMUM_ITERATIONS, PBES2_MINIMUM_ITERATIONS, PBES2_MINIMUM_SALT_LENGTH,
};
pub use rsa::RsaJwk;

use crate::{
    crypto::KeyManagementKey,
    jwk::{self, Jwk, JWK_KEY_ID, JWK_KEY_TYPE},
    ContentEncryptionMethod, CryptoError, EcCurve, JweDecrypter, JweEncrypter, JwsAlgorithm,
    KeyEncryptionAlgorithm, KeyError, OkpCurve, Provider, ProviderResolver, SignatureVerifier,
    Signer,
};

/// JWK members that only private keys carry.
const PRIVATE_MEMBERS: [&str; 7] = ["d", "p", "q", "dp", "dq", "qi", "oth"];

/// What a key is and what it may be used for.
///
/// The algorithm lists are derived from the key type and size, and are in the
/// order they are offered to a user. An operation outside of these lists is
/// rejected by [`Key`] before any cryptography takes place.
pub trait JoseKey {
    /// The identifier of the key, its JWK `"kid"`.
    fn id(&self) -> &str;

    /// A short human-readable description, e.g. `RSA 2048` or `P-256`.
    fn description(&self) -> String;

    /// Returns `true` for asymmetric keys.
    fn is_public(&self) -> bool;

    /// Returns `true` if the key holds secret material.
    fn has_private(&self) -> bool;

    /// Returns `true` if the key can produce signatures.
    fn can_sign(&self) -> bool;

    /// Returns `true` if the key can check signatures.
    fn can_verify(&self) -> bool;

    /// Returns `true` if the key can encrypt tokens.
    fn can_encrypt(&self) -> bool;

    /// Returns `true` if the key can decrypt tokens.
    fn can_decrypt(&self) -> bool {
        self.can_encrypt() && self.has_private()
    }

    /// The JWS algorithms the key signs and verifies with.
    fn signing_algorithms(&self) -> Vec<JwsAlgorithm>;

    /// The JWE key management algorithms the key supports.
    fn key_encryption_algorithms(&self) -> Vec<KeyEncryptionAlgorithm>;

    /// The JWE content encryption methods usable with the key management
    /// algorithm `algorithm`.
    fn content_encryption_methods(
        &self,
        algorithm: KeyEncryptionAlgorithm,
    ) -> Vec<ContentEncryptionMethod>;
}

/// The cryptographic backends of a key kind.
///
/// Callers have already checked the algorithm against the [`JoseKey`] lists.
pub(crate) trait KeyMaterial {
    fn signer(
        &self,
        algorithm: JwsAlgorithm,
        provider: Provider,
    ) -> Result<Box<dyn Signer>, CryptoError>;

    fn verifier(
        &self,
        algorithm: JwsAlgorithm,
        provider: Provider,
    ) -> Result<Box<dyn SignatureVerifier>, CryptoError>;

    fn key_management_key(
        &self,
        provider: Provider,
        error: fn(String) -> CryptoError,
    ) -> Result<KeyManagementKey, CryptoError>;
}

/// A key of any supported kind.
///
/// Keys are immutable. They are created from a JWK, a PEM document or the
/// parameters of a password, and hand out signers, verifiers, encrypters and
/// decrypters for the algorithms they support.
#[derive(Clone)]
pub enum Key {
    /// An RSA key pair or public key.
    Rsa(RsaJwk),
    /// An elliptic curve key pair or public key.
    Ec(EcJwk),
    /// An octet key pair (Edwards or Montgomery curve) or its public half.
    Okp(OkpJwk),
    /// A symmetric key.
    Oct(OctJwk),
    /// A password, used with PBES2 key encryption.
    Password(PasswordKey),
}

impl Key {
    /// Creates a key from a JWK.
    ///
    /// A JWK without a `"kid"` is identified by its [RFC7638] thumbprint, which
    /// is added to the stored JWK.
    ///
    /// [RFC7638]: https://datatracker.ietf.org/doc/html/rfc7638
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, KeyError> {
        let mut jwk = jwk.clone();

        let id = match jwk.get(JWK_KEY_ID) {
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(Error::root(KeyError::InvalidJwk(
                    "\"kid\" member is not a string".to_owned(),
                )))
                .ctx(|| format!("value of \"kid\" was {other}"))
            }
            None => {
                let id = jwk::jwk_thumbprint(&jwk)?;
                jwk.insert(JWK_KEY_ID.to_owned(), Value::String(id.clone()));
                id
            }
        };

        let key_type = jwk::string_member(&jwk, JWK_KEY_TYPE)?.to_owned();
        match key_type.as_str() {
            "RSA" => RsaJwk::from_jwk(id, jwk).map(Self::Rsa),
            "EC" => EcJwk::from_jwk(id, jwk).map(Self::Ec),
            "OKP" => OkpJwk::from_jwk(id, jwk).map(Self::Okp),
            "oct" => OctJwk::from_jwk(id, jwk).map(Self::Oct),
            other => Err(Error::root(KeyError::UnsupportedKey(format!(
                "key type {other}"
            )))),
        }
    }

    /// Creates a key from a PEM document, giving it the identifier `id`.
    ///
    /// Private keys may be PKCS#8, PKCS#1 (RSA) or SEC1 (EC); public keys may
    /// be SubjectPublicKeyInfo or PKCS#1 (RSA).
    pub fn from_pem(id: &str, pem: &str) -> Result<Self, KeyError> {
        let mut pem = pem.trim().to_owned();
        pem.push('\n');
        let pem = pem.as_bytes();

        let jwk = if let Ok(private) = PKey::private_key_from_pem(pem) {
            private_jwk(id, &private)?
        } else if let Ok(public) = PKey::public_key_from_pem(pem) {
            public_jwk(id, &public)?
        } else if let Ok(rsa) = openssl::rsa::Rsa::public_key_from_pem_pkcs1(pem) {
            rsa::public_jwk(id, &rsa)
        } else {
            return Err(Error::root(KeyError::InvalidPem(
                "not a supported private or public key".to_owned(),
            )));
        };

        Self::from_jwk(&jwk)
    }

    /// Creates a key from its persisted JSON form: either a JWK or a password
    /// key object.
    pub fn from_json(json: &Map<String, Value>) -> Result<Self, KeyError> {
        if PasswordKey::is_password_object(json) {
            PasswordKey::from_json(json).map(Self::Password)
        } else {
            Self::from_jwk(json)
        }
    }

    /// Generates an RSA key pair with a modulus of `bits` bits.
    pub fn generate_rsa(id: &str, bits: u32) -> Result<Self, KeyError> {
        let rsa = openssl::rsa::Rsa::generate(bits)
            .foreign_err(|| KeyError::UnsupportedKey(format!("RSA {bits}")))?;
        Self::from_jwk(&rsa::private_jwk(id, &rsa)?)
    }

    /// Generates an EC key pair on `curve`.
    pub fn generate_ec(id: &str, curve: EcCurve) -> Result<Self, KeyError> {
        let error = || KeyError::UnsupportedKey(format!("EC curve {curve}"));

        let group = openssl::ec::EcGroup::from_curve_name(curve.nid()).foreign_err(error)?;
        let key = openssl::ec::EcKey::generate(&group).foreign_err(error)?;
        Self::from_jwk(&ec::private_jwk(id, &key, curve)?)
    }

    /// Generates an octet key pair on `curve`.
    pub fn generate_okp(id: &str, curve: OkpCurve) -> Result<Self, KeyError> {
        let key = match curve {
            OkpCurve::Ed25519 => PKey::generate_ed25519(),
            OkpCurve::Ed448 => PKey::generate_ed448(),
            OkpCurve::X25519 => PKey::generate_x25519(),
            OkpCurve::X448 => PKey::generate_x448(),
        }
        .foreign_err(|| KeyError::UnsupportedKey(format!("OKP curve {curve}")))?;

        Self::from_jwk(&okp::private_jwk(id, &key, curve)?)
    }

    /// Generates a random symmetric key of `bits` bits.
    pub fn generate_oct(id: &str, bits: usize) -> Result<Self, KeyError> {
        let mut secret = vec![0; bits / 8];
        openssl::rand::rand_bytes(&mut secret)
            .foreign_err(|| KeyError::UnsupportedKey("random source unavailable".to_owned()))?;

        Self::from_jwk(&oct::jwk(id, &secret))
    }

    /// The full JWK of the key, including private members.
    ///
    /// A key created from a JWK returns the members it was created from, in
    /// their original order.
    pub fn to_jwk(&self) -> Result<Jwk, KeyError> {
        match self {
            Self::Rsa(key) => Ok(key.jwk().clone()),
            Self::Ec(key) => Ok(key.jwk().clone()),
            Self::Okp(key) => Ok(key.jwk().clone()),
            Self::Oct(key) => Ok(key.jwk().clone()),
            Self::Password(_) => Err(Error::root(KeyError::ConversionFailed(
                "password keys have no JWK".to_owned(),
            ))),
        }
    }

    /// The public JWK of an asymmetric key: its JWK without the private
    /// members.
    pub fn to_public_jwk(&self) -> Result<Jwk, KeyError> {
        if !self.is_public() {
            return Err(Error::root(KeyError::ConversionFailed(format!(
                "{} keys have no public JWK",
                self.description()
            ))));
        }

        let mut jwk = self.to_jwk()?;
        jwk.retain(|name, _| !PRIVATE_MEMBERS.contains(&name.as_str()));
        Ok(jwk)
    }

    /// The key as a PEM document: PKCS#8 if it is private,
    /// SubjectPublicKeyInfo otherwise.
    pub fn to_pem(&self) -> Result<String, KeyError> {
        match self.asymmetric_keys()? {
            (_, Some(private)) => pem_string(private.private_key_to_pem_pkcs8()),
            (public, None) => pem_string(public.public_key_to_pem()),
        }
    }

    /// The public half of the key as a SubjectPublicKeyInfo PEM document.
    pub fn to_public_pem(&self) -> Result<String, KeyError> {
        let (public, _) = self.asymmetric_keys()?;
        pem_string(public.public_key_to_pem())
    }

    /// The persisted JSON form of the key, read back by [`Key::from_json`].
    pub fn to_json(&self) -> Map<String, Value> {
        match self {
            Self::Rsa(key) => key.jwk().clone(),
            Self::Ec(key) => key.jwk().clone(),
            Self::Okp(key) => key.jwk().clone(),
            Self::Oct(key) => key.jwk().clone(),
            Self::Password(key) => key.to_json(),
        }
    }

    /// A signer for `algorithm`.
    pub fn signer(&self, algorithm: JwsAlgorithm) -> Result<Box<dyn Signer>, CryptoError> {
        self.signer_with(algorithm, &ProviderResolver::default())
    }

    /// A signer for `algorithm`, backed by the provider `resolver` picks.
    pub fn signer_with(
        &self,
        algorithm: JwsAlgorithm,
        resolver: &ProviderResolver,
    ) -> Result<Box<dyn Signer>, CryptoError> {
        if !self.can_sign() {
            return Err(Error::root(CryptoError::SigningFailed(format!(
                "key {} cannot sign",
                self.id()
            ))));
        }
        self.check_signing_algorithm(algorithm)?;

        self.material().signer(algorithm, resolver.resolve())
    }

    /// A verifier for `algorithm`.
    pub fn verifier(
        &self,
        algorithm: JwsAlgorithm,
    ) -> Result<Box<dyn SignatureVerifier>, CryptoError> {
        self.verifier_with(algorithm, &ProviderResolver::default())
    }

    /// A verifier for `algorithm`, backed by the provider `resolver` picks.
    pub fn verifier_with(
        &self,
        algorithm: JwsAlgorithm,
        resolver: &ProviderResolver,
    ) -> Result<Box<dyn SignatureVerifier>, CryptoError> {
        if !self.can_verify() {
            return Err(Error::root(CryptoError::VerificationFailed(format!(
                "key {} cannot verify",
                self.id()
            ))));
        }
        self.check_signing_algorithm(algorithm)?;

        self.material().verifier(algorithm, resolver.resolve())
    }

    /// An encrypter for the key management algorithm `algorithm` and the
    /// content encryption method `method`.
    pub fn encrypter(
        &self,
        algorithm: KeyEncryptionAlgorithm,
        method: ContentEncryptionMethod,
    ) -> Result<JweEncrypter, CryptoError> {
        self.encrypter_with(algorithm, method, &ProviderResolver::default())
    }

    /// Like [`Key::encrypter`], backed by the provider `resolver` picks.
    pub fn encrypter_with(
        &self,
        algorithm: KeyEncryptionAlgorithm,
        method: ContentEncryptionMethod,
        resolver: &ProviderResolver,
    ) -> Result<JweEncrypter, CryptoError> {
        if !self.can_encrypt() {
            return Err(Error::root(CryptoError::EncryptionFailed(format!(
                "key {} cannot encrypt",
                self.id()
            ))));
        }
        self.check_key_encryption_algorithm(algorithm)?;
        if !self.content_encryption_methods(algorithm).contains(&method) {
            return Err(Error::root(CryptoError::UnsupportedAlgorithm(format!(
                "{method} with {algorithm} and key {}",
                self.id()
            ))));
        }

        let key = self
            .material()
            .key_management_key(resolver.resolve(), CryptoError::EncryptionFailed)?;
        Ok(JweEncrypter::new(key, algorithm, method))
    }

    /// A decrypter for the key management algorithm `algorithm`.
    pub fn decrypter(&self, algorithm: KeyEncryptionAlgorithm) -> Result<JweDecrypter, CryptoError> {
        self.decrypter_with(algorithm, &ProviderResolver::default())
    }

    /// Like [`Key::decrypter`], backed by the provider `resolver` picks.
    pub fn decrypter_with(
        &self,
        algorithm: KeyEncryptionAlgorithm,
        resolver: &ProviderResolver,
    ) -> Result<JweDecrypter, CryptoError> {
        if !self.can_decrypt() {
            return Err(Error::root(CryptoError::DecryptionFailed(format!(
                "key {} cannot decrypt",
                self.id()
            ))));
        }
        self.check_key_encryption_algorithm(algorithm)?;

        let key = self
            .material()
            .key_management_key(resolver.resolve(), CryptoError::DecryptionFailed)?;
        Ok(JweDecrypter::new(key, algorithm))
    }

    fn check_signing_algorithm(&self, algorithm: JwsAlgorithm) -> Result<(), CryptoError> {
        if self.signing_algorithms().contains(&algorithm) {
            Ok(())
        } else {
            Err(Error::root(CryptoError::UnsupportedAlgorithm(format!(
                "{algorithm} with key {}",
                self.id()
            ))))
        }
    }

    fn check_key_encryption_algorithm(
        &self,
        algorithm: KeyEncryptionAlgorithm,
    ) -> Result<(), CryptoError> {
        if self.key_encryption_algorithms().contains(&algorithm) {
            Ok(())
        } else {
            Err(Error::root(CryptoError::UnsupportedAlgorithm(format!(
                "{algorithm} with key {}",
                self.id()
            ))))
        }
    }

    fn asymmetric_keys(&self) -> Result<(&PKey<Public>, Option<&PKey<Private>>), KeyError> {
        match self {
            Self::Rsa(key) => Ok((key.public_key(), key.private_key())),
            Self::Ec(key) => Ok((key.public_key(), key.private_key())),
            Self::Okp(key) => Ok((key.public_key(), key.private_key())),
            Self::Oct(_) | Self::Password(_) => Err(Error::root(KeyError::ConversionFailed(
                format!("{} keys have no PEM form", self.description()),
            ))),
        }
    }

    fn kind(&self) -> &dyn JoseKey {
        match self {
            Self::Rsa(key) => key,
            Self::Ec(key) => key,
            Self::Okp(key) => key,
            Self::Oct(key) => key,
            Self::Password(key) => key,
        }
    }

    fn material(&self) -> &dyn KeyMaterial {
        match self {
            Self::Rsa(key) => key,
            Self::Ec(key) => key,
            Self::Okp(key) => key,
            Self::Oct(key) => key,
            Self::Password(key) => key,
        }
    }
}

impl JoseKey for Key {
    fn id(&self) -> &str {
        self.kind().id()
    }

    fn description(&self) -> String {
        self.kind().description()
    }

    fn is_public(&self) -> bool {
        self.kind().is_public()
    }

    fn has_private(&self) -> bool {
        self.kind().has_private()
    }

    fn can_sign(&self) -> bool {
        self.kind().can_sign()
    }

    fn can_verify(&self) -> bool {
        self.kind().can_verify()
    }

    fn can_encrypt(&self) -> bool {
        self.kind().can_encrypt()
    }

    fn can_decrypt(&self) -> bool {
        self.kind().can_decrypt()
    }

    fn signing_algorithms(&self) -> Vec<JwsAlgorithm> {
        self.kind().signing_algorithms()
    }

    fn key_encryption_algorithms(&self) -> Vec<KeyEncryptionAlgorithm> {
        self.kind().key_encryption_algorithms()
    }

    fn content_encryption_methods(
        &self,
        algorithm: KeyEncryptionAlgorithm,
    ) -> Vec<ContentEncryptionMethod> {
        self.kind().content_encryption_methods(algorithm)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.id(), self.description())
    }
}

impl std::fmt::Debug for Key {
    /// Secret material is never printed.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("id", &self.id())
            .field("description", &self.description())
            .field("has_private", &self.has_private())
            .finish()
    }
}

impl PartialEq for Key {
    /// Keys are equal when their persisted forms are.
    fn eq(&self, other: &Self) -> bool {
        self.to_json() == other.to_json()
    }
}

/// The JWK of a private key read from PEM.
fn private_jwk(id: &str, key: &PKey<Private>) -> Result<Jwk, KeyError> {
    let error = || KeyError::InvalidPem("inconsistent key".to_owned());

    match key.id() {
        Id::RSA => {
            let rsa = key.rsa().foreign_err(error)?;
            rsa::private_jwk(id, &rsa)
        }
        Id::EC => {
            let ec_key = key.ec_key().foreign_err(error)?;
            ec::private_jwk(id, &ec_key, ec::curve_of(&ec_key)?)
        }
        other => match OkpCurve::from_id(other) {
            Some(curve) => okp::private_jwk(id, key, curve),
            None => Err(Error::root(KeyError::UnsupportedKey(format!(
                "PEM key type {other:?}"
            )))),
        },
    }
}

/// The JWK of a public key read from PEM.
fn public_jwk(id: &str, key: &PKey<Public>) -> Result<Jwk, KeyError> {
    let error = || KeyError::InvalidPem("inconsistent key".to_owned());

    match key.id() {
        Id::RSA => {
            let rsa = key.rsa().foreign_err(error)?;
            Ok(rsa::public_jwk(id, &rsa))
        }
        Id::EC => {
            let ec_key = key.ec_key().foreign_err(error)?;
            ec::public_jwk(id, &ec_key, ec::curve_of(&ec_key)?)
        }
        other => match OkpCurve::from_id(other) {
            Some(curve) => okp::public_jwk(id, key, curve),
            None => Err(Error::root(KeyError::UnsupportedKey(format!(
                "PEM key type {other:?}"
            )))),
        },
    }
}

fn pem_string(
    pem: std::result::Result<Vec<u8>, openssl::error::ErrorStack>,
) -> Result<String, KeyError> {
    let error = || KeyError::ConversionFailed("PEM encoding".to_owned());

    String::from_utf8(pem.foreign_err(error)?).foreign_err(error)
}
