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

use bh_jose::{
    base64_url_decode, base64_url_encode, Base64Url, Header, Jwe, HEADER_ALGORITHM,
    HEADER_ENCRYPTION,
};
use bherror::{
    traits::{ErrorContext as _, ForeignError as _, PropagateError as _},
    Error, Result,
};
use openssl::{
    aes::{self, AesKey},
    derive::Deriver,
    ec::{EcGroup, EcKey},
    encrypt::{Decrypter, Encrypter},
    hash::MessageDigest,
    pkcs5::pbkdf2_hmac,
    pkey::{PKey, Private, Public},
    rsa::Padding,
    sha::Sha256,
    symm::{self, Cipher},
};
use serde_json::{Map, Value};

use super::content::{decrypt_content, encrypt_content, random_bytes, EncryptedContent};
use crate::{
    jwk, ContentEncryptionMethod, CryptoError, EcCurve, KeyEncryptionAlgorithm, OkpCurve,
    PBES2_MAXIMUM_ITERATIONS,
};

const HEADER_EPHEMERAL_KEY: &str = "epk";
const HEADER_AGREEMENT_PARTY_U: &str = "apu";
const HEADER_AGREEMENT_PARTY_V: &str = "apv";
const HEADER_IV: &str = "iv";
const HEADER_TAG: &str = "tag";
const HEADER_PBES2_SALT: &str = "p2s";
const HEADER_PBES2_COUNT: &str = "p2c";

const GCM_KW_IV_LENGTH: usize = 12;
const GCM_KW_TAG_LENGTH: usize = 16;

/// The curve an ECDH-ES key agreement takes place on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AgreementCurve {
    Ec(EcCurve),
    Okp(OkpCurve),
}

/// Key material protecting the content encryption key of a JWE.
#[derive(Clone)]
pub(crate) enum KeyManagementKey {
    Rsa {
        public: PKey<Public>,
        private: Option<PKey<Private>>,
    },
    Ecdh {
        curve: AgreementCurve,
        public: PKey<Public>,
        private: Option<PKey<Private>>,
    },
    Symmetric(Vec<u8>),
    Password {
        password: String,
        salt_length: usize,
        iterations: usize,
    },
}

/// Encrypts payloads into JWEs with a key, key management algorithm and
/// content encryption method fixed at construction.
///
/// Created by [`Key::encrypter`](crate::Key::encrypter).
pub struct JweEncrypter {
    key: KeyManagementKey,
    algorithm: KeyEncryptionAlgorithm,
    method: ContentEncryptionMethod,
}

impl JweEncrypter {
    pub(crate) fn new(
        key: KeyManagementKey,
        algorithm: KeyEncryptionAlgorithm,
        method: ContentEncryptionMethod,
    ) -> Self {
        Self {
            key,
            algorithm,
            method,
        }
    }

    /// The key management algorithm, the JWE `"alg"`.
    pub fn algorithm(&self) -> KeyEncryptionAlgorithm {
        self.algorithm
    }

    /// The content encryption method, the JWE `"enc"`.
    pub fn method(&self) -> ContentEncryptionMethod {
        self.method
    }

    /// Encrypts `plaintext` into a JWE.
    ///
    /// The protected header holds `"alg"` and `"enc"`, followed by the
    /// parameters the key management algorithm needs for decryption.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Jwe, CryptoError> {
        let mut header = bh_jose::json_object!({
            "alg": self.algorithm.to_string(),
            "enc": self.method.to_string(),
        });

        let (cek, encrypted_key) = self.key.protect(self.algorithm, self.method, &mut header)?;

        let header = Header::from_json(header);
        let aad = header.encoded().as_encoded().as_bytes();
        let content = encrypt_content(self.method, &cek, aad, plaintext)?;

        Ok(Jwe::from_parts(
            header.encoded().clone(),
            Base64Url::encode(encrypted_key),
            Base64Url::encode(content.iv),
            Base64Url::encode(content.ciphertext),
            Base64Url::encode(content.tag),
        ))
    }
}

/// Decrypts JWEs with a key and key management algorithm fixed at
/// construction.
///
/// Created by [`Key::decrypter`](crate::Key::decrypter).
pub struct JweDecrypter {
    key: KeyManagementKey,
    algorithm: KeyEncryptionAlgorithm,
}

impl JweDecrypter {
    pub(crate) fn new(key: KeyManagementKey, algorithm: KeyEncryptionAlgorithm) -> Self {
        Self { key, algorithm }
    }

    /// The key management algorithm, the JWE `"alg"`.
    pub fn algorithm(&self) -> KeyEncryptionAlgorithm {
        self.algorithm
    }

    /// Decrypts the JWE and returns the plaintext.
    pub fn decrypt(&self, jwe: &Jwe) -> Result<Vec<u8>, CryptoError> {
        let header = jwe
            .header()
            .json()
            .match_err(|error| CryptoError::MalformedToken(error.to_string()))?;

        let algorithm = header_string(&header, HEADER_ALGORITHM)?;
        if algorithm != self.algorithm.to_string() {
            return Err(Error::root(CryptoError::DecryptionFailed(format!(
                "token uses {algorithm}, decrypter uses {}",
                self.algorithm
            ))));
        }
        let method = ContentEncryptionMethod::from_str(header_string(&header, HEADER_ENCRYPTION)?)?;

        let cek = self.key.recover(
            self.algorithm,
            method,
            &header,
            jwe.encrypted_key().decoded(),
        )?;

        let content = EncryptedContent {
            iv: jwe.iv().decoded().to_vec(),
            ciphertext: jwe.ciphertext().decoded().to_vec(),
            tag: jwe.tag().decoded().to_vec(),
        };
        decrypt_content(
            method,
            &cek,
            jwe.header().encoded().as_encoded().as_bytes(),
            &content,
        )
    }
}

impl KeyManagementKey {
    /// Produces the CEK and the encrypted key, inserting the parameters needed
    /// to recover the CEK into `header`.
    fn protect(
        &self,
        algorithm: KeyEncryptionAlgorithm,
        method: ContentEncryptionMethod,
        header: &mut Map<String, Value>,
    ) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let error = |message: String| Error::root(CryptoError::EncryptionFailed(message));

        match self {
            Self::Rsa { public, .. } => {
                let cek = random_bytes(method.key_length())?;
                let encrypted_key = rsa_encrypt(public, algorithm, &cek)?;
                Ok((cek, encrypted_key))
            }
            Self::Ecdh { curve, public, .. } => {
                let (ephemeral, epk) = generate_ephemeral_key(*curve)?;
                let shared_secret = agree(&ephemeral, public)
                    .with_err(|| CryptoError::EncryptionFailed("ECDH failed".to_owned()))?;
                header.insert(HEADER_EPHEMERAL_KEY.to_owned(), Value::Object(epk));

                match algorithm.wrapping_key_length() {
                    None => {
                        let cek = concat_kdf(
                            &shared_secret,
                            &method.to_string(),
                            &[],
                            &[],
                            method.key_length(),
                        );
                        Ok((cek, Vec::new()))
                    }
                    Some(length) => {
                        let kek =
                            concat_kdf(&shared_secret, &algorithm.to_string(), &[], &[], length);
                        let cek = random_bytes(method.key_length())?;
                        let encrypted_key = aes_wrap(&kek, &cek)?;
                        Ok((cek, encrypted_key))
                    }
                }
            }
            Self::Symmetric(key) => match algorithm {
                KeyEncryptionAlgorithm::Dir => Ok((key.clone(), Vec::new())),
                KeyEncryptionAlgorithm::A128Kw
                | KeyEncryptionAlgorithm::A192Kw
                | KeyEncryptionAlgorithm::A256Kw => {
                    let cek = random_bytes(method.key_length())?;
                    let encrypted_key = aes_wrap(key, &cek)?;
                    Ok((cek, encrypted_key))
                }
                KeyEncryptionAlgorithm::A128GcmKw
                | KeyEncryptionAlgorithm::A192GcmKw
                | KeyEncryptionAlgorithm::A256GcmKw => {
                    let cek = random_bytes(method.key_length())?;
                    let iv = random_bytes(GCM_KW_IV_LENGTH)?;
                    let mut tag = vec![0; GCM_KW_TAG_LENGTH];
                    let encrypted_key =
                        symm::encrypt_aead(gcm_cipher(key.len())?, key, Some(&iv), &[], &cek, &mut tag)
                            .foreign_err(|| {
                                CryptoError::EncryptionFailed("AES GCM key wrap failed".to_owned())
                            })?;

                    header.insert(HEADER_IV.to_owned(), Value::String(base64_url_encode(iv)));
                    header.insert(HEADER_TAG.to_owned(), Value::String(base64_url_encode(tag)));
                    Ok((cek, encrypted_key))
                }
                other => Err(error(format!("{other} cannot be used with a symmetric key"))),
            },
            Self::Password {
                password,
                salt_length,
                iterations,
            } => {
                let salt = random_bytes(*salt_length)?;
                let kek = pbes2_derive(password, algorithm, &salt, *iterations)
                    .with_err(|| CryptoError::EncryptionFailed("PBES2 key derivation failed".to_owned()))?;
                let cek = random_bytes(method.key_length())?;
                let encrypted_key = aes_wrap(&kek, &cek)?;

                header.insert(
                    HEADER_PBES2_SALT.to_owned(),
                    Value::String(base64_url_encode(salt)),
                );
                header.insert(HEADER_PBES2_COUNT.to_owned(), Value::from(*iterations));
                Ok((cek, encrypted_key))
            }
        }
    }

    /// Recovers the CEK from the encrypted key and the header parameters.
    fn recover(
        &self,
        algorithm: KeyEncryptionAlgorithm,
        method: ContentEncryptionMethod,
        header: &Map<String, Value>,
        encrypted_key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let error = |message: String| Error::root(CryptoError::DecryptionFailed(message));
        let private_key_required = || error("a private key is required".to_owned());

        let cek = match self {
            Self::Rsa { private, .. } => {
                let private = private.as_ref().ok_or_else(private_key_required)?;
                rsa_decrypt(private, algorithm, encrypted_key)?
            }
            Self::Ecdh { curve, private, .. } => {
                let private = private.as_ref().ok_or_else(private_key_required)?;
                let epk = match header.get(HEADER_EPHEMERAL_KEY) {
                    Some(Value::Object(epk)) => epk,
                    _ => return Err(error("missing \"epk\" header parameter".to_owned())),
                };
                let ephemeral = ephemeral_public_key(*curve, epk)
                    .with_err(|| CryptoError::DecryptionFailed("invalid \"epk\"".to_owned()))?;
                let shared_secret = agree(private, &ephemeral)?;
                let apu = optional_header_bytes(header, HEADER_AGREEMENT_PARTY_U)?;
                let apv = optional_header_bytes(header, HEADER_AGREEMENT_PARTY_V)?;

                match algorithm.wrapping_key_length() {
                    None => concat_kdf(
                        &shared_secret,
                        &method.to_string(),
                        &apu,
                        &apv,
                        method.key_length(),
                    ),
                    Some(length) => {
                        let kek =
                            concat_kdf(&shared_secret, &algorithm.to_string(), &apu, &apv, length);
                        aes_unwrap(&kek, encrypted_key)?
                    }
                }
            }
            Self::Symmetric(key) => match algorithm {
                KeyEncryptionAlgorithm::Dir => key.clone(),
                KeyEncryptionAlgorithm::A128Kw
                | KeyEncryptionAlgorithm::A192Kw
                | KeyEncryptionAlgorithm::A256Kw => aes_unwrap(key, encrypted_key)?,
                KeyEncryptionAlgorithm::A128GcmKw
                | KeyEncryptionAlgorithm::A192GcmKw
                | KeyEncryptionAlgorithm::A256GcmKw => {
                    let iv = header_bytes(header, HEADER_IV)?;
                    let tag = header_bytes(header, HEADER_TAG)?;
                    symm::decrypt_aead(gcm_cipher(key.len())?, key, Some(&iv), &[], encrypted_key, &tag)
                        .foreign_err(|| {
                            CryptoError::DecryptionFailed("AES GCM key unwrap failed".to_owned())
                        })?
                }
                other => return Err(error(format!("{other} cannot be used with a symmetric key"))),
            },
            Self::Password { password, .. } => {
                let salt = header_bytes(header, HEADER_PBES2_SALT)?;
                let iterations = header
                    .get(HEADER_PBES2_COUNT)
                    .and_then(Value::as_u64)
                    .filter(|count| *count > 0)
                    .ok_or_else(|| error("missing or invalid \"p2c\" header parameter".to_owned()))?;
                if iterations > PBES2_MAXIMUM_ITERATIONS as u64 {
                    return Err(error(format!(
                        "\"p2c\" of {iterations} exceeds {PBES2_MAXIMUM_ITERATIONS}"
                    )));
                }
                let kek = pbes2_derive(password, algorithm, &salt, iterations as usize)
                    .with_err(|| CryptoError::DecryptionFailed("PBES2 key derivation failed".to_owned()))?;
                aes_unwrap(&kek, encrypted_key)?
            }
        };

        if cek.len() != method.key_length() {
            return Err(error(format!(
                "recovered key has {} bits, {method} requires {}",
                cek.len() * 8,
                method.key_length() * 8
            )));
        }
        Ok(cek)
    }
}

fn header_string<'a>(header: &'a Map<String, Value>, name: &str) -> Result<&'a str, CryptoError> {
    header
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            Error::root(CryptoError::MalformedToken(format!(
                "missing \"{name}\" header parameter"
            )))
        })
}

fn header_bytes(header: &Map<String, Value>, name: &str) -> Result<Vec<u8>, CryptoError> {
    let encoded = header_string(header, name)?;
    base64_url_decode(encoded)
        .with_err(|| CryptoError::MalformedToken(format!("\"{name}\" is not base64url")))
}

fn optional_header_bytes(header: &Map<String, Value>, name: &str) -> Result<Vec<u8>, CryptoError> {
    if header.contains_key(name) {
        header_bytes(header, name)
    } else {
        Ok(Vec::new())
    }
}

fn gcm_cipher(key_length: usize) -> Result<Cipher, CryptoError> {
    match key_length {
        16 => Ok(Cipher::aes_128_gcm()),
        24 => Ok(Cipher::aes_192_gcm()),
        32 => Ok(Cipher::aes_256_gcm()),
        _ => Err(Error::root(CryptoError::UnsupportedAlgorithm(format!(
            "AES GCM with a {} bit key",
            key_length * 8
        )))),
    }
}

fn rsa_padding(
    algorithm: KeyEncryptionAlgorithm,
) -> Result<(Padding, Option<MessageDigest>), CryptoError> {
    match algorithm {
        KeyEncryptionAlgorithm::Rsa1_5 => Ok((Padding::PKCS1, None)),
        KeyEncryptionAlgorithm::RsaOaep => Ok((Padding::PKCS1_OAEP, Some(MessageDigest::sha1()))),
        KeyEncryptionAlgorithm::RsaOaep256 => {
            Ok((Padding::PKCS1_OAEP, Some(MessageDigest::sha256())))
        }
        other => Err(Error::root(CryptoError::UnsupportedAlgorithm(format!(
            "{other} cannot be used with an RSA key"
        )))),
    }
}

fn rsa_encrypt(
    key: &PKey<Public>,
    algorithm: KeyEncryptionAlgorithm,
    cek: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let error = || CryptoError::EncryptionFailed(format!("{algorithm} encryption failed"));
    let (padding, digest) = rsa_padding(algorithm)?;

    let mut encrypter = Encrypter::new(key).foreign_err(error)?;
    encrypter.set_rsa_padding(padding).foreign_err(error)?;
    if let Some(digest) = digest {
        encrypter.set_rsa_oaep_md(digest).foreign_err(error)?;
        encrypter.set_rsa_mgf1_md(digest).foreign_err(error)?;
    }

    let mut encrypted = vec![0; encrypter.encrypt_len(cek).foreign_err(error)?];
    let length = encrypter.encrypt(cek, &mut encrypted).foreign_err(error)?;
    encrypted.truncate(length);
    Ok(encrypted)
}

fn rsa_decrypt(
    key: &PKey<Private>,
    algorithm: KeyEncryptionAlgorithm,
    encrypted_key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let error = || CryptoError::DecryptionFailed(format!("{algorithm} decryption failed"));
    let (padding, digest) = rsa_padding(algorithm)?;

    let mut decrypter = Decrypter::new(key).foreign_err(error)?;
    decrypter.set_rsa_padding(padding).foreign_err(error)?;
    if let Some(digest) = digest {
        decrypter.set_rsa_oaep_md(digest).foreign_err(error)?;
        decrypter.set_rsa_mgf1_md(digest).foreign_err(error)?;
    }

    let mut decrypted = vec![0; decrypter.decrypt_len(encrypted_key).foreign_err(error)?];
    let length = decrypter
        .decrypt(encrypted_key, &mut decrypted)
        .foreign_err(error)?;
    decrypted.truncate(length);
    Ok(decrypted)
}

/// AES Key Wrap as defined in [RFC3394], with the default initial value.
///
/// [RFC3394]: https://datatracker.ietf.org/doc/html/rfc3394
fn aes_wrap(kek: &[u8], cek: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let error = || Error::root(CryptoError::EncryptionFailed("AES key wrap failed".to_owned()));

    let key = AesKey::new_encrypt(kek).map_err(|_| error())?;
    let mut wrapped = vec![0; cek.len() + 8];
    let length = aes::wrap_key(&key, None, &mut wrapped, cek).map_err(|_| error())?;
    wrapped.truncate(length);
    Ok(wrapped)
}

fn aes_unwrap(kek: &[u8], wrapped: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let error = || {
        Error::root(CryptoError::DecryptionFailed(
            "AES key unwrap failed".to_owned(),
        ))
    };

    if wrapped.len() < 24 || wrapped.len() % 8 != 0 {
        return Err(error()).ctx(|| format!("wrapped key has {} bytes", wrapped.len()));
    }

    let key = AesKey::new_decrypt(kek).map_err(|_| error())?;
    let mut unwrapped = vec![0; wrapped.len() - 8];
    let length = aes::unwrap_key(&key, None, &mut unwrapped, wrapped).map_err(|_| error())?;
    unwrapped.truncate(length);
    Ok(unwrapped)
}

/// Derives the key wrapping key of the PBES2 algorithms, as defined in
/// [RFC7518 section 4.8].
///
/// [RFC7518 section 4.8]: https://datatracker.ietf.org/doc/html/rfc7518#section-4.8
fn pbes2_derive(
    password: &str,
    algorithm: KeyEncryptionAlgorithm,
    salt: &[u8],
    iterations: usize,
) -> Result<Vec<u8>, CryptoError> {
    let digest = match algorithm {
        KeyEncryptionAlgorithm::Pbes2Hs256A128Kw => MessageDigest::sha256(),
        KeyEncryptionAlgorithm::Pbes2Hs384A192Kw => MessageDigest::sha384(),
        KeyEncryptionAlgorithm::Pbes2Hs512A256Kw => MessageDigest::sha512(),
        other => {
            return Err(Error::root(CryptoError::UnsupportedAlgorithm(format!(
                "{other} cannot be used with a password"
            ))))
        }
    };

    // salt input is the UTF-8 algorithm name, a zero byte, then the salt
    let mut salt_input = algorithm.to_string().into_bytes();
    salt_input.push(0);
    salt_input.extend_from_slice(salt);

    let mut kek = vec![0; algorithm.wrapping_key_length().unwrap_or(32)];
    pbkdf2_hmac(password.as_bytes(), &salt_input, iterations, digest, &mut kek).foreign_err(
        || CryptoError::UnsupportedAlgorithm(format!("{algorithm} key derivation")),
    )?;
    Ok(kek)
}

/// Generates an ephemeral key pair on `curve`, returning the private key and
/// its public JWK for the `"epk"` header parameter.
fn generate_ephemeral_key(
    curve: AgreementCurve,
) -> Result<(PKey<Private>, Map<String, Value>), CryptoError> {
    let error = || CryptoError::EncryptionFailed("ephemeral key generation failed".to_owned());

    match curve {
        AgreementCurve::Ec(curve) => {
            let group = EcGroup::from_curve_name(curve.nid()).foreign_err(error)?;
            let key = EcKey::generate(&group).foreign_err(error)?;
            let epk = jwk::ec_public_jwk(&key, curve).with_err(error)?;
            Ok((PKey::from_ec_key(key).foreign_err(error)?, epk))
        }
        AgreementCurve::Okp(curve) => {
            let key = match curve {
                OkpCurve::X25519 => PKey::generate_x25519(),
                OkpCurve::X448 => PKey::generate_x448(),
                other => {
                    return Err(Error::root(CryptoError::UnsupportedAlgorithm(format!(
                        "ECDH-ES on {other}"
                    ))))
                }
            }
            .foreign_err(error)?;
            let x = key.raw_public_key().foreign_err(error)?;
            let epk = bh_jose::json_object!({
                "kty": "OKP",
                "crv": curve.name(),
                "x": base64_url_encode(x),
            });
            Ok((key, epk))
        }
    }
}

/// Reconstructs the sender's ephemeral public key from the `"epk"` header
/// parameter, which must be on the recipient's curve.
fn ephemeral_public_key(
    curve: AgreementCurve,
    epk: &Map<String, Value>,
) -> Result<PKey<Public>, crate::KeyError> {
    let error = || crate::KeyError::InvalidJwk("invalid ephemeral key".to_owned());
    let curve_name = jwk::string_member(epk, jwk::JWK_CURVE)?;

    match curve {
        AgreementCurve::Ec(curve) if curve.name() == curve_name => {
            let key = jwk::ec_public_key_from_jwk(epk, curve)?;
            PKey::from_ec_key(key).foreign_err(error)
        }
        AgreementCurve::Okp(curve) if curve.name() == curve_name => {
            let x = jwk::bytes_member(epk, "x")?;
            PKey::public_key_from_raw_bytes(&x, curve.id()).foreign_err(error)
        }
        _ => Err(Error::root(crate::KeyError::InvalidJwk(format!(
            "ephemeral key is on {curve_name}"
        )))),
    }
}

/// The raw ECDH shared secret `Z`.
fn agree(private: &PKey<Private>, public: &PKey<Public>) -> Result<Vec<u8>, CryptoError> {
    let error = || CryptoError::DecryptionFailed("ECDH failed".to_owned());

    let mut deriver = Deriver::new(private).foreign_err(error)?;
    deriver.set_peer(public).foreign_err(error)?;
    deriver.derive_to_vec().foreign_err(error)
}

/// The Concat KDF of [NIST SP 800-56A] with SHA-256, parameterized as in
/// [RFC7518 section 4.6.2].
///
/// [NIST SP 800-56A]: https://nvlpubs.nist.gov/nistpubs/SpecialPublications/NIST.SP.800-56Ar2.pdf
/// [RFC7518 section 4.6.2]: https://datatracker.ietf.org/doc/html/rfc7518#section-4.6.2
fn concat_kdf(
    shared_secret: &[u8],
    algorithm_id: &str,
    party_u_info: &[u8],
    party_v_info: &[u8],
    key_length: usize,
) -> Vec<u8> {
    let mut other_info = Vec::new();
    for field in [algorithm_id.as_bytes(), party_u_info, party_v_info] {
        other_info.extend_from_slice(&(field.len() as u32).to_be_bytes());
        other_info.extend_from_slice(field);
    }
    other_info.extend_from_slice(&((key_length * 8) as u32).to_be_bytes());

    let mut derived = Vec::with_capacity(key_length + 32);
    let mut counter: u32 = 1;
    while derived.len() < key_length {
        let mut hasher = Sha256::new();
        hasher.update(&counter.to_be_bytes());
        hasher.update(shared_secret);
        hasher.update(&other_info);
        derived.extend_from_slice(&hasher.finish());
        counter += 1;
    }

    derived.truncate(key_length);
    derived
}
