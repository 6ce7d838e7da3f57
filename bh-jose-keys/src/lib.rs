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


#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate provides the keys [JSON Web Signatures (JWS)][1] and [JSON Web
//! Encryptions (JWE)][2] are signed, verified, encrypted and decrypted with.
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc7515
//! [2]: https://datatracker.ietf.org/doc/html/rfc7516
//!
//! # Details
//!
//! A [`Key`] is created from a [JWK](Jwk), a PEM document or the parameters of
//! a password. Through the [`JoseKey`] trait it reports what it can be used
//! for and which algorithms it supports; these lists are derived from the key
//! type and size.
//!
//! The token operations [`sign_jws`], [`verify_jws`], [`encrypt_jws`] and
//! [`decrypt_jwe`] work on the tokens of the [`bh_jose`] crate. A [`KeyRing`]
//! searches a set of keys for the one that verifies or decrypts a token, and
//! a [`KeysModel`] holds the keys of a user together with their persisted
//! form.
//!
//! All cryptography is done by [`openssl`]. Elliptic curves the default
//! OpenSSL provider lacks are used through the [`Provider::Extended`]
//! backend, selected per operation by a [`ProviderResolver`].
//!
//! # Examples
//!
//! ## Sign a token and find the key that verifies it
//!
//! ```
//! use bh_jose::Jws;
//! use bh_jose_keys::{sign_jws, EcCurve, JwsAlgorithm, Key, KeyRing, SigningUpdateMode};
//!
//! let jws = Jws::parse("eyJhbGciOiJub25lIn0.eyJzdWIiOiJUZXN0In0.").unwrap();
//!
//! let key = Key::generate_ec("signing-key", EcCurve::P256).unwrap();
//! let signed = sign_jws(
//!     &jws,
//!     &key,
//!     JwsAlgorithm::Es256,
//!     SigningUpdateMode::UpdateAlgorithmTypeAndKid,
//! )
//! .unwrap();
//! assert_eq!(signed.header().key_id().as_deref(), Some("signing-key"));
//!
//! // Only the public half is needed to verify
//! let public = Key::from_jwk(&key.to_public_jwk().unwrap()).unwrap();
//! let ring = KeyRing::new(vec![
//!     Key::generate_oct("other", 256).unwrap(),
//!     public,
//! ]);
//!
//! let (found, algorithm) = ring.find_verifying_key(&signed).unwrap();
//! assert_eq!(found.to_string(), "signing-key (P-256)");
//! assert_eq!(algorithm, JwsAlgorithm::Es256);
//! ```
//!
//! ## Encrypt a token with a password
//!
//! ```
//! use bh_jose::Jws;
//! use bh_jose_keys::{
//!     decrypt_jwe, encrypt_jws, ContentEncryptionMethod, Key, KeyEncryptionAlgorithm,
//!     PasswordKey,
//! };
//!
//! let jws = Jws::parse("eyJhbGciOiJub25lIn0.eyJzdWIiOiJUZXN0In0.").unwrap();
//! let key = Key::Password(PasswordKey::new("password", "shrubbery", 16, 10000));
//!
//! let jwe = encrypt_jws(
//!     &jws,
//!     &key,
//!     KeyEncryptionAlgorithm::Pbes2Hs256A128Kw,
//!     ContentEncryptionMethod::A128Gcm,
//! )
//! .unwrap();
//!
//! assert_eq!(decrypt_jwe(&jwe, &key).unwrap(), jws);
//! ```

mod algorithm;
mod crypto;
mod curve;
mod error;
mod jwk;
mod key;
mod key_ring;
mod keys_model;
mod operations;
mod provider;

pub use algorithm::*;
pub use crypto::{
    AsymmetricSigner, AsymmetricVerifier, HmacSigner, JweDecrypter, JweEncrypter,
    SignatureVerifier, Signer, HMAC_MINIMUM_KEY_LENGTH,
};
pub use curve::*;
pub use error::*;
pub use jwk::*;
pub use key::*;
pub use key_ring::*;
pub use keys_model::*;
pub use operations::*;
pub use provider::*;
