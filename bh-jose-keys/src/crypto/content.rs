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
    hash::MessageDigest,
    memcmp,
    pkey::PKey,
    rand::rand_bytes,
    sign,
    symm::{self, Cipher},
};

use crate::{ContentEncryptionMethod, CryptoError};

const GCM_IV_LENGTH: usize = 12;
const GCM_TAG_LENGTH: usize = 16;
const CBC_IV_LENGTH: usize = 16;

/// The output of content encryption: the last three JWE components.
pub(crate) struct EncryptedContent {
    pub(crate) iv: Vec<u8>,
    pub(crate) ciphertext: Vec<u8>,
    pub(crate) tag: Vec<u8>,
}

/// Generates `length` random bytes.
pub(crate) fn random_bytes(length: usize) -> Result<Vec<u8>, CryptoError> {
    let mut bytes = vec![0; length];
    rand_bytes(&mut bytes).foreign_err(|| {
        CryptoError::EncryptionFailed("random number generation failed".to_owned())
    })?;
    Ok(bytes)
}

/// Encrypts `plaintext` with the content encryption key `cek`, authenticating
/// `aad` alongside it.
pub(crate) fn encrypt_content(
    method: ContentEncryptionMethod,
    cek: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<EncryptedContent, CryptoError> {
    check_key_length(method, cek, CryptoError::EncryptionFailed)?;
    let error = |message: &str| CryptoError::EncryptionFailed(message.to_owned());

    match method {
        ContentEncryptionMethod::A128Gcm
        | ContentEncryptionMethod::A192Gcm
        | ContentEncryptionMethod::A256Gcm => {
            let iv = random_bytes(GCM_IV_LENGTH)?;
            let mut tag = vec![0; GCM_TAG_LENGTH];
            let ciphertext =
                symm::encrypt_aead(gcm_cipher(method), cek, Some(&iv), aad, plaintext, &mut tag)
                    .foreign_err(|| error("AES GCM encryption failed"))?;

            Ok(EncryptedContent {
                iv,
                ciphertext,
                tag,
            })
        }
        _ => {
            let (mac_key, encryption_key) = cek.split_at(cek.len() / 2);
            let iv = random_bytes(CBC_IV_LENGTH)?;
            let ciphertext = symm::encrypt(cbc_cipher(method), encryption_key, Some(&iv), plaintext)
                .foreign_err(|| error("AES CBC encryption failed"))?;
            let tag = cbc_hmac_tag(method, mac_key, aad, &iv, &ciphertext)
                .foreign_err(|| error("HMAC computation failed"))?;

            Ok(EncryptedContent {
                iv,
                ciphertext,
                tag,
            })
        }
    }
}

/// Authenticates and decrypts content encrypted by [`encrypt_content`].
pub(crate) fn decrypt_content(
    method: ContentEncryptionMethod,
    cek: &[u8],
    aad: &[u8],
    content: &EncryptedContent,
) -> Result<Vec<u8>, CryptoError> {
    check_key_length(method, cek, CryptoError::DecryptionFailed)?;
    let error = |message: &str| CryptoError::DecryptionFailed(message.to_owned());

    match method {
        ContentEncryptionMethod::A128Gcm
        | ContentEncryptionMethod::A192Gcm
        | ContentEncryptionMethod::A256Gcm => symm::decrypt_aead(
            gcm_cipher(method),
            cek,
            Some(&content.iv),
            aad,
            &content.ciphertext,
            &content.tag,
        )
        .foreign_err(|| error("AES GCM authentication failed")),
        _ => {
            let (mac_key, encryption_key) = cek.split_at(cek.len() / 2);
            let expected = cbc_hmac_tag(method, mac_key, aad, &content.iv, &content.ciphertext)
                .foreign_err(|| error("HMAC computation failed"))?;

            if expected.len() != content.tag.len() || !memcmp::eq(&expected, &content.tag) {
                return Err(Error::root(error("authentication tag mismatch")));
            }

            symm::decrypt(
                cbc_cipher(method),
                encryption_key,
                Some(&content.iv),
                &content.ciphertext,
            )
            .foreign_err(|| error("AES CBC decryption failed"))
        }
    }
}

fn check_key_length(
    method: ContentEncryptionMethod,
    cek: &[u8],
    error: fn(String) -> CryptoError,
) -> Result<(), CryptoError> {
    if cek.len() == method.key_length() {
        return Ok(());
    }

    Err(Error::root(error(format!(
        "{method} requires a {} bit key, got {} bits",
        method.key_length() * 8,
        cek.len() * 8
    ))))
}

fn gcm_cipher(method: ContentEncryptionMethod) -> Cipher {
    match method {
        ContentEncryptionMethod::A128Gcm => Cipher::aes_128_gcm(),
        ContentEncryptionMethod::A192Gcm => Cipher::aes_192_gcm(),
        _ => Cipher::aes_256_gcm(),
    }
}

fn cbc_cipher(method: ContentEncryptionMethod) -> Cipher {
    match method {
        ContentEncryptionMethod::A128CbcHs256 => Cipher::aes_128_cbc(),
        ContentEncryptionMethod::A192CbcHs384 => Cipher::aes_192_cbc(),
        _ => Cipher::aes_256_cbc(),
    }
}

/// The tag of [RFC7518 section 5.2.2.1]: the HMAC over `AAD || IV ||
/// ciphertext || AL`, truncated to the MAC key length.
///
/// [RFC7518 section 5.2.2.1]: https://datatracker.ietf.org/doc/html/rfc7518#section-5.2.2.1
fn cbc_hmac_tag(
    method: ContentEncryptionMethod,
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> std::result::Result<Vec<u8>, openssl::error::ErrorStack> {
    let digest = match method {
        ContentEncryptionMethod::A128CbcHs256 => MessageDigest::sha256(),
        ContentEncryptionMethod::A192CbcHs384 => MessageDigest::sha384(),
        _ => MessageDigest::sha512(),
    };
    let aad_bit_length = (aad.len() as u64 * 8).to_be_bytes();

    let key = PKey::hmac(mac_key)?;
    let mut signer = sign::Signer::new(digest, &key)?;
    signer.update(aad)?;
    signer.update(iv)?;
    signer.update(ciphertext)?;
    signer.update(&aad_bit_length)?;

    let mut tag = signer.sign_to_vec()?;
    tag.truncate(mac_key.len());
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // RFC 7518 appendix B.1
    const CBC_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const CBC_PLAINTEXT: &str = "41206369706865722073797374656d206d757374206e6f7420626520726571756972656420746f206265207365637265742c20616e64206974206d7573742062652061626c6520746f2066616c6c20696e746f207468652068616e6473206f662074686520656e656d7920776974686f757420696e636f6e76656e69656e6365";
    const CBC_IV: &str = "1af38c2dc2b96ffdd86694092341bc04";
    const CBC_AAD: &str = "546865207365636f6e64207072696e6369706c65206f662041756775737465204b6572636b686f666673";
    const CBC_CIPHERTEXT: &str = "c80edfa32ddf39d5ef00c0b468834279a2e46a1b8049f792f76bfe54b903a9c9a94ac9b47ad2655c5f10f9aef71427e2fc6f9b3f399a221489f16362c703233609d45ac69864e3321cf82935ac4096c86e133314c54019e8ca7980dfa4b9cf1b384c486f3a54c51078158ee5d79de59fbd34d848b3d69550a67646344427ade54b8851ffb598f7f80074b9473c82e2db";
    const CBC_TAG: &str = "652c3fa36b0a7c5b3219fab3a30bc1c4";

    #[test]
    fn cbc_hmac_known_answer() {
        let content = EncryptedContent {
            iv: hex::decode(CBC_IV).unwrap(),
            ciphertext: hex::decode(CBC_CIPHERTEXT).unwrap(),
            tag: hex::decode(CBC_TAG).unwrap(),
        };

        let plaintext = decrypt_content(
            ContentEncryptionMethod::A128CbcHs256,
            &hex::decode(CBC_KEY).unwrap(),
            &hex::decode(CBC_AAD).unwrap(),
            &content,
        )
        .unwrap();

        assert_eq!(hex::encode(plaintext), CBC_PLAINTEXT);
    }

    #[test]
    fn encrypt_then_decrypt() {
        let aad = b"eyJhbGciOiJkaXIiLCJlbmMiOiJBMTI4R0NNIn0";
        let plaintext = b"eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJUZXN0In0.c2ln";

        for method in ContentEncryptionMethod::ALL {
            let cek = random_bytes(method.key_length()).unwrap();

            let content = encrypt_content(method, &cek, aad, plaintext).unwrap();

            assert_eq!(decrypt_content(method, &cek, aad, &content).unwrap(), plaintext);
        }
    }

    #[test]
    fn tampering_is_detected() {
        let aad = b"header";

        for method in ContentEncryptionMethod::ALL {
            let cek = random_bytes(method.key_length()).unwrap();
            let mut content = encrypt_content(method, &cek, aad, b"plaintext").unwrap();
            content.tag[0] ^= 1;

            assert_matches!(
                decrypt_content(method, &cek, aad, &content).unwrap_err().error,
                CryptoError::DecryptionFailed(_),
                "{method}"
            );
        }
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        assert_matches!(
            encrypt_content(ContentEncryptionMethod::A256Gcm, &[0; 16], b"", b"x")
                .map(|_| ())
                .unwrap_err()
                .error,
            CryptoError::EncryptionFailed(message) if message.contains("256 bit")
        );
    }
}
