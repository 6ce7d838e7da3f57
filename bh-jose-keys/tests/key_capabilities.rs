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


mod common;

use bh_jose_keys::{
    jwk_thumbprint, ContentEncryptionMethod as Cek, EcCurve, JoseKey, JwsAlgorithm as Jws,
    Key, KeyEncryptionAlgorithm as Kek, OkpCurve, PasswordKey,
};
use common::*;

struct TestCase {
    key: Key,
    description: &'static str,
    can_sign: bool,
    can_encrypt: bool,
    signing: Vec<Jws>,
    key_encryption: Vec<Kek>,
}

#[test]
fn algorithm_lists_per_key_kind() {
    let ecdh = vec![Kek::EcdhEs, Kek::EcdhEsA128Kw, Kek::EcdhEsA192Kw, Kek::EcdhEsA256Kw];
    let all_rsa = vec![Jws::Rs256, Jws::Rs384, Jws::Rs512, Jws::Ps256, Jws::Ps384, Jws::Ps512];
    let rsa_encryption = vec![Kek::Rsa1_5, Kek::RsaOaep, Kek::RsaOaep256];

    let test_cases = [
        TestCase {
            key: Key::generate_rsa("rsa", 512).unwrap(),
            description: "RSA 512",
            can_sign: true,
            can_encrypt: false,
            signing: vec![Jws::Rs256],
            key_encryption: rsa_encryption.clone(),
        },
        TestCase {
            key: Key::generate_rsa("rsa", 768).unwrap(),
            description: "RSA 768",
            can_sign: true,
            can_encrypt: false,
            signing: all_rsa.clone(),
            key_encryption: rsa_encryption.clone(),
        },
        TestCase {
            key: Key::generate_rsa("rsa", 1024).unwrap(),
            description: "RSA 1024",
            can_sign: true,
            can_encrypt: false,
            signing: vec![Jws::Rs256, Jws::Rs384, Jws::Rs512, Jws::Ps256, Jws::Ps384],
            key_encryption: rsa_encryption.clone(),
        },
        TestCase {
            key: Key::generate_rsa("rsa", 1536).unwrap(),
            description: "RSA 1536",
            can_sign: true,
            can_encrypt: false,
            signing: all_rsa.clone(),
            key_encryption: rsa_encryption.clone(),
        },
        TestCase {
            key: Key::generate_rsa("rsa", 2048).unwrap(),
            description: "RSA 2048",
            can_sign: true,
            can_encrypt: true,
            signing: all_rsa.clone(),
            key_encryption: rsa_encryption.clone(),
        },
        TestCase {
            key: Key::generate_rsa("rsa", 3072).unwrap(),
            description: "RSA 3072",
            can_sign: true,
            can_encrypt: true,
            signing: all_rsa,
            key_encryption: rsa_encryption,
        },
        TestCase {
            key: Key::generate_ec("ec", EcCurve::P256).unwrap(),
            description: "P-256",
            can_sign: true,
            can_encrypt: true,
            signing: vec![Jws::Es256],
            key_encryption: ecdh.clone(),
        },
        TestCase {
            key: Key::generate_ec("ec", EcCurve::Secp256k1).unwrap(),
            description: "secp256k1",
            can_sign: true,
            can_encrypt: false,
            signing: vec![Jws::Es256K],
            key_encryption: vec![],
        },
        TestCase {
            key: Key::generate_ec("ec", EcCurve::P384).unwrap(),
            description: "P-384",
            can_sign: true,
            can_encrypt: true,
            signing: vec![Jws::Es384],
            key_encryption: ecdh.clone(),
        },
        TestCase {
            key: Key::generate_ec("ec", EcCurve::P521).unwrap(),
            description: "P-521",
            can_sign: true,
            can_encrypt: true,
            signing: vec![Jws::Es512],
            key_encryption: ecdh,
        },
        TestCase {
            key: Key::generate_okp("okp", OkpCurve::Ed25519).unwrap(),
            description: "Ed25519",
            can_sign: true,
            can_encrypt: false,
            signing: vec![Jws::EdDsa],
            key_encryption: vec![],
        },
        TestCase {
            key: Key::generate_okp("okp", OkpCurve::Ed448).unwrap(),
            description: "Ed448",
            can_sign: true,
            can_encrypt: false,
            signing: vec![Jws::EdDsa],
            key_encryption: vec![],
        },
        TestCase {
            key: Key::generate_okp("okp", OkpCurve::X25519).unwrap(),
            description: "X25519",
            can_sign: false,
            can_encrypt: true,
            signing: vec![],
            key_encryption: vec![Kek::EcdhEs],
        },
        TestCase {
            key: Key::generate_okp("okp", OkpCurve::X448).unwrap(),
            description: "X448",
            can_sign: false,
            can_encrypt: true,
            signing: vec![],
            key_encryption: vec![Kek::EcdhEs],
        },
        TestCase {
            key: Key::generate_oct("oct", 128).unwrap(),
            description: "OCT 128",
            can_sign: true,
            can_encrypt: true,
            signing: Jws::HMAC.to_vec(),
            key_encryption: vec![Kek::Dir, Kek::A128Kw, Kek::A128GcmKw],
        },
        TestCase {
            key: Key::generate_oct("oct", 192).unwrap(),
            description: "OCT 192",
            can_sign: true,
            can_encrypt: true,
            signing: Jws::HMAC.to_vec(),
            key_encryption: vec![Kek::Dir, Kek::A192Kw, Kek::A192GcmKw],
        },
        TestCase {
            key: Key::generate_oct("oct", 256).unwrap(),
            description: "OCT 256",
            can_sign: true,
            can_encrypt: true,
            signing: Jws::HMAC.to_vec(),
            key_encryption: vec![Kek::Dir, Kek::A256Kw, Kek::A256GcmKw],
        },
        TestCase {
            key: Key::generate_oct("oct", 384).unwrap(),
            description: "OCT 384",
            can_sign: true,
            can_encrypt: true,
            signing: Jws::HMAC.to_vec(),
            key_encryption: vec![Kek::Dir],
        },
        TestCase {
            key: Key::generate_oct("oct", 512).unwrap(),
            description: "OCT 512",
            can_sign: true,
            can_encrypt: true,
            signing: Jws::HMAC.to_vec(),
            key_encryption: vec![Kek::Dir],
        },
        TestCase {
            key: Key::Password(PasswordKey::new("password", "secret", 8, 1000)),
            description: "Password",
            can_sign: false,
            can_encrypt: true,
            signing: vec![],
            key_encryption: vec![
                Kek::Pbes2Hs256A128Kw,
                Kek::Pbes2Hs384A192Kw,
                Kek::Pbes2Hs512A256Kw,
            ],
        },
    ];

    for test_case in test_cases {
        let key = &test_case.key;
        let name = test_case.description;

        assert_eq!(key.description(), name);
        assert_eq!(key.can_sign(), test_case.can_sign, "{name}");
        assert_eq!(key.can_verify(), !test_case.signing.is_empty(), "{name}");
        assert_eq!(key.can_encrypt(), test_case.can_encrypt, "{name}");
        assert_eq!(key.can_decrypt(), test_case.can_encrypt, "{name}");
        assert_eq!(key.signing_algorithms(), test_case.signing, "{name}");
        assert_eq!(key.key_encryption_algorithms(), test_case.key_encryption, "{name}");
    }
}

#[test]
fn direct_encryption_matches_key_size() {
    let test_cases = [
        (128, vec![Cek::A128Gcm]),
        (192, vec![Cek::A192Gcm]),
        (256, vec![Cek::A256Gcm, Cek::A128CbcHs256]),
        (384, vec![Cek::A192CbcHs384]),
        (512, vec![Cek::A256CbcHs512]),
    ];

    for (bits, expected) in test_cases {
        let key = Key::generate_oct("oct", bits).unwrap();

        assert_eq!(key.content_encryption_methods(Kek::Dir), expected, "{bits}");
        for algorithm in key.key_encryption_algorithms() {
            if algorithm != Kek::Dir {
                assert_eq!(key.content_encryption_methods(algorithm), Cek::ALL.to_vec());
            }
        }
    }
}

#[test]
fn public_keys_verify_but_do_not_sign_or_decrypt() {
    let [rsa, ec, x25519] = [RSA1024_PUBLIC, PRIME256V1_PRIVATE_SEC1, X25519_PUBLIC]
        .map(|pem| Key::from_pem("public", pem).unwrap());
    let ec = Key::from_jwk(&ec.to_public_jwk().unwrap()).unwrap();

    assert!(!rsa.has_private());
    assert!(!rsa.can_sign());
    assert!(rsa.can_verify());

    assert!(!ec.has_private());
    assert!(ec.can_verify());
    assert!(ec.can_encrypt());
    assert!(!ec.can_decrypt());

    assert!(!x25519.has_private());
    assert!(x25519.can_encrypt());
    assert!(!x25519.can_decrypt());
    assert!(!x25519.can_verify());
}

#[test]
fn weak_password_parameters() {
    let test_cases = [
        PasswordKey::new("p", "", 8, 1000),
        PasswordKey::new("p", "secret", 7, 1000),
        PasswordKey::new("p", "secret", 8, 999),
        PasswordKey::new("p", "secret", 8, 1_000_001),
    ];

    for key in test_cases {
        let key = Key::Password(key);
        assert!(!key.can_encrypt());
        assert!(!key.can_decrypt());
    }
}

#[test]
fn pem_round_trip() {
    for pem in [PRIME256V1_PRIVATE_SEC1, RSA1024_PRIVATE, X25519_PRIVATE] {
        let key = Key::from_pem("pem", pem).unwrap();

        let reloaded = Key::from_pem("pem", &key.to_pem().unwrap()).unwrap();
        assert_eq!(reloaded.to_jwk().unwrap(), key.to_jwk().unwrap());

        let public = Key::from_pem("pem", &key.to_public_pem().unwrap()).unwrap();
        assert_eq!(public.to_jwk().unwrap(), key.to_public_jwk().unwrap());
    }
}

#[test]
fn symmetric_and_password_keys_have_no_pem() {
    assert!(Key::generate_oct("oct", 256).unwrap().to_pem().is_err());
    assert!(Key::Password(PasswordKey::new("p", "secret", 8, 1000))
        .to_public_pem()
        .is_err());
}

#[test]
fn missing_kid_is_the_thumbprint() {
    let mut jwk = Key::generate_ec("ec", EcCurve::P256)
        .unwrap()
        .to_public_jwk()
        .unwrap();
    jwk.remove("kid");

    let key = Key::from_jwk(&jwk).unwrap();

    let thumbprint = jwk_thumbprint(&jwk).unwrap();
    assert_eq!(key.id(), thumbprint);
    assert_eq!(key.to_jwk().unwrap()["kid"], thumbprint.as_str());
    assert_eq!(key.to_string(), format!("{thumbprint} (P-256)"));
}
