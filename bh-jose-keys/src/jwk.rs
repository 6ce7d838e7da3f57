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

use std::collections::HashSet;

use bh_jose::{base64_url_decode, base64_url_encode};
use bherror::{
    traits::{ErrorContext as _, ForeignError as _, PropagateError as _},
    Error, Result,
};
use openssl::{
    bn::{BigNum, BigNumContext, BigNumRef},
    ec::{EcGroup, EcKey, EcKeyRef},
    pkey::{HasPublic, Public},
    sha::Sha256,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{EcCurve, Key, KeyError};

/// A JSON object meant to represent a JWK, public or private.
///
/// Since this is a type alias, no aspects of the schema are enforced; this is
/// left to [`Key::from_jwk`].
pub type Jwk = Map<String, Value>;

/// JWK `"kty"` parameter name.
pub const JWK_KEY_TYPE: &str = "kty";
/// JWK `"kid"` parameter name.
pub const JWK_KEY_ID: &str = "kid";
/// JWK `"crv"` parameter name.
pub const JWK_CURVE: &str = "crv";

/// A JWK Set document: a JSON object whose `"keys"` member lists JWKs.
///
/// Any `"kid"` present must be a string, and no two JWKs may share one. JWKs
/// without a `"kid"` may appear alongside JWKs with one.
///
/// See [RFC7517][RFC].
///
/// [RFC]: https://datatracker.ietf.org/doc/html/rfc7517#section-5
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "JwkSetUnverified")]
pub struct JwkSet {
    keys: Vec<Jwk>,
}

impl JwkSet {
    /// Create a `JwkSet` from the given keys.
    pub fn new(keys: Vec<Jwk>) -> std::result::Result<Self, &'static str> {
        JwkSetUnverified { keys }.try_into()
    }

    /// The JWKs of the set.
    pub fn keys(&self) -> &[Jwk] {
        &self.keys
    }
}

/// Deserialization target for [`JwkSet`], validated through `TryFrom`
/// ([serde#642]).
///
/// [serde#642]: https://github.com/serde-rs/serde/issues/642
#[derive(Deserialize, Debug)]
struct JwkSetUnverified {
    keys: Vec<Jwk>,
}

impl TryFrom<JwkSetUnverified> for JwkSet {
    type Error = &'static str;

    fn try_from(value: JwkSetUnverified) -> std::result::Result<Self, Self::Error> {
        let keys = value.keys;

        let mut uniq = HashSet::new();
        for key in keys.iter() {
            let Some(kid) = key.get(JWK_KEY_ID) else {
                continue;
            };
            let kid = kid
                .as_str()
                .ok_or("JWK contains a `kid` parameter that is not a string")?;
            if !uniq.insert(kid) {
                return Err("Provided JWKs contain duplicate kid parameter values");
            }
        }

        Ok(JwkSet { keys })
    }
}

/// Parses a JWK Set document into keys.
///
/// JWKs that do not describe a supported key are skipped, so the result may
/// hold fewer keys than the set. A document that is not a valid JWK Set is an
/// error.
pub fn parse_jwk_set(json: &str) -> Result<Vec<Key>, KeyError> {
    let jwk_set: JwkSet = serde_json::from_str(json)
        .match_foreign_err(|error| KeyError::InvalidJwk(format!("invalid JWK Set: {error}")))?;

    Ok(jwk_set
        .keys
        .iter()
        .filter_map(|jwk| match Key::from_jwk(jwk) {
            Ok(key) => Some(key),
            Err(error) => {
                tracing::debug!("skipping JWK Set member: {}", error.error);
                None
            }
        })
        .collect())
}

/// Returns the string member `name`.
pub(crate) fn string_member<'a>(jwk: &'a Jwk, name: &str) -> Result<&'a str, KeyError> {
    let error = |message| Error::root(KeyError::InvalidJwk(message));

    let value = jwk
        .get(name)
        .ok_or_else(|| error(format!("missing \"{name}\" member")))?;

    value
        .as_str()
        .ok_or_else(|| error(format!("\"{name}\" member is not a string")))
        .ctx(|| format!("value of \"{name}\" was {value}"))
}

/// Returns the base64url-encoded member `name`, decoded.
pub(crate) fn bytes_member(jwk: &Jwk, name: &str) -> Result<Vec<u8>, KeyError> {
    let encoded = string_member(jwk, name)?;

    base64_url_decode(encoded)
        .with_err(|| KeyError::InvalidJwk(format!("\"{name}\" member is not base64url")))
}

/// Returns the base64url-encoded big-endian integer member `name`.
pub(crate) fn bignum_member(jwk: &Jwk, name: &str) -> Result<BigNum, KeyError> {
    let bytes = bytes_member(jwk, name)?;

    BigNum::from_slice(&bytes)
        .foreign_err(|| KeyError::InvalidJwk(format!("\"{name}\" member is not an integer")))
}

/// Encodes an integer the way JWKs carry them: big-endian, without leading
/// zeros.
pub(crate) fn encode_bignum(number: &BigNumRef) -> String {
    base64_url_encode(number.to_vec())
}

/// Returns the affine coordinates of the public key, each padded to the
/// coordinate size of the curve.
pub(crate) fn affine_coordinates<T: HasPublic>(
    key: &EcKeyRef<T>,
    curve: EcCurve,
) -> Result<(Vec<u8>, Vec<u8>), KeyError> {
    let error = || KeyError::ConversionFailed("EC affine coordinates".to_owned());

    let mut x = BigNum::new().foreign_err(error)?;
    let mut y = BigNum::new().foreign_err(error)?;
    let mut ctx = BigNumContext::new().foreign_err(error)?;
    key.public_key()
        .affine_coordinates(key.group(), &mut x, &mut y, &mut ctx)
        .foreign_err(error)?;

    let length = curve.coordinate_length() as i32;
    let x = x.to_vec_padded(length).foreign_err(error)?;
    let y = y.to_vec_padded(length).foreign_err(error)?;
    Ok((x, y))
}

/// Constructs the public JWK members of an EC key.
pub(crate) fn ec_public_jwk<T: HasPublic>(
    key: &EcKeyRef<T>,
    curve: EcCurve,
) -> Result<Jwk, KeyError> {
    let (x, y) = affine_coordinates(key, curve)?;

    Ok(bh_jose::json_object!({
        "kty": "EC",
        "crv": curve.name(),
        "x": base64_url_encode(x),
        "y": base64_url_encode(y),
    }))
}

/// Reconstructs the public EC key from the `"x"` and `"y"` members.
pub(crate) fn ec_public_key_from_jwk(
    jwk: &Jwk,
    curve: EcCurve,
) -> Result<EcKey<Public>, KeyError> {
    let x = bytes_member(jwk, "x")?;
    let y = bytes_member(jwk, "y")?;
    let length = curve.coordinate_length();
    if x.len() != length || y.len() != length {
        return Err(Error::root(KeyError::InvalidJwk(format!(
            "{curve} coordinates must be {length} bytes"
        ))))
        .ctx(|| format!("coordinate lengths were {} and {}", x.len(), y.len()));
    }

    let error = || KeyError::InvalidJwk("point is not on the curve".to_owned());
    let x = BigNum::from_slice(&x).foreign_err(error)?;
    let y = BigNum::from_slice(&y).foreign_err(error)?;
    let group = EcGroup::from_curve_name(curve.nid())
        .foreign_err(|| KeyError::UnsupportedKey(format!("EC curve {curve}")))?;

    EcKey::from_public_key_affine_coordinates(&group, &x, &y).foreign_err(error)
}

/// The [RFC7638] thumbprint of a public JWK, base64url-encoded.
///
/// It is computed over the required members only, in lexicographic order, so
/// it identifies the key regardless of its other members.
///
/// [RFC7638]: https://datatracker.ietf.org/doc/html/rfc7638#section-3
pub fn jwk_thumbprint(jwk: &Jwk) -> Result<String, KeyError> {
    let members: &[&str] = match string_member(jwk, JWK_KEY_TYPE)? {
        "EC" => &["crv", "kty", "x", "y"],
        "RSA" => &["e", "kty", "n"],
        "OKP" => &["crv", "kty", "x"],
        "oct" => &["k", "kty"],
        other => {
            return Err(Error::root(KeyError::UnsupportedKey(format!(
                "key type {other}"
            ))))
        }
    };

    let mut canonical = Map::new();
    for member in members {
        canonical.insert(
            (*member).to_owned(),
            Value::String(string_member(jwk, member)?.to_owned()),
        );
    }

    let mut hasher = Sha256::new();
    hasher.update(Value::Object(canonical).to_string().as_bytes());
    Ok(base64_url_encode(hasher.finish()))
}
