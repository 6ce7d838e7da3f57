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

use bherror::Error;
use openssl::{nid::Nid, pkey::Id};

use crate::{JwsAlgorithm, KeyError};

/// Named curves of `"EC"` keys, with their JWK `"crv"` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    /// NIST P-256, also known as `secp256r1` and `prime256v1`
    P256,
    /// SECG `secp256k1`
    Secp256k1,
    /// NIST P-384
    P384,
    /// NIST P-521
    P521,
}

impl EcCurve {
    /// Every supported curve.
    pub const ALL: [Self; 4] = [Self::P256, Self::Secp256k1, Self::P384, Self::P521];

    /// The JWK `"crv"` value of the curve.
    pub fn name(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::Secp256k1 => "secp256k1",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// The OpenSSL identifier of the curve.
    pub fn nid(&self) -> Nid {
        match self {
            // X9_62_PRIME256V1 is the ANSI X9.62 name of NIST P-256
            Self::P256 => Nid::X9_62_PRIME256V1,
            Self::Secp256k1 => Nid::SECP256K1,
            Self::P384 => Nid::SECP384R1,
            Self::P521 => Nid::SECP521R1,
        }
    }

    /// Size in bytes of a field element, i.e. of each affine coordinate.
    pub fn coordinate_length(&self) -> usize {
        match self {
            Self::P256 | Self::Secp256k1 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    /// The only ECDSA algorithm defined for the curve.
    pub fn signing_algorithm(&self) -> JwsAlgorithm {
        match self {
            Self::P256 => JwsAlgorithm::Es256,
            Self::Secp256k1 => JwsAlgorithm::Es256K,
            Self::P384 => JwsAlgorithm::Es384,
            Self::P521 => JwsAlgorithm::Es512,
        }
    }

    /// Looks up the curve by its OpenSSL identifier.
    pub fn from_nid(nid: Nid) -> Option<Self> {
        Self::ALL.into_iter().find(|curve| curve.nid() == nid)
    }
}

impl FromStr for EcCurve {
    type Err = Error<KeyError>;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|curve| curve.name() == value)
            .ok_or_else(|| Error::root(KeyError::UnsupportedKey(format!("EC curve {value}"))))
    }
}

impl std::fmt::Display for EcCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Curves of `"OKP"` (octet key pair) keys, as defined in [RFC8037].
///
/// [RFC8037]: https://datatracker.ietf.org/doc/html/rfc8037#section-2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OkpCurve {
    /// Ed25519 signature keys
    Ed25519,
    /// Ed448 signature keys
    Ed448,
    /// X25519 key agreement keys
    X25519,
    /// X448 key agreement keys
    X448,
}

impl OkpCurve {
    /// Every supported curve.
    pub const ALL: [Self; 4] = [Self::Ed25519, Self::Ed448, Self::X25519, Self::X448];

    /// The JWK `"crv"` value of the curve.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
            Self::Ed448 => "Ed448",
            Self::X25519 => "X25519",
            Self::X448 => "X448",
        }
    }

    /// The OpenSSL key type of the curve.
    pub fn id(&self) -> Id {
        match self {
            Self::Ed25519 => Id::ED25519,
            Self::Ed448 => Id::ED448,
            Self::X25519 => Id::X25519,
            Self::X448 => Id::X448,
        }
    }

    /// Returns `true` for the EdDSA curves, `false` for the key agreement
    /// curves.
    pub fn is_signing_curve(&self) -> bool {
        matches!(self, Self::Ed25519 | Self::Ed448)
    }

    /// Looks up the curve by its OpenSSL key type.
    pub fn from_id(id: Id) -> Option<Self> {
        Self::ALL.into_iter().find(|curve| curve.id() == id)
    }
}

impl FromStr for OkpCurve {
    type Err = Error<KeyError>;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|curve| curve.name() == value)
            .ok_or_else(|| Error::root(KeyError::UnsupportedKey(format!("OKP curve {value}"))))
    }
}

impl std::fmt::Display for OkpCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn curve_names() {
        for curve in EcCurve::ALL {
            assert_eq!(curve.name().parse::<EcCurve>().unwrap(), curve);
            assert_eq!(EcCurve::from_nid(curve.nid()), Some(curve));
        }
        for curve in OkpCurve::ALL {
            assert_eq!(curve.to_string().parse::<OkpCurve>().unwrap(), curve);
            assert_eq!(OkpCurve::from_id(curve.id()), Some(curve));
        }

        assert_matches!(
            "P-192".parse::<EcCurve>().unwrap_err().error,
            KeyError::UnsupportedKey(_)
        );
        assert_eq!(EcCurve::from_nid(Nid::SECP224R1), None);
    }
}
