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

use openssl::{ec::EcGroup, nid::Nid};

/// A cryptography backend that keys hand their operations to.
///
/// Both backends are OpenSSL; they differ in the elliptic curves they accept.
/// The [`Provider::Extended`] backend additionally accepts `secp256k1`, which
/// is needed for `ES256K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// The platform default backend, NIST curves only.
    Default,
    /// The backend with additional curves.
    Extended,
}

impl Provider {
    /// Returns `true` if the backend accepts keys on the given curve.
    pub fn supports_curve(&self, curve: Nid) -> bool {
        match self {
            Self::Extended => true,
            Self::Default => curve != Nid::SECP256K1,
        }
    }
}

/// Chooses the [`Provider`] for a cryptographic operation.
///
/// The resolver is queried once per operation. When the preferred backend is
/// not available it falls back to [`Provider::Default`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderResolver {
    preferred: Provider,
}

impl ProviderResolver {
    /// A resolver preferring the given backend.
    pub fn new(preferred: Provider) -> Self {
        Self { preferred }
    }

    /// The backend to use for the next operation.
    pub fn resolve(&self) -> Provider {
        match self.preferred {
            Provider::Extended if extended_provider_available() => Provider::Extended,
            Provider::Extended => {
                tracing::debug!("extended cryptography provider unavailable, using the default");
                Provider::Default
            }
            Provider::Default => Provider::Default,
        }
    }
}

impl Default for ProviderResolver {
    /// Prefers [`Provider::Extended`].
    fn default() -> Self {
        Self::new(Provider::Extended)
    }
}

/// The extended backend is usable when the linked OpenSSL knows `secp256k1`.
fn extended_provider_available() -> bool {
    EcGroup::from_curve_name(Nid::SECP256K1).is_ok()
}
