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


/// Error that occurs when an attack cannot be carried out.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum AttackError {
    /// The attack does not work with the requested algorithm.
    #[strum(to_string = "Invalid algorithm: {0}")]
    InvalidAlgorithm(String),
    /// The attack does not work with the given key.
    #[strum(to_string = "Unsupported key: {0}")]
    UnsupportedKey(String),
    /// The attacked token could not be signed.
    #[strum(to_string = "Signing failed: {0}")]
    SigningFailed(String),
    /// The attacked token is not usable for the attack.
    #[strum(to_string = "Invalid token: {0}")]
    InvalidToken(String),
    /// Reading the next candidate secret failed.
    #[strum(to_string = "Word list unreadable: {0}")]
    WordListUnreadable(String),
}

impl bherror::BhError for AttackError {}
