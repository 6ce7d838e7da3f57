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

/// Error that occurs when a token, one of its components, or a JSON document
/// could not be parsed.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum ParseError {
    /// A component is not valid `base64url` text.
    #[strum(to_string = "Invalid base64url value: {0}")]
    InvalidBase64(String),
    /// The compact serialization has the wrong number of `.` separated parts.
    #[strum(to_string = "Invalid number of encoded sections: expected {0}, found {1}")]
    InvalidPartCount(usize, usize),
    /// Every part of the compact serialization decodes to nothing.
    #[strum(to_string = "All sections empty")]
    AllPartsEmpty,
    /// Decoded bytes were required to be UTF-8 text, but they were not.
    #[strum(to_string = "Invalid UTF-8 text")]
    InvalidUtf8,
    /// Text was required to be JSON, but it was not.
    #[strum(to_string = "Invalid JSON: {0}")]
    InvalidJson(String),
    /// A JSON value had a different type than required.
    #[strum(to_string = "Unexpected JSON type: {0}")]
    UnexpectedJsonType(String),
    /// The text is not a JWS or JWE in compact serialization.
    #[strum(to_string = "Not a JOSE object")]
    NotJoseObject,
}

impl bherror::BhError for ParseError {}
