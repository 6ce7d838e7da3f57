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

//! Locating tokens within arbitrary text.
//!
//! Searching happens in two tiers. A regular expression first picks out
//! substrings shaped like a compact JWE or JWS starting with `e`, which is how
//! every `base64url` encoded JSON object starts. Each candidate is then parsed
//! strictly and discarded unless its header (and, for a JWS, its payload) is
//! meaningful JSON.

use regex::Regex;
use serde_json::Value;

use crate::{
    Base64Url, JoseObject as _, Jwe, Jws, MutableJoseObject, Token, HEADER_ALGORITHM,
    HEADER_ENCRYPTION,
};

const JWS_PATTERN: &str = r"e[A-Za-z0-9_-]*\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]*";
const JWE_PATTERN: &str =
    r"e[A-Za-z0-9_-]*\.[A-Za-z0-9_-]*\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+";

lazy_static::lazy_static! {
    /// JWE shapes are tried first, so a five part token is never cut short to
    /// the three part JWS shape.
    static ref JOSE_OBJECT_REGEX: Regex = Regex::new(&format!("({JWE_PATTERN})|({JWS_PATTERN})"))
        .expect("Implementation error: invalid token pattern");
}

/// Returns every substring of `text` shaped like a compact JWE or JWS, without
/// duplicates, in order of first appearance.
///
/// No decoding happens at this stage.
pub fn find_candidates(text: &str) -> Vec<&str> {
    let mut candidates: Vec<&str> = Vec::new();

    for found in JOSE_OBJECT_REGEX.find_iter(text) {
        let candidate = found.as_str();
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }

    candidates
}

/// Strictly parses `candidate` as a token.
///
/// A valid JWE wins over a JWS. A JWE must have a JSON object header with
/// string `alg` and `enc` members. A JWS must have a JSON object header with a
/// non-blank string `alg` member and a payload that is UTF-8 encoded JSON of
/// any kind.
pub fn parse_jose_object(candidate: &str) -> Option<Token> {
    if let Some(jwe) = parse_strict_jwe(candidate) {
        return Some(Token::Jwe(jwe));
    }

    parse_strict_jws(candidate).map(Token::Jws)
}

fn parse_strict_jwe(candidate: &str) -> Option<Jwe> {
    let jwe = Jwe::parse(candidate).ok()?;
    let header = jwe.header().json().ok()?;

    let has_string_member = |name: &str| header.get(name).is_some_and(Value::is_string);
    if has_string_member(HEADER_ALGORITHM) && has_string_member(HEADER_ENCRYPTION) {
        Some(jwe)
    } else {
        None
    }
}

fn parse_strict_jws(candidate: &str) -> Option<Jws> {
    let jws = Jws::parse(candidate).ok()?;
    let header = jws.header().json().ok()?;

    let has_algorithm = header
        .get(HEADER_ALGORITHM)
        .and_then(Value::as_str)
        .is_some_and(|algorithm| !algorithm.trim().is_empty());

    if has_algorithm && is_json(jws.claims().encoded()) {
        Some(jws)
    } else {
        None
    }
}

fn is_json(encoded: &Base64Url) -> bool {
    encoded
        .decode_utf8()
        .is_ok_and(|text| serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok())
}

/// Finds every token in `text`, paired with the text it was found as.
pub fn extract_jose_objects(text: &str) -> Vec<MutableJoseObject> {
    find_candidates(text)
        .into_iter()
        .filter_map(|candidate| match parse_jose_object(candidate) {
            Some(token) => Some(MutableJoseObject::new(candidate, token)),
            None => {
                tracing::debug!(length = candidate.len(), "discarding token candidate");
                None
            }
        })
        .collect()
}

/// Returns `true` if `text` contains at least one token.
pub fn contains_jose_objects(text: &str) -> bool {
    find_candidates(text)
        .into_iter()
        .any(|candidate| parse_jose_object(candidate).is_some())
}

/// Rewrites `message`, replacing the original text of every changed token with
/// its current serialization.
pub fn substitute_changed(message: &str, objects: &[MutableJoseObject]) -> String {
    objects
        .iter()
        .filter(|object| object.changed())
        .fold(message.to_owned(), |message, object| {
            message.replace(object.original(), &object.current().serialize())
        })
}
