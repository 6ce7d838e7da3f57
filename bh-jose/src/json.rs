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

//! Textual JSON helpers.
//!
//! Both helpers work on the characters of the document rather than on a parsed
//! value, so numbers, escapes and member order are reproduced exactly. This is
//! what allows deciding whether a signed header can be re-rendered without
//! changing its bytes.

use bherror::{traits::ForeignError as _, Result};
use serde::de::IgnoredAny;

use crate::ParseError;

const INDENTATION: usize = 4;

fn check_json(json: &str) -> Result<(), ParseError> {
    serde_json::from_str::<IgnoredAny>(json)
        .match_foreign_err(|error| ParseError::InvalidJson(error.to_string()))?;
    Ok(())
}

fn is_json_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r' | '\t')
}

/// Tracks whether the scanner is inside a string literal.
#[derive(Default)]
struct StringScanner {
    in_string: bool,
    escaped: bool,
}

impl StringScanner {
    /// Feeds `c` to the scanner and returns whether it belongs to a string
    /// literal, delimiting quotes included.
    fn feed(&mut self, c: char) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == '"' {
                self.in_string = false;
            }
            true
        } else if c == '"' {
            self.in_string = true;
            true
        } else {
            false
        }
    }
}

/// Removes all insignificant whitespace from a JSON document.
///
/// Fails if `json` is not a valid JSON document.
pub fn compact_json(json: &str) -> Result<String, ParseError> {
    check_json(json)?;

    let mut scanner = StringScanner::default();
    Ok(json
        .chars()
        .filter(|&c| scanner.feed(c) || !is_json_whitespace(c))
        .collect())
}

/// Pretty prints a JSON document, placing every member and element on its own
/// line with an indentation of four spaces per level.
///
/// Fails if `json` is not a valid JSON document.
pub fn pretty_print_json(json: &str) -> Result<String, ParseError> {
    let compact = compact_json(json)?;

    let mut output = String::with_capacity(compact.len() * 2);
    let mut scanner = StringScanner::default();
    let mut level = 0usize;
    let mut chars = compact.chars().peekable();

    let new_line = |output: &mut String, level: usize| {
        output.push('\n');
        output.extend(std::iter::repeat(' ').take(level * INDENTATION));
    };

    while let Some(c) = chars.next() {
        if scanner.feed(c) {
            output.push(c);
            continue;
        }

        match c {
            '{' | '[' => {
                output.push(c);
                // empty containers stay on one line
                if matches!(chars.peek(), Some('}') | Some(']')) {
                    if let Some(close) = chars.next() {
                        output.push(close);
                    }
                } else {
                    level += 1;
                    new_line(&mut output, level);
                }
            }
            '}' | ']' => {
                level = level.saturating_sub(1);
                new_line(&mut output, level);
                output.push(c);
            }
            ':' => output.push_str(": "),
            ',' => {
                output.push(',');
                new_line(&mut output, level);
            }
            _ => output.push(c),
        }
    }

    Ok(output)
}

/// Pretty prints `text` if it is JSON, otherwise returns it unchanged.
pub fn pretty_print_or_original(text: &str) -> String {
    pretty_print_json(text).unwrap_or_else(|_| text.to_owned())
}

/// Returns `true` if `json` is a JSON document without any insignificant
/// whitespace.
pub fn is_json_compact(json: &str) -> bool {
    compact_json(json).is_ok_and(|compact| compact == json)
}
