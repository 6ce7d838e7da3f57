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

use std::fmt;

use chrono::{DateTime, Utc};

use crate::TimeClaim;

/// A human readable note about a token, e.g. a claim that makes the token
/// unusable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Information {
    text: String,
    warning: bool,
}

impl Information {
    /// Creates a new information item.
    pub fn new(text: impl Into<String>, warning: bool) -> Self {
        Self {
            text: text.into(),
            warning,
        }
    }

    /// Describes a time claim, flagging it as a warning if the claim is not
    /// valid at `now`.
    pub fn from_time_claim(time_claim: &TimeClaim, now: DateTime<Utc>) -> Self {
        Self::new(time_claim.description(), !time_claim.is_valid_at(now))
    }

    /// The text of the item.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the item should be highlighted.
    pub fn is_warning(&self) -> bool {
        self.warning
    }
}

impl fmt::Display for Information {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
