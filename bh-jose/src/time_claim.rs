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

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde_json::{Map, Value};

const DISPLAY_FORMAT: &str = "%a %b %d %Y %H:%M:%S";

/// The registered claims carrying a point in time, as defined in [RFC7519].
///
/// [RFC7519]: https://datatracker.ietf.org/doc/html/rfc7519#section-4.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeClaimType {
    /// `exp` claim.
    ExpirationTime,
    /// `nbf` claim.
    NotBefore,
    /// `iat` claim.
    IssuedAt,
}

impl TimeClaimType {
    /// All time claim types, in the order they are reported.
    pub const ALL: [TimeClaimType; 3] = [Self::ExpirationTime, Self::NotBefore, Self::IssuedAt];

    /// The claim name within the JWT claims set.
    pub fn claim_name(&self) -> &'static str {
        match self {
            Self::ExpirationTime => "exp",
            Self::NotBefore => "nbf",
            Self::IssuedAt => "iat",
        }
    }

    /// The human readable name of the claim.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ExpirationTime => "Expiration Time",
            Self::NotBefore => "Not Before",
            Self::IssuedAt => "Issued At",
        }
    }

    fn must_be_in_the_past(&self) -> bool {
        match self {
            Self::ExpirationTime => false,
            Self::NotBefore | Self::IssuedAt => true,
        }
    }

    /// Checks `date_time` against `now`.
    ///
    /// An `exp` value is valid if it is strictly after `now`, `nbf` and `iat`
    /// values are valid if they are strictly before `now`. A missing or
    /// negative value is never valid.
    pub fn is_valid_at(&self, date_time: Option<&DateTime<FixedOffset>>, now: DateTime<Utc>) -> bool {
        let Some(date_time) = date_time else {
            return false;
        };

        if date_time.timestamp() < 0 {
            return false;
        }

        if self.must_be_in_the_past() {
            *date_time < now
        } else {
            *date_time > now
        }
    }
}

/// A time claim found in a JWS payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeClaim {
    claim_type: TimeClaimType,
    value: String,
    date_time: Option<DateTime<FixedOffset>>,
}

impl TimeClaim {
    /// Creates a claim from its raw value, interpreting it either as (possibly
    /// fractional) seconds since the epoch or as an ISO 8601 date-time.
    pub fn new(claim_type: TimeClaimType, value: impl Into<String>) -> Self {
        let value = value.into();
        let date_time = if is_epoch_seconds(&value) {
            parse_epoch_seconds(&value)
        } else {
            parse_iso_date_time(&value)
        };

        Self {
            claim_type,
            value,
            date_time,
        }
    }

    /// Extracts every time claim present in a JSON object payload, in the
    /// order `exp`, `nbf`, `iat`.
    pub fn from_claims(claims: &Map<String, Value>) -> Vec<Self> {
        TimeClaimType::ALL
            .into_iter()
            .filter_map(|claim_type| {
                claims
                    .get(claim_type.claim_name())
                    .map(|value| Self::new(claim_type, claim_text(value)))
            })
            .collect()
    }

    /// The type of the claim.
    pub fn claim_type(&self) -> TimeClaimType {
        self.claim_type
    }

    /// The raw claim value.
    pub fn raw_value(&self) -> &str {
        &self.value
    }

    /// The parsed point in time, if the value could be parsed.
    pub fn date_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.date_time.as_ref()
    }

    /// The parsed point in time rendered as e.g. `Thu Jan 18 2018 01:30:22`, in
    /// the offset of the original value (UTC for epoch values).
    pub fn date(&self) -> Option<String> {
        self.date_time
            .map(|date_time| date_time.format(DISPLAY_FORMAT).to_string())
    }

    /// Returns `true` if the claim is valid at the current time.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Returns `true` if the claim is valid at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.claim_type.is_valid_at(self.date_time.as_ref(), now)
    }

    /// One line describing the claim, such as
    /// `Expiration Time - Thu Jan 18 2018 01:30:22` or
    /// `Issued At - invalid value: soon`.
    pub fn description(&self) -> String {
        match self.date() {
            Some(date) => format!("{} - {}", self.claim_type.display_name(), date),
            None => format!(
                "{} - invalid value: {}",
                self.claim_type.display_name(),
                self.value
            ),
        }
    }
}

fn claim_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Matches `\d+(\.\d+)?`.
fn is_epoch_seconds(value: &str) -> bool {
    let all_digits = |text: &str| !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());

    match value.split_once('.') {
        Some((seconds, fraction)) => all_digits(seconds) && all_digits(fraction),
        None => all_digits(value),
    }
}

fn parse_epoch_seconds(value: &str) -> Option<DateTime<FixedOffset>> {
    let (seconds, fraction) = value.split_once('.').unwrap_or((value, ""));
    let seconds: i64 = seconds.parse().ok()?;

    // nine digits of the fraction are nanoseconds, the rest is truncated
    let nanoseconds = if fraction.is_empty() {
        0
    } else {
        let digits: String = fraction.chars().chain(std::iter::repeat('0')).take(9).collect();
        digits.parse().ok()?
    };

    DateTime::<Utc>::from_timestamp(seconds, nanoseconds).map(|date_time| date_time.fixed_offset())
}

fn parse_iso_date_time(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn parse_values() {
        struct TestCase {
            value: &'static str,
            expected_date: Option<&'static str>,
        }

        let test_cases = [
            TestCase {
                value: "1516239022",
                expected_date: Some("Thu Jan 18 2018 01:30:22"),
            },
            TestCase {
                value: "482196050",
                expected_date: Some("Fri Apr 12 1985 23:20:50"),
            },
            TestCase {
                value: "482196050.52",
                expected_date: Some("Fri Apr 12 1985 23:20:50"),
            },
            TestCase {
                value: "1985-04-12T23:20:50.52Z",
                expected_date: Some("Fri Apr 12 1985 23:20:50"),
            },
            TestCase {
                value: "2036-12-19T16:39:57-08:00",
                expected_date: Some("Fri Dec 19 2036 16:39:57"),
            },
            TestCase {
                value: "0",
                expected_date: Some("Thu Jan 01 1970 00:00:00"),
            },
            TestCase {
                value: "zeolite",
                expected_date: None,
            },
            TestCase {
                value: "null",
                expected_date: None,
            },
            TestCase {
                value: "-12345",
                expected_date: None,
            },
        ];

        for test_case in test_cases {
            let claim = TimeClaim::new(TimeClaimType::IssuedAt, test_case.value);
            assert_eq!(
                claim.date().as_deref(),
                test_case.expected_date,
                "{}",
                test_case.value
            );
        }
    }

    #[test]
    fn fractional_seconds_are_kept() {
        let claim = TimeClaim::new(TimeClaimType::IssuedAt, "482196050.52");
        let date_time = claim.date_time().unwrap();

        assert_eq!(date_time.timestamp(), 482196050);
        assert_eq!(date_time.timestamp_subsec_millis(), 520);
    }

    #[test]
    fn validity() {
        struct TestCase {
            claim_type: TimeClaimType,
            value: &'static str,
            valid: bool,
        }

        let test_cases = [
            TestCase {
                claim_type: TimeClaimType::ExpirationTime,
                value: "1516239022",
                valid: false,
            },
            TestCase {
                claim_type: TimeClaimType::ExpirationTime,
                value: "2516239022",
                valid: true,
            },
            TestCase {
                claim_type: TimeClaimType::NotBefore,
                value: "1516239022",
                valid: true,
            },
            TestCase {
                claim_type: TimeClaimType::NotBefore,
                value: "2516239022",
                valid: false,
            },
            TestCase {
                claim_type: TimeClaimType::IssuedAt,
                value: "1516239022",
                valid: true,
            },
            TestCase {
                claim_type: TimeClaimType::IssuedAt,
                value: "isogeny",
                valid: false,
            },
            TestCase {
                claim_type: TimeClaimType::ExpirationTime,
                value: "0",
                valid: false,
            },
        ];

        for test_case in test_cases {
            let claim = TimeClaim::new(test_case.claim_type, test_case.value);
            assert_eq!(
                claim.is_valid_at(now()),
                test_case.valid,
                "{:?} {}",
                test_case.claim_type,
                test_case.value
            );
        }
    }

    #[test]
    fn descriptions() {
        assert_eq!(
            TimeClaim::new(TimeClaimType::IssuedAt, "isogeny").description(),
            "Issued At - invalid value: isogeny"
        );
        assert_eq!(
            TimeClaim::new(TimeClaimType::NotBefore, "2516239022").description(),
            "Not Before - Sun Sep 26 2049 03:17:02"
        );
        assert_eq!(
            TimeClaim::new(TimeClaimType::ExpirationTime, "1516239022").description(),
            "Expiration Time - Thu Jan 18 2018 01:30:22"
        );
    }

    #[test]
    fn from_claims_reads_registered_claims_only() {
        let claims = serde_json::json!({
            "sub": "1234567890",
            "iat": 1516239022,
            "exp": "2516239022",
            "nbf": null,
            "auth_time": 1516239022
        });
        let claims = claims.as_object().unwrap();

        let time_claims = TimeClaim::from_claims(claims);

        let found: Vec<_> = time_claims
            .iter()
            .map(|claim| (claim.claim_type(), claim.raw_value()))
            .collect();
        assert_eq!(
            found,
            [
                (TimeClaimType::ExpirationTime, "2516239022"),
                (TimeClaimType::NotBefore, "null"),
                (TimeClaimType::IssuedAt, "1516239022"),
            ]
        );
    }
}
