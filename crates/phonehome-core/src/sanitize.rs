//! Validation and normalization of candidate phone numbers and email
//! addresses.
//!
//! Sanitizers never fail: an invalid candidate is simply dropped.

use std::sync::LazyLock;

use regex::Regex;

/// Length of a valid, normalized mobile number.
pub const PHONE_DIGITS: usize = 10;

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+[._]?[a-z0-9]+@\w+\.\w{2,5}$").expect("email pattern compiles")
});

/// Normalizes a candidate phone number.
///
/// Every non-digit is removed, then leading `0`/`1` trunk and country
/// prefixes are stripped one at a time while more than one digit remains.
/// The result is valid only when exactly ten digits are left.
///
/// ```
/// use phonehome_core::sanitize::sanitize_phone_number;
///
/// assert_eq!(sanitize_phone_number("+1 (734) 555-5555").as_deref(), Some("7345555555"));
/// assert_eq!(sanitize_phone_number("555-5555"), None);
/// ```
#[must_use]
pub fn sanitize_phone_number(candidate: &str) -> Option<String> {
    let digits: String = candidate.chars().filter(char::is_ascii_digit).collect();
    let trimmed = if digits.len() > 1 {
        let stripped = digits.trim_start_matches(['0', '1']);
        // Keep at least one digit.
        if stripped.is_empty() {
            &digits[digits.len() - 1..]
        } else {
            stripped
        }
    } else {
        digits.as_str()
    };

    (trimmed.len() == PHONE_DIGITS).then(|| trimmed.to_string())
}

/// Validates a candidate email address.
///
/// Only simple lowercase addresses of the form `name[._]name@domain.tld`
/// are accepted; anything else is rejected rather than repaired.
#[must_use]
pub fn sanitize_email(candidate: &str) -> Option<String> {
    EMAIL_RE
        .is_match(candidate)
        .then(|| candidate.to_string())
}

/// Valid values collected from a list of candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sanitized {
    /// Valid, normalized values in input order.
    pub values: Vec<String>,
}

impl Sanitized {
    /// Returns true if at least one candidate was valid.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        !self.values.is_empty()
    }
}

impl IntoIterator for Sanitized {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Sanitizes every phone candidate; `None` entries are skipped.
pub fn sanitize_phone_numbers<'a, I>(candidates: I) -> Sanitized
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    Sanitized {
        values: candidates
            .into_iter()
            .flatten()
            .filter_map(sanitize_phone_number)
            .collect(),
    }
}

/// Sanitizes every email candidate; `None` entries are skipped.
pub fn sanitize_emails<'a, I>(candidates: I) -> Sanitized
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    Sanitized {
        values: candidates
            .into_iter()
            .flatten()
            .filter_map(sanitize_email)
            .collect(),
    }
}
