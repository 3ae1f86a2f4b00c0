//! Recipient resolution: specifiers to deduplicated email and mobile sets.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use crate::contacts::ContactDirectory;
use crate::error::{Error, Result};
use crate::sanitize::{sanitize_email, sanitize_emails, sanitize_phone_number, sanitize_phone_numbers};

/// One or more tokens naming recipients: user names, group names, raw
/// phone numbers, or raw email addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// A single token.
    Single(String),
    /// Several tokens, resolved independently.
    Many(Vec<String>),
}

impl Specifier {
    /// Returns the tokens in order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        match self {
            Self::Single(token) => std::slice::from_ref(token),
            Self::Many(tokens) => tokens,
        }
    }

    /// Converts a dynamic JSON value: a string, an integer, or an array of
    /// strings and integers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgumentType`] for any other shape.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(scalar_token)
                .collect::<Result<Vec<_>>>()
                .map(Self::Many),
            other => scalar_token(other).map(Self::Single),
        }
    }
}

fn scalar_token(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        other => Err(Error::InvalidArgumentType(format!(
            "recipient must be a string, an integer, or a list of them, got {other}"
        ))),
    }
}

impl From<&str> for Specifier {
    fn from(token: &str) -> Self {
        Self::Single(token.to_string())
    }
}

impl From<String> for Specifier {
    fn from(token: String) -> Self {
        Self::Single(token)
    }
}

impl From<u64> for Specifier {
    fn from(number: u64) -> Self {
        Self::Single(number.to_string())
    }
}

impl From<i64> for Specifier {
    fn from(number: i64) -> Self {
        Self::Single(number.to_string())
    }
}

impl From<Vec<String>> for Specifier {
    fn from(tokens: Vec<String>) -> Self {
        Self::Many(tokens)
    }
}

impl From<&[&str]> for Specifier {
    fn from(tokens: &[&str]) -> Self {
        Self::Many(tokens.iter().map(|t| (*t).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Specifier {
    fn from(tokens: [&str; N]) -> Self {
        Self::from(&tokens[..])
    }
}

impl TryFrom<&Value> for Specifier {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        Self::from_json(value)
    }
}

/// A way of interpreting a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The token is a user name.
    User,
    /// The token is a group name.
    Group,
    /// The token is a phone number.
    Phone,
    /// The token is an email address.
    Email,
}

/// Rules tried for every token; the first one that yields a valid contact
/// method wins.
pub const RESOLUTION_ORDER: [Rule; 4] = [Rule::User, Rule::Group, Rule::Phone, Rule::Email];

/// Resolved, deduplicated and sorted recipients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRecipients {
    /// Valid email addresses.
    pub emails: BTreeSet<String>,
    /// Valid ten-digit mobile numbers.
    pub mobiles: BTreeSet<String>,
}

impl ResolvedRecipients {
    /// Returns false iff there is neither an email nor a mobile.
    #[must_use]
    pub fn has_any_recipient(&self) -> bool {
        !self.emails.is_empty() || !self.mobiles.is_empty()
    }
}

/// Resolves specifiers against a contact directory.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    directory: ContactDirectory,
}

impl Resolver {
    /// Creates a resolver over a directory.
    #[must_use]
    pub const fn new(directory: ContactDirectory) -> Self {
        Self { directory }
    }

    /// Returns the directory.
    #[must_use]
    pub const fn directory(&self) -> &ContactDirectory {
        &self.directory
    }

    /// Resolves a specifier. Tokens that match no rule contribute nothing.
    #[must_use]
    pub fn resolve(&self, specifier: &Specifier) -> ResolvedRecipients {
        resolve(&self.directory, specifier)
    }
}

/// Resolves a specifier against a directory.
#[must_use]
pub fn resolve(directory: &ContactDirectory, specifier: &Specifier) -> ResolvedRecipients {
    let mut resolved = ResolvedRecipients::default();

    for token in specifier.tokens() {
        let hit = RESOLUTION_ORDER
            .iter()
            .find(|rule| apply_rule(directory, **rule, token, &mut resolved));
        match hit {
            Some(rule) => debug!(token = %token, ?rule, "resolved recipient"),
            None => debug!(token = %token, "no contact method found"),
        }
    }

    resolved
}

fn apply_rule(
    directory: &ContactDirectory,
    rule: Rule,
    token: &str,
    resolved: &mut ResolvedRecipients,
) -> bool {
    match rule {
        Rule::User => directory.user(token).is_some_and(|user| {
            let emails = sanitize_emails([user.email.as_deref()]);
            let mobiles = sanitize_phone_numbers([user.mobile.as_deref()]);
            collect(resolved, emails.values, mobiles.values)
        }),
        Rule::Group => directory.group_members(token).is_some_and(|members| {
            let emails = sanitize_emails(members.iter().map(|m| m.email.as_deref()));
            let mobiles = sanitize_phone_numbers(members.iter().map(|m| m.mobile.as_deref()));
            collect(resolved, emails.values, mobiles.values)
        }),
        Rule::Phone => sanitize_phone_number(token).is_some_and(|mobile| {
            resolved.mobiles.insert(mobile);
            true
        }),
        Rule::Email => sanitize_email(token).is_some_and(|email| {
            resolved.emails.insert(email);
            true
        }),
    }
}

fn collect(resolved: &mut ResolvedRecipients, emails: Vec<String>, mobiles: Vec<String>) -> bool {
    let hit = !emails.is_empty() || !mobiles.is_empty();
    resolved.emails.extend(emails);
    resolved.mobiles.extend(mobiles);
    hit
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn directory() -> ContactDirectory {
        serde_json::from_value(json!({
            "users": {
                "fred": {"email": "fred@bedrock.com", "mobile": "17345555555"},
                "wilma": {"email": "wilma@bedrock.com"},
                "joe": {"mobile": "734-555-0000"},
                "broken": {"email": "Not An Email", "mobile": "12"},
                "admin": {"email": "root@bedrock.com"}
            },
            "groups": {
                "admin": ["wilma"],
                "ops": ["fred", "wilma"],
                "physics": ["joe", "fred", "ghost"],
                "hollow": ["ghost", "broken"]
            }
        }))
        .unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_user_with_only_mobile() {
        let resolved = resolve(&directory(), &"joe".into());
        assert!(resolved.emails.is_empty());
        assert_eq!(resolved.mobiles, set(&["7345550000"]));
    }

    #[test]
    fn test_groups_union_is_deduplicated_and_sorted() {
        let resolved = resolve(&directory(), &["ops", "physics"].into());
        assert_eq!(resolved.emails, set(&["fred@bedrock.com", "wilma@bedrock.com"]));
        assert_eq!(resolved.mobiles, set(&["7345550000", "7345555555"]));
    }

    #[test]
    fn test_user_wins_over_group_with_same_name() {
        let resolved = resolve(&directory(), &"admin".into());
        assert_eq!(resolved.emails, set(&["root@bedrock.com"]));
    }

    #[test]
    fn test_raw_phone_and_email_tokens() {
        let resolved = resolve(
            &directory(),
            &["(734) 555-1234", "barney@quarry.com", "nobody_at_all"].into(),
        );
        assert_eq!(resolved.mobiles, set(&["7345551234"]));
        assert_eq!(resolved.emails, set(&["barney@quarry.com"]));
    }

    #[test]
    fn test_unknown_token_resolves_to_nothing() {
        let resolved = resolve(&directory(), &"nobody_at_all".into());
        assert!(!resolved.has_any_recipient());
    }

    #[test]
    fn test_user_with_invalid_methods_falls_through() {
        // "broken" is a user but neither method is valid; the remaining
        // rules do not match the name either.
        let resolved = resolve(&directory(), &"broken".into());
        assert!(!resolved.has_any_recipient());
        let resolved = resolve(&directory(), &"hollow".into());
        assert!(!resolved.has_any_recipient());
    }

    #[test]
    fn test_integer_specifiers() {
        let resolved = resolve(&directory(), &Specifier::from(17_345_559_999_u64));
        assert_eq!(resolved.mobiles, set(&["7345559999"]));

        let spec = Specifier::from_json(&json!([7_345_551_111_u64, "wilma"])).unwrap();
        let resolved = Resolver::new(directory()).resolve(&spec);
        assert_eq!(resolved.mobiles, set(&["7345551111"]));
        assert_eq!(resolved.emails, set(&["wilma@bedrock.com"]));
    }

    #[test]
    fn test_invalid_json_specifiers() {
        for bad in [
            json!({"user": "fred"}),
            json!(true),
            json!(7.5),
            json!(null),
            json!([["fred"]]),
            json!(["fred", false]),
        ] {
            assert!(
                matches!(Specifier::from_json(&bad), Err(Error::InvalidArgumentType(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_resolution_order() {
        assert_eq!(
            RESOLUTION_ORDER,
            [Rule::User, Rule::Group, Rule::Phone, Rule::Email]
        );
    }
}
