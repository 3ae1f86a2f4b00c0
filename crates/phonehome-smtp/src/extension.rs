//! Server capabilities advertised in the EHLO reply.

use std::collections::HashSet;

/// SMTP extensions the session cares about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// STARTTLS - TLS upgrade
    StartTls,
    /// AUTH - Authentication
    Auth(Vec<AuthMechanism>),
    /// SIZE - Maximum message size
    Size(Option<usize>),
    /// 8BITMIME - 8-bit MIME transport
    EightBitMime,
    /// Anything else
    Other(String),
}

impl Extension {
    /// Parses an extension line from EHLO response.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Self::Other(line.to_string());
        };

        match keyword.to_uppercase().as_str() {
            "STARTTLS" => Self::StartTls,
            "AUTH" => Self::Auth(words.filter_map(AuthMechanism::parse).collect()),
            "SIZE" => Self::Size(words.next().and_then(|s| s.parse().ok())),
            "8BITMIME" => Self::EightBitMime,
            _ => Self::Other(line.to_string()),
        }
    }
}

/// SASL authentication mechanisms the session can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN - plaintext authentication
    Plain,
    /// LOGIN - legacy plaintext
    Login,
}

impl AuthMechanism {
    /// Parses an authentication mechanism name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLAIN" => Some(Self::Plain),
            "LOGIN" => Some(Self::Login),
            _ => None,
        }
    }

    /// Returns the mechanism name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
        }
    }
}

/// Server capabilities from the greeting and EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Supported extensions. Empty after a HELO fallback.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Replaces the extension set from the lines of an EHLO reply.
    ///
    /// The first line is the server's greeting and is skipped.
    pub fn update_from_ehlo(&mut self, lines: &[String]) {
        self.extensions = lines.iter().skip(1).map(|l| Extension::parse(l)).collect();
    }

    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.extensions.contains(&Extension::StartTls)
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Returns supported authentication mechanisms.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<AuthMechanism> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Picks the mechanism to authenticate with, preferring PLAIN.
    ///
    /// Servers that advertise no AUTH line at all get PLAIN.
    #[must_use]
    pub fn preferred_auth(&self) -> Option<AuthMechanism> {
        let mechanisms = self.auth_mechanisms();
        if mechanisms.is_empty() {
            return Some(AuthMechanism::Plain);
        }
        [AuthMechanism::Plain, AuthMechanism::Login]
            .into_iter()
            .find(|m| mechanisms.contains(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_starttls() {
        assert_eq!(Extension::parse("STARTTLS"), Extension::StartTls);
        assert_eq!(Extension::parse("starttls"), Extension::StartTls);
    }

    #[test]
    fn parse_auth_skips_unknown_mechanisms() {
        let ext = Extension::parse("AUTH CRAM-MD5 LOGIN XOAUTH2 PLAIN");
        assert_eq!(
            ext,
            Extension::Auth(vec![AuthMechanism::Login, AuthMechanism::Plain])
        );
    }

    #[test]
    fn parse_size() {
        assert_eq!(
            Extension::parse("SIZE 52428800"),
            Extension::Size(Some(52_428_800))
        );
        assert_eq!(Extension::parse("SIZE"), Extension::Size(None));
    }

    #[test]
    fn parse_other_and_empty() {
        assert_eq!(
            Extension::parse("PIPELINING"),
            Extension::Other("PIPELINING".into())
        );
        assert!(matches!(Extension::parse(""), Extension::Other(_)));
    }

    #[test]
    fn server_info_from_ehlo() {
        let mut info = ServerInfo::default();
        info.update_from_ehlo(&[
            "mail.example.com greets you".to_string(),
            "SIZE 1000".to_string(),
            "STARTTLS".to_string(),
            "AUTH LOGIN".to_string(),
        ]);
        assert!(info.supports_starttls());
        assert_eq!(info.max_message_size(), Some(1000));
        assert_eq!(info.preferred_auth(), Some(AuthMechanism::Login));
    }

    #[test]
    fn preferred_auth_defaults_to_plain() {
        let info = ServerInfo::default();
        assert_eq!(info.preferred_auth(), Some(AuthMechanism::Plain));

        let mut info = ServerInfo::default();
        info.update_from_ehlo(&["greeting".into(), "AUTH CRAM-MD5".into()]);
        assert_eq!(info.preferred_auth(), None);
    }
}
