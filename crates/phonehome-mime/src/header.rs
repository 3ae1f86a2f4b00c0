//! MIME header handling.

use crate::error::{Error, Result};
use std::fmt;

/// Ordered collection of message or part headers.
///
/// Names keep the casing they were first set with; lookups are
/// case-insensitive. Headers render in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header value, replacing an existing value in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value would break the header block.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let (name, value) = validate(name.into(), value.into())?;
        match self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        Ok(())
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn validate(name: String, value: String) -> Result<(String, String)> {
    if name.is_empty()
        || !name
            .bytes()
            .all(|b| b.is_ascii_graphic() && b != b':')
    {
        return Err(Error::InvalidHeader(format!("bad header name {name:?}")));
    }

    // Folded continuations ("\r\n " or "\r\n\t") are the only line breaks allowed.
    let bytes = value.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let ok = match b {
            b'\r' => bytes.get(i + 1) == Some(&b'\n'),
            b'\n' => i > 0 && bytes[i - 1] == b'\r' && matches!(bytes.get(i + 1), Some(b' ' | b'\t')),
            _ => true,
        };
        if !ok {
            return Err(Error::InvalidHeader(format!("bare line break in {name}")));
        }
    }

    Ok((name, value))
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_set_get() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain").unwrap();
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("To"), None);
    }

    #[test]
    fn test_headers_set_replaces_in_place() {
        let mut headers = Headers::new();
        headers.set("From", "me@example.com").unwrap();
        headers.set("To", "alice@example.com").unwrap();
        headers.set("Subject", "Hi").unwrap();

        headers.set("TO", "charlie@example.com").unwrap();
        assert_eq!(
            headers.to_string(),
            "From: me@example.com\r\nTo: charlie@example.com\r\nSubject: Hi\r\n"
        );
    }

    #[test]
    fn test_rejects_injection() {
        let mut headers = Headers::new();
        assert!(headers.set("Subject", "hi\r\nBcc: evil@example.com").is_err());
        assert!(headers.set("Subject", "hi\nthere").is_err());
        assert!(headers.set("To", "7345555555@txt.att.net\n").is_err());
        assert!(headers.set("Bad Name", "x").is_err());
        assert!(headers.set("", "x").is_err());
        assert!(headers.get("Subject").is_none());
        assert!(headers.set("Subject", "=?utf-8?B?YQ==?=\r\n =?utf-8?B?Yg==?=").is_ok());
    }
}
