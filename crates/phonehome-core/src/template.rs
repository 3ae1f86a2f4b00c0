//! Message template with a single body placeholder.
//!
//! The template is plain text containing `$BODY` or `${BODY}`; `$$` renders
//! a literal `$`. Any other `$` use is rejected when the template is parsed,
//! so rendering cannot fail.

use std::path::Path;

use crate::error::{Error, Result};

const PLACEHOLDER: &str = "BODY";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Body,
}

/// A parsed message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    segments: Vec<Segment>,
}

impl MessageTemplate {
    /// Parses template text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the text has no body placeholder or
    /// uses `$` in any other way than `$BODY`, `${BODY}` and `$$`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            let consumed = if after.starts_with('$') {
                literal.push('$');
                1
            } else if let Some(len) = placeholder_len(after) {
                if !literal.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Body);
                len
            } else {
                let snippet: String = rest[pos..].chars().take(12).collect();
                return Err(Error::Template(format!(
                    "invalid placeholder {snippet:?}; only $BODY, ${{BODY}} and $$ are allowed"
                )));
            };
            rest = &after[consumed..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Text(literal));
        }

        if !segments.contains(&Segment::Body) {
            return Err(Error::Template("template has no $BODY placeholder".into()));
        }
        Ok(Self { segments })
    }

    /// Reads and parses a template file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid template.
    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Substitutes the body into the template.
    #[must_use]
    pub fn render(&self, body: &str) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.as_str(),
                Segment::Body => body,
            })
            .collect()
    }
}

/// Length of a body placeholder at the start of `after` (the text following
/// a `$`), if there is one.
fn placeholder_len(after: &str) -> Option<usize> {
    if let Some(braced) = after.strip_prefix('{') {
        return braced
            .strip_prefix(PLACEHOLDER)
            .and_then(|tail| tail.strip_prefix('}'))
            .map(|_| PLACEHOLDER.len() + 2);
    }

    let tail = after.strip_prefix(PLACEHOLDER)?;
    let continues = tail
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    (!continues).then_some(PLACEHOLDER.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_both_forms() {
        let template = MessageTemplate::parse("Hello,\n\n$BODY\n\n-- ${BODY}!").unwrap();
        assert_eq!(template.render("disk full"), "Hello,\n\ndisk full\n\n-- disk full!");
    }

    #[test]
    fn test_dollar_escape() {
        let template = MessageTemplate::parse("Cost: $$5\n$BODY").unwrap();
        assert_eq!(template.render("x"), "Cost: $5\nx");
    }

    #[test]
    fn test_body_is_not_reinterpreted() {
        let template = MessageTemplate::parse("$BODY").unwrap();
        assert_eq!(template.render("$HOME ${BODY} $$"), "$HOME ${BODY} $$");
    }

    #[test]
    fn test_missing_placeholder() {
        assert!(matches!(
            MessageTemplate::parse("no placeholder here"),
            Err(Error::Template(_))
        ));
        assert!(matches!(
            MessageTemplate::parse("only $$BODY escaped"),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn test_invalid_placeholders() {
        for bad in ["$BODY $NAME", "$BODYX", "${BODY", "$BODY costs $5", "$BODY $"] {
            assert!(
                matches!(MessageTemplate::parse(bad), Err(Error::Template(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("email_template.txt");
        std::fs::write(&path, "Automated message:\n\n$BODY\n").unwrap();
        let template = MessageTemplate::load(&path).unwrap();
        assert_eq!(template.render("hi"), "Automated message:\n\nhi\n");
    }
}
