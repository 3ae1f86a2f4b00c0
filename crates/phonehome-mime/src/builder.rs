//! Builder for outgoing notification messages.
//!
//! Produces the layout used for every notification:
//!
//! ```text
//! multipart/mixed
//! ├── multipart/alternative
//! │   ├── text/plain
//! │   └── multipart/related        (text/html alone when no inline images)
//! │       ├── text/html
//! │       └── image/*  (Content-ID)
//! └── attachments...
//! ```

use crate::content_type::ContentType;
use crate::encoding::encode_rfc2047;
use crate::error::{Error, Result};
use crate::message::{Message, Part};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Returns a token unique within this process and very likely across
/// processes: timestamp, process id, and a counter.
fn unique_token() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{nanos:x}.{:x}.{seq}", std::process::id())
}

/// Generates a multipart boundary.
#[must_use]
pub fn make_boundary() -> String {
    format!("=_phonehome_{}", unique_token())
}

/// Generates a Content-ID (without angle brackets) for an inline part.
#[must_use]
pub fn make_content_id(domain: &str) -> String {
    format!("{}@{domain}", unique_token())
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient.
    pub filename: String,
    /// Content type, guessed from the file name.
    pub content_type: ContentType,
    /// Raw file contents.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment from in-memory bytes, guessing its type from
    /// the file name.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type =
            ContentType::guess_for_path(Path::new(&filename)).with_parameter("name", &filename);
        Self {
            filename,
            content_type,
            data,
        }
    }

    /// Reads an attachment from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has no file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidHeader(format!("no file name in {}", path.display())))?;
        let data = std::fs::read(path)?;
        Ok(Self::new(filename, data))
    }

    fn into_part(self) -> Result<Part> {
        let escaped = self.filename.replace('\\', "\\\\").replace('"', "\\\"");
        let mut part = Part::binary(self.content_type, self.data)?;
        part.headers.set(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", encode_rfc2047(&escaped)),
        )?;
        Ok(part)
    }
}

/// An image referenced from the HTML body by `cid:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Content-ID without angle brackets.
    pub content_id: String,
    /// Image content type.
    pub content_type: ContentType,
    /// Image bytes.
    pub data: Vec<u8>,
}

/// Builder for a notification [`Message`].
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Vec<String>,
    cc: Vec<String>,
    subject: Option<String>,
    text: String,
    html: Option<String>,
    images: Vec<InlineImage>,
    attachments: Vec<Attachment>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender.
    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Adds a primary recipient.
    #[must_use]
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    /// Adds carbon-copy recipients.
    #[must_use]
    pub fn cc<I, S>(mut self, cc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cc.extend(cc.into_iter().map(Into::into));
        self
    }

    /// Sets the subject (encoded as needed).
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the HTML alternative.
    #[must_use]
    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Adds an inline image for the HTML alternative.
    #[must_use]
    pub fn inline_image(mut self, image: InlineImage) -> Self {
        self.images.push(image);
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Builds the message.
    ///
    /// # Errors
    ///
    /// Returns an error if no sender was set or a header is malformed.
    pub fn build(self) -> Result<Message> {
        let from = self
            .from
            .ok_or_else(|| Error::MissingHeader("From".into()))?;

        let mut alternatives = vec![Part::text(ContentType::text_plain(), &self.text)?];
        if let Some(html) = &self.html {
            let html_part = Part::text(ContentType::text_html(), html)?;
            if self.images.is_empty() {
                alternatives.push(html_part);
            } else {
                let mut related = vec![html_part];
                for image in self.images {
                    let mut part = Part::binary(image.content_type, image.data)?;
                    part.headers
                        .set("Content-ID", format!("<{}>", image.content_id))?;
                    part.headers.set("Content-Disposition", "inline")?;
                    related.push(part);
                }
                alternatives.push(Part::multipart("related", make_boundary(), related)?);
            }
        }

        let mut mixed = vec![Part::multipart("alternative", make_boundary(), alternatives)?];
        for attachment in self.attachments {
            mixed.push(attachment.into_part()?);
        }
        let root = Part::multipart("mixed", make_boundary(), mixed)?;

        let domain = from
            .rsplit_once('@')
            .map_or("localhost", |(_, d)| d.trim_end_matches('>'))
            .to_string();

        let mut message = Message::new(root);
        message.set_header("From", from)?;
        if !self.to.is_empty() {
            message.set_header("To", self.to.join(", "))?;
        }
        if !self.cc.is_empty() {
            message.set_header("Cc", self.cc.join(", "))?;
        }
        if let Some(subject) = &self.subject {
            message.set_header("Subject", encode_rfc2047(subject))?;
        }
        message.set_header("Date", chrono::Local::now().to_rfc2822())?;
        message.set_header("Message-ID", format!("<{}>", make_content_id(&domain)))?;

        Ok(message)
    }
}
