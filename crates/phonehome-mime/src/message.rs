//! MIME message tree and serialization.

use crate::content_type::ContentType;
use crate::encoding::{encode_base64_lines, encode_quoted_printable};
use crate::error::Result;
use crate::header::Headers;
use std::fmt;

/// Transfer encoding applied to a leaf part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII, written as-is.
    SevenBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Picks an encoding for a text body: 7bit when plain ASCII with
    /// short lines, Quoted-Printable otherwise.
    #[must_use]
    pub fn for_text(text: &str) -> Self {
        if text.is_ascii() && text.lines().all(|l| l.len() <= 998) {
            Self::SevenBit
        } else {
            Self::QuotedPrintable
        }
    }

    fn encode(self, data: &[u8]) -> String {
        match self {
            Self::SevenBit => String::from_utf8_lossy(data).replace("\r\n", "\n").replace('\n', "\r\n"),
            Self::QuotedPrintable => encode_quoted_printable(&String::from_utf8_lossy(data)),
            Self::Base64 => encode_base64_lines(data),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
        }
    }
}

/// Body of a MIME part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// A leaf holding decoded bytes and the encoding to write them with.
    Single {
        /// Decoded content.
        data: Vec<u8>,
        /// Encoding applied on output.
        encoding: TransferEncoding,
    },
    /// A container of nested parts.
    Multipart {
        /// Boundary separating the nested parts.
        boundary: String,
        /// Nested parts in order.
        parts: Vec<Part>,
    },
}

/// MIME part: headers plus a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part headers (Content-Type, Content-Transfer-Encoding, ...).
    pub headers: Headers,
    /// Part body.
    pub body: Body,
}

impl Part {
    /// Creates a text leaf with a `charset=utf-8` content type.
    ///
    /// # Errors
    ///
    /// Returns an error if a header cannot be set.
    pub fn text(content_type: ContentType, text: &str) -> Result<Self> {
        let encoding = TransferEncoding::for_text(text);
        Self::leaf(content_type, text.as_bytes().to_vec(), encoding)
    }

    /// Creates a base64-encoded binary leaf.
    ///
    /// # Errors
    ///
    /// Returns an error if a header cannot be set.
    pub fn binary(content_type: ContentType, data: Vec<u8>) -> Result<Self> {
        Self::leaf(content_type, data, TransferEncoding::Base64)
    }

    fn leaf(content_type: ContentType, data: Vec<u8>, encoding: TransferEncoding) -> Result<Self> {
        let mut headers = Headers::new();
        headers.set("Content-Type", content_type.to_string())?;
        headers.set("Content-Transfer-Encoding", encoding.to_string())?;
        Ok(Self {
            headers,
            body: Body::Single { data, encoding },
        })
    }

    /// Creates a multipart container.
    ///
    /// # Errors
    ///
    /// Returns an error if a header cannot be set.
    pub fn multipart(sub_type: &str, boundary: String, parts: Vec<Self>) -> Result<Self> {
        let mut headers = Headers::new();
        headers.set(
            "Content-Type",
            ContentType::multipart(sub_type, boundary.clone()).to_string(),
        )?;
        Ok(Self {
            headers,
            body: Body::Multipart { boundary, parts },
        })
    }

    /// Returns the nested parts, or an empty slice for a leaf.
    #[must_use]
    pub fn parts(&self) -> &[Self] {
        match &self.body {
            Body::Single { .. } => &[],
            Body::Multipart { parts, .. } => parts.as_slice(),
        }
    }

    /// Returns the decoded content of a leaf.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Single { data, .. } => Some(data.as_slice()),
            Body::Multipart { .. } => None,
        }
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&self.headers.to_string());
        out.push_str("\r\n");
        match &self.body {
            Body::Single { data, encoding } => {
                out.push_str(&encoding.encode(data));
                if !out.ends_with("\r\n") {
                    out.push_str("\r\n");
                }
            }
            Body::Multipart { boundary, parts } => {
                for part in parts {
                    out.push_str("--");
                    out.push_str(boundary);
                    out.push_str("\r\n");
                    part.write_to(out);
                }
                out.push_str("--");
                out.push_str(boundary);
                out.push_str("--\r\n");
            }
        }
    }
}

/// A complete message: top-level headers and the root part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Envelope headers (From, To, Subject, ...).
    pub headers: Headers,
    /// Root MIME part.
    pub root: Part,
}

impl Message {
    /// Creates a message with an empty header block.
    #[must_use]
    pub fn new(root: Part) -> Self {
        Self {
            headers: Headers::new(),
            root,
        }
    }

    /// Replaces a top-level header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is malformed.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.headers.set(name, value)
    }

    /// Returns the first value of a top-level header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Serializes the message with CRLF line endings.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = self.headers.to_string();
        out.push_str("MIME-Version: 1.0\r\n");
        self.root.write_to(&mut out);
        f.write_str(&out)
    }
}
