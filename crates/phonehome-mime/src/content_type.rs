//! MIME content type handling.

use std::fmt;
use std::path::Path;

/// Extensions that mark a file as compressed or otherwise transfer-encoded.
/// Such files are sent as opaque bytes whatever their inner type.
const ENCODED_EXTENSIONS: &[&str] = &[
    "gz", "z", "bz2", "xz", "br", "zst", "tgz", "taz", "tz", "tbz2", "txz",
];

/// Known file extensions and their content types.
const EXTENSION_TYPES: &[(&str, &str, &str)] = &[
    ("txt", "text", "plain"),
    ("text", "text", "plain"),
    ("csv", "text", "csv"),
    ("tsv", "text", "tab-separated-values"),
    ("htm", "text", "html"),
    ("html", "text", "html"),
    ("css", "text", "css"),
    ("md", "text", "markdown"),
    ("xml", "text", "xml"),
    ("ics", "text", "calendar"),
    ("py", "text", "x-python"),
    ("json", "application", "json"),
    ("js", "text", "javascript"),
    ("pdf", "application", "pdf"),
    ("rtf", "application", "rtf"),
    ("zip", "application", "zip"),
    ("tar", "application", "x-tar"),
    ("doc", "application", "msword"),
    ("xls", "application", "vnd.ms-excel"),
    ("ppt", "application", "vnd.ms-powerpoint"),
    (
        "docx",
        "application",
        "vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (
        "xlsx",
        "application",
        "vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (
        "pptx",
        "application",
        "vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("png", "image", "png"),
    ("jpg", "image", "jpeg"),
    ("jpeg", "image", "jpeg"),
    ("gif", "image", "gif"),
    ("bmp", "image", "bmp"),
    ("svg", "image", "svg+xml"),
    ("tif", "image", "tiff"),
    ("tiff", "image", "tiff"),
    ("webp", "image", "webp"),
    ("ico", "image", "vnd.microsoft.icon"),
    ("mp3", "audio", "mpeg"),
    ("wav", "audio", "x-wav"),
    ("mp4", "video", "mp4"),
    ("mov", "video", "quicktime"),
];

/// MIME content type with parameters.
///
/// Parameters keep their insertion order so rendered headers are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters (e.g., charset=utf-8, boundary=xxx).
    pub parameters: Vec<(String, String)>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Vec::new(),
        }
    }

    /// Creates a text/plain content type.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain").with_parameter("charset", "utf-8")
    }

    /// Creates a text/html content type.
    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html").with_parameter("charset", "utf-8")
    }

    /// Creates the generic binary type, `application/octet-stream`.
    #[must_use]
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Creates a `multipart/<sub_type>` content type with a boundary.
    #[must_use]
    pub fn multipart(sub_type: impl Into<String>, boundary: impl Into<String>) -> Self {
        Self::new("multipart", sub_type).with_parameter("boundary", boundary)
    }

    /// Guesses a content type from a file name's extension.
    ///
    /// Unknown extensions, and extensions that indicate compression or
    /// another transfer encoding (`report.csv.gz`), yield
    /// `application/octet-stream`.
    #[must_use]
    pub fn guess_for_path(path: &Path) -> Self {
        let Some(ext) = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
        else {
            return Self::octet_stream();
        };

        if ENCODED_EXTENSIONS.contains(&ext.as_str()) {
            return Self::octet_stream();
        }

        EXTENSION_TYPES
            .iter()
            .find(|(known, _, _)| *known == ext)
            .map_or_else(Self::octet_stream, |(_, main, sub)| Self::new(*main, *sub))
    }

    /// Sets a parameter, replacing an existing one with the same name.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into().to_lowercase();
        let value = value.into();
        match self.parameters.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.parameters.push((key, value)),
        }
        self
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;

        for (key, value) in &self.parameters {
            // Quote value if it contains special characters
            if value.is_empty()
                || value.contains(|c: char| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c))
            {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "; {key}=\"{escaped}\"")?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }

        Ok(())
    }
}
