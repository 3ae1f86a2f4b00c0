//! Style options and their rendering to 24-bit SGR escape sequences.

use crate::error::{Result, StyleError};
use crate::palette::{self, NORMAL, Rgb};

/// Option keys accepted by [`Style::from_options`].
pub const OPTION_KEYS: [&str; 10] = [
    "fg",
    "bg",
    "bold",
    "underline",
    "italic",
    "strikethrough",
    "framed",
    "highlight",
    "header",
    "end",
];

const RULE_WIDTH: usize = 80;
const RESET: &str = "\x1b[0m";

/// How a piece of text is printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// Foreground colour name.
    pub fg: String,
    /// Background colour name.
    pub bg: String,
    /// SGR 1.
    pub bold: bool,
    /// SGR 4.
    pub underline: bool,
    /// SGR 3.
    pub italic: bool,
    /// SGR 9.
    pub strikethrough: bool,
    /// SGR 51.
    pub framed: bool,
    /// Black on yellow, overriding both colours.
    pub highlight: bool,
    /// Surround the text with `=` rules.
    pub header: bool,
    /// Line ending; `None` means `"\n"`.
    pub end: Option<String>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fg: NORMAL.to_string(),
            bg: NORMAL.to_string(),
            bold: false,
            underline: false,
            italic: false,
            strikethrough: false,
            framed: false,
            highlight: false,
            header: false,
            end: None,
        }
    }
}

impl Style {
    /// The terminal's default look.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the foreground colour.
    #[must_use]
    pub fn fg(mut self, name: impl Into<String>) -> Self {
        self.fg = name.into();
        self
    }

    /// Sets the background colour.
    #[must_use]
    pub fn bg(mut self, name: impl Into<String>) -> Self {
        self.bg = name.into();
        self
    }

    /// Turns on bold.
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Turns on underline.
    #[must_use]
    pub const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Turns on italic.
    #[must_use]
    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Turns on strikethrough.
    #[must_use]
    pub const fn strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }

    /// Turns on framed.
    #[must_use]
    pub const fn framed(mut self) -> Self {
        self.framed = true;
        self
    }

    /// Black on yellow.
    #[must_use]
    pub const fn highlight(mut self) -> Self {
        self.highlight = true;
        self
    }

    /// Surrounds the text with rules.
    #[must_use]
    pub const fn header(mut self) -> Self {
        self.header = true;
        self
    }

    /// Replaces the trailing newline.
    #[must_use]
    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Builds a style from `key=value` pairs such as `("fg", "red")` or
    /// `("bold", "true")`. `underscore` is accepted for `underline`.
    ///
    /// Colour names are checked when rendering, not here.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::UnknownOption`] for an unrecognized key and
    /// [`StyleError::InvalidFlag`] for a flag that is not `true` or `false`.
    pub fn from_options<I, K, V>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut style = Self::default();
        for (key, value) in options {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "fg" => style.fg = value.to_string(),
                "bg" => style.bg = value.to_string(),
                "end" => style.end = Some(value.to_string()),
                "bold" => style.bold = flag(key, value)?,
                "underline" | "underscore" => style.underline = flag(key, value)?,
                "italic" => style.italic = flag(key, value)?,
                "strikethrough" => style.strikethrough = flag(key, value)?,
                "framed" => style.framed = flag(key, value)?,
                "highlight" => style.highlight = flag(key, value)?,
                "header" => style.header = flag(key, value)?,
                other => return Err(StyleError::UnknownOption(other.to_string())),
            }
        }
        Ok(style)
    }

    /// Renders `text` with escape sequences and the line ending.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::UnknownColor`] if either colour is not in the
    /// palette.
    pub fn render(&self, text: &str) -> Result<String> {
        let resolved = self.resolve()?;
        let text = self.decorate(text);

        let mut attributes = Vec::new();
        if resolved.bold {
            attributes.push("1");
        }
        if resolved.underline {
            attributes.push("4");
        }
        if self.italic {
            attributes.push("3");
        }
        if self.strikethrough {
            attributes.push("9");
        }
        if self.framed {
            attributes.push("51");
        }
        let code = if attributes.is_empty() {
            String::new()
        } else {
            format!(";{}", attributes.join(";"))
        };

        let sgr = match (resolved.fg, resolved.bg) {
            (Some(fg), Some(bg)) => format!("38;2;{fg}{code};48;2;{bg}"),
            (None, Some(bg)) => format!("{code};48;2;{bg}"),
            (Some(fg), None) => format!("38;2;{fg}{code}"),
            (None, None) => code,
        };
        Ok(format!("\x1b[{sgr}m{text}{RESET}{}", self.line_end()))
    }

    /// Renders `text` without escape sequences: header rules and the line
    /// ending only.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::UnknownColor`] if either colour is not in the
    /// palette, so that plain and coloured output fail alike.
    pub fn render_plain(&self, text: &str) -> Result<String> {
        self.resolve()?;
        Ok(format!("{}{}", self.decorate(text), self.line_end()))
    }

    fn line_end(&self) -> &str {
        self.end.as_deref().unwrap_or("\n")
    }

    fn decorate(&self, text: &str) -> String {
        if self.header {
            let rule = "=".repeat(RULE_WIDTH);
            format!("\n{rule}\n{text}\n{rule}\n")
        } else {
            text.to_string()
        }
    }

    /// Applies highlight and the special foreground names, then looks up
    /// both colours. `None` stands for `normal`.
    fn resolve(&self) -> Result<Resolved> {
        let (mut fg, mut bg) = if self.highlight {
            ("black", "yellow")
        } else {
            (self.fg.as_str(), self.bg.as_str())
        };
        let mut bold = self.bold;
        let mut underline = self.underline;

        match fg {
            "hlink" => {
                fg = "cerulean";
                bg = NORMAL;
                underline = true;
            }
            "warning" => {
                fg = "yellow";
                bg = NORMAL;
                bold = true;
            }
            "error" => {
                fg = "light_red";
                bg = NORMAL;
                bold = true;
            }
            _ => {}
        }

        Ok(Resolved {
            fg: color(fg)?,
            bg: color(bg)?,
            bold,
            underline,
        })
    }
}

struct Resolved {
    fg: Option<Rgb>,
    bg: Option<Rgb>,
    bold: bool,
    underline: bool,
}

fn color(name: &str) -> Result<Option<Rgb>> {
    if name == NORMAL {
        return Ok(None);
    }
    palette::lookup(name)
        .map(Some)
        .ok_or_else(|| StyleError::UnknownColor(name.to_string()))
}

fn flag(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(StyleError::InvalidFlag {
            option: key.to_string(),
            value: value.to_string(),
        }),
    }
}
