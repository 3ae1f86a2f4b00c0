//! Writing styled text.

use std::io::{self, IsTerminal, Write};

use crate::error::Result;
use crate::palette::{self, NORMAL, SPECIAL};
use crate::style::Style;

/// Text used by [`Printer::demo`] when none is given.
pub const DEMO_TEXT: &str = "Foo Fighters Rule";

const LABEL_WIDTH: usize = 25;
const SECTION: &str = "light_cerulean";

/// Whether stdout should get escape sequences.
///
/// `NO_COLOR=1` disables, then `COLOR=1` forces, then the TTY check decides.
#[must_use]
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    io::stdout().is_terminal()
}

/// Prints styled text to a writer.
#[derive(Debug)]
pub struct Printer<W> {
    out: W,
    colorize: bool,
}

impl Printer<io::Stdout> {
    /// A printer on stdout, colouring only when [`should_colorize`] says so.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout(), should_colorize())
    }
}

impl<W: Write> Printer<W> {
    /// Wraps a writer.
    pub const fn new(out: W, colorize: bool) -> Self {
        Self { out, colorize }
    }

    /// Consumes the printer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes `text` in `style`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown colour or a failed write.
    pub fn print(&mut self, text: &str, style: &Style) -> Result<()> {
        let rendered = if self.colorize {
            style.render(text)?
        } else {
            style.render_plain(text)?
        };
        self.out.write_all(rendered.as_bytes())?;
        Ok(())
    }

    /// Prints every colour as foreground and background, the special
    /// names, and each formatting flag.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn demo(&mut self, text: &str) -> Result<()> {
        self.section("FOREGROUND COLORS")?;
        for name in palette::plain_names() {
            self.label(&format!("\t> {name}: "))?;
            self.print(text, &Style::new().fg(name).bold())?;
        }

        self.section("BACKGROUND COLORS")?;
        for name in palette::plain_names() {
            self.label(&format!("\t> {name}:"))?;
            self.print(text, &Style::new().fg("light_grey").bg(name))?;
        }

        self.section("SPECIAL FOREGROUND COLORS WITH AUTOMATIC TREATMENTS")?;
        for name in std::iter::once(NORMAL).chain(SPECIAL) {
            self.label(&format!("\t> {name}:"))?;
            self.print(text, &Style::new().fg(name))?;
        }

        self.section("FORMATTING WITH BOOLEAN FLAGS")?;
        let flags: [(&str, fn(Style) -> Style); 6] = [
            ("bold", Style::bold),
            ("italic", Style::italic),
            ("underscore", Style::underline),
            ("strikethrough", Style::strikethrough),
            ("framed", Style::framed),
            ("highlight", Style::highlight),
        ];
        for (name, apply) in flags {
            self.label(&format!("\t> {name}:"))?;
            self.print(text, &apply(Style::new().fg(SECTION)))?;
        }

        self.out.flush()?;
        Ok(())
    }

    fn section(&mut self, title: &str) -> Result<()> {
        self.print(title, &Style::new().fg(SECTION).header())
    }

    fn label(&mut self, label: &str) -> Result<()> {
        write!(self.out, "{label:<width$}", width = LABEL_WIDTH)?;
        Ok(())
    }
}

/// Prints `text` in `style` to stdout.
///
/// # Errors
///
/// Returns an error for an unknown colour or a failed write.
pub fn fancy_print(text: &str, style: &Style) -> Result<()> {
    Printer::stdout().print(text, style)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn output(colorize: bool, f: impl FnOnce(&mut Printer<Vec<u8>>)) -> String {
        let mut printer = Printer::new(Vec::new(), colorize);
        f(&mut printer);
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn test_print_coloured() {
        let out = output(true, |p| p.print("hi", &Style::new().fg("blue")).unwrap());
        assert_eq!(out, "\x1b[38;2;0;0;255mhi\x1b[0m\n");
    }

    #[test]
    fn test_print_plain() {
        let out = output(false, |p| p.print("hi", &Style::new().fg("blue").end("")).unwrap());
        assert_eq!(out, "hi");
    }

    #[test]
    fn test_plain_print_still_checks_colours() {
        let mut printer = Printer::new(Vec::new(), false);
        assert!(printer.print("hi", &Style::new().fg("puce")).is_err());
    }

    #[test]
    fn test_demo_lists_everything() {
        let out = output(false, |p| p.demo(DEMO_TEXT).unwrap());

        for title in [
            "FOREGROUND COLORS",
            "BACKGROUND COLORS",
            "SPECIAL FOREGROUND COLORS WITH AUTOMATIC TREATMENTS",
            "FORMATTING WITH BOOLEAN FLAGS",
        ] {
            assert!(out.contains(title), "{title}");
        }
        assert!(out.contains("\t> light_pink:           Foo Fighters Rule\n"));
        assert!(out.contains("\t> hlink:"));
        assert!(out.contains("\t> strikethrough:"));

        let lines = out.lines().filter(|l| l.contains(DEMO_TEXT)).count();
        assert_eq!(lines, 49 * 2 + 4 + 6);
    }

    #[test]
    fn test_demo_coloured_uses_truecolor() {
        let out = output(true, |p| p.demo("x").unwrap());
        assert!(out.contains("\x1b[38;2;153;205;255m\n====="));
        assert!(out.contains("48;2;255;153;205mx\x1b[0m"));
    }
}
