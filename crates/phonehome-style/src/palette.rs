//! The named 24-bit colour palette.

use std::fmt;

/// A 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.0, self.1, self.2)
    }
}

const DK: u8 = 64;
const MED: u8 = 128;
const FULL: u8 = 255;
const LT: u8 = 192;
const WASH1: u8 = 153;
const WASH2: u8 = 205;
const DK_HALF: u8 = DK / 2;
const MED_HALF: u8 = MED / 2;
const FULL_HALF: u8 = FULL / 2;

/// The terminal's own default colour.
pub const NORMAL: &str = "normal";

/// Foreground names that expand into a fixed combination of colours and
/// attributes.
pub const SPECIAL: [&str; 3] = ["hlink", "warning", "error"];

/// Every colour in display order: greys, then each hue from dark to
/// light, then the special names.
pub const PALETTE: [(&str, Rgb); 53] = [
    ("black", Rgb(0, 0, 0)),
    ("dark_grey", Rgb(DK, DK, DK)),
    ("medium_grey", Rgb(MED, MED, MED)),
    ("light_grey", Rgb(LT, LT, LT)),
    ("white", Rgb(FULL, FULL, FULL)),
    ("dark_red", Rgb(DK, 0, 0)),
    ("medium_red", Rgb(MED, 0, 0)),
    ("red", Rgb(FULL, 0, 0)),
    ("light_red", Rgb(FULL, 103, 103)),
    ("dark_orange", Rgb(DK, DK_HALF, 0)),
    ("medium_orange", Rgb(MED, MED_HALF, 0)),
    ("orange", Rgb(FULL, FULL_HALF, 0)),
    ("light_orange", Rgb(FULL, WASH2, WASH1)),
    ("dark_yellow", Rgb(DK, DK, 0)),
    ("medium_yellow", Rgb(MED, MED, 0)),
    ("yellow", Rgb(FULL, FULL, 0)),
    ("light_yellow", Rgb(FULL, FULL, WASH1)),
    ("dark_chartreuse", Rgb(DK_HALF, DK, 0)),
    ("medium_chartreuse", Rgb(MED_HALF, MED, 0)),
    ("chartreuse", Rgb(FULL_HALF, FULL, 0)),
    ("light_chartreuse", Rgb(WASH2, FULL, WASH1)),
    ("dark_green", Rgb(0, DK, 0)),
    ("medium_green", Rgb(0, MED, 0)),
    ("green", Rgb(0, FULL, 0)),
    ("light_green", Rgb(WASH1, FULL, WASH1)),
    ("dark_cyan", Rgb(0, DK, DK)),
    ("medium_cyan", Rgb(0, MED, MED)),
    ("cyan", Rgb(0, FULL, FULL)),
    ("light_cyan", Rgb(WASH1, FULL, FULL)),
    ("dark_cerulean", Rgb(0, DK_HALF, DK)),
    ("medium_cerulean", Rgb(0, MED_HALF, MED)),
    ("cerulean", Rgb(0, FULL_HALF, FULL)),
    ("light_cerulean", Rgb(WASH1, WASH2, FULL)),
    ("dark_blue", Rgb(0, 0, DK)),
    ("medium_blue", Rgb(0, 0, MED)),
    ("blue", Rgb(0, 0, FULL)),
    ("light_blue", Rgb(WASH1, WASH1, FULL)),
    ("dark_purple", Rgb(DK_HALF, 0, DK)),
    ("medium_purple", Rgb(MED_HALF, 0, MED)),
    ("purple", Rgb(FULL_HALF, 0, FULL)),
    ("light_purple", Rgb(WASH2, WASH1, FULL)),
    ("dark_magenta", Rgb(DK, 0, DK)),
    ("medium_magenta", Rgb(MED, 0, MED)),
    ("magenta", Rgb(FULL, 0, FULL)),
    ("light_magenta", Rgb(FULL, WASH1, FULL)),
    ("dark_pink", Rgb(DK, 0, DK_HALF)),
    ("medium_pink", Rgb(MED, 0, MED_HALF)),
    ("pink", Rgb(FULL, 0, FULL_HALF)),
    ("light_pink", Rgb(FULL, WASH1, WASH2)),
    (NORMAL, Rgb(MED, MED, MED)),
    ("hlink", Rgb(0, FULL_HALF, FULL)),
    ("warning", Rgb(FULL, FULL, 0)),
    ("error", Rgb(FULL, 103, 103)),
];

/// Looks up a colour by name.
#[must_use]
pub fn lookup(name: &str) -> Option<Rgb> {
    PALETTE.iter().find(|(n, _)| *n == name).map(|(_, rgb)| *rgb)
}

/// Returns true for `hlink`, `warning` and `error`.
#[must_use]
pub fn is_special(name: &str) -> bool {
    SPECIAL.contains(&name)
}

/// All colour names in display order.
pub fn names() -> impl Iterator<Item = &'static str> {
    PALETTE.iter().map(|(name, _)| *name)
}

/// Colour names a caller would pick directly: everything except `normal`
/// and the special names.
pub fn plain_names() -> impl Iterator<Item = &'static str> {
    names().filter(|name| *name != NORMAL && !is_special(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("light_orange"), Some(Rgb(255, 205, 153)));
        assert_eq!(lookup("medium_purple"), Some(Rgb(64, 0, 128)));
        assert_eq!(lookup("dark_chartreuse"), Some(Rgb(32, 64, 0)));
        assert_eq!(lookup("puce"), None);
    }

    #[test]
    fn test_names_are_unique() {
        let mut seen: Vec<_> = names().collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), PALETTE.len());
    }

    #[test]
    fn test_plain_names() {
        let plain: Vec<_> = plain_names().collect();
        assert_eq!(plain.len(), 49);
        assert_eq!(plain.first(), Some(&"black"));
        assert_eq!(plain.last(), Some(&"light_pink"));
        assert!(!plain.contains(&"warning"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgb(0, 127, 255).to_string(), "0;127;255");
    }
}
