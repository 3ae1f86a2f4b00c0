//! Error types for styling.

/// Result type alias for styling operations.
pub type Result<T> = std::result::Result<T, StyleError>;

/// Styling error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    /// An option key that is not recognized.
    #[error("'{0}' is not a valid style option. Valid options are: {keys}", keys = crate::style::OPTION_KEYS.join(", "))]
    UnknownOption(String),

    /// A flag option whose value is not `true` or `false`.
    #[error("'{option}' must be true or false but you gave {value:?}")]
    InvalidFlag {
        /// The option key.
        option: String,
        /// The rejected value.
        value: String,
    },

    /// A colour name that is not in the palette.
    #[error("Colour '{0}' is invalid. Choose one of: {names}", names = crate::palette::names().collect::<Vec<_>>().join(", "))]
    UnknownColor(String),

    /// Writing the styled text failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StyleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
