//! SMTP command builder.

use crate::address::Address;
use crate::extension::AuthMechanism;

/// SMTP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// HELO - Simple greeting
    Helo {
        /// Client hostname
        hostname: String,
    },
    /// EHLO - Extended greeting
    Ehlo {
        /// Client hostname
        hostname: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH - Begin authentication
    Auth {
        /// Authentication mechanism
        mechanism: AuthMechanism,
        /// Initial response (optional, for SASL-IR)
        initial_response: Option<String>,
    },
    /// A bare base64 line answering a 334 challenge.
    AuthResponse(String),
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: Address,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: Address,
    },
    /// DATA - Begin message data
    Data,
    /// RSET - Reset transaction
    Rset,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Serializes the command to bytes, including the trailing CRLF.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = match self {
            Self::Helo { hostname } => format!("HELO {hostname}").into_bytes(),
            Self::Ehlo { hostname } => format!("EHLO {hostname}").into_bytes(),
            Self::StartTls => b"STARTTLS".to_vec(),
            Self::Auth {
                mechanism,
                initial_response,
            } => match initial_response {
                Some(resp) => format!("AUTH {} {resp}", mechanism.as_str()).into_bytes(),
                None => format!("AUTH {}", mechanism.as_str()).into_bytes(),
            },
            Self::AuthResponse(line) => line.clone().into_bytes(),
            Self::MailFrom { from } => format!("MAIL FROM:<{from}>").into_bytes(),
            Self::RcptTo { to } => format!("RCPT TO:<{to}>").into_bytes(),
            Self::Data => b"DATA".to_vec(),
            Self::Rset => b"RSET".to_vec(),
            Self::Quit => b"QUIT".to_vec(),
        };

        buf.extend_from_slice(b"\r\n");
        buf
    }

    /// Returns the command as it may be written to a log.
    ///
    /// Credentials never appear in the returned text.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            Self::Auth { mechanism, .. } => format!("AUTH {} <redacted>", mechanism.as_str()),
            Self::AuthResponse(_) => "<redacted>".to_string(),
            other => String::from_utf8_lossy(&other.serialize())
                .trim_end()
                .to_string(),
        }
    }
}
