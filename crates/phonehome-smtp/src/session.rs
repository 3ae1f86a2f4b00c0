//! A single SMTP session: greeting, capabilities, optional TLS upgrade and
//! login, then any number of mail transactions until QUIT.

use crate::address::Address;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::extension::{AuthMechanism, ServerInfo};
use crate::reply::{Reply, ReplyCode, is_last_reply_line, parse_reply};
use crate::stream::{self, Security, SmtpStream};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, trace};

/// Result of one mail transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOutcome {
    /// Recipients the server accepted at RCPT TO.
    pub accepted: Vec<Address>,
    /// Recipients the server rejected, with its reply.
    pub refused: Vec<(Address, Reply)>,
}

/// An open SMTP session.
///
/// Setup steps consume and return the session so that a failed upgrade or
/// login drops the connection. Transactions borrow it mutably.
#[derive(Debug)]
pub struct SmtpSession {
    stream: SmtpStream,
    server_info: ServerInfo,
    host: String,
}

impl SmtpSession {
    /// Connects to a server and reads its greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the greeting is not 2xx.
    pub async fn connect(host: &str, port: u16, security: Security) -> Result<Self> {
        debug!(host, port, ?security, "connecting to SMTP server");
        let mut stream = stream::open(host, port, security).await?;

        let greeting = read_reply(&mut stream).await?;
        if !greeting.is_success() {
            return Err(greeting.into_error());
        }

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                ..ServerInfo::default()
            },
            host: host.to_string(),
        })
    }

    /// Returns the server information gathered so far.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns true if the connection is encrypted.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.stream.is_tls()
    }

    /// Sends EHLO, falling back to HELO for servers that reject it.
    ///
    /// # Errors
    ///
    /// Returns an error if both greetings are refused.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let reply = self
            .command(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?;

        if reply.is_success() {
            self.server_info.update_from_ehlo(&reply.message);
            return Ok(self);
        }

        debug!(code = %reply.code, "EHLO refused, falling back to HELO");
        let reply = self
            .command(Command::Helo {
                hostname: client_hostname.to_string(),
            })
            .await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }
        self.server_info.extensions.clear();
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS, then repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not offered or if the upgrade fails.
    pub async fn starttls(mut self, client_hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        let reply = self.command(Command::StartTls).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        let Self {
            stream,
            server_info,
            host,
        } = self;
        let stream = stream.upgrade_to_tls(&host).await?;
        Self {
            stream,
            server_info,
            host,
        }
        .ehlo(client_hostname)
        .await
    }

    /// Authenticates with the best mechanism the server offers.
    ///
    /// # Errors
    ///
    /// Returns an error if no supported mechanism is offered or the
    /// credentials are rejected.
    pub async fn login(mut self, username: &str, password: &str) -> Result<Self> {
        let Some(mechanism) = self.server_info.preferred_auth() else {
            return Err(Error::NotSupported("AUTH PLAIN or AUTH LOGIN".into()));
        };
        debug!(mechanism = mechanism.as_str(), username, "authenticating");

        let reply = match mechanism {
            AuthMechanism::Plain => {
                let credentials = format!("\0{username}\0{password}");
                self.command(Command::Auth {
                    mechanism,
                    initial_response: Some(STANDARD.encode(credentials)),
                })
                .await?
            }
            AuthMechanism::Login => {
                let reply = self
                    .command(Command::Auth {
                        mechanism,
                        initial_response: None,
                    })
                    .await?;
                expect_challenge(reply)?;
                let reply = self
                    .command(Command::AuthResponse(STANDARD.encode(username)))
                    .await?;
                expect_challenge(reply)?;
                self.command(Command::AuthResponse(STANDARD.encode(password)))
                    .await?
            }
        };

        if !reply.is_success() {
            return Err(reply.into_error());
        }
        Ok(self)
    }

    /// Runs one mail transaction.
    ///
    /// Recipients the server rejects are reported in
    /// [`SendOutcome::refused`]; the transaction only fails outright when
    /// every recipient is refused. Any failure after MAIL FROM resets the
    /// transaction so the session can be reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender or message is rejected, if all
    /// recipients are refused, or on I/O failure.
    pub async fn send_mail(
        &mut self,
        from: &Address,
        recipients: &[Address],
        message: &[u8],
    ) -> Result<SendOutcome> {
        if recipients.is_empty() {
            return Err(Error::InvalidAddress("No recipients specified".into()));
        }
        let limit = self.server_info.max_message_size().unwrap_or(0);
        if limit > 0 && message.len() > limit {
            return Err(Error::NotSupported(format!(
                "messages of {} bytes (limit {limit})",
                message.len()
            )));
        }

        let reply = self
            .command(Command::MailFrom { from: from.clone() })
            .await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        match self.transaction(recipients, message).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if !matches!(err, Error::Io(_) | Error::ConnectionClosed) {
                    // Best effort; the transaction error is returned.
                    let _ = self.reset().await;
                }
                Err(err)
            }
        }
    }

    async fn transaction(&mut self, recipients: &[Address], message: &[u8]) -> Result<SendOutcome> {
        let mut outcome = SendOutcome::default();
        for to in recipients {
            let reply = self.command(Command::RcptTo { to: to.clone() }).await?;
            if reply.is_success() {
                outcome.accepted.push(to.clone());
            } else {
                debug!(recipient = %to, code = %reply.code, "recipient refused");
                outcome.refused.push((to.clone(), reply));
            }
        }

        if outcome.accepted.is_empty() {
            return Err(Error::AllRecipientsRefused(
                outcome.refused.iter().map(|(a, _)| a.to_string()).collect(),
            ));
        }

        let reply = self.command(Command::Data).await?;
        if reply.code != ReplyCode::START_DATA {
            return Err(reply.into_error());
        }

        self.write_data(message).await?;
        let reply = read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        Ok(outcome)
    }

    /// Sends RSET, abandoning any transaction in progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the command.
    pub async fn reset(&mut self) -> Result<()> {
        let reply = self.command(Command::Rset).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }
        Ok(())
    }

    /// Sends QUIT and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.command(Command::Quit).await?;
        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(reply.into_error());
        }
        Ok(())
    }

    /// Writes message content with CRLF line endings, dot-stuffing, and the
    /// terminating `.` line.
    async fn write_data(&mut self, message: &[u8]) -> Result<()> {
        let mut buf = Vec::with_capacity(message.len() + 64);
        let body = message.strip_suffix(b"\n").unwrap_or(message);
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.first() == Some(&b'.') {
                buf.push(b'.');
            }
            buf.extend_from_slice(line);
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(b".\r\n");
        self.stream.write_all(&buf).await
    }

    async fn command(&mut self, cmd: Command) -> Result<Reply> {
        trace!(command = %cmd.redacted(), "C:");
        self.stream.write_all(&cmd.serialize()).await?;
        read_reply(&mut self.stream).await
    }
}

fn expect_challenge(reply: Reply) -> Result<()> {
    if reply.code == ReplyCode::AUTH_CONTINUE {
        Ok(())
    } else {
        Err(reply.into_error())
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        if line.is_empty() {
            continue;
        }

        let is_last = is_last_reply_line(&line);
        trace!(line = %line, "S:");
        lines.push(line);

        if is_last {
            break;
        }
    }

    parse_reply(&lines)
}
