//! The mail transport seam and its SMTP implementation.

use std::future::Future;

use phonehome_mime::Message;
use phonehome_smtp::{Address, Security, SmtpSession};
use tracing::{debug, info, warn};

use crate::config::{SmtpEndpoint, TransportConfig};
use crate::error::{Error, Result, SessionFailure};

/// One message and the envelope recipients it goes to.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Envelope recipients (the `To` addresses plus any CC addresses).
    pub recipients: Vec<String>,
    /// The message as it will be written after DATA.
    pub message: Message,
}

/// An open session able to transmit messages.
///
/// Transmissions are sequential: each call completes before the next one
/// starts.
pub trait MailTransport {
    /// Address used as envelope and header sender.
    fn sender(&self) -> &str;

    /// Transmits one message.
    fn transmit(&mut self, envelope: &Envelope) -> impl Future<Output = Result<()>> + Send;

    /// Ends the session. Failures are logged, not returned.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Which configured endpoint a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The authenticated external server.
    External,
    /// The internal relay.
    Internal,
}

/// [`MailTransport`] over a live SMTP session.
#[derive(Debug)]
pub struct SmtpTransport {
    session: SmtpSession,
    sender: Address,
    endpoint: Endpoint,
}

impl SmtpTransport {
    /// Returns which endpoint this session is connected to.
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }
}

impl MailTransport for SmtpTransport {
    fn sender(&self) -> &str {
        self.sender.as_str()
    }

    async fn transmit(&mut self, envelope: &Envelope) -> Result<()> {
        let recipients = envelope
            .recipients
            .iter()
            .map(Address::new)
            .collect::<phonehome_smtp::Result<Vec<_>>>()?;

        let outcome = self
            .session
            .send_mail(&self.sender, &recipients, &envelope.message.to_bytes())
            .await?;
        for (address, reply) in &outcome.refused {
            debug!(recipient = %address, code = %reply.code, "recipient refused");
        }
        Ok(())
    }

    async fn close(self) {
        if let Err(e) = self.session.quit().await {
            warn!(error = %e, "SMTP session did not close cleanly");
        }
    }
}

/// Opens a session on the external server, falling back once to the
/// internal relay.
///
/// # Errors
///
/// Returns [`Error::SessionUnavailable`] with both failure reasons when
/// neither endpoint can be used.
pub async fn open_session(config: &TransportConfig) -> Result<SmtpTransport> {
    let client_hostname = config.client_hostname();
    let mut failures = Vec::with_capacity(2);

    match connect_endpoint(&config.external, client_hostname, true).await {
        Ok(transport) => {
            info!(
                host = %config.external.host,
                server = %transport.session.server_info().hostname,
                encrypted = transport.session.is_encrypted(),
                "SMTP session open on external server"
            );
            return Ok(transport);
        }
        Err(e) => {
            warn!(host = %config.external.host, error = %e, "External SMTP server unavailable, trying internal relay");
            failures.push(SessionFailure::ExternalSessionFailed(e.to_string()));
        }
    }

    let Some(internal) = &config.internal else {
        failures.push(SessionFailure::InternalSessionFailed(
            "no internal relay configured".into(),
        ));
        return Err(Error::SessionUnavailable(failures));
    };

    match connect_endpoint(internal, client_hostname, false).await {
        Ok(transport) => {
            info!(
                host = %internal.host,
                server = %transport.session.server_info().hostname,
                encrypted = transport.session.is_encrypted(),
                "SMTP session open on internal relay"
            );
            Ok(transport)
        }
        Err(e) => {
            warn!(host = %internal.host, error = %e, "Internal SMTP relay unavailable");
            failures.push(SessionFailure::InternalSessionFailed(e.to_string()));
            Err(Error::SessionUnavailable(failures))
        }
    }
}

async fn connect_endpoint(
    endpoint: &SmtpEndpoint,
    client_hostname: &str,
    external: bool,
) -> Result<SmtpTransport> {
    let sender = Address::new(endpoint.sender.as_str())?;

    let mut session = SmtpSession::connect(&endpoint.host, endpoint.port(), endpoint.security)
        .await?
        .ehlo(client_hostname)
        .await?;

    if endpoint.security == Security::StartTls {
        session = session.starttls(client_hostname).await?;
    }

    // The relay trusts the network; only the external server logs in.
    let credentials = if external {
        endpoint.credentials()
    } else {
        None
    };
    if let Some((username, password)) = credentials {
        session = session.login(username, password).await?;
    }

    Ok(SmtpTransport {
        session,
        sender,
        endpoint: if external {
            Endpoint::External
        } else {
            Endpoint::Internal
        },
    })
}
