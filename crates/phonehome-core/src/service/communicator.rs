//! The notification facade: resolve, open a session, dispatch, close.

use std::path::Path;

use tracing::warn;

use super::dispatch::{DispatchReport, Dispatcher, SendOptions};
use super::transport::{MailTransport, open_session};
use crate::assets::Assets;
use crate::config::TransportConfig;
use crate::error::Result;
use crate::resolve::{ResolvedRecipients, Resolver, Specifier};

/// Sends notifications using loaded assets and a transport configuration.
#[derive(Debug, Clone)]
pub struct Communicator {
    resolver: Resolver,
    assets: Assets,
    config: TransportConfig,
}

impl Communicator {
    /// Creates a communicator from loaded assets.
    #[must_use]
    pub fn new(assets: Assets, config: TransportConfig) -> Self {
        Self {
            resolver: Resolver::new(assets.directory.clone()),
            assets,
            config,
        }
    }

    /// Loads assets from a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the assets cannot be loaded.
    pub fn from_dir(dir: &Path, config: TransportConfig) -> Result<Self> {
        Ok(Self::new(Assets::from_dir(dir)?, config))
    }

    /// Resolves a specifier without sending anything.
    #[must_use]
    pub fn resolve(&self, who: &Specifier) -> ResolvedRecipients {
        self.resolver.resolve(who)
    }

    /// Returns a dispatcher over this communicator's assets.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.assets.template, &self.assets.stubs)
            .with_cc(&self.config.cc)
            .with_logo(self.assets.logo.as_deref(), self.config.logo_link.as_deref())
    }

    /// Sends `body` to everyone `who` resolves to over a fresh SMTP session.
    ///
    /// Returns `Ok(None)` without opening a session when nobody resolves or
    /// the attachment is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if no SMTP session can be opened or the message
    /// cannot be built. Failures of individual sends are only logged.
    pub async fn send_msg(
        &self,
        body: &str,
        who: &Specifier,
        subject: Option<&str>,
        options: &SendOptions,
    ) -> Result<Option<DispatchReport>> {
        let Some(recipients) = self.check(who, options) else {
            return Ok(None);
        };
        let session = open_session(&self.config).await?;
        self.dispatch_with(session, body, &recipients, subject, options)
            .await
            .map(Some)
    }

    /// Like [`Communicator::send_msg`], over an already open transport.
    ///
    /// The transport is closed before returning, on every path.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built.
    pub async fn send_msg_with<T: MailTransport>(
        &self,
        session: T,
        body: &str,
        who: &Specifier,
        subject: Option<&str>,
        options: &SendOptions,
    ) -> Result<Option<DispatchReport>> {
        let Some(recipients) = self.check(who, options) else {
            session.close().await;
            return Ok(None);
        };
        self.dispatch_with(session, body, &recipients, subject, options)
            .await
            .map(Some)
    }

    fn check(&self, who: &Specifier, options: &SendOptions) -> Option<ResolvedRecipients> {
        let recipients = self.resolve(who);
        if !recipients.has_any_recipient() {
            warn!(who = ?who.tokens(), "No recipients identified, nothing sent");
            return None;
        }
        if let Some(path) = options.attachment.as_deref().filter(|p| !p.exists()) {
            warn!(path = %path.display(), "Attachment not found, nothing sent");
            return None;
        }
        Some(recipients)
    }

    async fn dispatch_with<T: MailTransport>(
        &self,
        mut session: T,
        body: &str,
        recipients: &ResolvedRecipients,
        subject: Option<&str>,
        options: &SendOptions,
    ) -> Result<DispatchReport> {
        let result = self
            .dispatcher()
            .send_message(&mut session, body, recipients, subject, options)
            .await;
        session.close().await;
        result
    }
}

/// One-shot helper: load assets from `assets_dir` and send.
///
/// # Errors
///
/// Returns an error if the assets cannot be loaded or no SMTP session can
/// be opened.
pub async fn phone_home(
    assets_dir: &Path,
    config: TransportConfig,
    body: &str,
    who: &Specifier,
    subject: Option<&str>,
    options: &SendOptions,
) -> Result<Option<DispatchReport>> {
    Communicator::from_dir(assets_dir, config)?
        .send_msg(body, who, subject, options)
        .await
}
