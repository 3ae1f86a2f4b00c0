//! Builds the notification message and sends it to every resolved
//! recipient.

use std::path::PathBuf;

use phonehome_mime::{Attachment, ContentType, InlineImage, Message, MessageBuilder, make_content_id};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::transport::{Envelope, MailTransport};
use crate::assets::CarrierStubs;
use crate::error::{Error, Result};
use crate::resolve::ResolvedRecipients;
use crate::template::MessageTemplate;

/// Per-call switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// File to attach to every message.
    pub attachment: Option<PathBuf>,
    /// Skip email recipients.
    pub disable_email: bool,
    /// Skip SMS recipients.
    pub disable_sms: bool,
}

impl SendOptions {
    /// Options that attach a file.
    #[must_use]
    pub fn with_attachment(path: impl Into<PathBuf>) -> Self {
        Self {
            attachment: Some(path.into()),
            ..Self::default()
        }
    }

    /// Reads options from a JSON object with the optional keys
    /// `attachment` (string), `disable_email` and `disable_sms` (booleans).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgumentType`] for a non-object value, an
    /// unknown key, or a value of the wrong type.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::InvalidArgumentType(format!(
                "send options must be an object, got {value}"
            )));
        };

        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "attachment" => {
                    options.attachment = match value {
                        Value::Null => None,
                        Value::String(path) => Some(PathBuf::from(path)),
                        other => {
                            return Err(Error::InvalidArgumentType(format!(
                                "'attachment' must be a path string but you gave {other}"
                            )));
                        }
                    };
                }
                "disable_email" => options.disable_email = switch(key, value)?,
                "disable_sms" => options.disable_sms = switch(key, value)?,
                other => {
                    return Err(Error::InvalidArgumentType(format!(
                        "unknown send option '{other}'"
                    )));
                }
            }
        }
        Ok(options)
    }
}

fn switch(key: &str, value: &Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        Error::InvalidArgumentType(format!("'{key}' must be boolean but you gave {value}"))
    })
}

/// What happened during one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Emails accepted by the server.
    pub emails_sent: usize,
    /// Emails that failed.
    pub emails_failed: usize,
    /// Mobile numbers whose SMS fan-out was accepted.
    pub sms_sent: usize,
    /// Mobile numbers whose SMS fan-out failed.
    pub sms_failed: usize,
}

impl DispatchReport {
    /// Total number of transmissions attempted.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.emails_sent + self.emails_failed + self.sms_sent + self.sms_failed
    }
}

/// Renders and sends notifications.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    template: &'a MessageTemplate,
    stubs: &'a CarrierStubs,
    logo: Option<&'a [u8]>,
    cc: &'a [String],
    logo_link: Option<&'a str>,
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher over loaded assets.
    #[must_use]
    pub const fn new(template: &'a MessageTemplate, stubs: &'a CarrierStubs) -> Self {
        Self {
            template,
            stubs,
            logo: None,
            cc: &[],
            logo_link: None,
        }
    }

    /// Shows a PNG logo under the HTML body.
    #[must_use]
    pub const fn with_logo(mut self, logo: Option<&'a [u8]>, link: Option<&'a str>) -> Self {
        self.logo = logo;
        self.logo_link = link;
        self
    }

    /// Copies every message to these addresses.
    #[must_use]
    pub const fn with_cc(mut self, cc: &'a [String]) -> Self {
        self.cc = cc;
        self
    }

    /// Sends the message to every resolved recipient.
    ///
    /// A missing attachment logs a warning and sends nothing. Each email
    /// address gets its own message; each mobile gets one message addressed
    /// to all carrier gateways. Individual failures are logged and counted,
    /// never returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the message itself cannot be built.
    pub async fn send_message<T: MailTransport>(
        &self,
        session: &mut T,
        body: &str,
        recipients: &ResolvedRecipients,
        subject: Option<&str>,
        options: &SendOptions,
    ) -> Result<DispatchReport> {
        let mut report = DispatchReport::default();

        let attachment = match &options.attachment {
            Some(path) if !path.exists() => {
                warn!(path = %path.display(), "Attachment not found, nothing sent");
                return Ok(report);
            }
            Some(path) => Some(Attachment::from_path(path)?),
            None => None,
        };

        let mut message = self.build(session.sender(), body, subject, attachment)?;

        if options.disable_email {
            debug!("email disabled");
        } else {
            for email in &recipients.emails {
                info!(to = %email, "Sending email");
                let sent = match message.set_header("To", email.as_str()) {
                    Ok(()) => session.transmit(&self.envelope(vec![email.clone()], &message)).await,
                    Err(e) => Err(e.into()),
                };
                match sent {
                    Ok(()) => report.emails_sent += 1,
                    Err(e) => {
                        warn!(to = %email, error = %e, "Failed sending email message");
                        report.emails_failed += 1;
                    }
                }
            }
        }

        if options.disable_sms {
            debug!("SMS disabled");
        } else {
            for mobile in &recipients.mobiles {
                info!(to = %display_mobile(mobile), "Sending SMS message");
                let candidates = self.stubs.gateway_addresses(mobile);
                if candidates.is_empty() {
                    warn!(to = %display_mobile(mobile), "No SMS carrier stubs, SMS not sent");
                    report.sms_failed += 1;
                    continue;
                }
                let sent = match message.set_header("To", candidates.join(", ")) {
                    Ok(()) => session.transmit(&self.envelope(candidates, &message)).await,
                    Err(e) => Err(e.into()),
                };
                match sent {
                    Ok(()) => report.sms_sent += 1,
                    Err(e) => {
                        warn!(to = %display_mobile(mobile), error = %e, "Failed sending SMS message");
                        report.sms_failed += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    fn envelope(&self, to: Vec<String>, message: &Message) -> Envelope {
        let mut recipients = to;
        recipients.extend(self.cc.iter().cloned());
        Envelope {
            recipients,
            message: message.clone(),
        }
    }

    fn build(
        &self,
        sender: &str,
        body: &str,
        subject: Option<&str>,
        attachment: Option<Attachment>,
    ) -> Result<Message> {
        let text = self.template.render(body);
        let domain = sender.rsplit_once('@').map_or("localhost", |(_, d)| d);

        let mut builder = MessageBuilder::new()
            .from(sender)
            .cc(self.cc.iter().cloned())
            .text_body(text.as_str());
        if let Some(subject) = subject {
            builder = builder.subject(subject.to_uppercase());
        }

        let logo = self.logo.map(|data| InlineImage {
            content_id: make_content_id(domain),
            content_type: ContentType::new("image", "png"),
            data: data.to_vec(),
        });
        builder = builder.html_body(html_body(
            &text,
            logo.as_ref().map(|image| image.content_id.as_str()),
            self.logo_link,
        ));
        if let Some(image) = logo {
            builder = builder.inline_image(image);
        }
        if let Some(attachment) = attachment {
            builder = builder.attach(attachment);
        }

        Ok(builder.build()?)
    }
}

/// HTML alternative: the rendered text with line breaks as `<br>`,
/// followed by the logo when there is one.
fn html_body(text: &str, logo_cid: Option<&str>, link: Option<&str>) -> String {
    let mut html = format!(
        "<html>\n  <head></head>\n  <body>\n    <p>{}</p>\n",
        text.replace('\n', "<br>")
    );
    if let Some(cid) = logo_cid {
        let image = format!("<img src=\"cid:{cid}\" />");
        match link {
            Some(href) => html.push_str(&format!("    <a href=\"{href}\">{image}</a>\n")),
            None => html.push_str(&format!("    {image}\n")),
        }
    }
    html.push_str("  </body>\n</html>\n");
    html
}

/// Formats a ten-digit number as `734.555.5555`.
fn display_mobile(mobile: &str) -> String {
    match (mobile.get(0..3), mobile.get(3..6), mobile.get(6..)) {
        (Some(a), Some(b), Some(c)) => format!("{a}.{b}.{c}"),
        _ => mobile.to_string(),
    }
}
