//! Dispatch tests against a recording transport.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::io::Write as _;

use phonehome_core::{
    Assets, CarrierStubs, Communicator, ContactDirectory, Dispatcher, Envelope, MailTransport,
    MessageTemplate, Resolver, Result, SendOptions, Specifier, TransportConfig,
};
use serde_json::json;

/// Records every transmission; fails for envelopes whose first recipient is
/// listed in `fail_for`.
#[derive(Default)]
struct RecordingTransport {
    sent: Vec<Envelope>,
    fail_for: HashSet<String>,
    closed: bool,
}

impl RecordingTransport {
    fn failing_for(addresses: &[&str]) -> Self {
        Self {
            fail_for: addresses.iter().map(|a| (*a).to_string()).collect(),
            ..Self::default()
        }
    }
}

impl MailTransport for &mut RecordingTransport {
    fn sender(&self) -> &str {
        "alerts@example.com"
    }

    async fn transmit(&mut self, envelope: &Envelope) -> Result<()> {
        self.sent.push(envelope.clone());
        if envelope
            .recipients
            .first()
            .is_some_and(|to| self.fail_for.contains(to))
        {
            return Err(phonehome_smtp::Error::smtp_error(550, "mailbox unavailable").into());
        }
        Ok(())
    }

    async fn close(self) {
        self.closed = true;
    }
}

fn directory() -> ContactDirectory {
    serde_json::from_value(json!({
        "users": {
            "fred": {"email": "fred@bedrock.com", "mobile": "7345555555"},
            "wilma": {"email": "wilma@bedrock.com"},
            "barney": {"email": "barney@bedrock.com"},
            "joe": {"mobile": 17_345_550_000_u64}
        },
        "groups": {
            "admin": ["fred", "wilma"],
            "physics": ["wilma", "barney", "joe"]
        }
    }))
    .unwrap()
}

fn stubs() -> CarrierStubs {
    CarrierStubs::new([("att", "@txt.att.net"), ("verizon", "@vtext.com")])
}

fn template() -> MessageTemplate {
    MessageTemplate::parse("Automated notice:\n\n$BODY\n").unwrap()
}

fn to_header(envelope: &Envelope) -> String {
    envelope.message.header("To").unwrap().to_string()
}

#[tokio::test]
async fn test_emails_then_sms_fan_out() {
    let template = template();
    let stubs = stubs();
    let recipients = Resolver::new(directory()).resolve(&Specifier::from("fred"));
    let mut transport = RecordingTransport::default();

    let report = Dispatcher::new(&template, &stubs)
        .send_message(&mut &mut transport, "disk full", &recipients, Some("alert"), &SendOptions::default())
        .await
        .unwrap();

    assert_eq!(report.emails_sent, 1);
    assert_eq!(report.sms_sent, 1);
    assert_eq!(transport.sent.len(), 2);

    let email = &transport.sent[0];
    assert_eq!(email.recipients, vec!["fred@bedrock.com"]);
    assert_eq!(to_header(email), "fred@bedrock.com");
    assert_eq!(email.message.header("Subject"), Some("ALERT"));
    assert_eq!(email.message.header("From"), Some("alerts@example.com"));

    let sms = &transport.sent[1];
    assert_eq!(
        sms.recipients,
        vec!["7345555555@txt.att.net", "7345555555@vtext.com"]
    );
    assert_eq!(to_header(sms), "7345555555@txt.att.net, 7345555555@vtext.com");

    let text = email.message.to_string();
    assert!(text.contains("Automated notice:\r\n\r\ndisk full"));
    assert!(text.contains("<p>Automated notice:<br><br>disk full<br></p>"));
}

#[tokio::test]
async fn test_disable_email_sends_only_sms() {
    let template = template();
    let stubs = stubs();
    let recipients = Resolver::new(directory()).resolve(&Specifier::from(["wilma", "barney", "joe"]));
    assert_eq!(recipients.emails.len(), 2);
    assert_eq!(recipients.mobiles.len(), 1);

    let mut transport = RecordingTransport::default();
    let options = SendOptions {
        disable_email: true,
        ..SendOptions::default()
    };
    let report = Dispatcher::new(&template, &stubs)
        .send_message(&mut &mut transport, "x", &recipients, None, &options)
        .await
        .unwrap();

    assert_eq!(transport.sent.len(), 1);
    assert_eq!(report.attempted(), 1);
    assert!(transport.sent[0].recipients[0].starts_with("7345550000@"));
}

#[tokio::test]
async fn test_disable_sms_sends_only_email() {
    let template = template();
    let stubs = stubs();
    let recipients = Resolver::new(directory()).resolve(&Specifier::from("physics"));
    let mut transport = RecordingTransport::default();
    let options = SendOptions {
        disable_sms: true,
        ..SendOptions::default()
    };

    let report = Dispatcher::new(&template, &stubs)
        .send_message(&mut &mut transport, "x", &recipients, None, &options)
        .await
        .unwrap();

    assert_eq!(report.emails_sent, 2);
    assert_eq!(report.sms_sent + report.sms_failed, 0);
    assert!(transport.sent[0].message.header("Subject").is_none());
}

#[tokio::test]
async fn test_failure_does_not_stop_the_batch() {
    let template = template();
    let stubs = stubs();
    let recipients = Resolver::new(directory()).resolve(&Specifier::from(["fred", "wilma", "barney"]));
    let mut transport = RecordingTransport::failing_for(&["fred@bedrock.com"]);
    let options = SendOptions {
        disable_sms: true,
        ..SendOptions::default()
    };

    let report = Dispatcher::new(&template, &stubs)
        .send_message(&mut &mut transport, "x", &recipients, None, &options)
        .await
        .unwrap();

    // Sorted order: barney, fred, wilma. The second one fails.
    let sent_to: Vec<_> = transport.sent.iter().map(|e| e.recipients[0].clone()).collect();
    assert_eq!(
        sent_to,
        vec!["barney@bedrock.com", "fred@bedrock.com", "wilma@bedrock.com"]
    );
    assert_eq!(report.emails_sent, 2);
    assert_eq!(report.emails_failed, 1);
}

#[tokio::test]
async fn test_sms_failure_does_not_stop_the_batch() {
    let template = template();
    let stubs = stubs();
    let recipients = Resolver::new(directory()).resolve(&Specifier::from(["fred", "joe"]));
    assert_eq!(recipients.mobiles.len(), 2);

    // Sorted order: joe (7345550000) first, then fred.
    let mut transport = RecordingTransport::failing_for(&["7345550000@txt.att.net"]);
    let options = SendOptions {
        disable_email: true,
        ..SendOptions::default()
    };

    let report = Dispatcher::new(&template, &stubs)
        .send_message(&mut &mut transport, "x", &recipients, None, &options)
        .await
        .unwrap();

    assert_eq!(transport.sent.len(), 2);
    assert!(transport.sent[1].recipients[0].starts_with("7345555555@"));
    assert_eq!(report.sms_failed, 1);
    assert_eq!(report.sms_sent, 1);
}

#[tokio::test]
async fn test_bad_gateway_suffix_fails_only_that_message() {
    let template = template();
    let stubs = CarrierStubs::new([("att", "@txt.att.net\n")]);
    let recipients = Resolver::new(directory()).resolve(&Specifier::from(["wilma", "fred", "joe"]));
    assert_eq!(recipients.emails.len(), 2);
    assert_eq!(recipients.mobiles.len(), 2);

    let mut transport = RecordingTransport::default();
    let report = Dispatcher::new(&template, &stubs)
        .send_message(&mut &mut transport, "x", &recipients, None, &SendOptions::default())
        .await
        .unwrap();

    assert_eq!(report.emails_sent, 2);
    assert_eq!(report.sms_failed, 2);
    assert_eq!(report.sms_sent, 0);
    assert_eq!(transport.sent.len(), 2);
}

#[tokio::test]
async fn test_cc_is_added_to_every_envelope() {
    let template = template();
    let stubs = stubs();
    let cc = vec!["audit@example.com".to_string()];
    let recipients = Resolver::new(directory()).resolve(&Specifier::from("admin"));
    let mut transport = RecordingTransport::default();

    Dispatcher::new(&template, &stubs)
        .with_cc(&cc)
        .send_message(&mut &mut transport, "x", &recipients, None, &SendOptions::default())
        .await
        .unwrap();

    assert_eq!(transport.sent.len(), 3);
    for envelope in &transport.sent {
        assert_eq!(envelope.recipients.last().map(String::as_str), Some("audit@example.com"));
        assert_eq!(envelope.message.header("Cc"), Some("audit@example.com"));
    }
}

#[tokio::test]
async fn test_logo_and_attachment_layout() {
    let template = template();
    let stubs = stubs();
    let logo = [0x89_u8, b'P', b'N', b'G'];
    let recipients = Resolver::new(directory()).resolve(&Specifier::from("wilma"));

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(b"a,b\n1,2\n").unwrap();

    let mut transport = RecordingTransport::default();
    Dispatcher::new(&template, &stubs)
        .with_logo(Some(&logo[..]), Some("https://example.com"))
        .send_message(
            &mut &mut transport,
            "report attached",
            &recipients,
            Some("daily"),
            &SendOptions::with_attachment(file.path()),
        )
        .await
        .unwrap();

    let text = transport.sent[0].message.to_string();
    assert!(text.contains("multipart/related"));
    assert!(text.contains("<a href=\"https://example.com\"><img src=\"cid:"));
    assert!(text.contains("Content-Type: image/png"));
    assert!(text.contains("Content-Type: text/csv; name="));
    assert!(text.contains("Content-Disposition: attachment; filename="));
}

#[tokio::test]
async fn test_missing_attachment_is_a_soft_no_op() {
    let template = template();
    let stubs = stubs();
    let recipients = Resolver::new(directory()).resolve(&Specifier::from("fred"));
    let mut transport = RecordingTransport::default();

    let report = Dispatcher::new(&template, &stubs)
        .send_message(
            &mut &mut transport,
            "x",
            &recipients,
            None,
            &SendOptions::with_attachment("/no/such/file.pdf"),
        )
        .await
        .unwrap();

    assert_eq!(report.attempted(), 0);
    assert!(transport.sent.is_empty());
}

fn communicator() -> Communicator {
    let assets = Assets {
        directory: directory(),
        stubs: stubs(),
        template: template(),
        logo: None,
    };
    let config: TransportConfig = serde_json::from_value(json!({
        "external": {"host": "smtp.invalid", "sender": "alerts@example.com"}
    }))
    .unwrap();
    Communicator::new(assets, config)
}

#[tokio::test]
async fn test_no_recipients_means_no_transmit_and_closed_session() {
    let mut transport = RecordingTransport::default();

    let report = communicator()
        .send_msg_with(&mut transport, "x", &Specifier::from("nobody_at_all"), None, &SendOptions::default())
        .await
        .unwrap();

    assert!(report.is_none());
    assert!(transport.sent.is_empty());
    assert!(transport.closed);
}

#[tokio::test]
async fn test_facade_closes_session_after_dispatch() {
    let mut transport = RecordingTransport::default();

    let report = communicator()
        .send_msg_with(&mut transport, "x", &Specifier::from("admin"), Some("hi"), &SendOptions::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.emails_sent, 2);
    assert_eq!(report.sms_sent, 1);
    assert!(transport.closed);
}

#[tokio::test]
async fn test_send_msg_without_recipients_never_connects() {
    // smtp.invalid cannot resolve, so reaching the network would error.
    let report = communicator()
        .send_msg("x", &Specifier::from("nobody_at_all"), None, &SendOptions::default())
        .await
        .unwrap();
    assert!(report.is_none());
}
