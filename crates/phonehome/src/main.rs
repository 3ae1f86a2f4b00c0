//! `phonehome` - email and SMS notifications from the command line.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod init;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use phonehome_core::{Assets, Communicator, ResolvedRecipients, SendOptions, Specifier, TransportConfig};
use phonehome_style::{DEMO_TEXT, Printer, Style, fancy_print};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phonehome=info,phonehome_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Command::Send {
            body,
            to,
            subject,
            attachment,
            no_email,
            no_sms,
            assets,
            config,
        } => {
            let options = SendOptions {
                attachment,
                disable_email: no_email,
                disable_sms: no_sms,
            };
            send(&body, to, subject.as_deref(), &options, assets, config).await
        }
        Command::Resolve { to, assets } => show_resolved(to, assets),
        Command::Print { text, opt } => print_styled(&text, &opt),
        Command::Demo { text } => {
            Printer::stdout().demo(text.as_deref().unwrap_or(DEMO_TEXT))?;
            Ok(())
        }
        Command::Init { assets, config } => {
            let dir = assets_dir(assets)?;
            let written = init::write_samples(&dir, &config_path(config)?)?;
            if written.is_empty() {
                progress(&format!("Nothing to do, {} already has every file", dir.display()))?;
            }
            for path in written {
                progress(&format!("Wrote {}", path.display()))?;
            }
            Ok(())
        }
    }
}

async fn send(
    body: &str,
    to: Vec<String>,
    subject: Option<&str>,
    options: &SendOptions,
    assets: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let path = config_path(config)?;
    let config = TransportConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    let communicator = load_communicator(assets, config)?;

    info!("Sending notification");
    let Some(report) = communicator
        .send_msg(body, &specifier(to), subject, options)
        .await
        .context("Failed to send notification")?
    else {
        caution("Nothing was sent")?;
        return Ok(());
    };

    progress(&format!(
        "Emails: {} sent, {} failed. SMS: {} sent, {} failed.",
        report.emails_sent, report.emails_failed, report.sms_sent, report.sms_failed
    ))?;
    if report.attempted() > 0 && report.emails_sent + report.sms_sent == 0 {
        bail!("Every transmission failed");
    }
    Ok(())
}

fn show_resolved(to: Vec<String>, assets: Option<PathBuf>) -> Result<()> {
    let dir = assets_dir(assets)?;
    let directory = phonehome_core::contacts::load_directory(&dir.join(phonehome_core::assets::CONTACTS_FILE))
        .with_context(|| format!("Failed to load contacts from {}", dir.display()))?;
    let ResolvedRecipients { emails, mobiles } = phonehome_core::resolve(&directory, &specifier(to));

    if emails.is_empty() && mobiles.is_empty() {
        caution("No recipients identified")?;
        return Ok(());
    }
    progress("Emails:")?;
    for email in &emails {
        println!("\t{email}");
    }
    progress("Mobiles:")?;
    for mobile in &mobiles {
        println!("\t{mobile}");
    }
    Ok(())
}

fn print_styled(text: &str, options: &[String]) -> Result<()> {
    let pairs = options
        .iter()
        .map(|option| {
            option
                .split_once('=')
                .with_context(|| format!("Style option '{option}' is not KEY=VALUE"))
        })
        .collect::<Result<Vec<_>>>()?;
    let style = Style::from_options(pairs)?;
    fancy_print(text, &style)?;
    Ok(())
}

fn load_communicator(assets: Option<PathBuf>, config: TransportConfig) -> Result<Communicator> {
    let dir = assets_dir(assets)?;
    let assets = Assets::from_dir(&dir)
        .with_context(|| format!("Failed to load assets from {}", dir.display()))?;
    Ok(Communicator::new(assets, config))
}

fn assets_dir(assets: Option<PathBuf>) -> Result<PathBuf> {
    match assets {
        Some(dir) => Ok(dir),
        None => Ok(Assets::default_dir()?),
    }
}

fn config_path(config: Option<PathBuf>) -> Result<PathBuf> {
    match config {
        Some(path) => Ok(path),
        None => Ok(TransportConfig::default_path()?),
    }
}

fn specifier(mut to: Vec<String>) -> Specifier {
    if to.len() == 1 {
        Specifier::Single(to.remove(0))
    } else {
        Specifier::Many(to)
    }
}

fn progress(message: &str) -> Result<()> {
    fancy_print(message, &Style::new().fg("light_cerulean"))?;
    Ok(())
}

fn caution(message: &str) -> Result<()> {
    fancy_print(message, &Style::new().fg("yellow"))?;
    Ok(())
}
