//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "phonehome")]
#[command(about = "Email and SMS notifications for people in a contact directory")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a notification
    Send {
        /// Message body, substituted into the template
        body: String,

        /// User, group, phone number or email address (repeatable)
        #[arg(short, long, required = true, num_args = 1..)]
        to: Vec<String>,

        /// Subject line (sent upper-cased)
        #[arg(short, long)]
        subject: Option<String>,

        /// File to attach to every message
        #[arg(short, long)]
        attachment: Option<PathBuf>,

        /// Do not send email
        #[arg(long)]
        no_email: bool,

        /// Do not send SMS
        #[arg(long)]
        no_sms: bool,

        /// Assets directory [default: $PHONEHOME_ASSETS or the config dir]
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Transport config file [default: $PHONEHOME_CONFIG or config.json in the config dir]
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show who a specifier resolves to, without sending
    Resolve {
        /// User, group, phone number or email address (repeatable)
        #[arg(short, long, required = true, num_args = 1..)]
        to: Vec<String>,

        /// Assets directory
        #[arg(long)]
        assets: Option<PathBuf>,
    },

    /// Print styled text
    Print {
        /// Text to print
        text: String,

        /// Style option such as fg=light_pink or bold=true (repeatable)
        #[arg(short, long)]
        opt: Vec<String>,
    },

    /// Show every colour and formatting flag
    Demo {
        /// Sample text
        text: Option<String>,
    },

    /// Write sample assets and config that do not exist yet
    Init {
        /// Assets directory
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Transport config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_send_args() {
        let cli = Cli::try_parse_from([
            "phonehome", "send", "disk full", "--to", "admin", "7345555555", "-s", "alert", "--no-sms",
        ])
        .unwrap();
        match cli.command {
            Command::Send {
                body,
                to,
                subject,
                no_sms,
                no_email,
                ..
            } => {
                assert_eq!(body, "disk full");
                assert_eq!(to, ["admin", "7345555555"]);
                assert_eq!(subject.as_deref(), Some("alert"));
                assert!(no_sms);
                assert!(!no_email);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_send_requires_recipient() {
        assert!(Cli::try_parse_from(["phonehome", "send", "x"]).is_err());
    }

    #[test]
    fn test_print_options() {
        let cli = Cli::try_parse_from(["phonehome", "print", "hi", "--opt", "fg=red", "-o", "bold=true"]).unwrap();
        match cli.command {
            Command::Print { opt, .. } => assert_eq!(opt, ["fg=red", "bold=true"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
