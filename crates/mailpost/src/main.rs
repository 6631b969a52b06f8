//! `mailpost` - send mail through the Postal transactional API
//!
//! Normalizes command-line mail arguments the same way the library does and
//! sends them as a structured message or as raw per-recipient messages.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailpost_api::SendResult;
use mailpost_core::{
    Delivery, MailArgs, Mailer, MessageAttributes, MessageRenderer, Rendered, Settings,
};

#[derive(Parser)]
#[command(name = "mailpost", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message
    Send(SendArgs),
}

#[derive(Args)]
struct SendArgs {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Postal host, overriding the settings file
    #[arg(long, env = "MAILPOST_HOST")]
    host: Option<String>,

    /// Server API key, overriding the settings file
    #[arg(long, env = "MAILPOST_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Comma-separated recipients
    #[arg(long)]
    to: String,

    /// Subject line
    #[arg(long, default_value = "")]
    subject: String,

    /// Message body
    #[arg(long, conflicts_with = "body_file")]
    body: Option<String>,

    /// Read the message body from a file
    #[arg(long, value_name = "FILE")]
    body_file: Option<PathBuf>,

    /// Extra header line, e.g. "Content-Type: text/plain" (repeatable)
    #[arg(long = "header", value_name = "LINE")]
    headers: Vec<String>,

    /// File to attach (repeatable)
    #[arg(long = "attach", value_name = "FILE")]
    attachments: Vec<PathBuf>,

    /// Embed attachments into raw multipart messages
    #[arg(long)]
    raw_attachments: bool,

    /// Print the rendered payloads instead of sending
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Send(args) => send(args).await,
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "mailpost=debug,mailpost_core=debug,mailpost_api=debug"
    } else {
        "mailpost=info,mailpost_core=info,mailpost_api=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn send(args: SendArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(host) = args.host.clone() {
        settings.host = host;
    }
    if let Some(api_key) = args.api_key.clone() {
        settings.api_key = api_key;
    }

    let environment = settings
        .environment()
        .context("Invalid site_url in settings")?;
    let renderer =
        MessageRenderer::new(Arc::new(environment)).with_raw_attachments(args.raw_attachments);
    let dry_run = args.dry_run;
    let mail_args = mail_args(args)?;

    if dry_run {
        let attributes =
            MessageAttributes::parse(mail_args, &settings.parse_options(), renderer.environment());
        return print_rendered(renderer.render(&attributes));
    }

    let client = settings.client().context("Cannot create API client")?;
    info!(host = %client.base_url(), "Sending via Postal");

    let mailer = Mailer::new(client, settings.parse_options(), renderer)
        .with_failure_policy(settings.failure_policy);

    match mailer.send(mail_args).await? {
        Delivery::Standard(result) => report(&result),
        Delivery::Raw(outcomes) => {
            let mut failed = Vec::new();
            for outcome in outcomes {
                match outcome.result {
                    Ok(result) => report(&result),
                    Err(e) => {
                        eprintln!("{}: {e}", outcome.recipient);
                        failed.push(outcome.recipient);
                    }
                }
            }
            if !failed.is_empty() {
                bail!("Delivery failed for {}", failed.join(", "));
            }
        }
    }
    Ok(())
}

/// Reads settings from `path`, or from the default location if it exists.
fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    if let Some(path) = path {
        return Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()));
    }

    let default_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailpost")
        .join("config.toml");

    if !default_path.exists() {
        debug!(path = %default_path.display(), "No settings file, using defaults");
        return Ok(Settings::default());
    }

    Settings::load(&default_path)
        .with_context(|| format!("Failed to load settings from {}", default_path.display()))
}

fn mail_args(args: SendArgs) -> anyhow::Result<MailArgs> {
    let body = match (args.body, args.body_file) {
        (Some(body), _) => body,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read body from {}", path.display()))?,
        (None, None) => String::new(),
    };

    Ok(MailArgs::new()
        .to(args.to)
        .subject(args.subject)
        .message(body)
        .headers(args.headers)
        .attachments(args.attachments))
}

fn print_rendered(rendered: Rendered) -> anyhow::Result<()> {
    match rendered {
        Rendered::Standard(message) => {
            println!("{}", serde_json::to_string_pretty(&message)?);
        }
        Rendered::Raw(messages) => {
            for message in messages {
                println!("MAIL FROM: {}", message.mail_from);
                println!("RCPT TO: {}", message.rcpt_to.join(", "));
                println!();
                println!("{}", message.data_text());
            }
        }
    }
    Ok(())
}

fn report(result: &SendResult) {
    for (recipient, queued) in &result.messages {
        println!("{recipient}: queued as {} ({})", queued.id, queued.token);
    }
    info!(message_id = %result.message_id, recipients = result.size(), "Message accepted");
}
