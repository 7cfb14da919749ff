use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_subscriber::prelude::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_log::LogTracer;
use tracing::subscriber as tracing_subscriber_global;
use anyhow::{Result, Context};
use album_release_mailer as lib;
use lib::api::SpotifyClient;
use lib::config::Config;

#[derive(Parser)]
#[command(name = "album-release-mailer", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up an artist and print their albums
    Albums {
        /// Artist name to search for
        artist: String,
    },
    /// Look up an artist's albums and mail them as a plain-text digest
    Notify {
        /// Artist name to search for
        artist: String,

        /// Sender mailbox, e.g. "Release Bot <bot@example.com>"
        #[arg(long)]
        from: String,

        /// Recipient mailbox; repeat for multiple recipients
        #[arg(long = "to", required = true)]
        to: Vec<String>,
    },
    /// Validate config file and exit
    ConfigValidate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Resolve config path: explicit --config overrides; otherwise prefer
    // system-wide /etc/album-release-mailer/config.toml and fall back to
    // the repository example config for local/dev usage.
    let resolved_config_path: PathBuf = match &cli.config {
        Some(p) => p.clone(),
        None => {
            let etc_path = Path::new("/etc/album-release-mailer/config.toml");
            if etc_path.exists() {
                etc_path.to_path_buf()
            } else {
                PathBuf::from("config/example-config.toml")
            }
        }
    };

    let cfg = Config::from_path(&resolved_config_path)
        .with_context(|| format!("loading config from {}", resolved_config_path.display()))?;

    // Initialize log->tracing bridge and structured logging.
    // Logs go to both stdout and a daily-rotated file in cfg.log_dir.
    let _ = LogTracer::init();
    let file_appender: RollingFileAppender =
        tracing_appender::rolling::daily(&cfg.log_dir, "album-release-mailer.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer().with_writer(non_blocking);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer);

    tracing_subscriber_global::set_global_default(subscriber)
        .expect("failed to set global tracing subscriber");

    match cli.command {
        Commands::Albums { artist } => {
            let albums = fetch_albums(&cfg, &artist)
                .await
                .with_context(|| format!("fetching albums for {}", artist))?;
            for album in &albums {
                println!("{}", album["name"].as_str().unwrap_or("<unnamed>"));
            }
        }
        Commands::Notify { artist, from, to } => {
            let albums = fetch_albums(&cfg, &artist)
                .await
                .with_context(|| format!("fetching albums for {}", artist))?;
            let subject = format!("New albums from {}", artist);
            let body = albums
                .iter()
                .map(|a| a["name"].as_str().unwrap_or("<unnamed>").to_string())
                .collect::<Vec<_>>()
                .join("\n");

            // lettre's SmtpTransport is blocking; keep it off the runtime.
            let mail_cfg = cfg.mail.clone();
            let in_production = cfg.in_production;
            tokio::task::spawn_blocking(move || {
                let recipients: Vec<&str> = to.iter().map(String::as_str).collect();
                lib::mail::send_mail(&from, &recipients, &subject, &body, in_production, &mail_cfg)
            })
            .await?
            .with_context(|| "sending digest mail".to_string())?;
            println!("Digest sent.");
        }
        Commands::ConfigValidate => {
            match Config::from_path(resolved_config_path.as_path()) {
                Ok(_) => println!("OK"),
                Err(e) => {
                    eprintln!("Config validation failed: {}", e);
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}

/// Token -> artist -> albums: three sequential, dependent calls.
async fn fetch_albums(cfg: &Config, artist: &str) -> Result<Vec<serde_json::Value>> {
    let client = SpotifyClient::new();
    let token = client
        .get_access_token(&cfg.spotify_client_id, &cfg.spotify_client_secret)
        .await?;
    let artist_id = client.get_artist(artist, &token).await?;
    let albums = client.get_albums(&artist_id, &token).await?;
    Ok(albums)
}
