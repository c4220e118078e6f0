//! Vidmeta - normalized, cached video metadata
//!
//! Command line front end over `MetadataService`. Every command prints a
//! JSON document on stdout; logs go to stderr.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use vidmeta::app;
use vidmeta::cache::CacheStore;
use vidmeta::utils::{logging, AppSettings};
use vidmeta::views::RequestedView;

#[derive(Parser)]
#[command(name = "vidmeta", version, about = "Normalized, cached video metadata")]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full normalized metadata
    Info(UrlArgs),
    /// Direct download links per format
    Links(UrlArgs),
    /// Subtitle tracks
    Subtitles(UrlArgs),
    /// Thumbnail list
    Thumbnails(UrlArgs),
    /// Answer a raw JSON request body for the given view
    Request {
        /// info, links, subtitles or thumbnails
        view: RequestedView,
        /// e.g. '{"urls": ["https://..."], "format": "720p"}'
        body: String,
    },
    /// List supported format tokens
    Formats,
    /// Check that yt-dlp and the result store are usable
    Health,
    /// Result store maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args)]
struct UrlArgs {
    /// Single video or playlist URL
    #[arg(long, conflicts_with = "urls")]
    url: Option<String>,

    /// Several URLs, answered in order
    #[arg(long, num_args = 1..)]
    urls: Vec<String>,

    /// Format token, e.g. best, 720p, mp3
    #[arg(long)]
    format: Option<String>,
}

impl UrlArgs {
    /// Same shape an HTTP caller would send, so it goes through validation
    fn to_request(&self) -> Value {
        let mut body = serde_json::Map::new();
        match &self.url {
            Some(url) => {
                body.insert("url".into(), json!(url));
            }
            None if !self.urls.is_empty() => {
                body.insert("urls".into(), json!(self.urls));
            }
            None => {}
        }
        if let Some(format) = &self.format {
            body.insert("format".into(), json!(format));
        }
        Value::Object(body)
    }
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete entries older than the given age
    Purge {
        #[arg(long)]
        older_than_secs: u64,
    },
    /// Number of stored entries
    Stats,
    /// Every recorded computation for a URL, oldest first
    History {
        #[arg(long)]
        url: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = AppSettings::load(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        settings.log_level = level.clone();
    }

    // Initialize logging
    logging::init(&settings.log_level);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli.command, settings))
}

async fn run(command: Command, settings: AppSettings) -> Result<ExitCode> {
    match command {
        Command::Info(args) => answer(&settings, RequestedView::Info, args.to_request()).await,
        Command::Links(args) => {
            answer(&settings, RequestedView::DownloadLinks, args.to_request()).await
        }
        Command::Subtitles(args) => {
            answer(&settings, RequestedView::Subtitles, args.to_request()).await
        }
        Command::Thumbnails(args) => {
            answer(&settings, RequestedView::Thumbnails, args.to_request()).await
        }
        Command::Request { view, body } => {
            let request: Value = match serde_json::from_str(&body) {
                Ok(request) => request,
                Err(e) => {
                    print_json(&json!({
                        "success": false,
                        "error": format!("Request body is not valid JSON: {}", e),
                    }))?;
                    return Ok(exit_code(400));
                }
            };
            answer(&settings, view, request).await
        }
        Command::Formats => {
            print_json(&vidmeta::formats::supported_formats())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => {
            let service = app::build_service(&settings).await?;
            let report = service.health().await;
            print_json(&report)?;
            Ok(exit_code(if report.success { 200 } else { 500 }))
        }
        Command::Cache { action } => cache_command(&settings, action).await,
    }
}

async fn answer(settings: &AppSettings, view: RequestedView, request: Value) -> Result<ExitCode> {
    let service = app::build_service(settings).await?;
    let response = service.handle(view, &request).await;
    print_json(&response)?;
    Ok(exit_code(response.status))
}

async fn cache_command(settings: &AppSettings, action: CacheAction) -> Result<ExitCode> {
    let store = app::open_store(settings).await?;

    let report = match action {
        CacheAction::Purge { older_than_secs } => {
            let age = chrono::Duration::try_seconds(older_than_secs as i64)
                .context("--older-than-secs is out of range")?;
            let removed = store.purge_older_than(Utc::now() - age).await?;
            json!({"success": true, "removed": removed})
        }
        CacheAction::Stats => {
            let entries = store.count().await?;
            json!({
                "success": true,
                "entries": entries,
                "database_url": settings.database_url,
                "ttl_secs": settings.cache_ttl_secs,
            })
        }
        CacheAction::History { url } => {
            let entries = store.history(&url).await?;
            json!({"success": true, "url": url, "entries": entries})
        }
    };

    print_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(status: u16) -> ExitCode {
    match status {
        200 => ExitCode::SUCCESS,
        400..=499 => ExitCode::from(1),
        _ => ExitCode::from(2),
    }
}
