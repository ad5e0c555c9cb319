use crate::client::HttpTransport;
use crate::form::FormState;
use crate::model::{ClientConfig, StatisticType};
use crate::report::Report;
use crate::submission::SubmissionController;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint URL {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("read entities from {path}: {source}")]
    EntitiesFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "entity-counter",
    version,
    about = "Count how often biological entities are mentioned in the C. elegans literature"
)]
pub struct Cli {
    /// URL of the statistics endpoint that receives the request
    #[arg(long, env = "ENTITY_COUNTER_API_ENDPOINT")]
    pub endpoint: String,

    /// Request timeout
    #[arg(long, default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Address the results are sent to
    #[arg(long)]
    pub email: Option<String>,

    /// Read entities from a file, one per line ("-" for stdin)
    #[arg(long)]
    pub entities_file: Option<PathBuf>,

    /// Add an entity (repeatable); appended after the file contents
    #[arg(long = "entity")]
    pub entities: Vec<String>,

    /// Statistic to compute
    #[arg(long, value_enum, default_value_t = StatisticType::TotalCount)]
    pub stat_type: StatisticType,

    /// Submit once, print a text summary and exit (no TUI)
    #[arg(long, conflicts_with = "json")]
    pub text: bool,

    /// Submit once, print a JSON report and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Log filter directive (e.g. "debug", "entity_counter=trace"); defaults to RUST_LOG
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        !self.text && !self.json && cfg!(feature = "tui")
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args, cfg).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_once(&args, cfg, false).await;
        }
    }

    run_once(&args, cfg, args.json).await
}

/// Parse and check the endpoint; only absolute http(s) URLs are accepted.
pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> Result<ClientConfig> {
    Ok(ClientConfig {
        endpoint: parse_endpoint(&args.endpoint)?,
        timeout: Duration::from(args.timeout),
        user_agent: format!("entity-counter/{}", env!("CARGO_PKG_VERSION")),
    })
}

fn read_entities_file(path: &Path) -> Result<String, ConfigError> {
    let wrap = |source| ConfigError::EntitiesFile {
        path: path.display().to_string(),
        source,
    };
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(wrap)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).map_err(wrap)
    }
}

/// Join file text and `--entity` values into the raw text-area contents.
/// Returns `None` when neither source was given, leaving the list untouched.
pub fn entities_text(file_text: Option<&str>, extra: &[String]) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(text) = file_text {
        let text = text.replace("\r\n", "\n");
        // A file's final newline terminates the last line rather than adding a blank one.
        let text = text.strip_suffix('\n').unwrap_or(&text);
        parts.push(text.to_string());
    }
    parts.extend(extra.iter().cloned());
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Prefill a form from CLI arguments.
pub fn initial_form(args: &Cli) -> Result<FormState> {
    let mut form = FormState::new();
    let file_text = match args.entities_file.as_deref() {
        Some(p) => Some(read_entities_file(p)?),
        None => None,
    };
    if let Some(raw) = entities_text(file_text.as_deref(), &args.entities) {
        form.set_entities(&raw);
    }
    if let Some(email) = args.email.as_deref() {
        form.set_email(email);
    }
    form.set_statistic_type(args.stat_type);
    Ok(form)
}

/// Submit once and print the report. Fails (non-zero exit) unless the service replied 200.
async fn run_once(args: &Cli, cfg: ClientConfig, json: bool) -> Result<()> {
    let mut form = initial_form(args)?;
    let transport = HttpTransport::new(&cfg)?;
    let mut ctrl = SubmissionController::new();
    let (out_tx, out_handle) = spawn_output_writer();

    tracing::info!(endpoint = %transport.endpoint(), "submitting statistics request");
    let result = ctrl.submit(&mut form, &transport).await;
    let report = Report::new(&form, result.as_ref());

    if json {
        let out = serde_json::to_string_pretty(&report).context("serialize report")?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    } else {
        for line in report.text_lines() {
            let target = if report.request.is_some() {
                OutputLine::Stdout(line)
            } else {
                OutputLine::Stderr(line)
            };
            let _ = out_tx.send(target);
        }
    }
    drop(out_tx);
    let _ = out_handle.await;

    match result {
        Some(r) if r.is_success() => Ok(()),
        Some(r) => Err(anyhow::anyhow!("submission failed: {}", r.message())),
        None => Err(anyhow::anyhow!("submission blocked by invalid input")),
    }
}
