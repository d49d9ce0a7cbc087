//! Condense command-line entrypoint.
//!
//! Reads one JSON request from stdin and writes the JSON response to stdout. Logs go to stderr
//! (filter with `RUST_LOG`).
//!
//! ```text
//! condense embed      < embed_request.json
//! condense condense   < condense_request.json   (alias: rerank)
//! condense info
//! condense --health-check
//! ```

use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, bail};
use mimalloc::MiMalloc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use condense::config::Config;
use condense::pipeline::{CondenseRequest, EmbedRequest, ErrorResponse, Pipeline, PipelineError};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "usage: condense <embed|condense|rerank|info> [--health-check]";

fn main() -> anyhow::Result<ExitCode> {
    if std::env::args().any(|arg| arg == "--health-check") {
        return Ok(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let command = std::env::args().nth(1).unwrap_or_default();
    if !matches!(command.as_str(), "embed" | "condense" | "rerank" | "info") {
        eprintln!("{USAGE}");
        return Ok(ExitCode::from(2));
    }

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        embedder = ?config.embedder_path,
        reranker = ?config.reranker_path,
        device = %config.device,
        command = %command,
        "Condense starting"
    );

    let pipeline = Pipeline::from_config(&config)?;

    let outcome = match command.as_str() {
        "embed" => {
            let request: EmbedRequest = read_request()?;
            pipeline.embed(&request).map(|r| to_json(&r))
        }
        "condense" | "rerank" => {
            let request: CondenseRequest = read_request()?;
            pipeline.condense(&request).map(|r| to_json(&r))
        }
        "info" => Ok(to_json(&pipeline.describe())),
        other => bail!("unknown command '{other}'"),
    };

    match outcome {
        Ok(body) => {
            println!("{}", body?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure(&err),
    }
}

fn read_request<T: DeserializeOwned>() -> anyhow::Result<T> {
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read request from stdin")?;
    serde_json::from_str(&raw).context("request is not valid JSON for this command")
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize response")
}

fn report_failure(err: &PipelineError) -> anyhow::Result<ExitCode> {
    if err.is_client_error() {
        tracing::warn!(error = %err, "Request rejected");
    } else {
        tracing::error!(error = %err, "Request failed");
    }
    println!("{}", to_json(&ErrorResponse::from(err))?);
    Ok(ExitCode::from(if err.is_client_error() { 2 } else { 1 }))
}

/// Succeeds when the environment parses and every configured path exists.
fn run_health_check() -> ExitCode {
    let checked = Config::from_env()
        .and_then(|config| config.validate().and_then(|()| config.check_catalog()));
    match checked {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("health check failed: {e}");
            ExitCode::FAILURE
        }
    }
}
