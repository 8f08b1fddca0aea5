//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `transfer_client` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output (body on stdout or to a file, metadata on stderr)
//!
//! All core functionality is implemented in the library crate.

use std::io::Write;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use transfer_client::config::Opt;
use transfer_client::initialization::init_logger_with;
use transfer_client::{HttpMethod, ReqwestTransport, RequestExecutor, Response, TransportOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let params = opt.request_params().context("Invalid --param")?;
    let headers = opt.request_headers().context("Invalid --header")?;
    let headers: Vec<(&str, &str)> = headers
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();

    let options = TransportOptions::default().merged(&opt.overrides());
    let mut executor =
        RequestExecutor::new(None, ReqwestTransport::new(), options).with_limits(opt.limits());

    let prepared = match opt.method {
        HttpMethod::Get => executor.prepare_get(&opt.url, params, &headers),
        HttpMethod::Post => executor.prepare_post(&opt.url, params, &headers),
    };
    prepared.context("Failed to prepare request")?;

    let response = executor.execute(&opt.info).await;

    if opt.include {
        print_headers(&response).context("Failed to write headers")?;
    }
    match &opt.output {
        Some(path) => {
            executor
                .response_to_file(path)
                .with_context(|| format!("Failed to save body to {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(response.body())
                .and_then(|()| stdout.flush())
                .context("Failed to write body")?;
        }
    }

    let metadata = serde_json::to_string_pretty(executor.metadata())
        .context("Failed to serialize metadata")?;
    eprintln!("{metadata}");

    if response.has_error() {
        eprintln!("transfer_client error: {}", response.error());
        process::exit(1);
    }
    if response.redirect_cap_exceeded() {
        eprintln!(
            "transfer_client: stopped after {} redirects at {}",
            opt.max_redirects,
            response.url()
        );
    }
    Ok(())
}

fn print_headers(response: &Response) -> std::io::Result<()> {
    let mut names: Vec<&String> = response.headers().keys().collect();
    names.sort();

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "HTTP {}", response.http_code())?;
    for name in names {
        if let Some(value) = response.headers().get(name) {
            for single in value.values() {
                writeln!(stdout, "{name}: {single}")?;
            }
        }
    }
    writeln!(stdout)
}
