//! # crashdrop
//!
//! Uploads minidump crash reports, together with key/value metadata, to an
//! HTTP collector as a single multipart/form-data POST request.
//!
//! The library exposes the building blocks (boundary generation, parameter
//! validation, text transcoding, multipart encoding) and the `run` function
//! used by the command-line binary.

pub mod boundary;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod multipart;
pub mod report;
pub mod sender;
pub mod transcode;
pub mod validate;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::AppError;
use crate::http::TcpTransport;
use crate::multipart::request_header;
use crate::sender::{describe_report, prepare_report, send_report_with};
use clap::Parser;
use log::{error, info};

/// Initializes the logger, parses command-line arguments, and sends the report.
///
/// Exits the process with status 1 if the configuration is invalid or the
/// report could not be delivered.
pub fn run() {
    let cli = Cli::parse();

    // Load configuration with precedence: CLI > INI > Defaults
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let log_level = config.log_level();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    log::debug!("Log level set to: {log_level}");

    if config.verbose {
        config.print_summary();
    }

    if let Err(e) = cli.validate() {
        error!("Configuration validation error: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run_with_config(&config) {
        error!("{e}");
        std::process::exit(1);
    }
}

/// Perform a dry run or an upload according to `config`.
pub fn run_with_config(config: &Config) -> Result<(), AppError> {
    if config.dry_run {
        return dry_run(config);
    }

    let url = config
        .url
        .as_deref()
        .ok_or_else(|| AppError::InvalidConfiguration("no collector URL".to_string()))?;

    let mut transport = match (&config.username, &config.password) {
        (Some(username), password) => {
            TcpTransport::with_basic_auth(username.as_str(), password.as_deref().unwrap_or(""))
        }
        (None, _) => TcpTransport::new(),
    };

    send_report_with(
        &mut transport,
        &mut rand::thread_rng(),
        url,
        &config.parameters,
        &config.dump,
    )?;
    println!("Crash report sent to {url}");
    Ok(())
}

fn dry_run(config: &Config) -> Result<(), AppError> {
    let prepared = prepare_report(&config.parameters, &config.dump, &mut rand::thread_rng())?;
    let lines = describe_report(&prepared)?;

    print!("{}", request_header(&prepared.boundary));
    println!("Content-Length: {}", prepared.body.len());
    for line in lines {
        println!("  {line}");
    }

    if let Some(ref output) = config.output {
        std::fs::write(output, &prepared.body)?;
        info!(
            "Wrote {} byte request body to {}",
            prepared.body.len(),
            output.display()
        );
    }

    Ok(())
}
