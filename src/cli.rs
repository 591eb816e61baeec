use crate::error::AppError;
use clap::Parser;
use log::warn;
use std::path::PathBuf;

// Command-line interface for the uploader.
#[derive(Parser, Clone, Debug)]
#[command(
    version,
    about = "Upload a minidump crash report with metadata to an HTTP collector.",
    long_about = "Uploads a minidump file together with key/value metadata to a crash collector as a single multipart/form-data POST request.\n Parameter names must be printable ASCII and may not contain a double quote.\n Only plain http:// collector URLs are supported.\n Settings may also come from an INI file (crashdrop.ini, ~/.config/crashdrop/config.ini or --config-file); command-line values take precedence."
)]
pub struct Cli {
    /// Collector URL, e.g. http://crash.example.com/submit (may come from the config file)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Minidump file to upload
    #[arg(short, long, required = true)]
    pub dump: PathBuf,

    /// Report parameter as NAME=VALUE; repeat for more parameters
    #[arg(short = 'p', long = "param", value_parser = parse_parameter)]
    pub params: Vec<(String, String)>,

    /// Username for HTTP Basic authentication against the collector
    #[arg(long)]
    pub username: Option<String>,

    /// Password for HTTP Basic authentication against the collector
    #[arg(long)]
    pub password: Option<String>,

    /// Enable verbose logging (log level: debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable more detailed logging (log level: info)
    #[arg(long)]
    pub detailed_logging: bool,

    /// Build and check the request without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, write the encoded request body to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file path (INI format)
    #[arg(long, value_parser = validate_config_file)]
    pub config_file: Option<String>,
}

/// Split a NAME=VALUE argument. The value may itself contain `=`.
fn parse_parameter(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Parameter must be NAME=VALUE, got '{s}'"))?;

    if name.is_empty() {
        return Err(format!("Parameter name is empty in '{s}'"));
    }

    Ok((name.to_string(), value.to_string()))
}

/// Validate config file path exists and is readable
fn validate_config_file(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Config file path cannot be empty".to_string());
    }

    let path = PathBuf::from(s);

    if !path.exists() {
        return Err(format!("Config file does not exist: {s}"));
    }

    if !path.is_file() {
        return Err(format!("Config path is not a file: {s}"));
    }

    match std::fs::File::open(&path) {
        Ok(_) => Ok(s.to_string()),
        Err(e) => Err(format!("Cannot read config file {s}: {e}")),
    }
}

impl Cli {
    /// Validate argument consistency before anything is read or sent
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.dump.exists() {
            return Err(AppError::DumpUnreadable(format!(
                "{} does not exist",
                self.dump.display()
            )));
        }

        if !self.dump.is_file() {
            return Err(AppError::DumpUnreadable(format!(
                "{} is not a file",
                self.dump.display()
            )));
        }

        if self.output.is_some() && !self.dry_run {
            warn!("--output is only used together with --dry-run and will be ignored");
        }

        Ok(())
    }
}
