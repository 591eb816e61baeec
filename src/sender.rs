//! Top-level crash report send operation.
//!
//! Validation, dump reading, boundary generation and body assembly all
//! happen before the transport is touched; any failure there means nothing
//! is sent.

use crate::boundary::generate_boundary_with;
use crate::error::AppError;
use crate::http::{HttpResponse, TcpTransport, Transport, Url};
use crate::multipart::parser::parse_body;
use crate::multipart::{content_type, request_body};
use crate::report::ReportParameters;
use crate::transcode::os_to_utf8;
use crate::validate::validate_parameters;
use log::{debug, error, info};
use rand::RngCore;
use std::fs;
use std::path::Path;

/// A fully built request body together with the boundary it was built with.
#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub boundary: String,
    pub display_name: String,
    pub body: Vec<u8>,
}

impl PreparedReport {
    /// Value of the Content-Type header matching the body
    pub fn content_type(&self) -> String {
        content_type(&self.boundary)
    }
}

/// Read the whole minidump into memory. An empty file counts as unreadable.
pub fn read_dump(path: &Path) -> Result<Vec<u8>, AppError> {
    let contents = fs::read(path)
        .map_err(|e| AppError::DumpUnreadable(format!("{}: {e}", path.display())))?;
    if contents.is_empty() {
        return Err(AppError::EmptyDump(path.display().to_string()));
    }
    debug!("Read {} bytes from {}", contents.len(), path.display());
    Ok(contents)
}

/// File name shown to the collector for the dump part.
pub fn dump_display_name(path: &Path) -> Result<String, AppError> {
    let name = path
        .file_name()
        .ok_or_else(|| AppError::DumpUnreadable(format!("{} has no file name", path.display())))?;
    os_to_utf8(name)
}

/// Validate, read and encode a report without sending it.
pub fn prepare_report<R: RngCore + ?Sized>(
    parameters: &ReportParameters,
    dump_path: &Path,
    rng: &mut R,
) -> Result<PreparedReport, AppError> {
    validate_parameters(parameters)?;

    let display_name = dump_display_name(dump_path)?;
    let dump = read_dump(dump_path)?;
    let boundary = generate_boundary_with(rng);
    let body = request_body(parameters, &dump, &display_name, &boundary)?;

    Ok(PreparedReport {
        boundary,
        display_name,
        body,
    })
}

/// Read a prepared body back and describe each part, one line per part.
///
/// Fails if the body does not parse with its own boundary, which would mean
/// the collector could not read it either.
pub fn describe_report(prepared: &PreparedReport) -> Result<Vec<String>, AppError> {
    let parts = parse_body(&prepared.body, &prepared.boundary)?;
    let lines = parts
        .iter()
        .map(|part| match &part.disposition.filename {
            Some(filename) => format!(
                "{} (file '{filename}', {}, {} bytes)",
                part.name(),
                part.content_type.as_deref().unwrap_or("no content type"),
                part.data.len()
            ),
            None => format!("{} = {}", part.name(), String::from_utf8_lossy(&part.data)),
        })
        .collect();
    Ok(lines)
}

/// Build the report and deliver it through `transport`.
///
/// Succeeds only when the collector answers 200.
pub fn send_report_with<T, R>(
    transport: &mut T,
    rng: &mut R,
    url: &str,
    parameters: &ReportParameters,
    dump_path: &Path,
) -> Result<HttpResponse, AppError>
where
    T: Transport + ?Sized,
    R: RngCore + ?Sized,
{
    let prepared = prepare_report(parameters, dump_path, rng)?;
    let url = Url::parse(url)?;

    info!(
        "Uploading {} ({} bytes, {} parameters) to {url}",
        prepared.display_name,
        prepared.body.len(),
        parameters.len()
    );

    let headers = [("Content-Type".to_string(), prepared.content_type())];
    let response = transport.post(&url, &headers, &prepared.body)?;

    if !response.is_success() {
        debug!(
            "Collector response body: {}",
            String::from_utf8_lossy(&response.body)
        );
        return Err(AppError::HttpStatus(response.status_code));
    }

    info!("Crash report accepted by {url}");
    Ok(response)
}

/// Send `dump_path` with `parameters` to `url` over plain HTTP.
///
/// Parameter names must be printable ASCII without `"`. Returns true when the
/// collector accepted the report; the cause of any failure is logged.
pub fn send_crash_report(url: &str, parameters: &ReportParameters, dump_path: &Path) -> bool {
    let mut transport = TcpTransport::new();
    match send_report_with(
        &mut transport,
        &mut rand::thread_rng(),
        url,
        parameters,
        dump_path,
    ) {
        Ok(_) => true,
        Err(e) => {
            error!("Failed to send crash report: {e}");
            false
        }
    }
}
