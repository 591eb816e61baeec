//! RFC 7578 multipart/form-data construction for crash report uploads
//!
//! A report body carries one text part per parameter followed by a single
//! binary part holding the minidump:
//!
//! ```text
//! --<boundary>\r\n
//! Content-Disposition: form-data; name="prod"\r\n
//! \r\n
//! MyApp\r\n
//! --<boundary>\r\n
//! Content-Disposition: form-data; name="upload_file_minidump"; filename="crash.dmp"\r\n
//! Content-Type: application/octet-stream\r\n
//! \r\n
//! <raw dump bytes>\r\n
//! --<boundary>--\r\n
//! ```
//!
//! # Example
//! ```rust
//! use crashdrop::multipart::{request_body, request_header};
//! use crashdrop::report::ReportParameters;
//!
//! fn build() -> Result<(), crashdrop::error::AppError> {
//!     let mut params = ReportParameters::new();
//!     params.insert("prod", "MyApp");
//!     let body = request_body(&params, b"MDMP", "crash.dmp", "ABC123")?;
//!     assert!(body.ends_with(b"--ABC123--\r\n"));
//!     assert_eq!(
//!         request_header("ABC123"),
//!         "Content-Type: multipart/form-data; boundary=ABC123\r\n"
//!     );
//!     Ok(())
//! }
//! # build().unwrap();
//! ```

pub mod parser;

use crate::error::AppError;
use crate::report::ReportParameters;
use crate::transcode::to_wire_text;
use crate::validate::is_valid_parameter_name;
use log::debug;

/// Form field name collectors expect for the minidump part
pub const MINIDUMP_FIELD_NAME: &str = "upload_file_minidump";

/// Media type of the minidump part
pub const MINIDUMP_CONTENT_TYPE: &str = "application/octet-stream";

const CRLF: &[u8] = b"\r\n";

/// Value of the Content-Type header for a body built with `boundary`.
///
/// Boundaries that are not a bare RFC 2045 token (spaces, `:`, `/`, `=` and
/// the like) are quoted.
pub fn content_type(boundary: &str) -> String {
    let is_token = boundary
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "'+-._".contains(c));
    if is_token {
        format!("multipart/form-data; boundary={boundary}")
    } else {
        format!("multipart/form-data; boundary=\"{boundary}\"")
    }
}

/// Complete, CRLF-terminated Content-Type header line.
pub fn request_header(boundary: &str) -> String {
    format!("Content-Type: {}\r\n", content_type(boundary))
}

/// Assemble the full request body.
///
/// Fails without producing anything when the dump is empty, when a
/// parameter name or the display name cannot be embedded in a header, or
/// when the boundary is not a legal RFC 2046 boundary: 1 to 70 characters
/// from `A-Z a-z 0-9 ' ( ) + _ , - . / : = ?` or space, not ending in a
/// space.
pub fn request_body(
    parameters: &ReportParameters,
    dump: &[u8],
    display_name: &str,
    boundary: &str,
) -> Result<Vec<u8>, AppError> {
    parser::validate_boundary(boundary)?;

    if dump.is_empty() {
        return Err(AppError::EmptyDump(display_name.to_string()));
    }

    if display_name.chars().any(|c| c == '"' || c.is_control()) {
        return Err(AppError::invalid_parameter_name(display_name));
    }

    if let Some((name, _)) = parameters
        .iter()
        .find(|(name, _)| !is_valid_parameter_name(name))
    {
        return Err(AppError::invalid_parameter_name(name));
    }

    let delimiter = format!("--{boundary}\r\n");
    let text_size: usize = parameters
        .iter()
        .map(|(name, value)| delimiter.len() + name.len() + value.len() + 48)
        .sum();
    let mut body = Vec::with_capacity(text_size + dump.len() + 256);

    for (name, value) in parameters.iter() {
        body.extend_from_slice(delimiter.as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(to_wire_text(value));
        body.extend_from_slice(CRLF);
    }

    body.extend_from_slice(delimiter.as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{MINIDUMP_FIELD_NAME}\"; filename=\"{display_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {MINIDUMP_CONTENT_TYPE}\r\n\r\n").as_bytes());
    body.extend_from_slice(dump);
    body.extend_from_slice(CRLF);

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    debug!(
        "Built multipart body: {} parameters, {} dump bytes, {} bytes total",
        parameters.len(),
        dump.len(),
        body.len()
    );

    Ok(body)
}
