//! Binary-safe reader for multipart/form-data bodies
//!
//! Used to inspect a report body before it is sent (`--dry-run`) and to
//! verify that what the encoder writes reads back unchanged. Part content
//! is never interpreted as text, so dumps containing CR, LF, NUL or runs of
//! dashes survive intact. Only the CRLF line endings this crate produces are
//! accepted.

use crate::error::AppError;
use std::collections::HashMap;

/// Default limits for multipart parsing
const DEFAULT_MAX_PARTS: usize = 1000;
const DEFAULT_MAX_HEADERS_SIZE: usize = 8 * 1024; // 8KB for part headers
const MIN_BOUNDARY_LENGTH: usize = 1;
const MAX_BOUNDARY_LENGTH: usize = 70; // RFC 2046 limit

/// Limits applied while reading a body
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Maximum number of parts allowed
    pub max_parts: usize,
    /// Maximum size for one part's header block
    pub max_headers_size: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_parts: DEFAULT_MAX_PARTS,
            max_headers_size: DEFAULT_MAX_HEADERS_SIZE,
        }
    }
}

/// Represents the Content-Disposition header of a multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    /// The disposition type (usually "form-data")
    pub disposition_type: String,
    /// The name of the form field
    pub name: String,
    /// Optional filename for file parts
    pub filename: Option<String>,
}

/// One decoded part
#[derive(Debug, Clone)]
pub struct Part {
    pub disposition: ContentDisposition,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn name(&self) -> &str {
        &self.disposition.name
    }

    pub fn is_file(&self) -> bool {
        self.disposition.filename.is_some()
    }

    /// Part content as UTF-8 text
    pub fn text(&self) -> Result<&str, AppError> {
        std::str::from_utf8(&self.data)
            .map_err(|_| AppError::invalid_multipart("Part contains invalid UTF-8"))
    }
}

/// Validate the boundary string (RFC 2046 character set and length).
///
/// Spaces are allowed anywhere but at the end.
pub fn validate_boundary(boundary: &str) -> Result<(), AppError> {
    if boundary.len() < MIN_BOUNDARY_LENGTH {
        return Err(AppError::invalid_multipart("Boundary too short"));
    }

    if boundary.len() > MAX_BOUNDARY_LENGTH {
        return Err(AppError::invalid_multipart("Boundary too long"));
    }

    if boundary.contains('\r') || boundary.contains('\n') {
        return Err(AppError::invalid_multipart("Boundary contains line breaks"));
    }

    if !boundary
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "'()+_,-./:=? ".contains(c))
    {
        return Err(AppError::invalid_multipart(
            "Boundary contains invalid characters",
        ));
    }

    if boundary.ends_with(' ') {
        return Err(AppError::invalid_multipart("Boundary ends with a space"));
    }

    Ok(())
}

/// Extract the boundary parameter from a Content-Type header value
pub fn extract_boundary_from_content_type(content_type: &str) -> Result<String, AppError> {
    let mut params = content_type.split(';');
    let media_type = params.next().unwrap_or("").trim();
    if !media_type.eq_ignore_ascii_case("multipart/form-data") {
        return Err(AppError::invalid_multipart("Not multipart/form-data"));
    }

    for param in params {
        if let Some((key, value)) = param.split_once('=') {
            if key.trim().eq_ignore_ascii_case("boundary") {
                let boundary = value.trim().trim_matches('"');
                validate_boundary(boundary)?;
                return Ok(boundary.to_string());
            }
        }
    }

    Err(AppError::invalid_multipart(
        "No boundary found in Content-Type",
    ))
}

/// Parse the value of a Content-Disposition header
pub fn parse_content_disposition(value: &str) -> Result<ContentDisposition, AppError> {
    let mut segments = value.split(';').map(str::trim);
    let disposition_type = segments.next().unwrap_or("").to_lowercase();
    if disposition_type.is_empty() {
        return Err(AppError::invalid_multipart(
            "Empty Content-Disposition header",
        ));
    }

    let mut name = None;
    let mut filename = None;

    for segment in segments {
        if let Some((key, val)) = segment.split_once('=') {
            let mut val = val.trim();
            if val.len() > 1 && val.starts_with('"') && val.ends_with('"') {
                val = &val[1..val.len() - 1];
            }

            match key.trim().to_lowercase().as_str() {
                "name" => name = Some(val.to_string()),
                "filename" => filename = Some(val.to_string()),
                _ => {}
            }
        }
    }

    let name = name.ok_or_else(|| {
        AppError::invalid_multipart("Missing 'name' in Content-Disposition")
    })?;

    Ok(ContentDisposition {
        disposition_type,
        name,
        filename,
    })
}

/// Parse a complete in-memory body into its parts.
pub fn parse_body(body: &[u8], boundary: &str) -> Result<Vec<Part>, AppError> {
    parse_body_with_config(body, boundary, &MultipartConfig::default())
}

pub fn parse_body_with_config(
    body: &[u8],
    boundary: &str,
    config: &MultipartConfig,
) -> Result<Vec<Part>, AppError> {
    validate_boundary(boundary)?;

    let dash_boundary = format!("--{boundary}").into_bytes();
    // A delimiter inside the body is always preceded by the CRLF ending the previous part
    let mut delimiter = b"\r\n".to_vec();
    delimiter.extend_from_slice(&dash_boundary);

    if !body.starts_with(&dash_boundary) {
        return Err(AppError::invalid_multipart(
            "Body does not start with a boundary",
        ));
    }

    let mut parts = Vec::new();
    let mut pos = dash_boundary.len();

    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            // Closing delimiter; anything after it is epilogue
            return Ok(parts);
        }
        if !rest.starts_with(b"\r\n") {
            return Err(AppError::invalid_multipart(
                "Boundary line not terminated by CRLF",
            ));
        }
        pos += 2;

        if parts.len() >= config.max_parts {
            return Err(AppError::invalid_multipart(format!(
                "Too many parts: maximum {} allowed",
                config.max_parts
            )));
        }

        let headers_len = find_bytes_pattern(&body[pos..], b"\r\n\r\n")
            .ok_or_else(|| AppError::invalid_multipart("Headers not properly terminated"))?;
        if headers_len > config.max_headers_size {
            return Err(AppError::invalid_multipart("Part headers too large"));
        }
        let headers_str = std::str::from_utf8(&body[pos..pos + headers_len])
            .map_err(|_| AppError::invalid_multipart("Part headers are not UTF-8"))?;
        let (disposition, content_type) = parse_part_headers(headers_str)?;

        let content_start = pos + headers_len + 4;
        let content_len = find_bytes_pattern(&body[content_start..], &delimiter)
            .ok_or_else(|| AppError::invalid_multipart("Missing closing boundary"))?;

        parts.push(Part {
            disposition,
            content_type,
            data: body[content_start..content_start + content_len].to_vec(),
        });

        pos = content_start + content_len + delimiter.len();
    }
}

/// Disposition and content type of a part; other headers are ignored
fn parse_part_headers(
    headers_str: &str,
) -> Result<(ContentDisposition, Option<String>), AppError> {
    let mut headers = HashMap::new();
    for line in headers_str.split("\r\n") {
        let (name, value) = line.split_once(':').ok_or_else(|| {
            AppError::invalid_multipart(format!("Invalid header format: {line}"))
        })?;
        headers.insert(name.trim().to_lowercase(), value.trim().to_string());
    }

    let disposition = headers
        .get("content-disposition")
        .ok_or_else(|| AppError::invalid_multipart("Part without Content-Disposition"))
        .and_then(|value| parse_content_disposition(value))?;
    let content_type = headers.remove("content-type");

    Ok((disposition, content_type))
}

/// Binary pattern search - find needle in haystack
fn find_bytes_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    haystack.windows(needle.len()).position(|window| window == needle)
}
