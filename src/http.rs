//! Minimal HTTP/1.1 client used to deliver report bodies.
//!
//! Only plain `http://` URLs are supported. The connection is closed after
//! one request; no retries, redirects, or timeouts are applied.

use crate::error::AppError;
use base64::Engine;
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::io::prelude::*;
use std::net::TcpStream;

/// Maximum size for response headers (8KB)
const MAX_HEADERS_SIZE: usize = 8 * 1024;

/// Response bodies are only logged, so never keep more than this
const MAX_RESPONSE_BODY_SIZE: u64 = 64 * 1024;

const USER_AGENT: &str = concat!("crashdrop/", env!("CARGO_PKG_VERSION"));

/// A parsed `http://host[:port][/path][?query]` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub host: String,
    pub port: u16,
    /// Path plus query, always starting with `/`
    pub path: String,
}

impl Url {
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let input = input.trim();
        let (scheme, rest) = input
            .split_once("://")
            .ok_or_else(|| AppError::InvalidUrl(input.to_string()))?;

        if !scheme.eq_ignore_ascii_case("http") {
            return Err(AppError::UnsupportedScheme(scheme.to_lowercase()));
        }

        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let authority = &rest[..authority_end];
        let mut path = rest[authority_end..].to_string();
        if let Some(fragment) = path.find('#') {
            path.truncate(fragment);
        }
        if !path.starts_with('/') {
            path.insert(0, '/');
        }

        // Authority and path go verbatim into the request head
        let unsafe_byte = |b: u8| b <= b' ' || b == 0x7F;
        if authority.bytes().any(unsafe_byte) || path.bytes().any(unsafe_byte) {
            return Err(AppError::InvalidUrl(input.to_string()));
        }

        if authority.is_empty() || authority.contains('@') {
            return Err(AppError::InvalidUrl(input.to_string()));
        }

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            // IPv6 literal: [::1]:8080
            let (host, after) = bracketed
                .split_once(']')
                .ok_or_else(|| AppError::InvalidUrl(input.to_string()))?;
            let port = match after.strip_prefix(':') {
                Some(port) => Some(port),
                None if after.is_empty() => None,
                None => return Err(AppError::InvalidUrl(input.to_string())),
            };
            (format!("[{host}]"), port)
        } else {
            match authority.rsplit_once(':') {
                Some((host, port)) => (host.to_string(), Some(port)),
                None => (authority.to_string(), None),
            }
        };

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| AppError::InvalidUrl(input.to_string()))?,
            None => 80,
        };

        if host.is_empty() || host == "[]" {
            return Err(AppError::InvalidUrl(input.to_string()));
        }

        Ok(Url { host, port, path })
    }

    /// Value for the Host header (port omitted when it is the default)
    pub fn host_header(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    fn socket_host(&self) -> &str {
        self.host.trim_start_matches('[').trim_end_matches(']')
    }
}

impl std::fmt::Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "http://{}{}", self.host_header(), self.path)
    }
}

/// Status line, headers and (truncated) body returned by the collector.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Collectors acknowledge an accepted report with 200 OK
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Parse a status line and header block (without the blank line).
    pub fn parse_head(head: &str) -> Result<Self, AppError> {
        let mut lines = head.lines();
        let status_line = lines
            .next()
            .ok_or_else(|| AppError::transport("Empty response"))?;

        let mut parts = status_line.splitn(3, ' ');
        let version = parts.next().unwrap_or("");
        if !version.starts_with("HTTP/1.") {
            return Err(AppError::transport(format!(
                "Malformed status line: {status_line}"
            )));
        }
        let status_code = parts
            .next()
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or_else(|| AppError::transport(format!("Malformed status line: {status_line}")))?;
        let status_text = parts.next().unwrap_or("").trim().to_string();

        let mut headers = HashMap::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }

        Ok(HttpResponse {
            status_code,
            status_text,
            headers,
            body: Vec::new(),
        })
    }
}

/// Something that can deliver one POST request and report the outcome.
pub trait Transport {
    fn post(
        &mut self,
        url: &Url,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<HttpResponse, AppError>;
}

/// Plain TCP transport speaking HTTP/1.1 with `Connection: close`.
#[derive(Debug, Clone, Default)]
pub struct TcpTransport {
    /// `user:password` sent as HTTP Basic credentials when present
    credentials: Option<(String, String)>,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basic_auth<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            credentials: Some((username.into(), password.into())),
        }
    }

    /// Serialize the request head for `url`.
    pub fn request_head(
        &self,
        url: &Url,
        headers: &[(String, String)],
        body_len: usize,
    ) -> String {
        let mut head = format!(
            "POST {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {USER_AGENT}\r\n",
            url.path,
            url.host_header()
        );
        for (name, value) in headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        if let Some(auth) = self.authorization() {
            head.push_str(&format!("Authorization: {auth}\r\n"));
        }
        head.push_str(&format!("Content-Length: {body_len}\r\n"));
        head.push_str("Connection: close\r\n\r\n");
        head
    }

    fn authorization(&self) -> Option<String> {
        self.credentials.as_ref().map(|(user, pass)| {
            let encoded =
                base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}"));
            format!("Basic {encoded}")
        })
    }

    /// Read the response head, returning it with any body bytes already received
    fn read_head(stream: &mut TcpStream) -> Result<(String, Vec<u8>), AppError> {
        let mut buffer = vec![0; MAX_HEADERS_SIZE];
        let mut total_read = 0;

        loop {
            let bytes_read = stream.read(&mut buffer[total_read..])?;
            if bytes_read == 0 {
                if total_read == 0 {
                    return Err(AppError::transport("Connection closed without a response"));
                }
                break;
            }
            total_read += bytes_read;

            let received = &buffer[..total_read];
            if let Some((head_end, body_start)) = find_head_end(received) {
                let head = std::str::from_utf8(&received[..head_end])
                    .map_err(|_| AppError::transport("Response headers are not UTF-8"))?;
                return Ok((head.to_string(), received[body_start..].to_vec()));
            }

            if total_read >= buffer.len() {
                return Err(AppError::transport("Response headers too large"));
            }
        }

        let head = std::str::from_utf8(&buffer[..total_read])
            .map_err(|_| AppError::transport("Response headers are not UTF-8"))?;
        Ok((head.to_string(), Vec::new()))
    }
}

/// Locate the blank line ending a response head, as `(head_end, body_start)`.
///
/// Whichever of `\r\n\r\n` and `\n\n` comes first wins.
fn find_head_end(received: &[u8]) -> Option<(usize, usize)> {
    let crlf = received
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| (pos, pos + 4));
    let lf = received
        .windows(2)
        .position(|w| w == b"\n\n")
        .map(|pos| (pos, pos + 2));

    match (crlf, lf) {
        (Some(crlf), Some(lf)) => Some(if lf.0 < crlf.0 { lf } else { crlf }),
        (crlf, lf) => crlf.or(lf),
    }
}

impl Transport for TcpTransport {
    fn post(
        &mut self,
        url: &Url,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<HttpResponse, AppError> {
        debug!("Connecting to {}:{}", url.host, url.port);
        let mut stream = TcpStream::connect((url.socket_host(), url.port)).map_err(|e| {
            AppError::transport(format!("Cannot connect to {}: {e}", url.host_header()))
        })?;

        let head = self.request_head(url, headers, body.len());
        trace!("Request head:\n{head}");
        stream.write_all(head.as_bytes())?;
        stream.write_all(body)?;
        stream.flush()?;
        debug!("Sent {} body bytes to {url}", body.len());

        let (head, mut body_bytes) = Self::read_head(&mut stream)?;
        let mut response = HttpResponse::parse_head(&head)?;

        let remaining = MAX_RESPONSE_BODY_SIZE.saturating_sub(body_bytes.len() as u64);
        if let Err(e) = (&mut stream).take(remaining).read_to_end(&mut body_bytes) {
            // The status line already decided the outcome
            warn!("Failed to read response body: {e}");
        }
        response.body = body_bytes;

        debug!(
            "Collector answered {} {} ({} body bytes)",
            response.status_code,
            response.status_text,
            response.body.len()
        );
        Ok(response)
    }
}
