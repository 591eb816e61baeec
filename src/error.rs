// SPDX-License-Identifier: MIT

use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    // Report construction errors
    InvalidParameterName(String), // Contains the rejected parameter name
    DumpUnreadable(String),       // Contains the dump path and cause
    EmptyDump(String),            // Contains the dump path or display name
    Encoding(String),             // Contains what could not be transcoded
    // Transport errors
    InvalidUrl(String),
    UnsupportedScheme(String), // Contains the rejected scheme
    Transport(String),
    HttpStatus(u16), // Contains the non-success status returned by the collector
    InvalidConfiguration(String),
    InvalidMultipart(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "IO error: {err}"),
            AppError::InvalidParameterName(name) => {
                write!(
                    f,
                    "Invalid parameter name '{name}': must be non-empty printable ASCII without quotes"
                )
            }
            AppError::DumpUnreadable(msg) => write!(f, "Cannot read minidump: {msg}"),
            AppError::EmptyDump(path) => write!(f, "Minidump is empty: {path}"),
            AppError::Encoding(msg) => write!(f, "Text encoding error: {msg}"),
            AppError::InvalidUrl(url) => write!(f, "Invalid collector URL: {url}"),
            AppError::UnsupportedScheme(scheme) => {
                write!(
                    f,
                    "Unsupported URL scheme '{scheme}': only http:// is supported"
                )
            }
            AppError::Transport(msg) => write!(f, "Transport error: {msg}"),
            AppError::HttpStatus(status) => {
                write!(f, "Collector rejected the report with HTTP status {status}")
            }
            AppError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {msg}"),
            AppError::InvalidMultipart(msg) => write!(f, "Invalid multipart data: {msg}"),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<std::string::FromUtf16Error> for AppError {
    fn from(err: std::string::FromUtf16Error) -> Self {
        AppError::Encoding(err.to_string())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl AppError {
    /// Creates an InvalidParameterName error
    pub fn invalid_parameter_name<S: Into<String>>(name: S) -> Self {
        AppError::InvalidParameterName(name.into())
    }

    /// Creates an Encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        AppError::Encoding(msg.into())
    }

    /// Creates an InvalidMultipart error
    pub fn invalid_multipart<S: Into<String>>(msg: S) -> Self {
        AppError::InvalidMultipart(msg.into())
    }

    /// Creates a Transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        AppError::Transport(msg.into())
    }

    /// True when the report was refused before any network activity
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidParameterName(_)
                | AppError::DumpUnreadable(_)
                | AppError::EmptyDump(_)
                | AppError::Encoding(_)
        )
    }

    /// True when the failure belongs to the connection or the collector
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            AppError::Io(_)
                | AppError::InvalidUrl(_)
                | AppError::UnsupportedScheme(_)
                | AppError::Transport(_)
                | AppError::HttpStatus(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_error_display() {
        let errors = [
            AppError::invalid_parameter_name("say \"hi\""),
            AppError::EmptyDump("crash.dmp".to_string()),
            AppError::UnsupportedScheme("https".to_string()),
            AppError::HttpStatus(500),
        ];

        let expected = [
            "Invalid parameter name 'say \"hi\"': must be non-empty printable ASCII without quotes",
            "Minidump is empty: crash.dmp",
            "Unsupported URL scheme 'https': only http:// is supported",
            "Collector rejected the report with HTTP status 500",
        ];

        for (error, expected_msg) in errors.iter().zip(expected.iter()) {
            assert_eq!(error.to_string(), *expected_msg);
        }
    }

    #[test]
    fn test_error_classification() {
        let validation_errors = vec![
            AppError::invalid_parameter_name("bad\nkey"),
            AppError::DumpUnreadable("missing.dmp".to_string()),
            AppError::EmptyDump("empty.dmp".to_string()),
            AppError::encoding("unpaired surrogate"),
        ];

        let transport_errors = vec![
            AppError::InvalidUrl("http://".to_string()),
            AppError::UnsupportedScheme("ftp".to_string()),
            AppError::transport("connection reset"),
            AppError::HttpStatus(404),
        ];

        for error in validation_errors {
            assert!(error.is_validation_error(), "{error} should be validation");
            assert!(!error.is_transport_error(), "{error} is not transport");
        }

        for error in transport_errors {
            assert!(error.is_transport_error(), "{error} should be transport");
            assert!(!error.is_validation_error(), "{error} is not validation");
        }
    }

    #[test]
    fn test_utf16_error_conversion() {
        let err: AppError = String::from_utf16(&[0xD800]).unwrap_err().into();
        assert!(matches!(err, AppError::Encoding(_)));
    }
}
