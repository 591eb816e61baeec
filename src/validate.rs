//! Wire-safety checks for report parameter names.
//!
//! Names end up inside a quoted `name="..."` header parameter, so they must
//! be printable ASCII with no `"`. Values are not checked here.

use crate::error::AppError;
use crate::report::ReportParameters;
use log::{debug, warn};

/// True if `name` can be embedded in a Content-Disposition header as-is.
pub fn is_valid_parameter_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| (0x20..=0x7E).contains(&b) && b != b'"')
}

/// Returns false at the first parameter whose name is not wire-safe.
pub fn check_parameters(parameters: &ReportParameters) -> bool {
    validate_parameters(parameters).is_ok()
}

/// Like [`check_parameters`], naming the offending parameter on failure.
pub fn validate_parameters(parameters: &ReportParameters) -> Result<(), AppError> {
    for (name, value) in parameters.iter() {
        if !is_valid_parameter_name(name) {
            debug!("Rejecting parameter name {name:?}");
            return Err(AppError::invalid_parameter_name(name));
        }

        // Values are embedded verbatim; line breaks can confuse lenient parsers
        if value.contains(['\r', '\n']) {
            warn!("Value of parameter '{name}' contains line breaks and is sent unmodified");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ReportParameters {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_printable_names_pass() {
        assert!(check_parameters(&params(&[("prod", "MyApp"), ("ver", "1.0")])));
        assert!(check_parameters(&params(&[("sayhi", "x")])));
        assert!(check_parameters(&params(&[("with space ~!@#", "x")])));
        assert!(check_parameters(&ReportParameters::new()));
    }

    #[test]
    fn test_quote_rejected() {
        let bad = params(&[("say \"hi\"", "x")]);
        assert!(!check_parameters(&bad));
        assert!(matches!(
            validate_parameters(&bad),
            Err(AppError::InvalidParameterName(name)) if name == "say \"hi\""
        ));
    }

    #[test]
    fn test_control_and_non_ascii_rejected() {
        assert!(!check_parameters(&params(&[("line\nbreak", "x")])));
        assert!(!check_parameters(&params(&[("tab\t", "x")])));
        assert!(!check_parameters(&params(&[("del\x7f", "x")])));
        assert!(!check_parameters(&params(&[("caf\u{e9}", "x")])));
        assert!(!check_parameters(&params(&[("", "x")])));
    }

    #[test]
    fn test_first_violation_reported() {
        // BTreeMap order: "a\"" sorts before "b\n"
        let bad = params(&[("b\n", "x"), ("a\"", "y"), ("ok", "z")]);
        assert!(matches!(
            validate_parameters(&bad),
            Err(AppError::InvalidParameterName(name)) if name == "a\""
        ));
    }

    #[test]
    fn test_values_are_not_validated() {
        let p = params(&[("comment", "line one\r\nline \"two\"\u{0}")]);
        assert!(check_parameters(&p));
    }
}
