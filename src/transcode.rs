//! Conversion between caller text representations and UTF-8 wire bytes.
//!
//! Native text in this crate is `String`. Wide (UTF-16) text and OS strings
//! cross into it here and nowhere else. Text that cannot be represented
//! fails with [`AppError::Encoding`]; nothing is replaced with placeholders.

use crate::error::AppError;
use std::ffi::OsStr;

/// Decode UTF-16 text, including surrogate pairs, into a `String`.
pub fn wide_to_utf8(wide: &[u16]) -> Result<String, AppError> {
    let text = String::from_utf16(wide)?;
    Ok(text)
}

/// Encode native text as UTF-16 code units.
pub fn utf8_to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Convert an OS string (path component, argument) to UTF-8.
pub fn os_to_utf8(text: &OsStr) -> Result<String, AppError> {
    text.to_str().map(str::to_owned).ok_or_else(|| {
        AppError::encoding(format!(
            "'{}' is not valid Unicode",
            text.to_string_lossy()
        ))
    })
}

/// Bytes placed on the wire for a piece of native text.
pub fn to_wire_text(text: &str) -> &[u8] {
    text.as_bytes()
}
