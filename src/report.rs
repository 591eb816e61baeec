//! Crash report metadata.

use crate::error::AppError;
use crate::transcode::wide_to_utf8;
use std::collections::BTreeMap;

/// Caller-supplied key/value metadata sent alongside the minidump.
///
/// Names iterate in sorted order so the encoded body is reproducible for a
/// given boundary. Names are checked by [`crate::validate`] before encoding;
/// inserting never rejects anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportParameters {
    entries: BTreeMap<String, String>,
}

impl ReportParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter, returning the previous value.
    pub fn insert<K, V>(&mut self, name: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.entries.insert(name.into(), value.into())
    }

    /// Insert a parameter given as UTF-16 text.
    pub fn insert_wide(
        &mut self,
        name: &[u16],
        value: &[u16],
    ) -> Result<Option<String>, AppError> {
        let name = wide_to_utf8(name)?;
        let value = wide_to_utf8(value)?;
        Ok(self.insert(name, value))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `other` on top of `self`; names present in both take `other`'s value.
    pub fn merge(&mut self, other: &ReportParameters) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ReportParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = ReportParameters::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}
