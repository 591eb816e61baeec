//! Simple INI file parser with zero dependencies
//! Supports sections, key-value pairs, comments, and boolean values

use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct IniConfig {
    sections: HashMap<String, HashMap<String, String>>,
    global: HashMap<String, String>,
}

impl IniConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {e}"))?;
        Self::parse(&content)
    }

    /// Parse INI content from string
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut config = Self::new();
        let mut current_section = String::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            let line_number = line_num + 1;

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') || line.len() < 3 {
                    return Err(format!("Invalid section at line {line_number}: {line}"));
                }
                current_section = line[1..line.len() - 1].trim().to_string();
                if current_section.is_empty() {
                    return Err(format!("Empty section name at line {line_number}"));
                }
                config.sections.entry(current_section.clone()).or_default();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(format!("Invalid syntax at line {line_number}: {line}"));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(format!("Empty key at line {line_number}: {line}"));
            }

            let value = strip_inline_comment(value.trim());

            let target = if current_section.is_empty() {
                &mut config.global
            } else {
                config.sections.entry(current_section.clone()).or_default()
            };
            target.insert(key.to_string(), value.to_string());
        }

        Ok(config)
    }

    /// Get string value
    pub fn get_string(&self, section: &str, key: &str) -> Option<String> {
        if section.is_empty() {
            self.global.get(key).cloned()
        } else {
            self.sections.get(section)?.get(key).cloned()
        }
    }

    /// Get boolean value
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.get_string(section, key)?.to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Some(true),
            "false" | "no" | "0" | "off" => Some(false),
            _ => None,
        }
    }

    pub fn get_bool_or(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_bool(section, key).unwrap_or(default)
    }

    /// All key/value pairs of a section, sorted by key
    pub fn section_entries(&self, section: &str) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .sections
            .get(section)
            .map(|s| s.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        entries.sort();
        entries
    }
}

/// Drop a trailing `# comment` or `; comment`. The marker must follow
/// whitespace so values like `build#42` survive.
fn strip_inline_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    for i in 1..bytes.len() {
        if (bytes[i] == b'#' || bytes[i] == b';') && bytes[i - 1].is_ascii_whitespace() {
            return value[..i].trim_end();
        }
    }
    value
}
