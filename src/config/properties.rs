//! Client properties files.
//!
//! The format is the usual Java `.properties` subset used for Kafka client
//! configs: one `key=value` (or `key: value`) per line, `#` and `!`
//! comments, surrounding whitespace ignored.

use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

/// Parse properties text. Later duplicates win.
pub fn parse_properties(text: &str) -> anyhow::Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let Some(split) = line.find(['=', ':']) else {
            anyhow::bail!("Line {}: expected 'key=value', got '{line}'", index + 1);
        };
        let key = line[..split].trim();
        let value = line[split + 1..].trim();
        if key.is_empty() {
            anyhow::bail!("Line {}: empty property name", index + 1);
        }

        properties.insert(key.to_string(), value.to_string());
    }

    Ok(properties)
}

/// Read and parse a properties file.
pub fn load_properties(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read properties file {path:?}"))?;
    parse_properties(&text).with_context(|| format!("Invalid properties file {path:?}"))
}
