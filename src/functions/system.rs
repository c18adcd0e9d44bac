// ABOUTME: Auxiliary template functions: shell command output, YAML serialization and string helpers
// ABOUTME: Thin wrappers with no promotion or decoding rules of their own

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::Value as JsonValue;
use std::process::Command;
use tracing::debug;

use super::error::{FunctionError, Result};

/// Run the concatenation of `parts` with `bash -c` and return its trimmed stdout.
pub fn shell(parts: &[String]) -> Result<String> {
    let script = parts.concat();
    debug!("Running shell function: {}", script);

    let output = Command::new("bash")
        .arg("-c")
        .arg(&script)
        .output()
        .map_err(|e| FunctionError::Shell {
            output: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() {
        return Err(FunctionError::Shell {
            output: format!("{} ({})", stdout, output.status),
        });
    }

    Ok(stdout)
}

/// Serialize a value as a YAML document.
pub fn to_yaml(value: &JsonValue) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// `given` when it is non-empty, otherwise `default`.
pub fn default_value<'a>(default: &'a str, given: &'a str) -> &'a str {
    if given.is_empty() {
        default
    } else {
        given
    }
}

pub fn b64enc(input: &str) -> String {
    BASE64.encode(input.as_bytes())
}

pub fn b64dec(input: &str) -> Result<String> {
    let bytes = BASE64.decode(input)?;
    Ok(String::from_utf8(bytes)?)
}

/// Join list items with `separator`. Non-string items use their JSON text.
pub fn join(separator: &str, items: &[JsonValue]) -> String {
    items
        .iter()
        .map(|item| match item {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}
