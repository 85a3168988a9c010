use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::CliError;

/// Where the context document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Front-end configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub input: InputSource,
    /// Overrides the `now` carried by the context document.
    pub now_override: Option<DateTime<Utc>>,
    pub pretty: bool,
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var          | Default |
    /// |------------------|---------|
    /// | `OEE_INPUT`      | `-`     |
    /// | `OEE_NOW`        | unset   |
    /// | `OEE_PRETTY`     | `false` |
    /// | `OEE_LOG_FORMAT` | `text`  |
    ///
    /// A positional `input` argument takes precedence over `OEE_INPUT`;
    /// `-` means stdin.
    pub fn from_env(input: Option<String>) -> Result<Self, CliError> {
        Self::from_lookup(|key| std::env::var(key).ok(), input)
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, input: Option<String>) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = match input.or_else(|| lookup("OEE_INPUT")) {
            None => InputSource::Stdin,
            Some(path) if path.trim() == "-" || path.trim().is_empty() => InputSource::Stdin,
            Some(path) => InputSource::File(PathBuf::from(path.trim())),
        };

        let now_override = lookup("OEE_NOW")
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                DateTime::parse_from_rfc3339(v.trim())
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| CliError::Config(format!("OEE_NOW must be RFC 3339: {e}")))
            })
            .transpose()?;

        let pretty = match lookup("OEE_PRETTY") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| {
                CliError::Config(format!("OEE_PRETTY must be a boolean, got '{v}'"))
            })?,
        };

        let log_format = match lookup("OEE_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(CliError::Config(format!(
                    "OEE_LOG_FORMAT must be 'text' or 'json', got '{other}'"
                )))
            }
        };

        Ok(Self {
            input,
            now_override,
            pretty,
            log_format,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = CliConfig::from_lookup(lookup(&[]), None).unwrap();
        assert_eq!(config.input, InputSource::Stdin);
        assert_eq!(config.now_override, None);
        assert!(!config.pretty);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn argument_overrides_env_input() {
        let config = CliConfig::from_lookup(
            lookup(&[("OEE_INPUT", "env.json")]),
            Some("arg.json".to_string()),
        )
        .unwrap();
        assert_eq!(config.input, InputSource::File(PathBuf::from("arg.json")));
    }

    #[test]
    fn dash_means_stdin() {
        let config = CliConfig::from_lookup(lookup(&[("OEE_INPUT", "-")]), None).unwrap();
        assert_eq!(config.input, InputSource::Stdin);
    }

    #[test]
    fn parses_now_and_flags() {
        let config = CliConfig::from_lookup(
            lookup(&[
                ("OEE_NOW", "2024-05-14T12:00:00+02:00"),
                ("OEE_PRETTY", "yes"),
                ("OEE_LOG_FORMAT", "json"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(
            config.now_override.unwrap().to_rfc3339(),
            "2024-05-14T10:00:00+00:00"
        );
        assert!(config.pretty);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_matches!(
            CliConfig::from_lookup(lookup(&[("OEE_NOW", "yesterday")]), None),
            Err(CliError::Config(_))
        );
        assert_matches!(
            CliConfig::from_lookup(lookup(&[("OEE_PRETTY", "maybe")]), None),
            Err(CliError::Config(_))
        );
        assert_matches!(
            CliConfig::from_lookup(lookup(&[("OEE_LOG_FORMAT", "xml")]), None),
            Err(CliError::Config(_))
        );
    }
}
