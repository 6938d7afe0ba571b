//! Environment variable loader.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::SpckitConfig;

/// Credential variables, checked in order.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "VITE_GEMINI_API_KEY", "API_KEY"];
/// Model identifier.
pub const MODEL_VAR: &str = "SPCKIT_MODEL";
/// API base URL override.
pub const BASE_URL_VAR: &str = "SPCKIT_BASE_URL";
/// Sampling temperature.
pub const TEMPERATURE_VAR: &str = "SPCKIT_TEMPERATURE";
/// Output-token cap.
pub const MAX_OUTPUT_TOKENS_VAR: &str = "SPCKIT_MAX_OUTPUT_TOKENS";
/// Request timeout in seconds.
pub const TIMEOUT_VAR: &str = "SPCKIT_TIMEOUT_SECS";
/// Guided build switch.
pub const GUIDED_BUILD_VAR: &str = "SPCKIT_GUIDED_BUILD";
/// Number of earlier turns sent with each request.
pub const HISTORY_TURNS_VAR: &str = "SPCKIT_HISTORY_TURNS";

impl SpckitConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`SpckitConfig::from_lookup`].
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when no credential variable is
    /// set and [`ConfigError::InvalidValue`] when a value cannot be parsed or is
    /// out of range.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let (source, api_key) = API_KEY_VARS
            .iter()
            .find_map(|name| get(*name).map(|value| (*name, value)))
            .ok_or(ConfigError::MissingCredential {
                variables: API_KEY_VARS,
            })?;
        debug!(source, "API credential found");

        let mut config = Self::new(api_key);

        if let Some(model) = get(MODEL_VAR) {
            config.model = model;
        }
        config.base_url = get(BASE_URL_VAR);

        if let Some(temperature) = parse::<f32>(&get, TEMPERATURE_VAR)? {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::invalid_value(
                    TEMPERATURE_VAR,
                    "must be between 0.0 and 2.0",
                ));
            }
            config.temperature = temperature;
        }

        if let Some(tokens) = parse::<u32>(&get, MAX_OUTPUT_TOKENS_VAR)? {
            if tokens == 0 {
                return Err(ConfigError::invalid_value(
                    MAX_OUTPUT_TOKENS_VAR,
                    "must be greater than zero",
                ));
            }
            config.max_output_tokens = tokens;
        }

        if let Some(secs) = parse::<u64>(&get, TIMEOUT_VAR)? {
            if secs == 0 {
                return Err(ConfigError::invalid_value(
                    TIMEOUT_VAR,
                    "must be greater than zero",
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = get(GUIDED_BUILD_VAR) {
            config.guided_build = parse_flag(&raw)
                .ok_or_else(|| ConfigError::invalid_value(GUIDED_BUILD_VAR, "expected a boolean"))?;
        }

        if let Some(turns) = parse::<usize>(&get, HISTORY_TURNS_VAR)? {
            config.history_turns = turns;
        }

        Ok(config)
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, name: &'static str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    get(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|err| ConfigError::invalid_value(name, format!("`{raw}`: {err}")))
        })
        .transpose()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> ConfigResult<SpckitConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        SpckitConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn missing_credential_is_fatal() {
        let err = load(&[("SPCKIT_MODEL", "gemini-2.0-flash-exp")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let err = load(&[("GEMINI_API_KEY", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn falls_back_through_credential_vars() {
        let config = load(&[("API_KEY", "fallback"), ("VITE_GEMINI_API_KEY", "vite")]).unwrap();
        assert_eq!(config.api_key, "vite");
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("GEMINI_API_KEY", "key")]).unwrap();
        assert_eq!(config.model(), "gemini-2.5-pro");
        assert!((config.temperature() - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.max_output_tokens(), 2048);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(!config.guided_build());
        assert_eq!(config.history_turns(), 0);
        assert_eq!(config.base_url(), None);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("GEMINI_API_KEY", "key"),
            ("SPCKIT_MODEL", "gemini-2.0-flash-exp"),
            ("SPCKIT_BASE_URL", "http://127.0.0.1:9000"),
            ("SPCKIT_TEMPERATURE", "0.2"),
            ("SPCKIT_MAX_OUTPUT_TOKENS", "4096"),
            ("SPCKIT_TIMEOUT_SECS", "15"),
            ("SPCKIT_GUIDED_BUILD", "Yes"),
            ("SPCKIT_HISTORY_TURNS", "6"),
        ])
        .unwrap();
        assert_eq!(config.model(), "gemini-2.0-flash-exp");
        assert_eq!(config.base_url(), Some("http://127.0.0.1:9000"));
        assert_eq!(config.max_output_tokens(), 4096);
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert!(config.guided_build());
        assert_eq!(config.history_turns(), 6);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let cases = [
            ("SPCKIT_TEMPERATURE", "hot"),
            ("SPCKIT_TEMPERATURE", "3.5"),
            ("SPCKIT_MAX_OUTPUT_TOKENS", "0"),
            ("SPCKIT_TIMEOUT_SECS", "-1"),
            ("SPCKIT_GUIDED_BUILD", "maybe"),
            ("SPCKIT_HISTORY_TURNS", "many"),
        ];
        for (variable, value) in cases {
            let err = load(&[("GEMINI_API_KEY", "key"), (variable, value)]).unwrap_err();
            match err {
                ConfigError::InvalidValue { variable: got, .. } => assert_eq!(got, variable),
                other => panic!("unexpected error for {variable}={value}: {other}"),
            }
        }
    }

    #[test]
    fn bad_base_url_fails_when_building_the_adapter() {
        let config = load(&[("GEMINI_API_KEY", "key"), ("SPCKIT_BASE_URL", "localhost:9000")])
            .unwrap();
        assert!(matches!(config.gemini_config(), Err(ConfigError::Adapter(_))));
    }
}
