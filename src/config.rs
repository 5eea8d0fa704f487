//! Configuration management module
//!
//! `AppConfig` is read from YAML (`--config`, or `formfill/config.yaml` under the
//! platform config directory) and then adjusted from the environment. Every
//! section has defaults, so an empty or absent file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use action_primitives::WaitSettings;
use cdp_adapter::CdpConfig;
use formfill_core_types::LookupOrder;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::FormFillError;

pub const ENV_DEBUGGER_ADDR: &str = "FORMFILL_DEBUGGER_ADDR";
pub const ENV_AUTOFILL_TIMEOUT_SECS: &str = "FORMFILL_AUTOFILL_TIMEOUT_SECS";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub browser: CdpConfig,
    pub waits: WaitConfig,
    /// Strategies tried, in order, when a field is looked up by key.
    pub lookup_order: LookupOrder,
}

/// Wait bounds, written as human durations (`15s`, `250ms`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    #[serde(with = "human_duration")]
    pub element_timeout: Duration,
    #[serde(with = "human_duration")]
    pub autofill_timeout: Duration,
    #[serde(with = "human_duration")]
    pub poll_interval: Duration,
    #[serde(with = "human_duration")]
    pub ajax_timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        let settings = WaitSettings::default();
        Self {
            element_timeout: settings.element_timeout,
            autofill_timeout: settings.autofill_timeout,
            poll_interval: settings.poll_interval,
            ajax_timeout: Duration::from_secs(10),
        }
    }
}

impl WaitConfig {
    pub fn settings(&self) -> WaitSettings {
        WaitSettings {
            element_timeout: self.element_timeout,
            autofill_timeout: self.autofill_timeout,
            poll_interval: self.poll_interval,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, FormFillError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    warn!(
                        "Config file not found, using defaults: {}",
                        path.display()
                    );
                    Self::default()
                }
                None => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, FormFillError> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            FormFillError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        let config: AppConfig = serde_yaml::from_str(&content).map_err(|err| {
            FormFillError::Config(format!("failed to parse {}: {err}", path.display()))
        })?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_DEBUGGER_ADDR).filter(|v| !v.trim().is_empty()) {
            info!("Using debugger address from {ENV_DEBUGGER_ADDR}: {addr}");
            self.browser.debugger_addr = addr.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_AUTOFILL_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.waits.autofill_timeout = Duration::from_secs(secs),
                Err(err) => warn!("Ignoring {ENV_AUTOFILL_TIMEOUT_SECS}={raw}: {err}"),
            }
        }
    }

    fn validate(&self) -> Result<(), FormFillError> {
        if self.lookup_order.is_empty() {
            return Err(FormFillError::Config(
                "lookup_order must name at least one strategy".to_string(),
            ));
        }
        if self.waits.poll_interval.is_zero() {
            return Err(FormFillError::Config(
                "waits.poll_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("formfill");
    path.push("config.yaml");
    Some(path)
}

mod human_duration {
    use std::time::Duration;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfill_core_types::LocatorStrategy;
    use std::io::Write;

    #[test]
    fn defaults_match_form_timings() {
        let config = AppConfig::default();
        assert_eq!(config.browser.debugger_addr, "127.0.0.1:9222");
        assert_eq!(config.waits.element_timeout, Duration::from_secs(15));
        assert_eq!(config.waits.autofill_timeout, Duration::from_secs(10));
        assert_eq!(config.waits.poll_interval, Duration::from_millis(250));
        assert_eq!(config.lookup_order, LookupOrder::default());
    }

    #[test]
    fn loads_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "browser:\n  debugger_addr: 127.0.0.1:9333\nwaits:\n  autofill_timeout: 4s\nlookup_order: [name, id]"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.browser.debugger_addr, "127.0.0.1:9333");
        assert_eq!(config.waits.autofill_timeout, Duration::from_secs(4));
        assert_eq!(config.waits.element_timeout, Duration::from_secs(15));
        assert_eq!(
            config.lookup_order.strategies(),
            &[LocatorStrategy::Name, LocatorStrategy::Id]
        );
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            ENV_DEBUGGER_ADDR => Some("10.0.0.2:9222".to_string()),
            ENV_AUTOFILL_TIMEOUT_SECS => Some("3".to_string()),
            _ => None,
        });
        assert_eq!(config.browser.debugger_addr, "10.0.0.2:9222");
        assert_eq!(config.waits.autofill_timeout, Duration::from_secs(3));
    }

    #[test]
    fn malformed_timeout_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == ENV_AUTOFILL_TIMEOUT_SECS).then(|| "soon".into()));
        assert_eq!(config.waits.autofill_timeout, Duration::from_secs(10));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/formfill.yaml"))).unwrap_err();
        assert!(matches!(err, FormFillError::Config(_)));
    }

    #[test]
    fn empty_lookup_order_is_rejected() {
        let config = AppConfig {
            lookup_order: LookupOrder::new(vec![]),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
