use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use careseed_filter::FilterRules;
use careseed_generate::GenerateOptions;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of the optional `--config` TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generate: GenerateOptions,
    pub filter: FilterRules,
}

impl Settings {
    /// Defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Toml {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use careseed_generate::BalancePolicy;

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(settings.generate.strict);
        assert_eq!(settings.generate.counts.shifts, 15);
        assert_eq!(settings.filter.excluded, vec!["profiles".to_string()]);
    }

    #[test]
    fn partial_tables_override_only_named_fields() {
        let settings: Settings = toml::from_str(
            r#"
            [generate]
            seed = 7
            balance_policy = "settled"
            base_time = "2024-06-01T09:00:00"

            [generate.counts]
            shifts = 8

            [filter]
            excluded = ["profiles", "users"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.generate.seed, Some(7));
        assert_eq!(settings.generate.balance_policy, BalancePolicy::Settled);
        assert!(settings.generate.base_time.is_some());
        assert_eq!(settings.generate.counts.shifts, 8);
        assert_eq!(settings.generate.counts.bookings, 10);
        assert_eq!(settings.generate.vat_rate, 0.20);
        assert_eq!(settings.filter.excluded.len(), 2);
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = Settings::load(Some(Path::new("/nonexistent/careseed.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/careseed.toml"));
    }
}
