//! Configuration file handling.
//!
//! The configuration is a small YAML file naming the custom fields to map
//! and the search settings used for retrieval:
//!
//! ```yaml
//! query:
//!   project: EN
//!   start: 2021-03-01
//!   page_limit: 99
//!   done_only: true
//! custom_fields:
//!   - id: 10002
//!     name: Story Points
//!   - id: 10100
//!     name: Team Assigned
//! ```

use crate::domain::CustomField;
use crate::error::{ConfigError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

/// Name of the configuration file looked up by default.
pub const CONFIG_FILE_NAME: &str = "milestone.yaml";

/// Project searched when none is configured.
pub const DEFAULT_PROJECT: &str = "EN";

/// Result count at which a search page is assumed to be truncated.
pub const DEFAULT_PAGE_LIMIT: usize = 99;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Retrieval settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Custom fields to expose on issue records.
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryConfig {
    /// Project key to search.
    pub project: String,

    /// Earliest creation date searched.
    pub start: NaiveDate,

    /// Page size at which results are treated as truncated.
    pub page_limit: usize,

    /// Restrict searches to issues resolved as done.
    pub done_only: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT.to_string(),
            start: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap_or_default(),
            page_limit: DEFAULT_PAGE_LIMIT,
            done_only: true,
        }
    }
}

impl Config {
    /// Defaults plus the three custom fields lifecycle reports use.
    ///
    /// Custom field ids differ between sites; the ids here are placeholders
    /// to be edited after `milestone init`.
    pub fn starter() -> Self {
        Self {
            query: QueryConfig::default(),
            custom_fields: vec![
                CustomField::new(10002, "Story Points"),
                CustomField::new(10100, "Team Assigned"),
                CustomField::new(10200, "Work Category"),
            ],
        }
    }

    /// Parse and validate a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on malformed YAML and
    /// [`ConfigError::Invalid`] when [`validate`](Self::validate) fails.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, otherwise see
    /// [`from_yaml`](Self::from_yaml).
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a file, or use defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) for a file that exists.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        let config = Self::load(path).await?;
        tracing::debug!(
            path = %path.display(),
            custom_fields = config.custom_fields.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Yaml(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty project key, a zero page
    /// limit, or two custom fields sharing an id or internal name.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.query.project.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "query.project must not be empty".to_string(),
            ));
        }

        if self.query.page_limit == 0 {
            return Err(ConfigError::Invalid(
                "query.page_limit must be at least 1".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for field in &self.custom_fields {
            if !ids.insert(field.id) {
                return Err(ConfigError::Invalid(format!(
                    "custom field id {} is configured twice",
                    field.id
                )));
            }
            let name = field.field_name();
            if !names.insert(name.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "custom field name '{name}' is configured twice"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.query.project, "EN");
        assert_eq!(config.query.start, NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
        assert_eq!(config.query.page_limit, 99);
        assert!(config.query.done_only);
        assert!(config.custom_fields.is_empty());
    }

    #[test]
    fn starter_fields_use_builtin_mappers() {
        let config = Config::starter();
        config.validate().unwrap();

        let names: Vec<_> = config
            .custom_fields
            .iter()
            .map(CustomField::field_name)
            .collect();
        assert_eq!(names, vec!["story_points", "team_assigned", "work_category"]);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = Config::from_yaml(
            "query:\n  project: OPS\ncustom_fields:\n  - id: 10002\n    name: Story Points\n",
        )
        .unwrap();

        assert_eq!(config.query.project, "OPS");
        assert_eq!(config.query.page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(config.custom_fields[0].field_key(), "customfield_10002");
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("{}").unwrap(), Config::default());
    }

    #[rstest]
    #[case::empty_project("query:\n  project: ' '\n", "project")]
    #[case::zero_limit("query:\n  page_limit: 0\n", "page_limit")]
    #[case::duplicate_id(
        "custom_fields:\n  - id: 1\n    name: A\n  - id: 1\n    name: B\n",
        "id 1"
    )]
    #[case::duplicate_name(
        "custom_fields:\n  - id: 1\n    name: Team\n  - id: 2\n    name: Other\n    field_name: team\n",
        "'team'"
    )]
    fn invalid_values_are_rejected(#[case] yaml: &str, #[case] expected: &str) {
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
        assert!(
            err.to_string().contains(expected),
            "Expected error to contain '{}', got: '{}'",
            expected,
            err
        );
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = Config::from_yaml("query: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Yaml(_))));
    }

    #[tokio::test]
    async fn save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.custom_fields.push(CustomField::new(10100, "Team Assigned"));
        config.save(&path).await.unwrap();

        let loaded = Config::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn load_or_default_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&temp_dir.path().join(CONFIG_FILE_NAME))
            .await
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(&temp_dir.path().join("absent.yaml")).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
