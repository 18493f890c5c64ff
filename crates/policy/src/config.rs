use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read policy config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse policy config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// The externally configurable policy surface. Every field has a shipped
/// default, so a config file only needs to name what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Tag key holding the data classification (matched case-sensitively).
    pub classification_tag_key: String,
    /// Accepted classification values (matched case-insensitively).
    pub classification_values: BTreeSet<String>,
    /// Substring identifying the full-administrator managed policy.
    pub full_admin_policy_marker: String,
    pub session_max_hours: f64,
    pub admin_session_max_hours: f64,
    /// Name substrings marking administrative permission sets.
    pub admin_name_markers: Vec<String>,
    /// Name substrings marking high-privilege permission sets.
    pub high_privilege_markers: Vec<String>,
    /// Tag keys every permission set must carry for cost attribution.
    pub required_tag_keys: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            classification_tag_key: "DataClassification".to_string(),
            classification_values: ["public", "internal", "confidential", "restricted"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            full_admin_policy_marker: "AdministratorAccess".to_string(),
            session_max_hours: 8.0,
            admin_session_max_hours: 1.0,
            admin_name_markers: vec![
                "admin".to_string(),
                "break-glass".to_string(),
                "root".to_string(),
            ],
            high_privilege_markers: vec![
                "admin".to_string(),
                "poweruser".to_string(),
                "privileged".to_string(),
                "break-glass".to_string(),
                "root".to_string(),
            ],
            required_tag_keys: vec![
                "CostCenter".to_string(),
                "Owner".to_string(),
                "Environment".to_string(),
            ],
        }
    }
}

impl PolicyConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
