//! Pipeline configuration
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::EtlError;

/// What to do with a category row that contains a malformed token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
    /// Drop the offending row and record a diagnostic.
    #[default]
    Lenient,
    /// Abort the whole batch on the first malformed token.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Destination table name (replaced on every run)
    pub table_name: String,
    pub category_policy: CategoryPolicy,
    /// Category column whose source value `2` is folded into `1`
    pub related_column: String,
    /// Prefix of the one-hot genre columns (`<prefix>_<value>`)
    pub genre_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            table_name: "merged".to_string(),
            category_policy: CategoryPolicy::Lenient,
            related_column: "related".to_string(),
            genre_prefix: "genre".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, EtlError> {
        serde_json::from_str(text).map_err(|e| EtlError::Schema {
            message: format!("invalid pipeline config: {e}"),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, EtlError> {
        let text = std::fs::read_to_string(path).map_err(|e| EtlError::SourceRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }
}
