//! Sectioning clause for list monitors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key path whose value partitions a list into named sections.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionBy {
    pub key_path: String,
}

impl SectionBy {
    pub fn new(key_path: impl Into<String>) -> Self {
        Self {
            key_path: key_path.into(),
        }
    }

    /// Section name for an object whose key path holds `value`.
    ///
    /// Strings are used as-is, `null` maps to the empty section, other
    /// values use their JSON rendering.
    pub fn section_name(&self, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl From<&str> for SectionBy {
    fn from(key_path: &str) -> Self {
        SectionBy::new(key_path)
    }
}
