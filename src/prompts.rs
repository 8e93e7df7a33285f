//! Versioned prompt/configuration bundles served from the key-value store.

use serde::Serialize;

use crate::error::Result;
use crate::storage::KvStore;

pub const DEFAULT_SECTION: &str = "common";
pub const DEFAULT_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptBundle {
    pub section: String,
    pub version: String,
    pub data: serde_json::Value,
}

/// KV key for a bundle: `prompts:{version}:{section}`.
pub fn prompt_key(version: &str, section: &str) -> String {
    format!("prompts:{}:{}", version, section)
}

/// Fetch a bundle. Missing or empty selectors use the defaults, and an absent
/// entry yields an empty array rather than an error.
pub async fn fetch_prompts(
    kv: &dyn KvStore,
    section: Option<&str>,
    version: Option<&str>,
) -> Result<PromptBundle> {
    let section = section.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SECTION);
    let version = version.filter(|v| !v.is_empty()).unwrap_or(DEFAULT_VERSION);

    let data = kv
        .get(&prompt_key(version, section))
        .await?
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));

    Ok(PromptBundle {
        section: section.to_string(),
        version: version.to_string(),
        data,
    })
}
