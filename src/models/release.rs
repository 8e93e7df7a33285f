use serde::{Deserialize, Serialize};

/// A published build. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    /// Product identifier, e.g. `acme/seo-plugin`
    pub slug: String,
    pub version: String,
    pub changelog: Option<String>,
    /// Detached signature or checksum, passed through to the client untouched
    pub signature: Option<String>,
    /// Blob store key of the archive
    pub artifact_key: String,
    pub created_at: i64,
}

impl Release {
    /// `{last slug segment}-{version}.zip`
    pub fn download_filename(&self) -> String {
        download_filename(&self.slug, &self.version)
    }
}

pub fn download_filename(slug: &str, version: &str) -> String {
    let name = slug.rsplit('/').next().unwrap_or(slug);
    format!("{}-{}.zip", name, version)
}

#[derive(Debug, Deserialize)]
pub struct CreateRelease {
    pub slug: String,
    pub version: String,
    #[serde(default)]
    pub changelog: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    pub artifact_key: String,
}
