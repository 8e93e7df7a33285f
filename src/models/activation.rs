use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivationStatus {
    Active,
    Revoked,
}

/// Binding of a license to one site. At most one active row per
/// (license_id, site_hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activation {
    pub id: String,
    pub license_id: String,
    pub site_url: String,
    /// Stable site fingerprint reported by the plugin
    pub site_hash: String,
    pub wp_version: Option<String>,
    pub plugin_version: Option<String>,
    pub activated_at: i64,
    pub deactivated_at: Option<i64>,
    /// Last successful validation (the liveness heartbeat)
    pub last_check_at: Option<i64>,
    pub status: ActivationStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivation {
    pub site_url: String,
    pub site_hash: String,
    #[serde(default)]
    pub wp_version: Option<String>,
    #[serde(default)]
    pub plugin_version: Option<String>,
}
