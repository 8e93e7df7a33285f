use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LicenseStatus {
    Active,
    Suspended,
    Revoked,
    Refunded,
}

/// A purchased entitlement. Issued and mutated outside this service;
/// read-only here apart from test and seed fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    /// Opaque pre-issued license key
    pub key: String,
    pub plan: String,
    pub max_activations: i64,
    /// None = perpetual
    pub expires_at: Option<i64>,
    pub status: LicenseStatus,
    pub created_at: i64,
}

impl License {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp < now)
    }

    /// Usable only while active and not past its expiry.
    pub fn is_usable_at(&self, now: i64) -> bool {
        self.status == LicenseStatus::Active && !self.is_expired_at(now)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateLicense {
    pub key: String,
    pub plan: String,
    pub max_activations: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default = "default_status")]
    pub status: LicenseStatus,
}

fn default_status() -> LicenseStatus {
    LicenseStatus::Active
}
