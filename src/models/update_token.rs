use serde::{Deserialize, Serialize};

/// Short-lived capability to download one release to one licensed site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateToken {
    pub id: String,
    pub slug: String,
    pub version: String,
    pub license_id: String,
    pub site_hash: String,
    pub expires_at: i64,
    pub created_at: i64,
    /// Set only when tokens are single-use and this one has been claimed
    pub redeemed_at: Option<i64>,
}

impl UpdateToken {
    /// Redeemable while `now < expires_at`.
    pub fn is_live_at(&self, now: i64) -> bool {
        now < self.expires_at
    }
}
