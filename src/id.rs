//! Prefixed ID generation for Gatepost entities.
//!
//! Format: `gp_{entity}_{uuid_simple}` (32 hex chars, no hyphens). The UUID is
//! v4, drawn from OS randomness, so update token ids are unguessable.

use uuid::Uuid;

/// All known entity prefixes for validation.
const ALL_PREFIXES: &[&str] = &["gp_lic_", "gp_act_", "gp_rel_", "gp_tok_"];

/// Validate that a string is a well-formed Gatepost prefixed ID.
///
/// This is a cheap check to reject garbage before hitting the database.
pub fn is_valid_prefixed_id(s: &str) -> bool {
    let Some(prefix) = ALL_PREFIXES.iter().find(|p| s.starts_with(*p)) else {
        return false;
    };

    let hex_part = &s[prefix.len()..];
    hex_part.len() == 32 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    License,
    Activation,
    Release,
    UpdateToken,
}

impl EntityType {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::License => "gp_lic",
            Self::Activation => "gp_act",
            Self::Release => "gp_rel",
            Self::UpdateToken => "gp_tok",
        }
    }

    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }

    /// Whether `s` is a well-formed id of this entity type.
    pub fn matches(&self, s: &str) -> bool {
        is_valid_prefixed_id(s)
            && s.strip_prefix(self.prefix())
                .is_some_and(|rest| rest.starts_with('_'))
    }
}
