//! Session token claims

use libris_domain::entities::Identity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims of a session token
///
/// Timestamps are epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity id
    pub sub: String,
    /// Role names held at issuance, sorted and de-duplicated
    pub roles: Vec<String>,
    /// Identity `token_version` at issuance
    pub token_version: i64,
    /// Issued at
    pub iat: i64,
    /// Expiry
    pub exp: i64,
    /// Unique token id; two logins in the same second get distinct markers
    pub jti: String,
}

impl Claims {
    /// Claims for `identity` issued at `now`, valid for `lifetime_secs`
    pub fn for_identity(identity: &Identity, now: i64, lifetime_secs: i64) -> Self {
        Self {
            sub: identity.id.clone(),
            roles: identity.roles.names(),
            token_version: identity.token_version,
            iat: now,
            exp: now.saturating_add(lifetime_secs),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Whether the token is expired at `now`
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Seconds of validity left at `now` (0 if expired)
    pub fn remaining_secs(&self, now: i64) -> u64 {
        u64::try_from(self.exp.saturating_sub(now)).unwrap_or(0)
    }
}
