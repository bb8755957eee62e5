//! Role entity

use crate::value_objects::RoleName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named role that identities can be assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier
    pub id: String,
    /// Role name from the fixed set
    pub name: RoleName,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}
