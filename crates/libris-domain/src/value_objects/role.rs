//! Role names and role sets
//!
//! Role names form a closed set. Aggregate queries hand role names back as a
//! single delimiter-joined field; [`RoleSet::parse_joined`] turns that field
//! into a typed set once, at the persistence boundary, so nothing downstream
//! ever compares raw strings.

use crate::constants::{ROLE_ADMIN, ROLE_JOIN_SEPARATOR, ROLE_STAFF, ROLE_USER};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One of the fixed role names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    /// Full administrative access
    Admin,
    /// Library staff
    Staff,
    /// Regular account
    User,
}

impl RoleName {
    /// All valid role names
    pub const ALL: [RoleName; 3] = [RoleName::Admin, RoleName::Staff, RoleName::User];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => ROLE_ADMIN,
            RoleName::Staff => ROLE_STAFF,
            RoleName::User => ROLE_USER,
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(RoleName::Admin),
            ROLE_STAFF => Ok(RoleName::Staff),
            ROLE_USER => Ok(RoleName::User),
            other => Err(Error::invalid_argument(format!(
                "Unknown role name '{other}'. Use admin, staff, or user"
            ))),
        }
    }
}

/// Set of role names held by an identity
///
/// Serializes as a sorted, de-duplicated array of names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<RoleName>);

impl RoleSet {
    /// Create an empty role set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a delimiter-joined field such as `"admin, staff"`
    ///
    /// Segments are trimmed; empty and unrecognized segments are dropped.
    pub fn parse_joined(joined: &str) -> Self {
        joined
            .split(ROLE_JOIN_SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| segment.parse::<RoleName>().ok())
            .collect()
    }

    /// Add a role, returning whether it was newly inserted
    pub fn insert(&mut self, role: RoleName) -> bool {
        self.0.insert(role)
    }

    /// Remove a role, returning whether it was present
    pub fn remove(&mut self, role: RoleName) -> bool {
        self.0.remove(&role)
    }

    /// Whether the set holds the given role
    pub fn contains(&self, role: RoleName) -> bool {
        self.0.contains(&role)
    }

    /// Whether any held role appears in `permitted`
    pub fn intersects(&self, permitted: &[RoleName]) -> bool {
        permitted.iter().any(|role| self.0.contains(role))
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of held roles
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over held roles in canonical order
    pub fn iter(&self) -> impl Iterator<Item = RoleName> + '_ {
        self.0.iter().copied()
    }

    /// Canonical (sorted) list of role names
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|r| r.as_str().to_string()).collect()
    }
}

impl FromIterator<RoleName> for RoleSet {
    fn from_iter<I: IntoIterator<Item = RoleName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[RoleName; N]> for RoleSet {
    fn from(roles: [RoleName; N]) -> Self {
        roles.into_iter().collect()
    }
}
