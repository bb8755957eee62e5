//! Library member entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Member gender as recorded on the membership card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

impl Gender {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(crate::error::Error::invalid_argument(format!(
                "Unknown gender '{other}'"
            ))),
        }
    }
}

/// A library member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier
    pub id: String,
    /// Sequential member code (`ID001`, ...)
    pub code: String,
    /// Full name, unique across members
    pub name: String,
    /// Gender
    pub gender: Gender,
    /// School class
    pub class: String,
    /// Phone number, unique across members
    pub phone: String,
    /// Profile picture reference
    pub photo: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Data required to register a member; the code is generated
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub gender: Gender,
    pub class: String,
    pub phone: String,
    pub photo: Option<String>,
}

/// Partial update of a member
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub class: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
}
