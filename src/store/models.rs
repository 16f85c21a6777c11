//! Relational store models not owned by a domain module

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a platform user within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Worker,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Worker => "worker",
        }
    }
}

/// A platform user. Only the slice needed for notification fan-out lives
/// here; account management is upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNode {
    pub id: Uuid,
    pub org_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl UserNode {
    pub fn new(org_id: Uuid, email: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            org_id,
            email: email.into(),
            name: name.into(),
            role,
            created_at: Utc::now(),
        }
    }
}
