//! Tenant scope and per-request context
//!
//! Identity and tenant resolution happen upstream (gateway / session layer).
//! Every request arrives with a pre-resolved [`RequestContext`]; the core
//! never looks up users, roles, or organizations itself.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organization reference: relational scope (id) plus the slug used as
/// the mirror-store namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgRef {
    pub id: Uuid,
    pub slug: String,
}

/// The storage scope an operation runs under.
///
/// Platform-level operators carry no organization: they read an empty map
/// and their map writes are no-op successes (nothing to persist for a
/// tenant-less actor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantScope {
    /// Scoped to a single organization.
    Org(OrgRef),
    /// Platform-wide scope (no tenant).
    Platform,
}

impl TenantScope {
    /// Build an organization scope.
    pub fn org(id: Uuid, slug: impl Into<String>) -> Self {
        Self::Org(OrgRef {
            id,
            slug: slug.into(),
        })
    }

    /// The organization this scope resolves to, if any.
    pub fn as_org(&self) -> Option<&OrgRef> {
        match self {
            Self::Org(org) => Some(org),
            Self::Platform => None,
        }
    }

    /// Mirror-store namespace for this scope.
    pub fn mirror_slug(&self) -> Option<&str> {
        self.as_org().map(|org| org.slug.as_str())
    }

    /// Human-readable label for logs.
    pub fn label(&self) -> &str {
        match self {
            Self::Org(org) => org.slug.as_str(),
            Self::Platform => "platform",
        }
    }
}

/// Pre-resolved request identity, supplied by the upstream gateway.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub tenant: TenantScope,
    /// Administrator capability, already evaluated upstream. The core
    /// trusts this boolean.
    pub is_admin: bool,
}

impl RequestContext {
    /// Context for a regular (non-admin) user in an organization.
    pub fn worker(user_id: Uuid, tenant: TenantScope) -> Self {
        Self {
            user_id,
            tenant,
            is_admin: false,
        }
    }

    /// Context for an organization administrator.
    pub fn admin(user_id: Uuid, tenant: TenantScope) -> Self {
        Self {
            user_id,
            tenant,
            is_admin: true,
        }
    }
}
