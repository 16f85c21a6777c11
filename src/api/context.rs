//! Request-context extractor
//!
//! The upstream gateway resolves the session and injects identity headers;
//! this extractor turns them into a typed [`RequestContext`]. The service
//! trusts these values — it never resolves users, roles, or tenants itself.
//!
//! Headers:
//! - `x-user-id`   (required) — uuid of the authenticated user
//! - `x-org-id`    (optional) — uuid of the organization scope
//! - `x-org-slug`  (optional) — storage slug; required with `x-org-id`
//! - `x-user-role` (optional) — `admin` grants the administrator capability
//!
//! A request with neither org header runs in the platform-wide scope.

use super::handlers::AppError;
use crate::tenant::{RequestContext, TenantScope};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ORG_ID_HEADER: &str = "x-org-id";
pub const ORG_SLUG_HEADER: &str = "x-org-slug";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Typed request context extracted from gateway headers.
pub struct ApiContext(pub RequestContext);

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for ApiContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id: Uuid = header(parts, USER_ID_HEADER)
            .ok_or_else(|| {
                AppError::Unauthorized(format!("missing {} header", USER_ID_HEADER))
            })?
            .parse()
            .map_err(|_| AppError::BadRequest(format!("invalid {} header", USER_ID_HEADER)))?;

        let tenant = match (header(parts, ORG_ID_HEADER), header(parts, ORG_SLUG_HEADER)) {
            (Some(id), Some(slug)) => {
                let org_id: Uuid = id.parse().map_err(|_| {
                    AppError::BadRequest(format!("invalid {} header", ORG_ID_HEADER))
                })?;
                TenantScope::org(org_id, slug)
            }
            (None, None) => TenantScope::Platform,
            _ => {
                return Err(AppError::BadRequest(format!(
                    "{} and {} must be supplied together",
                    ORG_ID_HEADER, ORG_SLUG_HEADER
                )))
            }
        };

        let is_admin = header(parts, USER_ROLE_HEADER)
            .map(|role| role.eq_ignore_ascii_case("admin"))
            .unwrap_or(false);

        Ok(ApiContext(RequestContext {
            user_id,
            tenant,
            is_admin,
        }))
    }
}
