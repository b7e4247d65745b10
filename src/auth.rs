//! Authenticated identity, as supplied by the upstream auth layer.
//!
//! Credential checking, JWT validation, and refresh-token rotation happen
//! in front of this service; by the time a request reaches a handler the
//! gateway has resolved it to a user id and role, forwarded in the
//! `x-user-id` and `x-user-role` headers. Core operations take the
//! [`Identity`] as an explicit parameter rather than reading any ambient
//! security context.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ShopError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const ADMIN_ROLE: &str = "ADMIN";

/// The requesting user for the life of one request.
#[derive(Clone, Copy, Debug)]
pub struct Identity {
    pub user_id: i64,
    pub is_admin: bool,
}

impl Identity {
    /// Ownership-or-admin check: deny unless the requester owns the
    /// resource or holds the admin role.
    pub fn can_access(&self, owner_id: i64) -> bool {
        self.is_admin || self.user_id == owner_id
    }

    pub fn require_admin(&self) -> Result<(), ShopError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ShopError::AccessDenied)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ShopError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or(ShopError::Unauthenticated)?;

        let is_admin = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|role| role.eq_ignore_ascii_case(ADMIN_ROLE))
            .unwrap_or(false);

        Ok(Identity { user_id, is_admin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_and_admin_can_access() {
        let owner = Identity {
            user_id: 5,
            is_admin: false,
        };
        let admin = Identity {
            user_id: 99,
            is_admin: true,
        };
        assert!(owner.can_access(5));
        assert!(admin.can_access(5));
    }

    #[test]
    fn stranger_is_denied() {
        let stranger = Identity {
            user_id: 6,
            is_admin: false,
        };
        assert!(!stranger.can_access(5));
        assert!(stranger.require_admin().is_err());
    }
}
