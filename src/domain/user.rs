//! User rows as the core reads them.
//!
//! Registration, login, and token issuance live in the upstream auth
//! service; this module only models the identity details checkout needs.

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl User {
    /// Checkout requires the owning user to have usable contact details.
    pub fn has_valid_details(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_email_is_invalid() {
        let user = User {
            id: 1,
            name: "Ada".into(),
            email: "  ".into(),
            role: "CUSTOMER".into(),
        };
        assert!(!user.has_valid_details());
    }

    #[test]
    fn non_empty_email_is_valid() {
        let user = User {
            id: 1,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: "CUSTOMER".into(),
        };
        assert!(user.has_valid_details());
    }
}
