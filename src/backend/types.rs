//! Account types shared by every backend

use serde::{Deserialize, Serialize};

/// An authenticated account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl User {
    /// Name, else email, else "User"
    pub fn display_name(&self) -> &str {
        if !self.name.trim().is_empty() {
            &self.name
        } else if !self.email.trim().is_empty() {
            &self.email
        } else {
            "User"
        }
    }
}

/// A password session
///
/// `token` is the secret presented as `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User {
            id: "u1".to_string(),
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(user("Ada", "ada@example.com").display_name(), "Ada");
        assert_eq!(user(" ", "ada@example.com").display_name(), "ada@example.com");
        assert_eq!(user("", "").display_name(), "User");
    }
}
