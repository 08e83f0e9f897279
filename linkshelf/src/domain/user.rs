// linkshelf/src/domain/user.rs
use crate::domain::bookmark::UserId;
use serde::{Deserialize, Serialize};

/// Identity handed over by the authentication boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl CurrentUser {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            email: None,
            display_name: None,
            avatar_url: None,
        }
    }

    /// First word of the display name, or "there"
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
            .unwrap_or("there")
    }

    /// Display name, falling back to the email address
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or(self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_full_name_when_greeting_then_first_name() {
        let mut user = CurrentUser::new(UserId::from("u-1"));
        user.display_name = Some("Ada Lovelace".to_string());
        assert_eq!(user.greeting_name(), "Ada");
    }

    #[test]
    fn given_no_or_blank_name_when_greeting_then_there() {
        let mut user = CurrentUser::new(UserId::from("u-1"));
        assert_eq!(user.greeting_name(), "there");
        user.display_name = Some("   ".to_string());
        assert_eq!(user.greeting_name(), "there");
    }

    #[test]
    fn given_email_only_when_label_then_email() {
        let mut user = CurrentUser::new(UserId::from("u-1"));
        assert_eq!(user.label(), "u-1");
        user.email = Some("ada@example.com".to_string());
        assert_eq!(user.label(), "ada@example.com");
    }
}
