//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Subscription tier.
///
/// Closed set; the credit grant and display label live here rather
/// than in scattered conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Starter,
    Pro,
}

impl Plan {
    /// Credits granted with this plan.
    pub fn credit_grant(&self) -> u32 {
        match self {
            Plan::Free => 5,
            Plan::Starter => 25,
            Plan::Pro => 150,
        }
    }

    /// Display label for UI surfaces.
    pub fn label(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Starter => "Starter",
            Plan::Pro => "Pro",
        }
    }
}

/// A completed credit purchase. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub plan: Plan,
    pub credits: u32,
    /// Amount paid in cents
    pub amount: u32,
    /// Purchase date (RFC3339)
    pub date: String,
    /// External payment session id, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_session_id: Option<String>,
}

/// Profile fields mirrored from the identity provider on each login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// User profile stored in Firestore (`users/{uid}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity-provider uid (also used as document ID)
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Credit balance; decrements are refused once it reaches 0.
    /// Records predating the billing fields read as 0 / free.
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub plan: Plan,
    /// Append-only purchase history
    #[serde(default)]
    pub purchases: Vec<Purchase>,
    /// When the account record was first created (RFC3339)
    pub created_at: String,
    /// Refreshed on every successful session establishment (RFC3339)
    pub last_login_at: String,
    /// Beta gate; flipped only by the external approval process
    #[serde(default)]
    pub beta_access: bool,
    #[serde(default)]
    pub beta_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta_requested_at: Option<String>,
}

impl User {
    /// Build the default record for a first sign-in.
    pub fn new_account(profile: &IdentityProfile, now: &str) -> Self {
        Self {
            uid: profile.uid.clone(),
            email: profile.email.clone().unwrap_or_default(),
            display_name: profile
                .display_name
                .clone()
                .unwrap_or_else(|| "User".to_string()),
            photo_url: profile.photo_url.clone(),
            credits: Plan::Free.credit_grant(),
            plan: Plan::Free,
            purchases: vec![],
            created_at: now.to_string(),
            last_login_at: now.to_string(),
            beta_access: false,
            beta_requested: false,
            beta_requested_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_mapping() {
        assert_eq!(Plan::Free.credit_grant(), 5);
        assert_eq!(Plan::Starter.credit_grant(), 25);
        assert_eq!(Plan::Pro.credit_grant(), 150);
        assert_eq!(Plan::Pro.label(), "Pro");
    }

    #[test]
    fn test_plan_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Plan::Starter).unwrap(), "\"starter\"");
        let plan: Plan = serde_json::from_str("\"pro\"").unwrap();
        assert_eq!(plan, Plan::Pro);
    }

    #[test]
    fn test_new_account_defaults() {
        let profile = IdentityProfile {
            uid: "u1".to_string(),
            email: None,
            display_name: None,
            photo_url: None,
        };

        let user = User::new_account(&profile, "2026-01-01T00:00:00Z");

        assert_eq!(user.credits, 5);
        assert_eq!(user.plan, Plan::Free);
        assert_eq!(user.display_name, "User");
        assert_eq!(user.email, "");
        assert!(!user.beta_access);
        assert!(!user.beta_requested);
        assert!(user.purchases.is_empty());
    }

    #[test]
    fn test_user_document_field_names() {
        let profile = IdentityProfile {
            uid: "u1".to_string(),
            email: Some("a@b.com".to_string()),
            display_name: Some("Ada".to_string()),
            photo_url: Some("https://example.com/p.png".to_string()),
        };
        let user = User::new_account(&profile, "2026-01-01T00:00:00Z");

        let value = serde_json::to_value(&user).unwrap();
        let obj = value.as_object().unwrap();

        assert!(obj.contains_key("displayName"));
        assert!(obj.contains_key("photoURL"));
        assert!(obj.contains_key("createdAt"));
        assert!(obj.contains_key("lastLoginAt"));
        assert!(obj.contains_key("betaAccess"));
    }
}
