//! Beta access request models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Document key prefix for submissions without an authenticated user.
/// Cannot collide with identity-provider uids.
pub const ANONYMOUS_KEY_PREFIX: &str = "anonymous_";

/// Beta request form as submitted by the website.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BetaRequestForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub email: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub twitter: String,
    #[validate(length(min = 1))]
    pub use_case: String,
    #[validate(length(min = 1))]
    pub experience: String,
    #[serde(default)]
    pub excited_about: String,
}

impl BetaRequestForm {
    /// Wire names of required fields that are missing or empty,
    /// sorted for stable error messages.
    pub fn missing_fields(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|field| wire_name(field.as_ref()).to_string())
                    .collect();
                fields.sort();
                fields
            }
        }
    }
}

/// Map a Rust field ident to the form's wire name.
fn wire_name(field: &str) -> &str {
    match field {
        "use_case" => "useCase",
        "excited_about" => "excitedAbout",
        other => other,
    }
}

/// Review status, transitioned by the external reviewer process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BetaRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Stored request document (`betaRequests/{key}`).
/// Write-once from this system's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaRequest {
    pub name: String,
    pub email: String,
    pub github: String,
    pub twitter: String,
    pub use_case: String,
    pub experience: String,
    pub excited_about: String,
    /// Submitter uid when authenticated
    pub uid: Option<String>,
    pub status: BetaRequestStatus,
    /// Submission time (RFC3339)
    pub submitted_at: String,
}

impl BetaRequest {
    /// Build the stored record for a validated form submission.
    pub fn from_form(form: BetaRequestForm, uid: Option<&str>, now: &str) -> Self {
        Self {
            name: form.name,
            email: form.email,
            github: form.github,
            twitter: form.twitter,
            use_case: form.use_case,
            experience: form.experience,
            excited_about: form.excited_about,
            uid: uid.map(str::to_string),
            status: BetaRequestStatus::Pending,
            submitted_at: now.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> BetaRequestForm {
        BetaRequestForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            github: String::new(),
            twitter: String::new(),
            use_case: "Automating deployment scripts".to_string(),
            experience: "intermediate".to_string(),
            excited_about: String::new(),
        }
    }

    #[test]
    fn test_complete_form_validates() {
        assert!(complete_form().missing_fields().is_empty());
    }

    #[test]
    fn test_missing_use_case_reported_by_wire_name() {
        let mut form = complete_form();
        form.use_case = String::new();

        assert_eq!(form.missing_fields(), vec!["useCase".to_string()]);
    }

    #[test]
    fn test_all_required_fields_reported() {
        let form = BetaRequestForm {
            name: String::new(),
            email: String::new(),
            github: String::new(),
            twitter: String::new(),
            use_case: String::new(),
            experience: String::new(),
            excited_about: String::new(),
        };

        assert_eq!(
            form.missing_fields(),
            vec!["email", "experience", "name", "useCase"]
        );
    }
}
