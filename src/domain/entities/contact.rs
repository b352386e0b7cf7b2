use serde::{Deserialize, Serialize};

/// A contact form as posted by the browser. Every field is optional on the
/// wire so that missing fields surface as validation messages rather than
/// body parse failures.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl ContactSubmission {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// The organization, if one was given and is not empty.
    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref().filter(|org| !org.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub submission_id: String,
}
