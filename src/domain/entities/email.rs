use serde::Serialize;

/// A fully composed message handed to the email provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}
