use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    constants::SUCCESS_MESSAGE,
    domain::validation::validate_submission,
    entities::{
        contact::{ContactResponse, ContactSubmission},
        email::OutgoingEmail,
    },
    errors::AppError,
    repositories::email_sender::EmailSender,
    settings::AppConfig,
    utils::html::{escape_html, escape_multiline},
};

/// Where outgoing contact emails come from and go to.
#[derive(Debug, Clone)]
pub struct Mailbox {
    pub from: String,
    pub to: String,
    pub site_name: String,
}

impl From<&AppConfig> for Mailbox {
    fn from(config: &AppConfig) -> Self {
        Mailbox {
            from: config.sender_address(),
            to: config.recipient_email.clone(),
            site_name: config.site_name.clone(),
        }
    }
}

pub struct ContactHandler {
    pub mailer: Arc<dyn EmailSender>,
    pub mailbox: Mailbox,
}

impl ContactHandler {
    pub fn new(mailer: Arc<dyn EmailSender>, mailbox: Mailbox) -> Self {
        ContactHandler { mailer, mailbox }
    }

    /// Validates a submission and forwards it to the email provider
    pub async fn submit(&self, submission: ContactSubmission) -> Result<ContactResponse, AppError> {
        validate_submission(&submission)?;

        let email = self.compose(&submission, Utc::now());

        let id = self
            .mailer
            .send(&email)
            .await
            .inspect_err(|e| tracing::error!("Email provider error: {}", e))?;

        let submission_id = id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("sub_{}", Utc::now().timestamp_millis()));

        tracing::info!(%submission_id, "Contact submission forwarded");

        Ok(ContactResponse {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            submission_id,
        })
    }

    /// Builds the notification email. Only the HTML body is escaped.
    pub fn compose(&self, submission: &ContactSubmission, sent_at: DateTime<Utc>) -> OutgoingEmail {
        let name = submission.name();
        let email = submission.email();
        let message = submission.message();
        let organization = submission.organization();
        let footer = format!(
            "Sent from the {} contact form at {}",
            self.mailbox.site_name,
            sent_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        );

        let subject = match organization {
            Some(org) => format!("New Contact Form: {} ({})", name, org),
            None => format!("New Contact Form: {}", name),
        };

        let organization_html = organization
            .map(|org| format!("<p><strong>Organization:</strong> {}</p>\n", escape_html(org)))
            .unwrap_or_default();

        let html = format!(
            "<h2>New Contact Form Submission</h2>\n\
             <p><strong>Name:</strong> {name}</p>\n\
             <p><strong>Email:</strong> <a href=\"mailto:{email}\">{email}</a></p>\n\
             {organization_html}\
             <h3>Message:</h3>\n\
             <p>{message}</p>\n\
             <hr>\n\
             <p style=\"color: #666; font-size: 12px;\">{footer}</p>\n",
            name = escape_html(name),
            email = escape_html(email),
            message = escape_multiline(message),
            footer = escape_html(&footer),
        );

        let organization_text = organization
            .map(|org| format!("Organization: {}\n", org))
            .unwrap_or_default();

        let text = format!(
            "New Contact Form Submission\n\n\
             Name: {name}\n\
             Email: {email}\n\
             {organization_text}\n\
             Message:\n\
             {message}\n\n\
             ---\n\
             {footer}"
        )
        .trim()
        .to_string();

        OutgoingEmail {
            from: self.mailbox.from.clone(),
            to: vec![self.mailbox.to.clone()],
            reply_to: email.to_string(),
            subject,
            html,
            text,
        }
    }
}
