use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::entities::contact::ContactSubmission;

const MIN_MESSAGE_LENGTH: usize = 10;

/// One `@`, something on both sides, a dot after it, and no whitespace anywhere.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Checks a submission field by field and stops at the first problem.
pub fn validate_submission(submission: &ContactSubmission) -> Result<(), ValidationError> {
    if submission.name().trim().is_empty() {
        return Err(field_error("name_required", "Name is required"));
    }

    if submission.email().trim().is_empty() {
        return Err(field_error("email_required", "Email is required"));
    }

    if !is_valid_email(submission.email()) {
        return Err(field_error("email_format", "Invalid email format"));
    }

    let message = submission.message().trim();
    if message.is_empty() {
        return Err(field_error("message_required", "Message is required"));
    }

    if message.chars().count() < MIN_MESSAGE_LENGTH {
        return Err(field_error(
            "message_length",
            format!("Message must be at least {} characters", MIN_MESSAGE_LENGTH),
        ));
    }

    Ok(())
}

fn field_error(code: &'static str, message: impl Into<std::borrow::Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}
