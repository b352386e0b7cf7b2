use async_trait::async_trait;

use crate::{entities::email::OutgoingEmail, errors::EmailError};

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Delivers one message. On success returns the provider's message id, if it reported one.
    async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>, EmailError>;
}
