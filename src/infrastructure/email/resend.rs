use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::{
    entities::email::OutgoingEmail,
    errors::EmailError,
    repositories::email_sender::EmailSender,
    settings::AppConfig,
};

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the Resend transactional email API (`POST /emails`).
#[derive(Clone)]
pub struct ResendClient {
    http: Client,
    api_key: Zeroizing<String>,
    endpoint: Url,
}

impl ResendClient {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, EmailError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join("emails"))
            .map_err(|e| EmailError::Transport(format!("invalid API URL: {}", e)))?;

        Ok(ResendClient {
            http: Client::new(),
            api_key: Zeroizing::new(api_key.to_string()),
            endpoint,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, EmailError> {
        ResendClient::new(&config.resend_api_key, &config.resend_api_url)
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>, EmailError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);

            return Err(EmailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let id = serde_json::from_str::<SendEmailResponse>(&body)
            .ok()
            .and_then(|r| r.id)
            .filter(|id| !id.is_empty());

        Ok(id)
    }
}
