//! Resend transactional email client, used for newsletter welcome mails.

use anyhow::{anyhow, Result};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::ResendConfig;

const WELCOME_SUBJECT: &str = "Welcome to our newsletter";

const WELCOME_HTML: &str = "<p>Thanks for subscribing!</p>\
<p>You'll be the first to hear about new launches, skincare routines and member-only offers.</p>";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct ResendClient {
    client: Client,
    config: ResendConfig,
}

impl ResendClient {
    pub fn new(config: ResendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.expose_secret().is_empty()
    }

    /// Send the newsletter welcome email. Returns Resend's message id.
    pub async fn send_welcome(&self, to: &str) -> Result<String> {
        if !self.is_configured() {
            return Err(anyhow!("Resend API key not configured"));
        }

        let url = format!("{}/emails", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&SendEmailRequest {
                from: &self.config.from_email,
                to: vec![to],
                subject: WELCOME_SUBJECT,
                html: WELCOME_HTML,
            })
            .send()
            .await
            .map_err(|e| anyhow!("Resend request failed: {}", e))?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let sent: SendEmailResponse = serde_json::from_str(&body)
                .map_err(|e| anyhow!("Unexpected Resend response: {}", e))?;
            tracing::info!(email_id = %sent.id, "Newsletter welcome email sent");
            Ok(sent.id)
        } else {
            let message = serde_json::from_str::<ResendError>(&body)
                .map(|e| match e.name {
                    Some(name) => format!("{}: {}", name, e.message),
                    None => e.message,
                })
                .unwrap_or_else(|_| body.chars().take(200).collect());
            tracing::error!(status = %status, error = %message, "Resend send failed");
            Err(anyhow!("Failed to send email: {}", message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base: &str) -> ResendConfig {
        ResendConfig {
            api_key: Secret::new("re_test".to_string()),
            api_base_url: base.to_string(),
            from_email: "Glow <hello@example.com>".to_string(),
        }
    }

    #[tokio::test]
    async fn sends_welcome_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_partial_json(serde_json::json!({
                "from": "Glow <hello@example.com>",
                "to": ["reader@example.com"],
                "subject": WELCOME_SUBJECT
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "em_1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ResendClient::new(config(&server.uri()));
        assert_eq!(client.send_welcome("reader@example.com").await.unwrap(), "em_1");
    }

    #[tokio::test]
    async fn surfaces_resend_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "statusCode": 422,
                "name": "validation_error",
                "message": "Invalid `to` field."
            })))
            .mount(&server)
            .await;

        let client = ResendClient::new(config(&server.uri()));
        let err = client.send_welcome("reader@example.com").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to send email: validation_error: Invalid `to` field."
        );
    }
}
