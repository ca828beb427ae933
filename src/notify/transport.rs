//! Outbound transactional mail. The provider exposes an HTTP API that
//! accepts `{from, to, subject, html}`; failures are hard errors for the
//! caller to handle.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), String>;
}

pub struct HttpMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(
        api_url: String,
        api_key: String,
        from: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url,
            api_key,
            from,
        })
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl MailTransport for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), String> {
        let message = WireMessage {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .http
            .post(format!("{}/messages", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|err| format!("mail transport error: {err}"))?;

        if !response.status().is_success() {
            return Err(format!(
                "mail provider returned {} for {}",
                response.status(),
                email.to
            ));
        }

        Ok(())
    }
}
