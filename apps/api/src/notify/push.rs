use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Payload handed to the push-delivery endpoint. `data` rides along for the
/// client to deep-link the matches screen.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: Value,
}

/// Delivery seam. Success/failure of the send is the only signal consumed
/// back; transport mechanics beyond that are out of scope.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, push_token: &str, message: &PushMessage) -> Result<()>;
}

/// Expo-style HTTP push sender: one POST per message to the configured
/// endpoint.
pub struct HttpPushSender {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpPushSender {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    title: &'a str,
    body: &'a str,
    data: &'a Value,
}

#[async_trait]
impl PushSender for HttpPushSender {
    async fn send(&self, push_token: &str, message: &PushMessage) -> Result<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&PushRequest {
                to: push_token,
                title: &message.title,
                body: &message.body,
                data: &message.data,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("push delivery failed ({status}): {body}"));
        }
        Ok(())
    }
}
