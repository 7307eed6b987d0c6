//! LINE Messaging API push client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use super::PushSender;

const LINE_PUSH_ENDPOINT: &str = "https://api.line.me/v2/bot/message/push";

pub struct LinePushClient {
    client: reqwest::Client,
    access_token: String,
}

#[derive(Serialize)]
struct PushPayload<'a> {
    to: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    message_type: &'static str,
    text: &'a str,
}

impl LinePushClient {
    pub fn new(access_token: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            access_token,
        })
    }
}

#[async_trait]
impl PushSender for LinePushClient {
    async fn send_text(&self, user_id: &str, text: &str) -> Result<()> {
        let payload = PushPayload {
            to: user_id,
            messages: vec![TextMessage {
                message_type: "text",
                text,
            }],
        };

        let response = self
            .client
            .post(LINE_PUSH_ENDPOINT)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .context("Failed to reach the push API")?;

        // Delivery rejections are logged but not treated as failures of
        // the requesting flow; only transport errors bubble up.
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!("Push response status code: {}", status);
        info!("Push response text: {}", body);

        Ok(())
    }
}
