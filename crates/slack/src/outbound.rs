//! Outbound message shapes and the `chat.postMessage` sender.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://slack.com/api";

/// Single legacy-attachment card, the only rich shape this bot sends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttachmentCard {
    pub fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    pub title: String,
    pub title_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl AttachmentCard {
    pub fn new(title: impl Into<String>, title_link: impl Into<String>) -> Self {
        Self {
            fallback: "no result".to_owned(),
            pretext: None,
            title: title.into(),
            title_link: title_link.into(),
            image_url: None,
        }
    }

    pub fn pretext(mut self, pretext: impl Into<String>) -> Self {
        self.pretext = Some(pretext.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    Attachment(AttachmentCard),
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("chat transport failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat api rejected message: {0}")]
    Api(String),
}

#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send(&self, channel_id: &str, message: &OutboundMessage) -> Result<(), SendError>;
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Web API sender: posts to `chat.postMessage` with the bot token and
/// checks Slack's `ok` envelope.
pub struct HttpChatSender {
    client: Client,
    bot_token: SecretString,
    api_base: String,
}

impl HttpChatSender {
    pub fn new(bot_token: SecretString) -> Self {
        Self { client: Client::new(), bot_token, api_base: API_BASE.to_owned() }
    }

    pub fn with_api_base(bot_token: SecretString, api_base: impl Into<String>) -> Self {
        Self { client: Client::new(), bot_token, api_base: api_base.into() }
    }

    fn body(channel_id: &str, message: &OutboundMessage) -> serde_json::Value {
        match message {
            OutboundMessage::Text(text) => serde_json::json!({
                "channel": channel_id,
                "text": text,
            }),
            OutboundMessage::Attachment(card) => serde_json::json!({
                "channel": channel_id,
                "text": card.fallback,
                "attachments": [card],
            }),
        }
    }
}

#[async_trait]
impl ChatSender for HttpChatSender {
    async fn send(&self, channel_id: &str, message: &OutboundMessage) -> Result<(), SendError> {
        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&Self::body(channel_id, message))
            .send()
            .await?;

        let parsed: PostMessageResponse = response.json().await?;
        if !parsed.ok {
            return Err(SendError::Api(parsed.error.unwrap_or_else(|| "unknown error".into())));
        }
        Ok(())
    }
}

/// Sender that drops everything. Default wiring for environments without a
/// bot token, and the quiet end of tests that do not assert on output.
#[derive(Default)]
pub struct NoopChatSender;

#[async_trait]
impl ChatSender for NoopChatSender {
    async fn send(&self, _channel_id: &str, _message: &OutboundMessage) -> Result<(), SendError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AttachmentCard, HttpChatSender, OutboundMessage};

    #[test]
    fn text_body_carries_channel_and_text() {
        let body = HttpChatSender::body("C42", &OutboundMessage::text("Yeehaw"));
        assert_eq!(body["channel"], "C42");
        assert_eq!(body["text"], "Yeehaw");
        assert!(body.get("attachments").is_none());
    }

    #[test]
    fn attachment_body_uses_the_fallback_as_text() {
        let card = AttachmentCard::new("Old Town Road - Lil Nas X", "https://example.test/watch")
            .image_url("https://example.test/cover.jpg");
        let body = HttpChatSender::body("C42", &OutboundMessage::Attachment(card));

        assert_eq!(body["text"], "no result");
        assert_eq!(body["attachments"][0]["title"], "Old Town Road - Lil Nas X");
        assert_eq!(body["attachments"][0]["image_url"], "https://example.test/cover.jpg");
        assert!(body["attachments"][0].get("pretext").is_none());
    }

    #[test]
    fn pretext_serializes_when_present() {
        let card = AttachmentCard::new("La Taqueria", "https://example.test/la-taqueria")
            .pretext("Rating: 4.5");
        let json = serde_json::to_value(&card).expect("card should serialize");
        assert_eq!(json["pretext"], "Rating: 4.5");
        assert_eq!(json["fallback"], "no result");
    }
}
