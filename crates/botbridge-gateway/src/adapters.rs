// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic JSON webhook adapter.
//!
//! Speaks a plain JSON wire format: inbound deliveries carry `text` and
//! `user` fields, URL verification uses a top-level `challenge`, and
//! signatures are HMAC-SHA256 over `"{timestamp}.{body}"` in lowercase hex.
//! Replies go out as JSON POSTs to the configured reply endpoint.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use botbridge_core::{BridgeError, ParsedMessage, PlatformAdapter};

type HmacSha256 = Hmac<Sha256>;

/// Adapter for platforms that deliver plain JSON webhooks.
pub struct WebhookJsonAdapter {
    platform: String,
    signing_secret: Option<String>,
    reply_url: Option<String>,
    http: reqwest::Client,
}

impl WebhookJsonAdapter {
    pub fn new(platform: &str, signing_secret: Option<String>, reply_url: Option<String>) -> Self {
        Self {
            platform: platform.to_string(),
            signing_secret,
            reply_url,
            http: reqwest::Client::new(),
        }
    }

    async fn post_json(&self, body: serde_json::Value) -> Result<(), BridgeError> {
        let url = self.reply_url.as_deref().ok_or_else(|| BridgeError::Adapter {
            message: format!("platform `{}` has no reply_url configured", self.platform),
            source: None,
        })?;

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BridgeError::Network(format!("reply delivery failed: {e}")))?;

        if !response.status().is_success() {
            return Err(BridgeError::Adapter {
                message: format!("reply endpoint returned {}", response.status()),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformAdapter for WebhookJsonAdapter {
    fn platform(&self) -> &str {
        &self.platform
    }

    /// No secret configured means verification is disabled. With a secret,
    /// both the signature and the timestamp header are required.
    fn verify_signature(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> bool {
        let Some(ref secret) = self.signing_secret else {
            return true;
        };
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        mac.verify_slice(&expected).is_ok()
    }

    fn handle_challenge(&self, payload: &serde_json::Value) -> Option<String> {
        payload
            .get("challenge")
            .and_then(|c| c.as_str())
            .map(String::from)
    }

    /// Ignores non-message types and bot echoes (payloads carrying a
    /// `bot_id`), matching how chat platforms redeliver their own sends.
    fn parse_message(&self, payload: &serde_json::Value) -> Option<ParsedMessage> {
        if payload.get("bot_id").is_some() {
            return None;
        }
        let message_type = payload
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or("message");
        if message_type != "message" {
            return None;
        }

        let text = payload.get("text")?.as_str()?.to_string();
        let user = payload.get("user")?.as_str()?.to_string();
        Some(ParsedMessage {
            text,
            external_user_id: user,
            external_user_name: payload
                .get("user_name")
                .and_then(|n| n.as_str())
                .map(String::from),
            message_type: message_type.to_string(),
            message_id: payload
                .get("message_id")
                .and_then(|m| m.as_str())
                .map(String::from),
            raw_payload: payload.clone(),
        })
    }

    async fn send_reply(&self, external_user_id: &str, text: &str) -> Result<(), BridgeError> {
        self.post_json(serde_json::json!({ "user": external_user_id, "text": text }))
            .await
    }

    async fn send_error(&self, external_user_id: &str, error: &str) -> Result<(), BridgeError> {
        self.post_json(serde_json::json!({ "user": external_user_id, "error": error }))
            .await
    }
}
