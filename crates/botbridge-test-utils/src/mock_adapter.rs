// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock platform adapter for deterministic testing.
//!
//! Replies and error notices are captured for assertion; signature checks
//! and message parsing are configurable per test.

use std::sync::Mutex;

use async_trait::async_trait;

use botbridge_core::{BridgeError, ParsedMessage, PlatformAdapter};

/// A mock chat platform.
///
/// `parse_message` expects `{"text": ..., "user": ...}` payloads and treats a
/// top-level `"challenge"` key as a URL-verification handshake.
pub struct MockAdapter {
    platform: String,
    verify_ok: bool,
    fail_sends: bool,
    replies: Mutex<Vec<(String, String)>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl MockAdapter {
    pub fn new(platform: &str) -> Self {
        Self {
            platform: platform.to_string(),
            verify_ok: true,
            fail_sends: false,
            replies: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Adapter that rejects every signature.
    pub fn rejecting_signatures(platform: &str) -> Self {
        Self {
            verify_ok: false,
            ..Self::new(platform)
        }
    }

    /// Adapter whose sends fail with a network error.
    pub fn with_failing_sends(platform: &str) -> Self {
        Self {
            fail_sends: true,
            ..Self::new(platform)
        }
    }

    /// All `(user, text)` pairs passed to `send_reply`.
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }

    /// All `(user, message)` pairs passed to `send_error`.
    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformAdapter for MockAdapter {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn verify_signature(
        &self,
        _payload: &[u8],
        _signature: Option<&str>,
        _timestamp: Option<&str>,
    ) -> bool {
        self.verify_ok
    }

    fn handle_challenge(&self, payload: &serde_json::Value) -> Option<String> {
        payload
            .get("challenge")
            .and_then(|c| c.as_str())
            .map(String::from)
    }

    fn parse_message(&self, payload: &serde_json::Value) -> Option<ParsedMessage> {
        let text = payload.get("text")?.as_str()?.to_string();
        let user = payload.get("user")?.as_str()?.to_string();
        Some(ParsedMessage {
            text,
            external_user_id: user,
            external_user_name: payload
                .get("user_name")
                .and_then(|n| n.as_str())
                .map(String::from),
            message_type: "message".to_string(),
            message_id: payload
                .get("message_id")
                .and_then(|m| m.as_str())
                .map(String::from),
            raw_payload: payload.clone(),
        })
    }

    async fn send_reply(&self, external_user_id: &str, text: &str) -> Result<(), BridgeError> {
        if self.fail_sends {
            return Err(BridgeError::Network("connection refused".into()));
        }
        self.replies
            .lock()
            .unwrap()
            .push((external_user_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_error(&self, external_user_id: &str, error: &str) -> Result<(), BridgeError> {
        if self.fail_sends {
            return Err(BridgeError::Network("connection refused".into()));
        }
        self.errors
            .lock()
            .unwrap()
            .push((external_user_id.to_string(), error.to_string()));
        Ok(())
    }
}
