// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform adapter capability trait.
//!
//! Each chat platform implements this once; the pipeline never sees wire
//! formats. Adapters are looked up by platform tag in [`AdapterRegistry`],
//! keeping dispatch as a table lookup rather than an inheritance tree.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::types::ParsedMessage;

/// Capability interface implemented per chat platform.
///
/// `verify_signature`, `handle_challenge`, and `parse_message` are pure
/// payload inspections; only the reply methods touch the network.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Platform tag this adapter serves ("webhook", "slack", ...).
    fn platform(&self) -> &str;

    /// Validates the webhook signature for a raw payload.
    fn verify_signature(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> bool;

    /// Returns the challenge response for platform URL-verification
    /// handshakes, or `None` if the payload is not a challenge.
    fn handle_challenge(&self, payload: &serde_json::Value) -> Option<String>;

    /// Extracts a platform-neutral message, or `None` for deliveries the
    /// pipeline should ignore (edits, reactions, bot echoes).
    fn parse_message(&self, payload: &serde_json::Value) -> Option<ParsedMessage>;

    /// Sends a reply to the originating user.
    async fn send_reply(&self, external_user_id: &str, text: &str) -> Result<(), BridgeError>;

    /// Sends a human-readable failure notice to the originating user.
    async fn send_error(&self, external_user_id: &str, error: &str) -> Result<(), BridgeError>;
}

/// Registry mapping platform tags to adapter instances.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under its own platform tag, replacing any
    /// previous registration for that tag.
    pub fn register(&mut self, adapter: Arc<dyn PlatformAdapter>) {
        self.adapters
            .insert(adapter.platform().to_string(), adapter);
    }

    /// Resolves the adapter for a platform tag.
    pub fn get(&self, platform: &str) -> Result<Arc<dyn PlatformAdapter>, BridgeError> {
        self.adapters
            .get(platform)
            .cloned()
            .ok_or_else(|| BridgeError::AdapterNotFound(platform.to_string()))
    }

    pub fn platforms(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullAdapter;

    #[async_trait]
    impl PlatformAdapter for NullAdapter {
        fn platform(&self) -> &str {
            "null"
        }

        fn verify_signature(&self, _: &[u8], _: Option<&str>, _: Option<&str>) -> bool {
            true
        }

        fn handle_challenge(&self, _: &serde_json::Value) -> Option<String> {
            None
        }

        fn parse_message(&self, _: &serde_json::Value) -> Option<ParsedMessage> {
            None
        }

        async fn send_reply(&self, _: &str, _: &str) -> Result<(), BridgeError> {
            Ok(())
        }

        async fn send_error(&self, _: &str, _: &str) -> Result<(), BridgeError> {
            Ok(())
        }
    }

    #[test]
    fn registry_resolves_by_tag() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(NullAdapter));

        assert!(registry.get("null").is_ok());
        assert!(matches!(
            registry.get("missing"),
            Err(BridgeError::AdapterNotFound(_))
        ));
    }
}
