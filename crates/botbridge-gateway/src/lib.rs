// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook ingress.
//!
//! One POST route per bot delivery plus a health endpoint. The handler
//! validates the token, defers challenge/signature/parsing decisions to the
//! bot's platform adapter, persists a pending event, and hands it to the
//! worker pool. The built-in [`adapters::WebhookJsonAdapter`] covers
//! platforms that deliver plain JSON webhooks.

pub mod adapters;
pub mod handlers;
pub mod server;

pub use adapters::WebhookJsonAdapter;
pub use server::{AppState, ServerConfig, start_server};
