// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation threading and context windows.

pub mod tracker;

pub use tracker::{
    ContextOptions, ConversationContext, ConversationTracker, format_context_for_prompt,
};
