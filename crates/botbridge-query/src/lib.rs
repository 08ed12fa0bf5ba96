// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQL safety guard and executors for the botbridge pipeline.
//!
//! Untrusted SQL-derived text passes through [`guard`] before any datasource
//! sees it; [`executor`] runs bounded snippets through injected factories and
//! translates driver failures via [`errors`].

pub mod errors;
pub mod executor;
pub mod guard;

pub use errors::translate_driver_error;
pub use executor::{ActionExecutor, ExecuteOptions, QueryExecutor, SqlSnippet};
pub use guard::{apply_limit, ensure_action_safe, ensure_read_only};
