// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for botbridge.
//!
//! Two separate concerns share this crate: the botbridge database itself
//! (events, conversations, messages) behind [`SqliteStore`], and the
//! configured analytics datasources behind [`SqliteDatasourceFactory`].

pub mod database;
pub mod datasource;
pub mod queries;
pub mod repository;

pub use database::Database;
pub use datasource::{DatasourceSpec, SqliteDatasourceClient, SqliteDatasourceFactory};
pub use repository::SqliteStore;
