// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Driver-error translation.
//!
//! Datasource clients surface raw driver messages; the executors translate
//! them into domain errors here so callers never see driver internals.
//! Matching is against known error shapes for the bundled SQLite engine and
//! the common MySQL-family messages/vendor codes.

use botbridge_core::{BridgeError, DatasourceConfig};

/// Translates a raw driver failure into a user-presentable domain error.
///
/// Unrecognized messages fall through to a generic execution error that
/// still names the datasource, never the driver.
pub fn translate_driver_error(error: BridgeError, config: &DatasourceConfig) -> BridgeError {
    let BridgeError::Datasource { message } = error else {
        return error;
    };
    let lower = message.to_lowercase();

    let friendly = if lower.contains("no such table")
        || lower.contains("doesn't exist")
        || lower.contains("unknown table")
        || message.contains("1146")
    {
        format!("table not found in datasource `{}`", config.name)
    } else if lower.contains("no such column")
        || lower.contains("unknown column")
        || message.contains("1054")
    {
        format!("unknown column referenced in query against `{}`", config.name)
    } else if lower.contains("syntax error")
        || lower.contains("error in your sql syntax")
        || message.contains("1064")
    {
        "SQL syntax error".to_string()
    } else if lower.contains("access denied") || message.contains("1045") {
        format!("access denied to datasource `{}`", config.name)
    } else if lower.contains("unknown database") || message.contains("1049") {
        format!("unknown database for datasource `{}`", config.name)
    } else {
        format!("query against `{}` failed", config.name)
    };

    tracing::debug!(
        datasource = config.id.as_str(),
        engine = config.engine.as_str(),
        driver_message = message.as_str(),
        "translated driver error"
    );

    BridgeError::Execution(friendly)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DatasourceConfig {
        DatasourceConfig {
            id: "ds1".into(),
            name: "warehouse".into(),
            engine: "sqlite".into(),
        }
    }

    fn translate(message: &str) -> String {
        translate_driver_error(
            BridgeError::Datasource {
                message: message.to_string(),
            },
            &config(),
        )
        .to_string()
    }

    #[test]
    fn missing_table_shapes() {
        assert!(translate("no such table: users").contains("table not found"));
        assert!(translate("Table 'db.users' doesn't exist").contains("table not found"));
        assert!(translate("ERROR 1146 (42S02)").contains("table not found"));
    }

    #[test]
    fn unknown_column_shapes() {
        assert!(translate("no such column: agee").contains("unknown column"));
        assert!(translate("Unknown column 'agee' in 'field list'").contains("unknown column"));
    }

    #[test]
    fn syntax_error_shapes() {
        assert!(translate("near \"FORM\": syntax error").contains("syntax error"));
        assert!(translate("You have an error in your SQL syntax").contains("syntax error"));
    }

    #[test]
    fn access_and_database_shapes() {
        assert!(translate("Access denied for user 'x'@'%'").contains("access denied"));
        assert!(translate("Unknown database 'nope'").contains("unknown database"));
    }

    #[test]
    fn unrecognized_message_is_wrapped_not_leaked() {
        let out = translate("SQLITE_IOERR: disk I/O error");
        assert!(out.contains("warehouse"));
        assert!(!out.contains("SQLITE_IOERR"), "driver detail must not leak");
    }

    #[test]
    fn non_datasource_errors_pass_through() {
        let original = BridgeError::SqlRejected("nope".into());
        let out = translate_driver_error(original, &config());
        assert!(matches!(out, BridgeError::SqlRejected(_)));
    }
}
