// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQL safety guard: validates and bounds raw SQL text before execution.
//!
//! Two guard levels share the same literal/comment stripping:
//! - [`ensure_read_only`] for ad-hoc queries: single statement, must start
//!   with a read verb, no DML/DDL keywords anywhere.
//! - [`ensure_action_safe`] for admin-authored actions: single statement and
//!   no DDL, but parameterized writes are allowed.
//!
//! Keywords appearing only inside quoted string literals are ignored by both.

use std::sync::LazyLock;

use regex::Regex;

use botbridge_core::BridgeError;

/// Verbs a read-only statement may start with.
const READ_PREFIXES: &[&str] = &["select", "with", "show", "describe", "explain"];

/// Keywords rejected anywhere in a read-only statement.
static WRITE_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(insert|update|delete|drop|alter|truncate|create|grant|revoke)\b")
        .expect("write keyword pattern is valid")
});

/// DDL keywords rejected in action statements.
static DDL_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(drop|alter|truncate|create|grant|revoke)\b")
        .expect("ddl keyword pattern is valid")
});

/// Existing LIMIT clause detector, checked on stripped SQL.
static LIMIT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\blimit\s+\d+").expect("limit pattern is valid")
});

/// Replaces string literal contents and removes comments, preserving
/// everything that could carry executable SQL.
///
/// Handles `'...'` and `"..."` literals with doubled-quote escapes, `--`
/// line comments, `#` line comments, and `/* ... */` block comments.
pub fn strip_literals_and_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                let quote = c;
                // Emit an empty literal so token boundaries survive.
                out.push(quote);
                out.push(quote);
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == quote {
                        // Doubled quote is an escaped quote inside the literal.
                        if chars.peek() == Some(&quote) {
                            chars.next();
                        } else {
                            break;
                        }
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '#' => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

/// Rejects SQL that is not a single read-only statement.
///
/// After stripping literals and comments: any remaining semicolon fails
/// (no multi-statement execution), the statement must start with one of
/// `SELECT | WITH | SHOW | DESCRIBE | EXPLAIN`, and no write keyword may
/// appear as a whole word anywhere.
pub fn ensure_read_only(sql: &str) -> Result<(), BridgeError> {
    let stripped = strip_literals_and_comments(sql);
    let trimmed = stripped.trim();

    if trimmed.is_empty() {
        return Err(BridgeError::SqlRejected("empty statement".to_string()));
    }
    if trimmed.contains(';') {
        return Err(BridgeError::SqlRejected(
            "multi-statement execution is not allowed".to_string(),
        ));
    }

    let first_word = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if !READ_PREFIXES.contains(&first_word.as_str()) {
        return Err(BridgeError::SqlRejected(format!(
            "only read-only statements are allowed (got `{first_word}`)"
        )));
    }

    if let Some(m) = WRITE_KEYWORDS.find(trimmed) {
        return Err(BridgeError::SqlRejected(format!(
            "forbidden keyword `{}` in read-only statement",
            m.as_str().to_lowercase()
        )));
    }

    Ok(())
}

/// Narrower guard for action execution.
///
/// Actions may legitimately run parameterized writes, so non-SELECT
/// statements pass; multi-statement and comment smuggling are blocked the
/// same way as [`ensure_read_only`], and DDL keywords are rejected.
pub fn ensure_action_safe(sql: &str) -> Result<(), BridgeError> {
    let stripped = strip_literals_and_comments(sql);
    let trimmed = stripped.trim();

    if trimmed.is_empty() {
        return Err(BridgeError::SqlRejected("empty statement".to_string()));
    }
    if trimmed.contains(';') {
        return Err(BridgeError::SqlRejected(
            "multi-statement execution is not allowed".to_string(),
        ));
    }
    if let Some(m) = DDL_KEYWORDS.find(trimmed) {
        return Err(BridgeError::SqlRejected(format!(
            "forbidden DDL keyword `{}` in action statement",
            m.as_str().to_lowercase()
        )));
    }

    Ok(())
}

/// Appends `LIMIT n` unless the statement already carries a LIMIT clause.
pub fn apply_limit(sql: &str, limit: u64) -> String {
    let stripped = strip_literals_and_comments(sql);
    if LIMIT_CLAUSE.is_match(&stripped) {
        sql.to_string()
    } else {
        format!("{} LIMIT {limit}", sql.trim_end())
    }
}
