// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering query results into chat-sized replies.

use serde_json::Value;

use botbridge_core::QueryResponse;

/// Rows shown inline before switching to a count header.
const MAX_INLINE_ROWS: usize = 5;

/// Prefers an upstream summary; otherwise renders up to five rows as
/// `"idx. key: value, …"` lines, with a total-count header when truncated.
pub fn format_query_response(response: &QueryResponse) -> String {
    if let Some(ref summary) = response.summary
        && !summary.trim().is_empty()
    {
        return summary.clone();
    }

    let total = response.rows.len();
    if total == 0 {
        return "No data found".to_string();
    }

    let mut out = String::new();
    if total > MAX_INLINE_ROWS {
        out.push_str(&format!("Showing {MAX_INLINE_ROWS} of {total} rows:\n"));
    }
    for (i, row) in response.rows.iter().take(MAX_INLINE_ROWS).enumerate() {
        let fields: Vec<String> = row
            .iter()
            .map(|(key, value)| format!("{key}: {}", render_value(value)))
            .collect();
        out.push_str(&format!("{}. {}\n", i + 1, fields.join(", ")));
    }
    out.trim_end().to_string()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
