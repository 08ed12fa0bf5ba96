// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-field configuration validation.
//!
//! Runs after deserialization and reports every problem at once instead of
//! failing on the first, so operators can fix a config in one pass.

use std::collections::HashSet;

use crate::model::BridgeConfig;

/// Validate cross-references between bots, platforms, datasources, and actions.
///
/// Returns all diagnostics found; an empty vec means the config is usable.
pub fn validate(config: &BridgeConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let platform_tags: HashSet<&str> = config.platforms.iter().map(|p| p.tag.as_str()).collect();
    let datasource_ids: HashSet<&str> = config.datasources.iter().map(|d| d.id.as_str()).collect();
    let action_ids: HashSet<&str> = config.actions.iter().map(|a| a.id.as_str()).collect();

    let mut seen_bot_ids = HashSet::new();
    for bot in &config.bots {
        if !seen_bot_ids.insert(bot.id.as_str()) {
            errors.push(format!("bots: duplicate bot id `{}`", bot.id));
        }
        if !platform_tags.contains(bot.platform.as_str()) {
            errors.push(format!(
                "bots.{}: unknown platform `{}` (declare it under [[platforms]])",
                bot.id, bot.platform
            ));
        }
        for action_id in &bot.enabled_actions {
            if !action_ids.contains(action_id.as_str()) {
                errors.push(format!(
                    "bots.{}: enabled action `{action_id}` is not declared",
                    bot.id
                ));
            }
        }
        for ds_id in &bot.enabled_datasources {
            if !datasource_ids.contains(ds_id.as_str()) {
                errors.push(format!(
                    "bots.{}: enabled datasource `{ds_id}` is not declared",
                    bot.id
                ));
            }
        }
        if let Some(ref ds_id) = bot.default_datasource_id
            && !datasource_ids.contains(ds_id.as_str())
        {
            errors.push(format!(
                "bots.{}: default datasource `{ds_id}` is not declared",
                bot.id
            ));
        }
        if bot.token.is_empty() {
            errors.push(format!("bots.{}: webhook token must not be empty", bot.id));
        }
    }

    for action in &config.actions {
        if !datasource_ids.contains(action.datasource_id.as_str()) {
            errors.push(format!(
                "actions.{}: datasource `{}` is not declared",
                action.id, action.datasource_id
            ));
        }
    }

    if config.worker.concurrency == 0 {
        errors.push("worker.concurrency must be at least 1".to_string());
    }
    if config.worker.queue_capacity == 0 {
        errors.push("worker.queue_capacity must be at least 1".to_string());
    }
    if config.retry.backoff_multiplier < 1.0 {
        errors.push("retry.backoff_multiplier must be >= 1.0".to_string());
    }
    if config.retry.max_delay_ms < config.retry.initial_delay_ms {
        errors.push("retry.max_delay_ms must be >= retry.initial_delay_ms".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn default_config_validates_clean() {
        let config = BridgeConfig::default();
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn dangling_references_are_reported() {
        let toml = r#"
            [[bots]]
            id = "b1"
            name = "bot"
            platform = "nope"
            token = "t"
            enabled_actions = ["missing-action"]
            default_datasource_id = "missing-ds"
        "#;
        let config = load_config_from_str(toml).unwrap();
        let errors = validate(&config);
        assert_eq!(errors.len(), 3, "errors: {errors:?}");
        assert!(errors.iter().any(|e| e.contains("unknown platform")));
        assert!(errors.iter().any(|e| e.contains("missing-action")));
        assert!(errors.iter().any(|e| e.contains("missing-ds")));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let toml = r#"
            [worker]
            concurrency = 0
        "#;
        let config = load_config_from_str(toml).unwrap();
        let errors = validate(&config);
        assert!(errors.iter().any(|e| e.contains("worker.concurrency")));
    }

    #[test]
    fn backoff_multiplier_below_one_is_rejected() {
        let toml = r#"
            [retry]
            backoff_multiplier = 0.5
        "#;
        let config = load_config_from_str(toml).unwrap();
        let errors = validate(&config);
        assert!(errors.iter().any(|e| e.contains("backoff_multiplier")));
    }
}
