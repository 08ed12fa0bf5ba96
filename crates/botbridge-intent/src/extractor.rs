// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parameter extraction from free-form text against an action's input schema.
//!
//! Three strategies in priority order per declared parameter: explicit
//! `name=value` tokens, bare quoted strings assigned positionally to string
//! parameters, and a parameter name followed by a bare token. Raw tokens are
//! coerced to the declared type; failures produce warnings, never errors.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use botbridge_core::{Action, ParamType, ParameterSpec};

/// `name=value`, `name="quoted"`, or `name='quoted'`.
static NAMED_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)\s*=\s*(?:"([^"]*)"|'([^']*)'|(\S+))"#).unwrap_or_else(|e| panic!("{e}"))
});

/// Bare double-quoted strings.
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).unwrap_or_else(|e| panic!("{e}")));

/// How the parameters were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Pattern-matched against the action's input schema.
    Pattern,
    /// No schema declared; nothing to extract.
    None,
}

/// Extraction outcome: filled parameters plus diagnostics.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub parameters: Map<String, Value>,
    pub method: ExtractionMethod,
    /// Fraction of declared parameters successfully filled, in [0, 1].
    pub confidence: f64,
    pub warnings: Vec<String>,
}

/// Pattern-based parameter extractor.
#[derive(Debug, Default)]
pub struct ParameterExtractor;

impl ParameterExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts parameters for `action` from `text`.
    ///
    /// Missing parameters are recorded as warnings; optional parameters with
    /// a declared default are filled from it. An absent schema yields method
    /// [`ExtractionMethod::None`] with an empty map and one warning.
    pub fn extract(&self, text: &str, action: &Action) -> ExtractionResult {
        let Some(ref schema) = action.input_schema else {
            return ExtractionResult {
                parameters: Map::new(),
                method: ExtractionMethod::None,
                confidence: 0.0,
                warnings: vec![format!(
                    "action `{}` declares no input schema; nothing to extract",
                    action.name
                )],
            };
        };

        let mut parameters = Map::new();
        let mut warnings = Vec::new();

        if schema.parameters.is_empty() {
            return ExtractionResult {
                parameters,
                method: ExtractionMethod::Pattern,
                confidence: 1.0,
                warnings,
            };
        }

        let named = named_pairs(text);
        let mut quoted = positional_quoted(text, &named);
        let mut filled = 0usize;

        for spec in &schema.parameters {
            let raw = named
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&spec.name))
                .map(|(_, value)| value.clone())
                .or_else(|| {
                    if spec.param_type == ParamType::String && !quoted.is_empty() {
                        Some(quoted.remove(0))
                    } else {
                        None
                    }
                })
                .or_else(|| bare_token_after_name(text, &spec.name));

            match raw {
                Some(token) => match coerce(&token, spec) {
                    Ok(value) => {
                        parameters.insert(spec.name.clone(), value);
                        filled += 1;
                    }
                    Err(warning) => warnings.push(warning),
                },
                None => {
                    if let Some(ref default) = spec.default {
                        parameters.insert(spec.name.clone(), default.clone());
                        filled += 1;
                    } else if spec.required {
                        warnings.push(format!("required parameter `{}` not found", spec.name));
                    } else {
                        warnings.push(format!("optional parameter `{}` not found", spec.name));
                    }
                }
            }
        }

        let confidence = if text.trim().is_empty() {
            0.0
        } else {
            filled as f64 / schema.parameters.len() as f64
        };

        ExtractionResult {
            parameters,
            method: ExtractionMethod::Pattern,
            confidence,
            warnings,
        }
    }
}

/// All `name=value` pairs in order of appearance.
fn named_pairs(text: &str) -> Vec<(String, String)> {
    NAMED_PAIR
        .captures_iter(text)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
                .unwrap_or_default();
            (caps[1].to_string(), value.to_string())
        })
        .collect()
}

/// Quoted strings that are not the value side of a `name=value` pair, in
/// order of appearance.
fn positional_quoted(text: &str, named: &[(String, String)]) -> Vec<String> {
    QUOTED
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            // Skip quotes immediately preceded by `=`.
            let before = text[..whole.start()].trim_end();
            if before.ends_with('=') {
                return None;
            }
            Some(caps[1].to_string())
        })
        .filter(|v| !named.iter().any(|(_, nv)| nv == v))
        .collect()
}

/// A bare token immediately following the parameter name, e.g. `limit 10`.
///
/// Case folding is applied per token; lowercasing can change byte lengths,
/// so offsets into a lowercased copy must never slice the original text.
fn bare_token_after_name(text: &str, name: &str) -> Option<String> {
    let name_lower = name.to_lowercase();
    let mut tokens = text.split_whitespace().peekable();
    while let Some(token) = tokens.next() {
        let word = token.trim_matches(|c: char| !c.is_alphanumeric());
        if word.to_lowercase() != name_lower {
            continue;
        }
        let Some(next) = tokens.peek() else {
            break;
        };
        let value = next.trim_matches(|c| c == ',' || c == '.');
        if !value.is_empty() && !value.starts_with('=') {
            return Some(value.to_string());
        }
    }
    None
}

/// Coerces a raw token to the declared parameter type.
fn coerce(raw: &str, spec: &ParameterSpec) -> Result<Value, String> {
    match spec.param_type {
        ParamType::String => Ok(Value::String(raw.to_string())),
        ParamType::Number => {
            if let Ok(n) = raw.parse::<i64>() {
                Ok(Value::Number(n.into()))
            } else if let Ok(f) = raw.parse::<f64>() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("parameter `{}`: `{raw}` is not a finite number", spec.name))
            } else {
                Err(format!(
                    "parameter `{}`: `{raw}` is not a number, omitted",
                    spec.name
                ))
            }
        }
        ParamType::Boolean => match raw.to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "0" => Ok(Value::Bool(false)),
            _ => Err(format!(
                "parameter `{}`: `{raw}` is not a boolean, omitted",
                spec.name
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botbridge_core::InputSchema;

    fn spec(name: &str, param_type: ParamType, required: bool, default: Option<Value>) -> ParameterSpec {
        ParameterSpec {
            name: name.into(),
            param_type,
            required,
            default,
            description: None,
        }
    }

    fn action_with(parameters: Vec<ParameterSpec>) -> Action {
        Action {
            id: "a1".into(),
            name: "lookup".into(),
            description: None,
            action_type: "sql".into(),
            payload: "SELECT 1".into(),
            datasource_id: "ds1".into(),
            input_schema: Some(InputSchema { parameters }),
        }
    }

    #[test]
    fn named_pairs_with_types() {
        let extractor = ParameterExtractor::new();
        let action = action_with(vec![
            spec("userId", ParamType::Number, true, None),
            spec("name", ParamType::String, true, None),
        ]);

        let result = extractor.extract(r#"userId=123 name="John Doe""#, &action);

        assert_eq!(result.method, ExtractionMethod::Pattern);
        assert_eq!(result.parameters["userId"], Value::Number(123.into()));
        assert_eq!(result.parameters["name"], Value::String("John Doe".into()));
        assert_eq!(result.confidence, 1.0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn no_schema_yields_method_none_with_warning() {
        let extractor = ParameterExtractor::new();
        let action = Action {
            input_schema: None,
            ..action_with(vec![])
        };

        let result = extractor.extract("anything", &action);

        assert_eq!(result.method, ExtractionMethod::None);
        assert!(result.parameters.is_empty());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn bare_quoted_string_fills_next_string_parameter() {
        let extractor = ParameterExtractor::new();
        let action = action_with(vec![spec("title", ParamType::String, true, None)]);

        let result = extractor.extract(r#"create with "Quarterly Numbers""#, &action);

        assert_eq!(
            result.parameters["title"],
            Value::String("Quarterly Numbers".into())
        );
    }

    #[test]
    fn name_followed_by_bare_token() {
        let extractor = ParameterExtractor::new();
        let action = action_with(vec![spec("limit", ParamType::Number, true, None)]);

        let result = extractor.extract("show records limit 25 please", &action);

        assert_eq!(result.parameters["limit"], Value::Number(25.into()));
    }

    #[test]
    fn case_folding_that_changes_byte_length_is_safe() {
        let extractor = ParameterExtractor::new();
        let action = action_with(vec![spec("limit", ParamType::Number, true, None)]);

        // 'İ' (U+0130) lowercases to two chars, growing the string.
        let result = extractor.extract("İİİİİİ limit 5", &action);

        assert_eq!(result.parameters["limit"], Value::Number(5.into()));
    }

    #[test]
    fn non_numeric_token_is_omitted_with_warning() {
        let extractor = ParameterExtractor::new();
        let action = action_with(vec![spec("limit", ParamType::Number, true, None)]);

        let result = extractor.extract("limit=lots", &action);

        assert!(!result.parameters.contains_key("limit"));
        assert!(result.warnings.iter().any(|w| w.contains("not a number")));
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn boolean_truthy_falsy_tokens() {
        let extractor = ParameterExtractor::new();
        let action = action_with(vec![
            spec("a", ParamType::Boolean, true, None),
            spec("b", ParamType::Boolean, true, None),
        ]);

        let result = extractor.extract("a=yes b=0", &action);

        assert_eq!(result.parameters["a"], Value::Bool(true));
        assert_eq!(result.parameters["b"], Value::Bool(false));
    }

    #[test]
    fn optional_default_is_filled_when_absent() {
        let extractor = ParameterExtractor::new();
        let action = action_with(vec![spec(
            "region",
            ParamType::String,
            false,
            Some(Value::String("emea".into())),
        )]);

        let result = extractor.extract("run it", &action);

        assert_eq!(result.parameters["region"], Value::String("emea".into()));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn missing_required_warns_without_error() {
        let extractor = ParameterExtractor::new();
        let action = action_with(vec![spec("userId", ParamType::Number, true, None)]);

        let result = extractor.extract("hello", &action);

        assert!(result.parameters.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("required")));
    }

    #[test]
    fn empty_input_has_zero_confidence() {
        let extractor = ParameterExtractor::new();
        let action = action_with(vec![spec(
            "region",
            ParamType::String,
            false,
            Some(Value::String("emea".into())),
        )]);

        let result = extractor.extract("   ", &action);

        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn fractional_numbers_parse() {
        let extractor = ParameterExtractor::new();
        let action = action_with(vec![spec("rate", ParamType::Number, true, None)]);

        let result = extractor.extract("rate=0.75", &action);

        assert_eq!(result.parameters["rate"], serde_json::json!(0.75));
    }
}
