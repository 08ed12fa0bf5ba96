// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic intent classification.
//!
//! Classifies inbound text as an action invocation, an ad-hoc data query, or
//! unknown, using zero-cost heuristic rules. No LLM pre-call, no network, no
//! latency. Action matches require an explicit name/keyword hit (precision
//! over recall); query detection is intentionally permissive with a tie-break
//! favoring the richer, more common query path.

use botbridge_core::{Action, Bot, Intent, IntentResult};

/// Minimum score for an action candidate to count as a match.
const ACTION_THRESHOLD: u32 = 2;

/// Minimum raw score for text to register as a query at all.
const QUERY_THRESHOLD: u32 = 1;

/// Divisor normalizing raw scores into [0, 1] confidence.
const SCORE_NORM: f64 = 7.0;

/// Confidence bonus when the text reads like a question.
const QUESTION_TONE_BIAS: f64 = 0.2;

/// Biased query confidence at or above this routes to query even when the
/// raw score is weak.
const QUERY_CONFIDENCE_FLOOR: f64 = 0.45;

/// Query-indicator keywords, English and Chinese.
const QUERY_KEYWORDS: &[&str] = &[
    // English
    "how many", "count", "total", "what", "how", "why", "when", "where", "which", "search",
    "find", "show", "stats", "statistics", "analyze", "analysis", "data", "report", "trend",
    "average", "sum",
    // Chinese
    "多少", "什么", "怎么", "为什么", "什么时候", "哪里", "哪个", "查询", "查找", "搜索",
    "统计", "分析", "数据", "报表", "报告", "趋势", "平均", "汇总",
];

/// Polite-request markers contributing to question tone.
const POLITE_MARKERS: &[&str] = &["please", "can you", "could you", "请", "帮我", "麻烦"];

/// Sentence-final question particles (Chinese).
const QUESTION_PARTICLES: &[char] = &['吗', '呢', '么'];

/// Best-scoring action candidate.
#[derive(Debug, Clone)]
struct ActionMatch {
    action_id: String,
    action_name: String,
    score: u32,
}

/// Heuristic dispatcher scoring inbound text against enabled actions and
/// query indicators.
#[derive(Debug, Default)]
pub struct IntentDetector;

impl IntentDetector {
    pub fn new() -> Self {
        Self
    }

    /// Classifies `text` for `bot`, considering only actions whose ids appear
    /// in the bot's enabled set.
    pub fn detect(&self, bot: &Bot, text: &str, actions: &[Action]) -> IntentResult {
        let lower = text.to_lowercase();
        if lower.trim().is_empty() {
            return IntentResult::unknown("empty message");
        }

        let action = self.best_action_match(bot, &lower, actions);
        let action_score = action.as_ref().map_or(0, |m| m.score);
        let action_confidence = normalize(action_score);
        let action_matched = action_score >= ACTION_THRESHOLD;

        let query_score = self.query_score(&lower);
        let tone_bias = if has_question_tone(text) {
            QUESTION_TONE_BIAS
        } else {
            0.0
        };
        let query_confidence = (normalize(query_score) + tone_bias).min(1.0);

        // Routing decision order; see each arm's reasoning string.
        if !bot.enable_query {
            return match action {
                Some(m) if action_matched => action_result(m, action_confidence),
                _ => IntentResult::unknown("query disabled and no action keyword matched"),
            };
        }

        let query_strong = query_score >= QUERY_THRESHOLD
            && query_score >= ACTION_THRESHOLD
            && query_confidence >= action_confidence;
        if query_strong {
            return query_result(query_score, query_confidence, tone_bias);
        }

        if query_confidence >= QUERY_CONFIDENCE_FLOOR
            && normalize(query_score) >= action_confidence - QUESTION_TONE_BIAS
        {
            return query_result(query_score, query_confidence, tone_bias);
        }

        if let Some(m) = action
            && action_matched
        {
            return action_result(m, action_confidence);
        }

        if query_score > 0 {
            return query_result(query_score, query_confidence, tone_bias);
        }

        IntentResult::unknown("no action or query indicators matched")
    }

    /// Scores each enabled action: +4 for the full name appearing in the
    /// text, +1 per name token (length > 1), +1 per description token.
    fn best_action_match(&self, bot: &Bot, lower: &str, actions: &[Action]) -> Option<ActionMatch> {
        let mut best: Option<ActionMatch> = None;

        for action in actions {
            if !bot.enabled_actions.contains(&action.id) {
                continue;
            }

            let mut score = 0u32;
            let name_lower = action.name.to_lowercase();
            if contains_word(lower, &name_lower) {
                score += 4;
            }
            for token in tokens(&name_lower) {
                if contains_word(lower, token) {
                    score += 1;
                }
            }
            if let Some(ref description) = action.description {
                for token in tokens(&description.to_lowercase()) {
                    if contains_word(lower, token) {
                        score += 1;
                    }
                }
            }

            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(ActionMatch {
                    action_id: action.id.clone(),
                    action_name: action.name.clone(),
                    score,
                });
            }
        }

        best.filter(|m| m.score > 0)
    }

    /// Counts query-indicator keyword occurrences, +1 each.
    fn query_score(&self, lower: &str) -> u32 {
        QUERY_KEYWORDS
            .iter()
            .map(|kw| lower.matches(kw).count() as u32)
            .sum()
    }
}

fn normalize(score: u32) -> f64 {
    (score as f64 / SCORE_NORM).clamp(0.0, 1.0)
}

/// True when `needle` occurs in `haystack` on token boundaries: an ASCII
/// word must not continue across either edge of the match. Scripts without
/// word separators (CJK) are not held to ASCII boundaries.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        let first = needle.chars().next();
        let last = needle.chars().next_back();
        if edge_ok(before, first) && edge_ok(last, after) {
            return true;
        }
        from = end;
    }
    false
}

fn edge_ok(a: Option<char>, b: Option<char>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !(a.is_ascii_alphanumeric() && b.is_ascii_alphanumeric()),
        _ => true,
    }
}

/// Question marks, sentence-final particles, or polite-request markers.
fn has_question_tone(text: &str) -> bool {
    let trimmed = text.trim_end();
    if trimmed.ends_with('?') || trimmed.ends_with('？') {
        return true;
    }
    if trimmed
        .chars()
        .last()
        .is_some_and(|c| QUESTION_PARTICLES.contains(&c))
    {
        return true;
    }
    let lower = text.to_lowercase();
    POLITE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Splits on non-alphanumeric boundaries, keeping tokens longer than one char.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
}

fn action_result(m: ActionMatch, confidence: f64) -> IntentResult {
    IntentResult {
        intent: Intent::Action,
        reasoning: format!("matched action `{}` with score {}", m.action_name, m.score),
        action_id: Some(m.action_id),
        action_name: Some(m.action_name),
        confidence,
    }
}

fn query_result(score: u32, confidence: f64, bias: f64) -> IntentResult {
    IntentResult {
        intent: Intent::Query,
        action_id: None,
        action_name: None,
        confidence,
        reasoning: format!("{score} query keyword hit(s), question-tone bias {bias:.1}"),
    }
}
