//! Domain Services
//!
//! Pure moderation logic: the content filter and the alert throttle.

use chrono::{DateTime, Duration, Utc};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use unicode_normalization::UnicodeNormalization;

use crate::domain::rules::{FilterRule, RuleMatcher, default_rules};
use crate::domain::value_objects::{RuleCategory, Severity, Verdict};
use crate::error::{ModerationError, ModerationResult};

// ============================================================================
// Content Filter
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    pub rule_id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    /// Matched text as it appears after normalisation
    pub matched: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningResult {
    pub matches: Vec<RuleMatch>,
    pub max_severity: Option<Severity>,
    pub verdict: Verdict,
}

impl ScreeningResult {
    pub fn allow() -> Self {
        Self {
            matches: Vec::new(),
            max_severity: None,
            verdict: Verdict::Allow,
        }
    }

    pub fn rule_ids(&self) -> Vec<String> {
        self.matches.iter().map(|m| m.rule_id.clone()).collect()
    }

    /// Distinct categories in rule order
    pub fn categories(&self) -> Vec<RuleCategory> {
        let mut out: Vec<RuleCategory> = Vec::new();
        for m in &self.matches {
            if !out.contains(&m.category) {
                out.push(m.category);
            }
        }
        out
    }
}

struct CompiledRule {
    rule: FilterRule,
    regex: Regex,
}

pub struct ContentFilter {
    rules: Vec<CompiledRule>,
}

impl ContentFilter {
    pub fn new(rules: Vec<FilterRule>) -> ModerationResult<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let source = match &rule.matcher {
                    RuleMatcher::Keywords(words) => keyword_pattern(words),
                    RuleMatcher::Pattern(p) => p.clone(),
                };
                let regex = RegexBuilder::new(&source)
                    .case_insensitive(matches!(rule.matcher, RuleMatcher::Keywords(_)))
                    .build()
                    .map_err(|e| ModerationError::InvalidRule(format!("{}: {}", rule.id, e)))?;
                Ok(CompiledRule { rule, regex })
            })
            .collect::<ModerationResult<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Filter with the built-in rule table
    pub fn with_default_rules() -> ModerationResult<Self> {
        Self::new(default_rules())
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn screen(&self, text: &str) -> ScreeningResult {
        let normalized: String = text.nfkc().collect();
        if normalized.trim().is_empty() {
            return ScreeningResult::allow();
        }

        let matches: Vec<RuleMatch> = self
            .rules
            .iter()
            .filter_map(|compiled| {
                compiled.regex.find(&normalized).map(|m| RuleMatch {
                    rule_id: compiled.rule.id.clone(),
                    category: compiled.rule.category,
                    severity: compiled.rule.severity,
                    matched: m.as_str().to_string(),
                })
            })
            .collect();

        let max_severity = matches.iter().map(|m| m.severity).max();

        ScreeningResult {
            verdict: Verdict::for_severity(max_severity),
            matches,
            max_severity,
        }
    }
}

fn keyword_pattern(words: &[String]) -> String {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| {
            let normalized: String = w.nfkc().collect();
            // Allow any run of whitespace between words of a phrase
            normalized
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .filter(|w| !w.is_empty())
        .collect();

    if alternatives.is_empty() {
        // Never matches
        return r"\b\B".to_string();
    }
    format!(r"\b(?:{})\b", alternatives.join("|"))
}

/// First `max_chars` characters, ellipsised when cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

// ============================================================================
// Alert Throttle
// ============================================================================

/// In-process record of when each alert key last fired, bucketed by UTC day.
/// Not shared between instances.
pub struct AlertThrottle {
    min_interval: Duration,
    sent: Mutex<HashMap<(i64, String), DateTime<Utc>>>,
}

impl AlertThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            sent: Mutex::new(HashMap::new()),
        }
    }

    pub fn should_notify(&self, key: &str) -> bool {
        self.should_notify_at(key, Utc::now())
    }

    /// True when `key` has not fired in this day bucket within the minimum
    /// interval. A `true` answer records `now` as the last send.
    pub fn should_notify_at(&self, key: &str, now: DateTime<Utc>) -> bool {
        let bucket = day_bucket(now);
        let Ok(mut sent) = self.sent.lock() else {
            tracing::error!("Alert throttle lock poisoned, notifying anyway");
            return true;
        };

        sent.retain(|(day, _), _| *day >= bucket);

        let entry_key = (bucket, key.to_string());
        match sent.get(&entry_key) {
            Some(last) if now - *last < self.min_interval => false,
            _ => {
                sent.insert(entry_key, now);
                true
            }
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for AlertThrottle {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}

fn day_bucket(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(86_400)
}
