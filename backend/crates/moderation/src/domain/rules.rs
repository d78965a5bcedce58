//! Content filter rule table
//!
//! Each rule is either a keyword list (whole word, case-insensitive, matched
//! after NFKC normalisation) or a regular expression.

use crate::domain::value_objects::{RuleCategory, Severity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatcher {
    Keywords(Vec<String>),
    Pattern(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    pub matcher: RuleMatcher,
}

impl FilterRule {
    pub fn keywords(
        id: &str,
        category: RuleCategory,
        severity: Severity,
        words: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            category,
            severity,
            matcher: RuleMatcher::Keywords(words.iter().map(|w| w.to_string()).collect()),
        }
    }

    pub fn pattern(id: &str, category: RuleCategory, severity: Severity, pattern: &str) -> Self {
        Self {
            id: id.to_string(),
            category,
            severity,
            matcher: RuleMatcher::Pattern(pattern.to_string()),
        }
    }
}

/// The built-in rule set
pub fn default_rules() -> Vec<FilterRule> {
    use RuleCategory::*;
    use Severity::*;

    vec![
        FilterRule::keywords(
            "profanity-mild",
            Profanity,
            Low,
            &["damn", "crap", "bloody", "bastard"],
        ),
        FilterRule::keywords(
            "profanity-strong",
            Profanity,
            Medium,
            &["fuck", "fucking", "shit", "bitch", "asshole"],
        ),
        FilterRule::pattern(
            "harassment-xenophobic",
            Harassment,
            High,
            r"(?i)\bgo\s+back\s+to\s+(your|ur)\s+(own\s+)?country\b",
        ),
        FilterRule::keywords(
            "harassment-slurs",
            Harassment,
            High,
            &["illegals", "wetback", "anchor baby"],
        ),
        FilterRule::pattern(
            "harassment-threat",
            Harassment,
            Critical,
            r"(?i)\b(i\s+will|i'?ll|gonna)\s+(kill|hurt|find)\s+you\b",
        ),
        FilterRule::pattern(
            "scam-guarantee",
            Scam,
            High,
            r"(?i)\bguarantee(d)?\s+(visa|green\s*card|approval|citizenship|asylum)\b",
        ),
        FilterRule::pattern(
            "scam-payment",
            Scam,
            High,
            r"(?i)\b(send|wire|transfer)\s+(money|payment|fees?)\s+(via|through|by)\s+(western\s+union|moneygram|gift\s*cards?|crypto|bitcoin)\b",
        ),
        FilterRule::pattern(
            "fraud-buy-documents",
            ImmigrationFraud,
            Critical,
            r"(?i)\b(buy|sell|selling|purchase)\s+(a\s+|an\s+)?(visa|green\s*card|passport|work\s+permit|residence\s+permit|ssn|social\s+security\s+number)s?\b",
        ),
        FilterRule::keywords(
            "fraud-sham",
            ImmigrationFraud,
            High,
            &[
                "sham marriage",
                "fake marriage",
                "marriage for papers",
                "forged documents",
                "fake documents",
            ],
        ),
        FilterRule::pattern(
            "pii-ssn",
            PersonalData,
            Medium,
            r"\b\d{3}-\d{2}-\d{4}\b",
        ),
        FilterRule::pattern(
            "pii-a-number",
            PersonalData,
            Medium,
            r"(?i)\bA-?\d{8,9}\b",
        ),
        FilterRule::pattern(
            "pii-card-number",
            PersonalData,
            Medium,
            r"\b(?:\d[ -]?){13,16}\b",
        ),
        FilterRule::pattern(
            "self-harm",
            SelfHarm,
            Medium,
            r"(?i)\b(kill\s+myself|end\s+my\s+life|want\s+to\s+die|suicide)\b",
        ),
        FilterRule::keywords(
            "spam-solicitation",
            Spam,
            Low,
            &["click here", "dm me", "whatsapp me", "limited offer", "100% guaranteed"],
        ),
        FilterRule::pattern(
            "spam-link-burst",
            Spam,
            Low,
            r"(?is)(https?://\S+.*){3,}",
        ),
    ]
}
