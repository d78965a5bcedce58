//! Domain Value Objects
//!
//! Enum vocabularies stored as snake_case text.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

/// Ordered: `Severity::High >= Severity::Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

text_enum!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

impl Severity {
    /// Every severity at or above `self`
    pub fn and_above(self) -> Vec<Severity> {
        Self::ALL.iter().copied().filter(|s| *s >= self).collect()
    }

    pub fn is_alerting(&self) -> bool {
        *self >= Severity::High
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Profanity,
    Harassment,
    Scam,
    ImmigrationFraud,
    PersonalData,
    SelfHarm,
    Spam,
}

text_enum!(RuleCategory {
    Profanity => "profanity",
    Harassment => "harassment",
    Scam => "scam",
    ImmigrationFraud => "immigration_fraud",
    PersonalData => "personal_data",
    SelfHarm => "self_harm",
    Spam => "spam",
});

/// What kind of content a flag points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Story,
    ChatMessage,
    Media,
}

text_enum!(ContentType {
    Story => "story",
    ChatMessage => "chat_message",
    Media => "media",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagStatus {
    #[default]
    Open,
    Resolved,
    Dismissed,
}

text_enum!(FlagStatus {
    Open => "open",
    Resolved => "resolved",
    Dismissed => "dismissed",
});

/// Screening outcome for a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    Review,
    Block,
}

text_enum!(Verdict {
    Allow => "allow",
    Review => "review",
    Block => "block",
});

impl Verdict {
    pub fn for_severity(severity: Option<Severity>) -> Self {
        match severity {
            None => Verdict::Allow,
            Some(Severity::Low | Severity::Medium) => Verdict::Review,
            Some(Severity::High | Severity::Critical) => Verdict::Block,
        }
    }
}

/// Moderator decision on an open flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Content is fine, publish it
    Approve,
    /// Content violates policy, keep it hidden
    Reject,
    /// False positive, leave content as it is
    Dismiss,
}

text_enum!(ReviewDecision {
    Approve => "approve",
    Reject => "reject",
    Dismiss => "dismiss",
});

impl ReviewDecision {
    pub fn resulting_status(&self) -> FlagStatus {
        match self {
            ReviewDecision::Approve | ReviewDecision::Reject => FlagStatus::Resolved,
            ReviewDecision::Dismiss => FlagStatus::Dismissed,
        }
    }

    pub fn content_decision(&self) -> Option<ContentDecision> {
        match self {
            ReviewDecision::Approve => Some(ContentDecision::Publish),
            ReviewDecision::Reject => Some(ContentDecision::Reject),
            ReviewDecision::Dismiss => None,
        }
    }
}

/// Visibility change pushed to the owning content store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentDecision {
    Publish,
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_by_severity() {
        assert_eq!(Verdict::for_severity(None), Verdict::Allow);
        assert_eq!(Verdict::for_severity(Some(Severity::Low)), Verdict::Review);
        assert_eq!(Verdict::for_severity(Some(Severity::Medium)), Verdict::Review);
        assert_eq!(Verdict::for_severity(Some(Severity::High)), Verdict::Block);
        assert_eq!(Verdict::for_severity(Some(Severity::Critical)), Verdict::Block);
    }

    #[test]
    fn test_severity_and_above() {
        assert_eq!(
            Severity::High.and_above(),
            vec![Severity::High, Severity::Critical]
        );
        assert_eq!(Severity::Low.and_above().len(), 4);
    }

    #[test]
    fn test_codes_round_trip() {
        for category in RuleCategory::ALL {
            assert_eq!(RuleCategory::from_code(category.code()), Some(*category));
        }
        assert_eq!(ContentType::from_code("chat_message"), Some(ContentType::ChatMessage));
        assert_eq!(FlagStatus::from_code("closed"), None);
    }
}
