//! Domain Value Objects

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Forms and documents guide
    Mira,
    /// Process and timeline navigator
    Kairo,
    /// Settlement and wellbeing companion
    Lumo,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Mira, AgentKind::Kairo, AgentKind::Lumo];
    pub const DEFAULT: AgentKind = AgentKind::Mira;

    pub const fn code(&self) -> &'static str {
        match self {
            AgentKind::Mira => "mira",
            AgentKind::Kairo => "kairo",
            AgentKind::Lumo => "lumo",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "mira" => Some(AgentKind::Mira),
            "kairo" => Some(AgentKind::Kairo),
            "lumo" => Some(AgentKind::Lumo),
            _ => None,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    LowConfidence,
    LanguageMismatch,
}

impl DriftKind {
    pub const fn code(&self) -> &'static str {
        match self {
            DriftKind::LowConfidence => "low_confidence",
            DriftKind::LanguageMismatch => "language_mismatch",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "low_confidence" => Some(DriftKind::LowConfidence),
            "language_mismatch" => Some(DriftKind::LanguageMismatch),
            _ => None,
        }
    }
}

impl fmt::Display for DriftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A reply's confidence, clamped to `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
