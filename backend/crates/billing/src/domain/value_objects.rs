//! Domain Value Objects

use serde::Serialize;
use std::fmt;

/// Plan tier. Declaration order is rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Starter,
    Official,
    Family,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Starter, Tier::Official, Tier::Family];

    pub const fn code(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Starter => "starter",
            Tier::Official => "official",
            Tier::Family => "family",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "free" => Some(Tier::Free),
            "starter" => Some(Tier::Starter),
            "official" => Some(Tier::Official),
            "family" => Some(Tier::Family),
            _ => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        *self != Tier::Free
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    Stripe,
    Paypal,
}

impl PaymentProvider {
    pub const fn code(&self) -> &'static str {
        match self {
            PaymentProvider::Stripe => "stripe",
            PaymentProvider::Paypal => "paypal",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "stripe" => Some(PaymentProvider::Stripe),
            "paypal" => Some(PaymentProvider::Paypal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Refunded,
    Failed,
}

impl PurchaseStatus {
    pub const fn code(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Completed => "completed",
            PurchaseStatus::Refunded => "refunded",
            PurchaseStatus::Failed => "failed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(PurchaseStatus::Pending),
            "completed" => Some(PurchaseStatus::Completed),
            "refunded" => Some(PurchaseStatus::Refunded),
            "failed" => Some(PurchaseStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What a usage log entry counts against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    FormGeneration,
    AiPrompt,
}

impl UsageKind {
    pub const fn code(&self) -> &'static str {
        match self {
            UsageKind::FormGeneration => "form_generation",
            UsageKind::AiPrompt => "ai_prompt",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "form_generation" => Some(UsageKind::FormGeneration),
            "ai_prompt" => Some(UsageKind::AiPrompt),
            _ => None,
        }
    }
}

impl fmt::Display for UsageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
