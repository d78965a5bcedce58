//! Domain Value Objects

use chrono::Duration;
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
                match code.trim() {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DsarKind {
    Access,
    Erasure,
    Rectification,
    OptOutOfSale,
}

text_enum!(DsarKind {
    Access => "access",
    Erasure => "erasure",
    Rectification => "rectification",
    OptOutOfSale => "opt_out_of_sale",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regulation {
    Gdpr,
    Ccpa,
}

text_enum!(Regulation {
    Gdpr => "gdpr",
    Ccpa => "ccpa",
});

impl Regulation {
    /// Statutory response window
    pub fn response_window(&self) -> Duration {
        match self {
            Regulation::Gdpr => Duration::days(30),
            Regulation::Ccpa => Duration::days(45),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DsarStatus {
    Received,
    InProgress,
    Completed,
    Rejected,
}

text_enum!(DsarStatus {
    Received => "received",
    InProgress => "in_progress",
    Completed => "completed",
    Rejected => "rejected",
});

impl DsarStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, DsarStatus::Received | DsarStatus::InProgress)
    }

    /// received → in_progress | rejected, in_progress → completed | rejected
    pub fn can_transition_to(&self, next: DsarStatus) -> bool {
        matches!(
            (self, next),
            (DsarStatus::Received, DsarStatus::InProgress)
                | (DsarStatus::Received, DsarStatus::Rejected)
                | (DsarStatus::InProgress, DsarStatus::Completed)
                | (DsarStatus::InProgress, DsarStatus::Rejected)
        )
    }
}
