//! User Status
//!
//! - **Active**: normal account
//! - **Disabled**: blocked by an admin
//! - **PendingDeletion**: an erasure request is being processed
//! - **Erased**: personal data scrubbed; terminal

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Disabled,
    PendingDeletion,
    Erased,
}

impl UserStatus {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::PendingDeletion => "pending_deletion",
            Self::Erased => "erased",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "active" => Some(Self::Active),
            "disabled" => Some(Self::Disabled),
            "pending_deletion" => Some(Self::PendingDeletion),
            "erased" => Some(Self::Erased),
            _ => None,
        }
    }

    /// Pending deletion still signs in so the user can follow the request.
    #[inline]
    pub const fn can_login(&self) -> bool {
        matches!(self, Self::Active | Self::PendingDeletion)
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Erased)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for status in [
            UserStatus::Active,
            UserStatus::Disabled,
            UserStatus::PendingDeletion,
            UserStatus::Erased,
        ] {
            assert_eq!(UserStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(UserStatus::from_code("memorial"), None);
    }

    #[test]
    fn test_login_rules() {
        assert!(UserStatus::Active.can_login());
        assert!(UserStatus::PendingDeletion.can_login());
        assert!(!UserStatus::Disabled.can_login());
        assert!(!UserStatus::Erased.can_login());
        assert!(UserStatus::Erased.is_terminal());
    }
}
