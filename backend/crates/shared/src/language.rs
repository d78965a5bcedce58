//! Supported languages
//!
//! Stories, agent prompts and emails are localized into this fixed set.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    Pt,
    Ar,
    Zh,
    Hi,
    Uk,
    Ru,
    Tl,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::En,
        Language::Es,
        Language::Fr,
        Language::Pt,
        Language::Ar,
        Language::Zh,
        Language::Hi,
        Language::Uk,
        Language::Ru,
        Language::Tl,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::Pt => "pt",
            Language::Ar => "ar",
            Language::Zh => "zh",
            Language::Hi => "hi",
            Language::Uk => "uk",
            Language::Ru => "ru",
            Language::Tl => "tl",
        }
    }

    pub const fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Español",
            Language::Fr => "Français",
            Language::Pt => "Português",
            Language::Ar => "العربية",
            Language::Zh => "中文",
            Language::Hi => "हिन्दी",
            Language::Uk => "Українська",
            Language::Ru => "Русский",
            Language::Tl => "Tagalog",
        }
    }

    pub const fn is_rtl(&self) -> bool {
        matches!(self, Language::Ar)
    }

    /// Accepts bare codes and BCP 47 tags (`es-MX`, `zh_Hans`); only the
    /// primary subtag is looked at.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::ALL.into_iter().find(|lang| lang.code() == primary)
    }

    /// Like [`Language::from_code`] but falls back to English.
    pub fn from_code_or_default(code: Option<&str>) -> Self {
        code.and_then(Self::from_code).unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
