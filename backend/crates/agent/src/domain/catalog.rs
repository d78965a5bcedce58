//! Agent catalog and language matrix
//!
//! Each agent supports a subset of the product languages. Asking for an
//! unsupported language yields the English prompt with `fell_back` set.

use kernel::Language;
use serde::Serialize;

use crate::domain::value_objects::AgentKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    pub agent: AgentKind,
    pub name: &'static str,
    pub title: &'static str,
    pub languages: &'static [Language],
}

const MIRA_LANGUAGES: &[Language] = &[
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

const KAIRO_LANGUAGES: &[Language] = &[
    Language::En,
    Language::Es,
    Language::Fr,
    Language::Pt,
    Language::Zh,
    Language::Hi,
];

const LUMO_LANGUAGES: &[Language] = &[
    Language::En,
    Language::Es,
    Language::Ar,
    Language::Uk,
    Language::Ru,
    Language::Tl,
];

pub fn profile(agent: AgentKind) -> AgentProfile {
    match agent {
        AgentKind::Mira => AgentProfile {
            agent,
            name: "Mira",
            title: "Forms & documents guide",
            languages: MIRA_LANGUAGES,
        },
        AgentKind::Kairo => AgentProfile {
            agent,
            name: "Kairo",
            title: "Process & timeline navigator",
            languages: KAIRO_LANGUAGES,
        },
        AgentKind::Lumo => AgentProfile {
            agent,
            name: "Lumo",
            title: "Settlement & wellbeing companion",
            languages: LUMO_LANGUAGES,
        },
    }
}

impl AgentProfile {
    pub fn supports(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedPrompt {
    pub agent: AgentKind,
    pub requested_language: Language,
    /// Language actually served
    pub language: Language,
    pub fell_back: bool,
    /// Clients lay the greeting out right-to-left
    pub rtl: bool,
    pub greeting: String,
    pub system_prompt: String,
}

pub fn localized(agent: AgentKind, requested: Language) -> LocalizedPrompt {
    let profile = profile(agent);
    let language = if profile.supports(requested) {
        requested
    } else {
        Language::En
    };

    LocalizedPrompt {
        agent,
        requested_language: requested,
        language,
        fell_back: language != requested,
        rtl: language.is_rtl(),
        greeting: greeting_template(language).replace("{name}", profile.name),
        system_prompt: format!(
            "{}\n\nAlways reply in {} (language code \"{}\"). {}",
            persona(agent),
            language.native_name(),
            language.code(),
            GUARDRAILS
        ),
    }
}

const GUARDRAILS: &str = "You give general information, not legal advice. Point users to \
official government sources or a licensed immigration lawyer for decisions about their case. \
Never ask for passport numbers, bank details or passwords.";

fn persona(agent: AgentKind) -> &'static str {
    match agent {
        AgentKind::Mira => {
            "You are Mira, a patient guide to immigration forms and documents. \
             Explain which form applies, what each field means and which supporting \
             documents are usually required. Work through forms one section at a time."
        }
        AgentKind::Kairo => {
            "You are Kairo, a navigator for immigration processes and timelines. \
             Lay out the steps in order, typical processing times and the deadlines that \
             matter. Be explicit when timelines vary by country or office."
        }
        AgentKind::Lumo => {
            "You are Lumo, a warm companion for people settling into a new country. \
             Help with housing, schools, healthcare, language learning and finding community. \
             Acknowledge stress kindly and share crisis lines when someone is in distress."
        }
    }
}

fn greeting_template(language: Language) -> &'static str {
    match language {
        Language::En => "Hi, I'm {name}. How can I help you today?",
        Language::Es => "Hola, soy {name}. ¿En qué puedo ayudarte hoy?",
        Language::Fr => "Bonjour, je suis {name}. Comment puis-je vous aider aujourd'hui ?",
        Language::Pt => "Olá, eu sou {name}. Como posso ajudar hoje?",
        Language::Ar => "مرحبًا، أنا {name}. كيف يمكنني مساعدتك اليوم؟",
        Language::Zh => "你好，我是{name}。今天我能帮你做什么？",
        Language::Hi => "नमस्ते, मैं {name} हूँ। आज मैं आपकी कैसे मदद कर सकता हूँ?",
        Language::Uk => "Привіт, я {name}. Чим можу допомогти сьогодні?",
        Language::Ru => "Здравствуйте, я {name}. Чем могу помочь сегодня?",
        Language::Tl => "Kumusta, ako si {name}. Paano kita matutulungan ngayon?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_language_served() {
        let prompt = localized(AgentKind::Kairo, Language::Hi);
        assert_eq!(prompt.language, Language::Hi);
        assert!(!prompt.fell_back);
        assert!(prompt.greeting.contains("Kairo"));
        assert!(prompt.system_prompt.contains("\"hi\""));
        assert!(!prompt.rtl);
    }

    #[test]
    fn test_arabic_prompt_is_rtl() {
        let prompt = localized(AgentKind::Lumo, Language::Ar);
        assert!(!prompt.fell_back);
        assert!(prompt.rtl);
    }

    #[test]
    fn test_unsupported_language_falls_back_to_english() {
        let prompt = localized(AgentKind::Kairo, Language::Uk);
        assert_eq!(prompt.requested_language, Language::Uk);
        assert_eq!(prompt.language, Language::En);
        assert!(prompt.fell_back);
        assert_eq!(prompt.greeting, "Hi, I'm Kairo. How can I help you today?");
    }

    #[test]
    fn test_every_agent_speaks_english() {
        for agent in AgentKind::ALL {
            assert!(profile(agent).supports(Language::En));
        }
    }
}
