//! Assistant backend port

use kernel::Language;

use crate::domain::value_objects::{AgentKind, Confidence};
use crate::error::AgentResult;

#[derive(Debug, Clone)]
pub struct AssistantRequest {
    pub agent: AgentKind,
    pub language: Language,
    pub system_prompt: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub content: String,
    pub confidence: Confidence,
}

#[trait_variant::make(AssistantClient: Send)]
pub trait LocalAssistantClient {
    async fn complete(&self, request: &AssistantRequest) -> AgentResult<AssistantReply>;
}
