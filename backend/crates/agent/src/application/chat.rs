//! Chat Use Case
//!
//! One user turn with an agent:
//! 1. agent must exist and be enabled
//! 2. message is validated and screened (blocked messages get 422)
//! 3. the caller must have an AI prompt left
//! 4. the assistant answers in the agent's localized persona
//! 5. the prompt is consumed only once a reply arrived
//! 6. confidence is recorded and drift evaluated; the context is touched

use std::sync::Arc;

use billing::{QuotaGate, QuotaStatus, UsageKind};
use kernel::{AuthContext, Language};
use moderation::{ContentScreener, ContentSubmission, ContentType, Verdict};
use serde_json::json;
use uuid::Uuid;

use crate::application::catalog::parse_agent;
use crate::application::config::AgentConfig;
use crate::domain::catalog::localized;
use crate::domain::entities::{AgentContext, ConfidenceScore, DriftSignal};
use crate::domain::ports::{AssistantClient, AssistantRequest};
use crate::domain::repository::{ContextRepository, SignalRepository, ToggleRepository};
use crate::domain::services::{ToggleSet, low_confidence_mean, parse_message};
use crate::domain::value_objects::{AgentKind, Confidence, DriftKind};
use crate::error::{AgentError, AgentResult};

pub struct ChatInput {
    pub message: String,
    /// Overrides the context language for this turn
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub agent: AgentKind,
    pub language: Language,
    pub reply: String,
    pub confidence: Confidence,
    pub quota: QuotaStatus,
}

pub struct ChatUseCase<R, S, Q, C>
where
    R: ContextRepository + ToggleRepository + SignalRepository,
    S: ContentScreener,
    Q: QuotaGate,
    C: AssistantClient,
{
    repo: Arc<R>,
    screener: Arc<S>,
    quota: Arc<Q>,
    assistant: Arc<C>,
    config: Arc<AgentConfig>,
}

impl<R, S, Q, C> ChatUseCase<R, S, Q, C>
where
    R: ContextRepository + ToggleRepository + SignalRepository + Sync,
    S: ContentScreener + Sync,
    Q: QuotaGate + Sync,
    C: AssistantClient + Sync,
{
    pub fn new(
        repo: Arc<R>,
        screener: Arc<S>,
        quota: Arc<Q>,
        assistant: Arc<C>,
        config: Arc<AgentConfig>,
    ) -> Self {
        Self {
            repo,
            screener,
            quota,
            assistant,
            config,
        }
    }

    pub async fn execute(&self, ctx: &AuthContext, agent: &str, input: ChatInput) -> AgentResult<ChatOutcome> {
        let agent = parse_agent(agent)?;
        let toggles = ToggleSet::from_toggles(&self.repo.list_toggles().await?);
        if !toggles.is_enabled(agent) {
            return Err(AgentError::AgentUnavailable(agent));
        }

        let message = parse_message(&input.message)?;
        let requested = match input.language.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(code) => Some(
                Language::from_code(code)
                    .ok_or_else(|| AgentError::Validation(format!("Unsupported language: {}", code)))?,
            ),
            None => None,
        };

        let outcome = self
            .screener
            .screen_submission(ContentSubmission {
                content_type: ContentType::ChatMessage,
                content_id: Uuid::new_v4(),
                author_id: Some(ctx.user_id),
                text: &message,
            })
            .await?;
        if outcome.result.verdict == Verdict::Block {
            tracing::info!(user_id = %ctx.user_id, agent = %agent, "Chat message blocked by screening");
            return Err(AgentError::MessageRejected);
        }

        self.quota.check(&ctx.user_id, UsageKind::AiPrompt).await?;

        let mut context = self
            .repo
            .find_context(&ctx.user_id)
            .await?
            .unwrap_or_else(|| AgentContext::default_for(ctx.user_id, ctx.language));
        let language = requested.unwrap_or(context.language);
        let prompt = localized(agent, language);

        let reply = self
            .assistant
            .complete(&AssistantRequest {
                agent,
                language: prompt.language,
                system_prompt: prompt.system_prompt,
                message,
            })
            .await?;

        let quota = self
            .quota
            .consume(&ctx.user_id, UsageKind::AiPrompt, Some(agent.code()))
            .await?;

        self.repo
            .record_score(&ConfidenceScore::new(ctx.user_id, agent, prompt.language, reply.confidence))
            .await?;
        self.evaluate_drift(agent, prompt.language).await?;

        if language != context.language {
            let signal = DriftSignal::new(
                agent,
                language,
                DriftKind::LanguageMismatch,
                0.0,
                json!({
                    "context_language": context.language.code(),
                    "requested_language": language.code(),
                    "served_language": prompt.language.code(),
                }),
            );
            self.repo.record_drift(&signal).await?;
        }

        context.touch(agent);
        self.repo.save_context(&context).await?;

        tracing::info!(
            user_id = %ctx.user_id,
            agent = %agent,
            language = %prompt.language,
            confidence = reply.confidence.value(),
            remaining = quota.remaining,
            "Chat turn completed"
        );

        Ok(ChatOutcome {
            agent,
            language: prompt.language,
            reply: reply.content,
            confidence: reply.confidence,
            quota,
        })
    }

    async fn evaluate_drift(&self, agent: AgentKind, language: Language) -> AgentResult<()> {
        let window = self.config.drift_window;
        let recent = self.repo.recent_scores(agent, language, window).await?;
        let Some(mean) = low_confidence_mean(&recent, window, self.config.low_confidence_threshold)
        else {
            return Ok(());
        };

        tracing::warn!(agent = %agent, language = %language, mean, "Low confidence drift");
        let signal = DriftSignal::new(
            agent,
            language,
            DriftKind::LowConfidence,
            mean,
            json!({
                "window": window,
                "threshold": self.config.low_confidence_threshold,
            }),
        );
        self.repo.record_drift(&signal).await
    }
}
