//! Use case tests against in-memory fakes

#[cfg(test)]
pub(crate) mod support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use billing::domain::Entitlement;
    use billing::{BillingError, BillingResult, QuotaGate, QuotaStatus, UsageKind};
    use chrono::Utc;
    use kernel::id::UserId;
    use kernel::{Language, Pagination};
    use moderation::{
        ContentFilter, ContentScreener, ContentSubmission, ModerationFlag, ModerationResult,
        ScreeningOutcome, Verdict,
    };

    use crate::domain::entities::{AgentContext, AgentToggle, ConfidenceScore, DriftSignal};
    use crate::domain::ports::{AssistantClient, AssistantReply, AssistantRequest};
    use crate::domain::repository::{ContextRepository, DriftFilter, SignalRepository, ToggleRepository};
    use crate::domain::value_objects::{AgentKind, Confidence};
    use crate::error::{AgentError, AgentResult};

    #[derive(Default)]
    pub struct MemoryAgentRepository {
        pub toggles: Mutex<HashMap<AgentKind, AgentToggle>>,
        pub contexts: Mutex<HashMap<UserId, AgentContext>>,
        pub scores: Mutex<Vec<ConfidenceScore>>,
        pub drift: Mutex<Vec<DriftSignal>>,
    }

    impl MemoryAgentRepository {
        pub fn disable(&self, agent: AgentKind) {
            self.toggles.lock().unwrap().insert(
                agent,
                AgentToggle {
                    agent,
                    enabled: false,
                    updated_by: None,
                    updated_at: Utc::now(),
                },
            );
        }
    }

    impl ToggleRepository for MemoryAgentRepository {
        async fn list_toggles(&self) -> AgentResult<Vec<AgentToggle>> {
            Ok(self.toggles.lock().unwrap().values().cloned().collect())
        }

        async fn save_toggle(&self, toggle: &AgentToggle) -> AgentResult<()> {
            self.toggles.lock().unwrap().insert(toggle.agent, toggle.clone());
            Ok(())
        }
    }

    impl ContextRepository for MemoryAgentRepository {
        async fn find_context(&self, user_id: &UserId) -> AgentResult<Option<AgentContext>> {
            Ok(self.contexts.lock().unwrap().get(user_id).cloned())
        }

        async fn save_context(&self, context: &AgentContext) -> AgentResult<()> {
            self.contexts
                .lock()
                .unwrap()
                .insert(context.user_id, context.clone());
            Ok(())
        }
    }

    impl SignalRepository for MemoryAgentRepository {
        async fn record_score(&self, score: &ConfidenceScore) -> AgentResult<()> {
            self.scores.lock().unwrap().push(score.clone());
            Ok(())
        }

        async fn recent_scores(
            &self,
            agent: AgentKind,
            language: Language,
            limit: usize,
        ) -> AgentResult<Vec<Confidence>> {
            Ok(self
                .scores
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|s| s.agent == agent && s.language == language)
                .take(limit)
                .map(|s| s.score)
                .collect())
        }

        async fn record_drift(&self, signal: &DriftSignal) -> AgentResult<()> {
            self.drift.lock().unwrap().push(signal.clone());
            Ok(())
        }

        async fn list_drift(
            &self,
            filter: &DriftFilter,
            pagination: Pagination,
        ) -> AgentResult<(Vec<DriftSignal>, i64)> {
            let matching: Vec<DriftSignal> = self
                .drift
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|s| filter.agent.is_none_or(|a| s.agent == a))
                .filter(|s| filter.language.is_none_or(|l| s.language == l))
                .filter(|s| filter.kind.is_none_or(|k| s.kind == k))
                .cloned()
                .collect();
            let total = matching.len() as i64;
            let items = matching
                .into_iter()
                .skip(pagination.skip() as usize)
                .take(pagination.limit() as usize)
                .collect();
            Ok((items, total))
        }
    }

    pub struct RuleScreener {
        pub filter: ContentFilter,
    }

    impl Default for RuleScreener {
        fn default() -> Self {
            Self {
                filter: ContentFilter::with_default_rules().unwrap(),
            }
        }
    }

    impl ContentScreener for RuleScreener {
        async fn screen_submission(
            &self,
            submission: ContentSubmission<'_>,
        ) -> ModerationResult<ScreeningOutcome> {
            let result = self.filter.screen(submission.text);
            let flag = if result.verdict == Verdict::Allow {
                None
            } else {
                ModerationFlag::from_screening(
                    submission.content_type,
                    submission.content_id,
                    submission.author_id,
                    &result,
                    submission.text,
                )
            };
            Ok(ScreeningOutcome { result, flag })
        }
    }

    /// Free-tier prompt quota kept in memory
    #[derive(Default)]
    pub struct FreeTierGate {
        pub used: Mutex<HashMap<UserId, i64>>,
        pub agents: Mutex<Vec<Option<String>>>,
    }

    impl FreeTierGate {
        fn status(&self, user_id: &UserId, kind: UsageKind) -> BillingResult<QuotaStatus> {
            let entitlement = Entitlement::free();
            let used = self.used.lock().unwrap().get(user_id).copied().unwrap_or_default();
            let status = QuotaStatus::new(&entitlement, kind, used, Utc::now());
            if !status.allowed() {
                return Err(BillingError::QuotaExceeded {
                    kind,
                    tier: entitlement.tier,
                });
            }
            Ok(status)
        }
    }

    impl QuotaGate for FreeTierGate {
        async fn check(&self, user_id: &UserId, kind: UsageKind) -> BillingResult<QuotaStatus> {
            self.status(user_id, kind)
        }

        async fn consume(
            &self,
            user_id: &UserId,
            kind: UsageKind,
            agent: Option<&str>,
        ) -> BillingResult<QuotaStatus> {
            let status = self.status(user_id, kind)?;
            *self.used.lock().unwrap().entry(*user_id).or_default() += 1;
            self.agents.lock().unwrap().push(agent.map(str::to_string));
            Ok(status.after_use())
        }
    }

    /// Assistant backend that is always down
    pub struct DownAssistant;

    impl AssistantClient for DownAssistant {
        async fn complete(&self, _request: &AssistantRequest) -> AgentResult<AssistantReply> {
            Err(AgentError::Assistant("connection refused".into()))
        }
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;

    use kernel::audit::AuditHandle;
    use kernel::id::UserId;
    use kernel::{AuthContext, Language, Pagination, UserRole};
    use serde_json::json;

    use super::support::*;
    use crate::application::*;
    use crate::domain::value_objects::{AgentKind, DriftKind};
    use crate::error::AgentError;
    use crate::infra::CannedAssistantClient;

    type Chat = ChatUseCase<MemoryAgentRepository, RuleScreener, FreeTierGate, CannedAssistantClient>;

    struct Harness {
        repo: Arc<MemoryAgentRepository>,
        gate: Arc<FreeTierGate>,
        chat: Chat,
        context: AgentContextUseCase<MemoryAgentRepository>,
    }

    fn harness_with(assistant: CannedAssistantClient) -> Harness {
        let repo = Arc::new(MemoryAgentRepository::default());
        let gate = Arc::new(FreeTierGate::default());
        Harness {
            chat: ChatUseCase::new(
                repo.clone(),
                Arc::new(RuleScreener::default()),
                gate.clone(),
                Arc::new(assistant),
                Arc::new(AgentConfig::default()),
            ),
            context: AgentContextUseCase::new(repo.clone()),
            repo,
            gate,
        }
    }

    fn harness() -> Harness {
        harness_with(CannedAssistantClient::new())
    }

    fn user(language: Language) -> AuthContext {
        AuthContext::new(UserId::new(), UserRole::User, language)
    }

    fn admin() -> AuthContext {
        AuthContext::new(UserId::new(), UserRole::Admin, Language::En)
    }

    fn say(message: &str) -> ChatInput {
        ChatInput {
            message: message.into(),
            language: None,
        }
    }

    #[tokio::test]
    async fn test_catalog_reflects_toggles() {
        let h = harness();
        h.repo.disable(AgentKind::Lumo);

        let agents = AgentCatalogUseCase::new(h.repo.clone()).list().await.unwrap();
        assert_eq!(agents.len(), 3);
        let lumo = agents.iter().find(|a| a.profile.agent == AgentKind::Lumo).unwrap();
        assert!(!lumo.enabled);
        assert!(agents.iter().any(|a| a.is_default && a.profile.agent == AgentKind::Mira));

        let catalog = AgentCatalogUseCase::new(h.repo.clone());
        let prompt = catalog.prompt("kairo", Some("ar")).unwrap();
        assert!(prompt.fell_back);
        assert_eq!(prompt.language, Language::En);
        assert!(matches!(catalog.prompt("atlas", None), Err(AgentError::UnknownAgent(_))));
    }

    #[tokio::test]
    async fn test_context_defaults_and_disabled_fallback() {
        let h = harness();
        let ctx = user(Language::Uk);

        let context = h.context.resolve(&ctx).await.unwrap();
        assert_eq!(context.active_agent, AgentKind::Mira);
        assert_eq!(context.language, Language::Uk);
        assert!(h.repo.contexts.lock().unwrap().is_empty());

        h.context
            .update(
                &ctx,
                UpdateContextInput {
                    agent: Some("lumo".into()),
                    language: Some("es".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(h.context.resolve(&ctx).await.unwrap().active_agent, AgentKind::Lumo);

        h.repo.disable(AgentKind::Lumo);
        let context = h.context.resolve(&ctx).await.unwrap();
        assert_eq!(context.active_agent, AgentKind::Mira);
        assert_eq!(context.language, Language::Es);
    }

    #[tokio::test]
    async fn test_switching_to_disabled_agent_is_refused() {
        let h = harness();
        h.repo.disable(AgentKind::Kairo);
        let ctx = user(Language::En);

        let err = h
            .context
            .update(
                &ctx,
                UpdateContextInput {
                    agent: Some("kairo".into()),
                    language: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = h
            .context
            .update(
                &ctx,
                UpdateContextInput {
                    agent: None,
                    language: Some("xx".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[tokio::test]
    async fn test_metadata_merge() {
        let h = harness();
        let ctx = user(Language::En);

        let err = h
            .context
            .update_metadata(&ctx, json!({"visa": "f1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ContextNotFound));

        h.context.update(&ctx, UpdateContextInput::default()).await.unwrap();
        h.context
            .update_metadata(&ctx, json!({"visa": "f1", "step": 1}))
            .await
            .unwrap();
        let context = h
            .context
            .update_metadata(&ctx, json!({"step": 2, "visa": null}))
            .await
            .unwrap();
        assert_eq!(serde_json::Value::Object(context.metadata), json!({"step": 2}));

        let err = h
            .context
            .update_metadata(&ctx, json!({"notes": "x".repeat(9000)}))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_chat_turn_records_everything() {
        let h = harness();
        let ctx = user(Language::Es);

        let outcome = h
            .chat
            .execute(&ctx, "lumo", say("¿Cómo encuentro una escuela para mis hijos?"))
            .await
            .unwrap();
        assert_eq!(outcome.agent, AgentKind::Lumo);
        assert_eq!(outcome.language, Language::Es);
        assert!(outcome.reply.starts_with("Hola, soy Lumo."));
        assert_eq!(outcome.quota.remaining, 9);

        assert_eq!(h.gate.agents.lock().unwrap().as_slice(), &[Some("lumo".to_string())]);
        assert_eq!(h.repo.scores.lock().unwrap().len(), 1);
        assert!(h.repo.drift.lock().unwrap().is_empty());

        let context = h.repo.contexts.lock().unwrap().get(&ctx.user_id).cloned().unwrap();
        assert_eq!(context.active_agent, AgentKind::Lumo);
        assert!(context.last_interaction_at.is_some());
    }

    #[tokio::test]
    async fn test_chat_refusals_consume_no_quota() {
        let h = harness();
        let ctx = user(Language::En);

        h.repo.disable(AgentKind::Kairo);
        let err = h.chat.execute(&ctx, "kairo", say("When is my interview?")).await.unwrap_err();
        assert!(matches!(err, AgentError::AgentUnavailable(AgentKind::Kairo)));
        assert_eq!(err.to_app_error().message(), "agent unavailable");

        let err = h.chat.execute(&ctx, "mira", say("   ")).await.unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));

        let err = h
            .chat
            .execute(
                &ctx,
                "mira",
                say("Guaranteed visa in 10 days! Send money via Western Union to my agent"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 422);

        assert!(matches!(
            h.chat.execute(&ctx, "atlas", say("hi")).await,
            Err(AgentError::UnknownAgent(_))
        ));
        assert!(h.gate.agents.lock().unwrap().is_empty());
        assert!(h.repo.scores.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_free_prompts_run_out() {
        let h = harness();
        let ctx = user(Language::En);

        for _ in 0..10 {
            h.chat.execute(&ctx, "mira", say("Which form do I need?")).await.unwrap();
        }
        let err = h.chat.execute(&ctx, "mira", say("One more?")).await.unwrap_err();
        assert_eq!(err.status_code(), 402);
        assert_eq!(h.repo.scores.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_assistant_failure_keeps_prompt() {
        let repo = Arc::new(MemoryAgentRepository::default());
        let gate = Arc::new(FreeTierGate::default());
        let chat = ChatUseCase::new(
            repo.clone(),
            Arc::new(RuleScreener::default()),
            gate.clone(),
            Arc::new(DownAssistant),
            Arc::new(AgentConfig::default()),
        );
        let ctx = user(Language::En);

        for _ in 0..11 {
            let err = chat.execute(&ctx, "mira", say("Which form do I need?")).await.unwrap_err();
            assert_eq!(err.status_code(), 502);
        }
        assert!(gate.used.lock().unwrap().get(&ctx.user_id).is_none());
        assert!(gate.agents.lock().unwrap().is_empty());
        assert!(repo.scores.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_low_confidence_drift_after_full_window() {
        let h = harness_with(CannedAssistantClient::with_confidence(0.3));
        let ctx = user(Language::En);

        for _ in 0..4 {
            h.chat.execute(&ctx, "kairo", say("How long does it take?")).await.unwrap();
        }
        assert!(h.repo.drift.lock().unwrap().is_empty());

        h.chat.execute(&ctx, "kairo", say("And after that?")).await.unwrap();
        let drift = h.repo.drift.lock().unwrap().clone();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].kind, DriftKind::LowConfidence);
        assert_eq!(drift[0].agent, AgentKind::Kairo);
        assert!((drift[0].value - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_language_mismatch_signal() {
        let h = harness();
        let ctx = user(Language::En);

        let outcome = h
            .chat
            .execute(
                &ctx,
                "kairo",
                ChatInput {
                    message: "Скільки триває розгляд?".into(),
                    language: Some("uk".into()),
                },
            )
            .await
            .unwrap();
        // Kairo has no Ukrainian persona
        assert_eq!(outcome.language, Language::En);

        let drift = h.repo.drift.lock().unwrap().clone();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].kind, DriftKind::LanguageMismatch);
        assert_eq!(drift[0].language, Language::Uk);
        assert_eq!(drift[0].details["served_language"], "en");
    }

    #[tokio::test]
    async fn test_toggles_are_admin_only_and_audited() {
        let h = harness();
        let (audit, mut rx) = AuditHandle::channel(8);
        let toggles = SetToggleUseCase::new(h.repo.clone(), audit);

        let err = toggles
            .execute(&user(Language::En), "lumo", false, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(h.repo.toggles.lock().unwrap().is_empty());

        let admin = admin();
        let toggle = toggles
            .execute(&admin, "lumo", false, Some("203.0.113.9".into()))
            .await
            .unwrap();
        assert!(!toggle.enabled);
        assert_eq!(toggle.updated_by, Some(admin.user_id));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.action, "agent.disabled");
        assert_eq!(event.target_type, "agent");
        assert_eq!(event.target_id.as_deref(), Some("lumo"));
    }

    #[tokio::test]
    async fn test_drift_report() {
        let h = harness_with(CannedAssistantClient::with_confidence(0.1));
        let ctx = user(Language::En);
        for _ in 0..6 {
            h.chat.execute(&ctx, "mira", say("Is this right?")).await.unwrap();
        }
        h.chat
            .execute(
                &ctx,
                "mira",
                ChatInput {
                    message: "¿Y ahora?".into(),
                    language: Some("es".into()),
                },
            )
            .await
            .unwrap();

        let report = DriftReportUseCase::new(h.repo.clone());
        assert_eq!(
            report
                .execute(&ctx, DriftQuery::default(), Pagination::default())
                .await
                .unwrap_err()
                .status_code(),
            403
        );

        let all = report
            .execute(&admin(), DriftQuery::default(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(all.total, 3);

        let mismatches = report
            .execute(
                &admin(),
                DriftQuery {
                    kind: Some("language_mismatch".into()),
                    ..Default::default()
                },
                Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(mismatches.total, 1);

        assert!(
            report
                .execute(
                    &admin(),
                    DriftQuery {
                        agent: Some("atlas".into()),
                        ..Default::default()
                    },
                    Pagination::default(),
                )
                .await
                .is_err()
        );
    }
}
