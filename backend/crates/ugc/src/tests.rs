//! Use case tests against in-memory fakes

#[cfg(test)]
pub(crate) mod support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use kernel::Pagination;
    use kernel::id::{MediaId, StoryId, UserId};
    use moderation::{
        ContentFilter, ContentScreener, ContentSubmission, ModerationFlag, ModerationResult,
        ScreeningOutcome, Verdict,
    };

    use crate::domain::entities::{Category, Media, Story};
    use crate::domain::filter::{ExportFilter, StoryFilter};
    use crate::domain::repository::{
        AuthorContact, AuthorDirectory, CategoryRepository, MediaRepository, MediaStorage,
        StoryRepository,
    };
    use crate::domain::value_objects::{CategorySlug, StoryStatus};
    use crate::error::UgcResult;

    #[derive(Default)]
    pub struct MemoryUgcRepository {
        pub stories: Mutex<Vec<Story>>,
        pub categories: Mutex<Vec<Category>>,
        pub media: Mutex<Vec<Media>>,
        pub contacts: Mutex<HashMap<UserId, AuthorContact>>,
    }

    impl MemoryUgcRepository {
        pub fn with_category(slug: &str, active: bool) -> Self {
            let repo = Self::default();
            let mut category = Category::new(
                CategorySlug::parse(slug).unwrap(),
                "Work visas".into(),
                None,
                1,
            );
            category.is_active = active;
            repo.categories.lock().unwrap().push(category);
            repo
        }
    }

    impl StoryRepository for MemoryUgcRepository {
        async fn create(&self, story: &Story) -> UgcResult<()> {
            self.stories.lock().unwrap().push(story.clone());
            Ok(())
        }

        async fn find_by_id(&self, story_id: &StoryId) -> UgcResult<Option<Story>> {
            Ok(self
                .stories
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.story_id == *story_id)
                .cloned())
        }

        async fn list_published(
            &self,
            filter: &StoryFilter,
            pagination: Pagination,
        ) -> UgcResult<(Vec<Story>, i64)> {
            let stories = self.stories.lock().unwrap();
            let mut matching: Vec<Story> = stories
                .iter()
                .filter(|s| s.status == StoryStatus::Published)
                .filter(|s| filter.language.is_none_or(|l| s.language == l))
                .filter(|s| filter.category.as_ref().is_none_or(|c| &s.category_slug == c))
                .filter(|s| {
                    filter.country.as_ref().is_none_or(|c| {
                        s.country_of_origin.as_ref() == Some(c)
                            || s.destination_country.as_ref() == Some(c)
                    })
                })
                .filter(|s| {
                    filter.search.as_ref().is_none_or(|q| {
                        let q = q.to_lowercase();
                        s.title.as_str().to_lowercase().contains(&q)
                            || s.body.as_str().to_lowercase().contains(&q)
                    })
                })
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.published_at.cmp(&a.published_at));
            let total = matching.len() as i64;
            let page = matching
                .into_iter()
                .skip(pagination.skip() as usize)
                .take(pagination.limit() as usize)
                .collect();
            Ok((page, total))
        }

        async fn list_by_author(
            &self,
            author_id: &UserId,
            pagination: Pagination,
        ) -> UgcResult<(Vec<Story>, i64)> {
            let stories = self.stories.lock().unwrap();
            let mine: Vec<Story> = stories
                .iter()
                .rev()
                .filter(|s| s.is_authored_by(author_id))
                .cloned()
                .collect();
            let total = mine.len() as i64;
            Ok((
                mine.into_iter()
                    .skip(pagination.skip() as usize)
                    .take(pagination.limit() as usize)
                    .collect(),
                total,
            ))
        }

        async fn update_status(&self, story: &Story) -> UgcResult<bool> {
            let mut stories = self.stories.lock().unwrap();
            match stories.iter_mut().find(|s| s.story_id == story.story_id) {
                Some(stored) => {
                    *stored = story.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn export(&self, filter: &ExportFilter) -> UgcResult<Vec<Story>> {
            Ok(self
                .stories
                .lock()
                .unwrap()
                .iter()
                .filter(|s| filter.status.is_none_or(|st| s.status == st))
                .filter(|s| filter.from.is_none_or(|f| s.created_at >= f))
                .filter(|s| filter.to.is_none_or(|t| s.created_at < t))
                .cloned()
                .collect())
        }
    }

    impl CategoryRepository for MemoryUgcRepository {
        async fn list_active(&self) -> UgcResult<Vec<Category>> {
            let mut active: Vec<Category> = self
                .categories
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.is_active)
                .cloned()
                .collect();
            active.sort_by_key(|c| c.sort_order);
            Ok(active)
        }

        async fn find_by_slug(&self, slug: &CategorySlug) -> UgcResult<Option<Category>> {
            Ok(self
                .categories
                .lock()
                .unwrap()
                .iter()
                .find(|c| &c.slug == slug)
                .cloned())
        }

        async fn create(&self, category: &Category) -> UgcResult<bool> {
            let mut categories = self.categories.lock().unwrap();
            if categories.iter().any(|c| c.slug == category.slug) {
                return Ok(false);
            }
            categories.push(category.clone());
            Ok(true)
        }
    }

    impl MediaRepository for MemoryUgcRepository {
        async fn create(&self, media: &Media) -> UgcResult<()> {
            self.media.lock().unwrap().push(media.clone());
            Ok(())
        }

        async fn find_owned(&self, ids: &[MediaId], owner: &UserId) -> UgcResult<Vec<Media>> {
            Ok(self
                .media
                .lock()
                .unwrap()
                .iter()
                .filter(|m| ids.contains(&m.media_id) && m.owner_id.as_ref() == Some(owner))
                .cloned()
                .collect())
        }
    }

    impl AuthorDirectory for MemoryUgcRepository {
        async fn contact(&self, user_id: &UserId) -> UgcResult<Option<AuthorContact>> {
            Ok(self.contacts.lock().unwrap().get(user_id).cloned())
        }
    }

    /// Screens with the default rule table; opens a flag for anything not allowed
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

    #[derive(Default)]
    pub struct MemoryStorage {
        pub files: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MediaStorage for MemoryStorage {
        async fn put(&self, relative_path: &str, bytes: &[u8]) -> UgcResult<()> {
            self.files
                .lock()
                .unwrap()
                .insert(relative_path.to_string(), bytes.to_vec());
            Ok(())
        }
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;

    use kernel::audit::AuditHandle;
    use kernel::id::{MediaId, UserId};
    use kernel::{AuthContext, Language, Pagination, UserRole};
    use moderation::{ContentDecision, ContentType};
    use platform::mailer::{EmailTemplate, LogMailer};

    use super::support::*;
    use crate::application::*;
    use crate::domain::entities::Media;
    use crate::domain::filter::{ExportQuery, StoryQuery};
    use crate::domain::repository::AuthorContact;
    use crate::domain::value_objects::StoryStatus;
    use crate::error::UgcError;

    const BODY: &str = "After eight months of paperwork we finally landed in Toronto and \
                        found a small flat close to the language school.";
    const SCAM: &str = "Guaranteed visa in 10 days! Send money via Western Union to my agent \
                        and skip the whole embassy interview process entirely.";

    fn user() -> AuthContext {
        AuthContext::new(UserId::new(), UserRole::User, Language::En)
    }

    fn admin() -> AuthContext {
        AuthContext::new(UserId::new(), UserRole::Admin, Language::En)
    }

    struct Harness {
        repo: Arc<MemoryUgcRepository>,
        mailer: Arc<LogMailer>,
        submit: SubmitStoryUseCase<MemoryUgcRepository, RuleScreener, LogMailer>,
    }

    fn harness_with(config: UgcConfig) -> Harness {
        let repo = Arc::new(MemoryUgcRepository::with_category("work-visas", true));
        let mailer = Arc::new(LogMailer::new());
        let submit = SubmitStoryUseCase::new(
            repo.clone(),
            Arc::new(RuleScreener::default()),
            mailer.clone(),
            AuditHandle::disconnected(),
            Arc::new(config),
        );
        Harness {
            repo,
            mailer,
            submit,
        }
    }

    fn harness() -> Harness {
        harness_with(UgcConfig::default())
    }

    fn input(title: &str, body: &str) -> SubmitStoryInput {
        SubmitStoryInput {
            title: title.into(),
            body: body.into(),
            language: None,
            category: "work-visas".into(),
            country_of_origin: Some("mx".into()),
            destination_country: Some("CA".into()),
            is_anonymous: false,
            media_ids: vec![],
            ip: None,
        }
    }

    fn register_contact(h: &Harness, ctx: &AuthContext) {
        h.repo.contacts.lock().unwrap().insert(
            ctx.user_id,
            AuthorContact {
                email: "author@example.org".into(),
                language: Language::Es,
            },
        );
    }

    #[tokio::test]
    async fn test_clean_story_is_published() {
        let h = harness();
        let ctx = user();
        register_contact(&h, &ctx);

        let story = h.submit.execute(&ctx, input("Arrival in Toronto", BODY)).await.unwrap();
        assert_eq!(story.status, StoryStatus::Published);
        assert!(story.published_at.is_some());
        assert_eq!(story.country_of_origin.as_ref().unwrap().as_str(), "MX");
        assert_eq!(story.language, Language::En);

        let sent = h.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template, EmailTemplate::StoryPublished);
        assert_eq!(sent[0].language, "es");
    }

    #[tokio::test]
    async fn test_clean_story_pending_without_auto_publish() {
        let h = harness_with(UgcConfig {
            auto_publish: false,
            ..UgcConfig::default()
        });
        let ctx = user();
        register_contact(&h, &ctx);

        let story = h.submit.execute(&ctx, input("Arrival in Toronto", BODY)).await.unwrap();
        assert_eq!(story.status, StoryStatus::Pending);
        assert!(story.published_at.is_none());
        assert_eq!(h.mailer.sent()[0].template, EmailTemplate::StoryReceived);
    }

    #[tokio::test]
    async fn test_review_level_story_is_flagged() {
        let h = harness();
        let body = format!("{} The damn office lost my file twice.", BODY);
        let story = h.submit.execute(&user(), input("Lost paperwork", &body)).await.unwrap();
        assert_eq!(story.status, StoryStatus::Flagged);
        assert!(story.moderation_severity.is_some());
    }

    #[tokio::test]
    async fn test_blocked_story_is_kept_rejected() {
        let h = harness();
        let ctx = user();
        register_contact(&h, &ctx);

        let err = h.submit.execute(&ctx, input("Fast track", SCAM)).await.unwrap_err();
        assert!(matches!(err, UgcError::ContentRejected));
        assert_eq!(err.status_code(), 422);

        let stored = h.repo.stories.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, StoryStatus::Rejected);
        assert_eq!(h.mailer.sent()[0].template, EmailTemplate::StoryRejected);
    }

    #[tokio::test]
    async fn test_submission_validation() {
        let h = harness();
        let ctx = user();

        let short = h.submit.execute(&ctx, input("Hi", BODY)).await.unwrap_err();
        assert_eq!(short.status_code(), 400);

        let thin = h.submit.execute(&ctx, input("Arrival", "Too short.")).await.unwrap_err();
        assert_eq!(thin.status_code(), 400);

        let mut unknown = input("Arrival in Toronto", BODY);
        unknown.category = "housing".into();
        let err = h.submit.execute(&ctx, unknown).await.unwrap_err();
        assert!(matches!(err, UgcError::CategoryNotFound));

        let mut bad_lang = input("Arrival in Toronto", BODY);
        bad_lang.language = Some("xx".into());
        assert_eq!(h.submit.execute(&ctx, bad_lang).await.unwrap_err().status_code(), 400);
    }

    #[tokio::test]
    async fn test_inactive_category_rejected() {
        let repo = Arc::new(MemoryUgcRepository::with_category("work-visas", false));
        let submit = SubmitStoryUseCase::new(
            repo,
            Arc::new(RuleScreener::default()),
            Arc::new(LogMailer::new()),
            AuditHandle::disconnected(),
            Arc::new(UgcConfig::default()),
        );
        let err = submit
            .execute(&user(), input("Arrival in Toronto", BODY))
            .await
            .unwrap_err();
        assert!(matches!(err, UgcError::CategoryNotFound));
    }

    #[tokio::test]
    async fn test_media_must_belong_to_author() {
        let h = harness();
        let ctx = user();
        let other = user();

        let media_for = |owner: &AuthContext| Media {
            media_id: MediaId::new(),
            owner_id: Some(owner.user_id),
            storage_path: "2026/10/x.png".into(),
            mime_type: "image/png".into(),
            size_bytes: 10,
            sha256: "00".into(),
            original_filename: None,
            created_at: chrono::Utc::now(),
        };
        let mine = media_for(&ctx);
        let theirs = media_for(&other);
        h.repo.media.lock().unwrap().extend([mine.clone(), theirs.clone()]);

        let mut ok = input("Arrival in Toronto", BODY);
        ok.media_ids = vec![mine.media_id.to_string(), mine.media_id.to_string()];
        let story = h.submit.execute(&ctx, ok).await.unwrap();
        assert_eq!(story.media_ids, vec![mine.media_id]);

        let mut stolen = input("Arrival in Toronto", BODY);
        stolen.media_ids = vec![theirs.media_id.to_string()];
        let err = h.submit.execute(&ctx, stolen).await.unwrap_err();
        assert!(matches!(err, UgcError::MediaNotOwned));
    }

    #[tokio::test]
    async fn test_browse_only_published() {
        let h = harness_with(UgcConfig {
            auto_publish: false,
            ..UgcConfig::default()
        });
        let author = user();
        let pending = h.submit.execute(&author, input("Arrival in Toronto", BODY)).await.unwrap();

        let browse = BrowseStoriesUseCase::new(h.repo.clone());
        let page = browse.list(&StoryQuery::default()).await.unwrap();
        assert_eq!(page.total, 0);

        // Hidden from the public, visible to the author and moderators
        assert!(matches!(
            browse.get(None, &pending.story_id).await,
            Err(UgcError::StoryNotFound)
        ));
        assert!(browse.get(Some(&author), &pending.story_id).await.is_ok());
        let moderator = AuthContext::new(UserId::new(), UserRole::Moderator, Language::En);
        assert!(browse.get(Some(&moderator), &pending.story_id).await.is_ok());

        let mine = browse.mine(&author, Pagination::default()).await.unwrap();
        assert_eq!(mine.total, 1);
    }

    #[tokio::test]
    async fn test_browse_filters_and_category_listing() {
        let h = harness();
        let ctx = user();
        h.submit.execute(&ctx, input("Arrival in Toronto", BODY)).await.unwrap();

        let mut spanish = input("Llegada a Madrid", BODY);
        spanish.language = Some("es".into());
        spanish.destination_country = Some("ES".into());
        h.submit.execute(&ctx, spanish).await.unwrap();

        let browse = BrowseStoriesUseCase::new(h.repo.clone());
        let es = browse
            .list(&StoryQuery {
                language: Some("es".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(es.total, 1);
        assert_eq!(es.items[0].title.as_str(), "Llegada a Madrid");

        let canada = browse
            .list(&StoryQuery {
                country: Some("ca".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(canada.total, 1);

        let (category, page) = browse
            .list_by_category("work-visas", &StoryQuery::default())
            .await
            .unwrap();
        assert_eq!(category.slug.as_str(), "work-visas");
        assert_eq!(page.total, 2);

        assert!(matches!(
            browse.list_by_category("nope", &StoryQuery::default()).await,
            Err(UgcError::CategoryNotFound)
        ));
    }

    #[tokio::test]
    async fn test_moderator_decision_publishes_flagged_story() {
        let h = harness();
        let body = format!("{} The damn office lost my file twice.", BODY);
        let mut story = h.submit.execute(&user(), input("Lost paperwork", &body)).await.unwrap();
        assert_eq!(story.status, StoryStatus::Flagged);

        story.apply_decision(ContentDecision::Publish);
        assert_eq!(story.status, StoryStatus::Published);
        assert!(story.published_at.is_some());
        assert_eq!(ContentType::Story.code(), "story");
    }

    #[tokio::test]
    async fn test_category_admin() {
        let repo = Arc::new(MemoryUgcRepository::default());
        let (audit, mut rx) = AuditHandle::channel(8);
        let use_case = ManageCategoriesUseCase::new(repo.clone(), audit);

        let input = || CreateCategoryInput {
            slug: "family-reunification".into(),
            name: " Family reunification ".into(),
            description: Some("  ".into()),
            sort_order: Some(3),
        };

        let forbidden = use_case.create(&user(), input()).await.unwrap_err();
        assert_eq!(forbidden.status_code(), 403);

        let created = use_case.create(&admin(), input()).await.unwrap();
        assert_eq!(created.name, "Family reunification");
        assert!(created.description.is_none());
        assert_eq!(rx.recv().await.unwrap().action, "category.created");

        let dup = use_case.create(&admin(), input()).await.unwrap_err();
        assert!(matches!(dup, UgcError::CategoryExists));
        assert_eq!(dup.status_code(), 409);

        let bad = use_case
            .create(
                &admin(),
                CreateCategoryInput {
                    slug: "Bad Slug".into(),
                    ..input()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(bad.status_code(), 400);
    }

    #[tokio::test]
    async fn test_upload_media_sniffs_and_stores() {
        let repo = Arc::new(MemoryUgcRepository::default());
        let storage = Arc::new(MemoryStorage::default());
        let use_case = UploadMediaUseCase::new(
            repo.clone(),
            storage.clone(),
            AuditHandle::disconnected(),
            Arc::new(UgcConfig::default()),
        );

        let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        png.extend_from_slice(&[0u8; 32]);
        let ctx = user();
        let media = use_case
            .execute(
                &ctx,
                UploadMediaInput {
                    bytes: png.clone(),
                    declared_type: Some("image/png".into()),
                    filename: Some("../passport.png".into()),
                    ip: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(media.mime_type, "image/png");
        assert_eq!(media.size_bytes, png.len() as i64);
        assert_eq!(media.original_filename.as_deref(), Some("passport.png"));
        assert!(media.storage_path.ends_with(".png"));
        assert_eq!(
            storage.files.lock().unwrap().get(&media.storage_path),
            Some(&png)
        );
        assert_eq!(repo.media.lock().unwrap().len(), 1);

        let err = use_case
            .execute(
                &ctx,
                UploadMediaInput {
                    bytes: b"just some text".to_vec(),
                    declared_type: None,
                    filename: None,
                    ip: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 415);
        assert_eq!(storage.files.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_export_requires_admin_and_writes_csv() {
        let h = harness();
        let ctx = user();
        h.submit.execute(&ctx, input("Arrival, \"finally\"", BODY)).await.unwrap();

        let export = ExportStoriesUseCase::new(h.repo.clone());
        assert_eq!(
            export
                .execute(&ctx, &ExportQuery::default())
                .await
                .unwrap_err()
                .status_code(),
            403
        );

        let (csv, rows) = export.execute(&admin(), &ExportQuery::default()).await.unwrap();
        assert_eq!(rows, 1);
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("story_id,created_at,published_at,status"));
        assert!(lines.next().unwrap().contains("\"Arrival, \"\"finally\"\"\""));
    }
}
