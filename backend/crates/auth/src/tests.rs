//! Use case tests against an in-memory store

#[cfg(test)]
mod support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use kernel::UserRole;
    use kernel::id::UserId;

    use crate::domain::entity::{credentials::Credentials, user::User};
    use crate::domain::repository::{CredentialsRepository, UserRepository};
    use crate::domain::value_object::email::Email;
    use crate::error::{AuthError, AuthResult};

    #[derive(Default)]
    pub struct MemoryAuthRepository {
        pub users: Mutex<HashMap<UserId, User>>,
        pub credentials: Mutex<HashMap<UserId, Credentials>>,
    }

    impl UserRepository for MemoryAuthRepository {
        async fn create(&self, user: &User, credentials: &Credentials) -> AuthResult<()> {
            let mut users = self.users.lock().unwrap();
            if users.values().any(|u| u.email == user.email) {
                return Err(AuthError::EmailTaken);
            }
            users.insert(user.user_id, user.clone());
            self.credentials
                .lock()
                .unwrap()
                .insert(user.user_id, credentials.clone());
            Ok(())
        }

        async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
            Ok(self.users.lock().unwrap().get(user_id).cloned())
        }

        async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.email == *email)
                .cloned())
        }

        async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
            Ok(self.users.lock().unwrap().values().any(|u| u.email == *email))
        }

        async fn record_login(&self, user: &User) -> AuthResult<()> {
            if let Some(stored) = self.users.lock().unwrap().get_mut(&user.user_id) {
                stored.last_login_at = user.last_login_at;
            }
            Ok(())
        }

        async fn update_role(&self, user_id: &UserId, role: UserRole) -> AuthResult<bool> {
            Ok(match self.users.lock().unwrap().get_mut(user_id) {
                Some(user) => {
                    user.set_role(role);
                    true
                }
                None => false,
            })
        }
    }

    impl CredentialsRepository for MemoryAuthRepository {
        async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Credentials>> {
            Ok(self.credentials.lock().unwrap().get(user_id).cloned())
        }

        async fn update(&self, credentials: &Credentials) -> AuthResult<()> {
            self.credentials
                .lock()
                .unwrap()
                .insert(credentials.user_id, credentials.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;

    use kernel::audit::AuditHandle;
    use kernel::{AuthContext, Language, UserRole};
    use platform::mailer::{EmailTemplate, LogMailer};

    use super::support::MemoryAuthRepository;
    use crate::application::*;
    use crate::domain::value_object::user_status::UserStatus;
    use crate::domain::entity::credentials::Credentials;
    use crate::error::AuthError;

    struct Harness {
        repo: Arc<MemoryAuthRepository>,
        mailer: Arc<LogMailer>,
        audit: AuditHandle,
        audit_rx: tokio::sync::mpsc::Receiver<kernel::audit::AuditEvent>,
        tokens: Arc<TokenService>,
        config: Arc<AuthConfig>,
    }

    fn harness() -> Harness {
        let config = Arc::new(AuthConfig::development());
        let (audit, audit_rx) = AuditHandle::channel(64);
        Harness {
            repo: Arc::new(MemoryAuthRepository::default()),
            mailer: Arc::new(LogMailer::new()),
            audit,
            audit_rx,
            tokens: Arc::new(TokenService::new(&config)),
            config,
        }
    }

    fn sign_up_input(email: &str) -> SignUpInput {
        SignUpInput {
            email: email.to_string(),
            password: "river-lantern-42".to_string(),
            display_name: "Ana Souza".to_string(),
            language: Some("pt".to_string()),
            ip: Some("203.0.113.4".to_string()),
        }
    }

    impl Harness {
        fn sign_up(&self) -> SignUpUseCase<MemoryAuthRepository, LogMailer> {
            SignUpUseCase::new(
                self.repo.clone(),
                self.mailer.clone(),
                self.audit.clone(),
                self.config.clone(),
            )
        }

        fn sign_in(&self) -> SignInUseCase<MemoryAuthRepository, MemoryAuthRepository> {
            SignInUseCase::new(
                self.repo.clone(),
                self.repo.clone(),
                self.tokens.clone(),
                self.audit.clone(),
                self.config.clone(),
            )
        }
    }

    fn sign_in_input(email: &str, password: &str) -> SignInInput {
        SignInInput {
            email: email.to_string(),
            password: password.to_string(),
            ip: None,
        }
    }

    #[tokio::test]
    async fn test_sign_up_sends_welcome_and_audits() {
        let mut h = harness();
        let user = h.sign_up().execute(sign_up_input("Ana@Example.org")).await.unwrap();

        assert_eq!(user.email.as_str(), "ana@example.org");
        assert_eq!(user.preferred_language, Language::Pt);
        assert_eq!(user.role, UserRole::User);

        let sent = h.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template, EmailTemplate::Welcome);
        assert_eq!(sent[0].language, "pt");

        let event = h.audit_rx.recv().await.unwrap();
        assert_eq!(event.action, "user.signed_up");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let h = harness();
        h.sign_up().execute(sign_up_input("ana@example.org")).await.unwrap();
        let err = h
            .sign_up()
            .execute(sign_up_input("ANA@example.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let h = harness();
        let mut input = sign_up_input("ana@example.org");
        input.password = "password".to_string();
        let err = h.sign_up().execute(input).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_sign_in_issues_verifiable_token() {
        let h = harness();
        let user = h.sign_up().execute(sign_up_input("ana@example.org")).await.unwrap();

        let out = h
            .sign_in()
            .execute(sign_in_input("ana@example.org", "river-lantern-42"))
            .await
            .unwrap();

        let ctx = h.tokens.verify(&out.token.token).unwrap();
        assert_eq!(ctx.user_id, user.user_id);
        assert_eq!(ctx.language, Language::Pt);
        assert!(out.user.last_login_at.is_some());

        let printed = format!("{:?}", out);
        assert!(!printed.contains(&out.token.token));
        assert!(printed.contains("token_expires_at"));
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_look_the_same() {
        let h = harness();
        h.sign_up().execute(sign_up_input("ana@example.org")).await.unwrap();

        let unknown = h
            .sign_in()
            .execute(sign_in_input("nobody@example.org", "river-lantern-42"))
            .await
            .unwrap_err();
        let wrong = h
            .sign_in()
            .execute(sign_in_input("ana@example.org", "wrong-password-1"))
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.status_code(), 401);
    }

    #[tokio::test]
    async fn test_lockout_after_repeated_failures() {
        let h = harness();
        let user = h.sign_up().execute(sign_up_input("ana@example.org")).await.unwrap();

        for attempt in 1..=Credentials::MAX_FAILED_ATTEMPTS {
            let err = h
                .sign_in()
                .execute(sign_in_input("ana@example.org", "wrong-password-1"))
                .await
                .unwrap_err();
            if attempt < Credentials::MAX_FAILED_ATTEMPTS {
                assert!(matches!(err, AuthError::InvalidCredentials));
            } else {
                assert!(matches!(err, AuthError::AccountLocked));
            }
        }

        // Correct password is refused while locked
        let err = h
            .sign_in()
            .execute(sign_in_input("ana@example.org", "river-lantern-42"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountLocked));
        assert_eq!(err.status_code(), 429);

        let creds = h.repo.credentials.lock().unwrap().get(&user.user_id).cloned().unwrap();
        assert!(creds.locked_until.is_some());
    }

    #[tokio::test]
    async fn test_successful_sign_in_resets_failures() {
        let h = harness();
        let user = h.sign_up().execute(sign_up_input("ana@example.org")).await.unwrap();

        let _ = h
            .sign_in()
            .execute(sign_in_input("ana@example.org", "wrong-password-1"))
            .await;
        h.sign_in()
            .execute(sign_in_input("ana@example.org", "river-lantern-42"))
            .await
            .unwrap();

        let creds = h.repo.credentials.lock().unwrap().get(&user.user_id).cloned().unwrap();
        assert_eq!(creds.failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_assign_role_requires_super_admin() {
        let h = harness();
        let user = h.sign_up().execute(sign_up_input("ana@example.org")).await.unwrap();
        let manage = ManageUserUseCase::new(h.repo.clone(), h.audit.clone());

        let admin = AuthContext::new(kernel::id::UserId::new(), UserRole::Admin, Language::En);
        let err = manage
            .assign_role(&admin, user.user_id, UserRole::Moderator)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let root = AuthContext::new(kernel::id::UserId::new(), UserRole::SuperAdmin, Language::En);
        manage
            .assign_role(&root, user.user_id, UserRole::Moderator)
            .await
            .unwrap();

        let me = manage.current(&user.auth_context()).await.unwrap();
        assert_eq!(me.role, UserRole::Moderator);

        let err = manage
            .assign_role(&root, root.user_id, UserRole::User)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    fn sessions(h: &Harness) -> SessionResolver<MemoryAuthRepository> {
        SessionResolver::new(h.tokens.clone(), h.repo.clone())
    }

    async fn signed_in(h: &Harness, email: &str) -> (kernel::id::UserId, String) {
        h.sign_up().execute(sign_up_input(email)).await.unwrap();
        let out = h
            .sign_in()
            .execute(sign_in_input(email, "river-lantern-42"))
            .await
            .unwrap();
        (out.user.user_id, out.token.token)
    }

    fn set_status(h: &Harness, user_id: &kernel::id::UserId, status: UserStatus) {
        h.repo.users.lock().unwrap().get_mut(user_id).unwrap().status = status;
    }

    #[tokio::test]
    async fn test_session_follows_current_role() {
        let h = harness();
        let (user_id, token) = signed_in(&h, "ana@example.org").await;
        h.repo.users.lock().unwrap().get_mut(&user_id).unwrap().role = UserRole::Moderator;

        let ctx = sessions(&h).resolve(&token).await.unwrap();
        assert_eq!(ctx.user_id, user_id);
        assert_eq!(ctx.role, UserRole::Moderator);
        assert_eq!(ctx.language, Language::Pt);

        h.repo.users.lock().unwrap().get_mut(&user_id).unwrap().role = UserRole::User;
        assert_eq!(sessions(&h).resolve(&token).await.unwrap().role, UserRole::User);
    }

    #[tokio::test]
    async fn test_erased_or_disabled_account_loses_session() {
        let h = harness();
        let (user_id, token) = signed_in(&h, "ana@example.org").await;

        set_status(&h, &user_id, UserStatus::PendingDeletion);
        assert!(sessions(&h).resolve(&token).await.is_ok());

        set_status(&h, &user_id, UserStatus::Disabled);
        let err = sessions(&h).resolve(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));

        set_status(&h, &user_id, UserStatus::Erased);
        let err = sessions(&h).resolve(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
        assert_eq!(err.status_code(), 401);

        h.repo.users.lock().unwrap().remove(&user_id);
        assert!(sessions(&h).resolve(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_middleware_rejects_erased_user_token() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode, header};
        use axum::{Router, middleware, routing::get};
        use tower::ServiceExt;

        use crate::presentation::middleware::attach_auth_context;

        let h = harness();
        let (user_id, token) = signed_in(&h, "ana@example.org").await;
        let app = Router::new()
            .route("/whoami", get(|ctx: AuthContext| async move { ctx.role.code() }))
            .layer(middleware::from_fn_with_state(
                Arc::new(sessions(&h)),
                attach_auth_context::<MemoryAuthRepository>,
            ));
        let request = || {
            Request::get("/whoami")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap()
        };

        let ok = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        set_status(&h, &user_id, UserStatus::Erased);
        let rejected = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);

        let anonymous = app
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    }
}
