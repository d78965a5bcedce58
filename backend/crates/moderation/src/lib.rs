//! Content Moderation
//!
//! - Rule-table content filter (keywords + regex) with allow / review / block
//!   verdicts
//! - Moderation flags with a validated, parameterised list filter
//! - Throttled email alerts for high-severity flags
//! - Moderator review, applied to content through [`ContentStatusUpdater`]

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


pub use application::{AlertNotifier, ModerationConfig, ScreenContentUseCase};
pub use domain::{
    ContentDecision, ContentFilter, ContentScreener, ContentStatusUpdater, ContentSubmission,
    ContentType, ModerationFlag, ScreeningOutcome, ScreeningResult, Severity, Verdict,
};
pub use error::{ModerationError, ModerationResult};
pub use infra::postgres::PgFlagRepository;
pub use presentation::router::moderation_router;
