//! Application Layer

pub mod config;
pub mod list_flags;
pub mod notify;
pub mod review_flag;
pub mod screen_content;

pub use config::ModerationConfig;
pub use list_flags::ListFlagsUseCase;
pub use notify::AlertNotifier;
pub use review_flag::{ReviewFlagInput, ReviewFlagUseCase};
pub use screen_content::ScreenContentUseCase;
