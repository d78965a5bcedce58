//! Repository Traits

use kernel::Pagination;
use kernel::id::FlagId;

use crate::domain::entities::ModerationFlag;
use crate::domain::filter::FlagFilter;
use crate::error::ModerationResult;

#[trait_variant::make(FlagRepository: Send)]
pub trait LocalFlagRepository {
    async fn create(&self, flag: &ModerationFlag) -> ModerationResult<()>;

    async fn find_by_id(&self, flag_id: &FlagId) -> ModerationResult<Option<ModerationFlag>>;

    /// Newest first, with the total matching count
    async fn list(
        &self,
        filter: &FlagFilter,
        pagination: Pagination,
    ) -> ModerationResult<(Vec<ModerationFlag>, i64)>;

    /// Persist a review. Returns `false` if the flag was no longer open.
    async fn save_review(&self, flag: &ModerationFlag) -> ModerationResult<bool>;
}
