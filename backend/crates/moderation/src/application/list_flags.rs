//! List / Get Flags Use Case

use std::sync::Arc;

use kernel::id::FlagId;
use kernel::{AuthContext, Paginated, Pagination, UserRole};

use crate::domain::entities::ModerationFlag;
use crate::domain::filter::{FlagFilter, FlagQuery};
use crate::domain::repository::FlagRepository;
use crate::error::{ModerationError, ModerationResult};

pub struct ListFlagsUseCase<F>
where
    F: FlagRepository,
{
    repo: Arc<F>,
}

impl<F> ListFlagsUseCase<F>
where
    F: FlagRepository,
{
    pub fn new(repo: Arc<F>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        query: &FlagQuery,
    ) -> ModerationResult<Paginated<ModerationFlag>> {
        ctx.require_role(UserRole::Moderator)?;

        let filter = FlagFilter::parse(query)?;
        let pagination = Pagination::new(query.page, query.limit);
        let (items, total) = self.repo.list(&filter, pagination).await?;

        Ok(Paginated::new(items, pagination, total))
    }

    pub async fn get(&self, ctx: &AuthContext, flag_id: &FlagId) -> ModerationResult<ModerationFlag> {
        ctx.require_role(UserRole::Moderator)?;

        self.repo
            .find_by_id(flag_id)
            .await?
            .ok_or(ModerationError::FlagNotFound)
    }
}
