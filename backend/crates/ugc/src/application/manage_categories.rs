//! Category administration

use std::sync::Arc;

use kernel::audit::{AuditEvent, AuditHandle};
use kernel::{AuthContext, UserRole};

use crate::domain::entities::Category;
use crate::domain::repository::CategoryRepository;
use crate::domain::value_objects::CategorySlug;
use crate::error::{UgcError, UgcResult};

pub struct CreateCategoryInput {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

pub struct ManageCategoriesUseCase<R>
where
    R: CategoryRepository,
{
    repo: Arc<R>,
    audit: AuditHandle,
}

impl<R> ManageCategoriesUseCase<R>
where
    R: CategoryRepository,
{
    pub fn new(repo: Arc<R>, audit: AuditHandle) -> Self {
        Self { repo, audit }
    }

    pub async fn create(&self, ctx: &AuthContext, input: CreateCategoryInput) -> UgcResult<Category> {
        ctx.require_role(UserRole::Admin)?;

        let slug = CategorySlug::parse(&input.slug)?;
        let name = input.name.trim().to_string();
        if name.is_empty() || name.chars().count() > 80 {
            return Err(UgcError::Validation("Name must be between 1 and 80 characters".into()));
        }
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let category = Category::new(slug, name, description, input.sort_order.unwrap_or(0));
        if !self.repo.create(&category).await? {
            return Err(UgcError::CategoryExists);
        }

        tracing::info!(slug = %category.slug, "Category created");
        self.audit.record(
            AuditEvent::new("category.created", "category")
                .actor(ctx.user_id)
                .target(category.category_id)
                .metadata(serde_json::json!({ "slug": category.slug.as_str() })),
        );

        Ok(category)
    }
}
