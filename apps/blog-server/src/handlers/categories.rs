//! Category pages: published posts under one published category.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::ports::CategoryRepository;
use blogicum_core::visibility::PostFilter;
use blogicum_shared::dto::CategoryPage;

use super::posts::PageQuery;
use super::views;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /category/{slug}/
///
/// Unpublished categories do not exist as far as visitors are concerned.
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .filter(|c| c.is_published)
        .ok_or_else(|| AppError::NotFound(format!("Category {slug} not found")))?;

    let filter = PostFilter::category(category.slug.as_str(), Utc::now());
    let posts = views::list_posts(&state, &filter, query.page).await?;

    Ok(HttpResponse::Ok().json(CategoryPage {
        category: views::category_response(&category),
        posts,
    }))
}
