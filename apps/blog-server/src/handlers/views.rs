//! Domain values to response DTOs.

use blogicum_core::domain::{Category, CommentView, PostListing, User};
use blogicum_core::pagination::{Page, PageRequest};
use blogicum_core::ports::PostRepository;
use blogicum_core::visibility::PostFilter;
use blogicum_shared::dto::{
    CategoryResponse, CommentResponse, PaginatedResponse, PostResponse, UserResponse,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Run a listing query for `?page=N`; pages past the end are not found.
pub async fn list_posts(
    state: &AppState,
    filter: &PostFilter,
    page: Option<u64>,
) -> AppResult<PaginatedResponse<PostResponse>> {
    let page = state.posts.select_posts(filter, PageRequest::posts(page)).await?;

    if !page.exists() {
        return Err(AppError::NotFound("Invalid page.".to_string()));
    }

    Ok(paginated(page.map(post_response)))
}

pub fn paginated<T>(page: Page<T>) -> PaginatedResponse<T> {
    PaginatedResponse {
        page: page.number,
        num_pages: page.num_pages(),
        total: page.total,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        items: page.items,
    }
}

pub fn post_response(listing: PostListing) -> PostResponse {
    let PostListing {
        post,
        category,
        location,
        author_username,
        comment_count,
    } = listing;

    PostResponse {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        author: author_username,
        category: category_response(&category),
        location: location.filter(|l| l.is_published).map(|l| l.name),
        is_published: post.is_published,
        comment_count,
    }
}

pub fn category_response(category: &Category) -> CategoryResponse {
    CategoryResponse {
        title: category.title.clone(),
        description: category.description.clone(),
        slug: category.slug.clone(),
    }
}

pub fn comment_response(view: CommentView) -> CommentResponse {
    CommentResponse {
        id: view.comment.id,
        text: view.comment.text,
        author: view.author_username,
        created_at: view.comment.created_at,
    }
}

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        date_joined: user.created_at,
    }
}
