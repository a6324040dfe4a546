//! Data Transfer Objects - request/response types for the site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response containing a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// A user's public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub title: String,
    pub description: String,
    pub slug: String,
}

/// A post as shown in listings and on its detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub category: CategoryResponse,
    /// Only set when the location itself is published.
    pub location: Option<String>,
    pub is_published: bool,
    pub comment_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// One page of a listing plus pager state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexPage {
    pub posts: PaginatedResponse<PostResponse>,
}

/// `GET /category/<slug>/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPage {
    pub category: CategoryResponse,
    pub posts: PaginatedResponse<PostResponse>,
}

/// `GET /profile/<username>/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePage {
    pub profile: UserResponse,
    pub posts: PaginatedResponse<PostResponse>,
}

/// Blank comment form offered under a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentFormResponse {
    pub text: String,
}

/// `GET /posts/<id>/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailPage {
    pub post: PostResponse,
    /// Oldest first.
    pub comments: Vec<CommentResponse>,
    /// Only offered to signed-in visitors.
    pub comment_form: Option<CommentFormResponse>,
}

/// What submitting a form page will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormIntent {
    Create,
    Edit,
    Delete,
}

/// A form page: the (pre-filled) form and what submitting it does.
/// Delete confirmations reuse the edit form with [`FormIntent::Delete`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormPage<F> {
    pub intent: FormIntent,
    pub form: F,
    /// Where to go once the form is submitted (login only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl<F> FormPage<F> {
    pub fn new(intent: FormIntent, form: F) -> Self {
        Self {
            intent,
            form,
            next: None,
        }
    }

    pub fn with_next(mut self, next: Option<String>) -> Self {
        self.next = next;
        self
    }
}
