use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Location};

/// Post entity - a blog entry owned by exactly one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    /// Posts dated in the future stay hidden until this moment.
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new published post.
    pub fn new(
        author_id: Uuid,
        category_id: Uuid,
        title: String,
        text: String,
        pub_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            text,
            pub_date,
            author_id,
            category_id,
            location_id: None,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_location(mut self, location_id: Option<Uuid>) -> Self {
        self.location_id = location_id;
        self
    }

    pub fn published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// A post together with everything a listing shows next to it.
#[derive(Debug, Clone)]
pub struct PostListing {
    pub post: Post,
    pub category: Category,
    pub location: Option<Location>,
    pub author_username: String,
    pub comment_count: u64,
}
