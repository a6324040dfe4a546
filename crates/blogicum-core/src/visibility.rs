//! Post visibility rules.
//!
//! A post is public when it is published, its publication date has passed and
//! its category is published. An author looking at their own profile sees
//! every post they wrote, drafts included.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Post};

/// Which publication constraints a listing applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only posts that are published, already dated and in a published category.
    Published { now: DateTime<Utc> },
    /// No publication constraints (the owner's view of their own posts).
    Everything,
}

/// Query shape for post listings.
///
/// Built through the named constructors so that every listing in the
/// application goes through the same rule. Repositories either evaluate
/// [`PostFilter::matches`] directly or translate the fields into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
    pub category_slug: Option<String>,
    pub visibility: Visibility,
}

impl PostFilter {
    /// Front page: every public post.
    pub fn index(now: DateTime<Utc>) -> Self {
        Self {
            author_id: None,
            category_slug: None,
            visibility: Visibility::Published { now },
        }
    }

    /// Category page: public posts of one category.
    pub fn category(slug: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            author_id: None,
            category_slug: Some(slug.into()),
            visibility: Visibility::Published { now },
        }
    }

    /// Profile page: the author's posts. Constraints are waived only when the
    /// viewer is the author.
    pub fn profile(author_id: Uuid, viewer: Option<Uuid>, now: DateTime<Utc>) -> Self {
        let visibility = if viewer == Some(author_id) {
            Visibility::Everything
        } else {
            Visibility::Published { now }
        };

        Self {
            author_id: Some(author_id),
            category_slug: None,
            visibility,
        }
    }

    /// Evaluate the filter against a post and the category it belongs to.
    pub fn matches(&self, post: &Post, category: &Category) -> bool {
        if let Some(author_id) = self.author_id {
            if post.author_id != author_id {
                return false;
            }
        }

        if let Some(slug) = &self.category_slug {
            if &category.slug != slug {
                return false;
            }
        }

        match self.visibility {
            Visibility::Published { now } => is_public(post, category, now),
            Visibility::Everything => true,
        }
    }
}

/// Whether anyone may see the post.
pub fn is_public(post: &Post, category: &Category, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date <= now && category.is_published
}

/// Whether `viewer` may open the post's detail page.
pub fn can_view(post: &Post, category: &Category, viewer: Option<Uuid>, now: DateTime<Utc>) -> bool {
    viewer.is_some_and(|id| post.is_authored_by(id)) || is_public(post, category, now)
}
