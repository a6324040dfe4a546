//! In-memory repository implementations.

use std::cmp::Reverse;
use std::marker::PhantomData;

use async_trait::async_trait;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, CommentView, Location, Post, PostListing, User};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::{Page, PageRequest};
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};
use blogicum_core::visibility::PostFilter;

use super::store::{InMemoryDatabase, Stored, Tables};

/// Generic in-memory repository over one table of an [`InMemoryDatabase`].
pub struct InMemoryRepository<T> {
    db: InMemoryDatabase,
    _entity: PhantomData<fn() -> T>,
}

impl<T> InMemoryRepository<T> {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

pub type InMemoryUserRepository = InMemoryRepository<User>;
pub type InMemoryCategoryRepository = InMemoryRepository<Category>;
pub type InMemoryLocationRepository = InMemoryRepository<Location>;
pub type InMemoryPostRepository = InMemoryRepository<Post>;
pub type InMemoryCommentRepository = InMemoryRepository<Comment>;

#[async_trait]
impl<T: Stored> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn create(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.db.tables.write().await;

        if T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::Constraint(format!("{} already exists", T::NAME)));
        }
        if let Some(conflict) = entity.conflict(&tables) {
            return Err(RepoError::Constraint(conflict));
        }

        tracing::debug!(entity = T::NAME, id = %entity.id(), "Inserting row");
        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.db.tables.write().await;

        if !T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::NotFound);
        }
        if let Some(conflict) = entity.conflict(&tables) {
            return Err(RepoError::Constraint(conflict));
        }

        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;

        if !T::table(&tables).contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        T::on_delete(id, &mut tables).map_err(RepoError::Constraint)?;
        T::table_mut(&mut tables).remove(&id);

        tracing::debug!(entity = T::NAME, id = %id, "Deleted row");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }
}

impl LocationRepository for InMemoryLocationRepository {}

/// Join a post with its category, location, author and comment count.
/// Posts whose category row is missing are skipped.
fn listing(tables: &Tables, post: &Post) -> Option<PostListing> {
    let category = tables.categories.get(&post.category_id)?.clone();
    let location = post
        .location_id
        .and_then(|id| tables.locations.get(&id))
        .cloned();
    let author_username = tables
        .users
        .get(&post.author_id)
        .map(|u| u.username.clone())
        .unwrap_or_default();
    let comment_count = tables
        .comments
        .values()
        .filter(|c| c.post_id == post.id)
        .count() as u64;

    Some(PostListing {
        post: post.clone(),
        category,
        location,
        author_username,
        comment_count,
    })
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn select_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostListing>, RepoError> {
        let tables = self.db.tables.read().await;

        let mut matching: Vec<PostListing> = tables
            .posts
            .values()
            .filter_map(|post| listing(&tables, post))
            .filter(|l| filter.matches(&l.post, &l.category))
            .collect();
        matching.sort_by_key(|l| (Reverse(l.post.pub_date), Reverse(l.post.created_at), l.post.id));

        Ok(Page::from_all(matching, page))
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<PostListing>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.posts.get(&id).and_then(|post| listing(&tables, post)))
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let tables = self.db.tables.read().await;

        let mut comments: Vec<CommentView> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .map(|c| CommentView {
                comment: c.clone(),
                author_username: tables
                    .users
                    .get(&c.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
            })
            .collect();
        comments.sort_by_key(|c| (c.comment.created_at, c.comment.id));

        Ok(comments)
    }
}
