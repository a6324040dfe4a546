use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, Post, User};

/// All rows of the in-memory database.
#[derive(Default)]
pub struct Tables {
    pub(crate) users: HashMap<Uuid, User>,
    pub(crate) categories: HashMap<Uuid, Category>,
    pub(crate) locations: HashMap<Uuid, Location>,
    pub(crate) posts: HashMap<Uuid, Post>,
    pub(crate) comments: HashMap<Uuid, Comment>,
}

/// Shared in-memory database.
///
/// Cloning is cheap; every clone (and every repository built from it) sees
/// the same rows. Data is lost on process restart.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    pub(crate) tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Row type stored in one of the [`Tables`].
pub trait Stored: Clone + Send + Sync + 'static {
    const NAME: &'static str;

    fn id(&self) -> Uuid;

    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Unique constraint violated by storing `self`, if any.
    fn conflict(&self, _tables: &Tables) -> Option<String> {
        None
    }

    /// Foreign key handling when the row `id` is removed.
    fn on_delete(_id: Uuid, _tables: &mut Tables) -> Result<(), String> {
        Ok(())
    }
}

impl Stored for User {
    const NAME: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.users
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }

    fn conflict(&self, tables: &Tables) -> Option<String> {
        tables
            .users
            .values()
            .any(|u| u.id != self.id && u.username == self.username)
            .then(|| format!("username '{}' already exists", self.username))
    }

    fn on_delete(id: Uuid, tables: &mut Tables) -> Result<(), String> {
        let posts: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        tables.posts.retain(|_, p| p.author_id != id);
        tables
            .comments
            .retain(|_, c| c.author_id != id && !posts.contains(&c.post_id));
        Ok(())
    }
}

impl Stored for Category {
    const NAME: &'static str = "category";

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }

    fn conflict(&self, tables: &Tables) -> Option<String> {
        tables
            .categories
            .values()
            .any(|c| c.id != self.id && c.slug == self.slug)
            .then(|| format!("category slug '{}' already exists", self.slug))
    }

    fn on_delete(id: Uuid, tables: &mut Tables) -> Result<(), String> {
        if tables.posts.values().any(|p| p.category_id == id) {
            return Err("category is still referenced by posts".to_string());
        }
        Ok(())
    }
}

impl Stored for Location {
    const NAME: &'static str = "location";

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.locations
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.locations
    }

    fn on_delete(id: Uuid, tables: &mut Tables) -> Result<(), String> {
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        Ok(())
    }
}

impl Stored for Post {
    const NAME: &'static str = "post";

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }

    fn on_delete(id: Uuid, tables: &mut Tables) -> Result<(), String> {
        tables.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

impl Stored for Comment {
    const NAME: &'static str = "comment";

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }
}
