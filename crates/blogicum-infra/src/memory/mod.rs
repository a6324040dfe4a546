//! In-memory storage - used when no database is configured, and in tests.

mod repositories;
mod store;

pub use repositories::{
    InMemoryCategoryRepository, InMemoryCommentRepository, InMemoryLocationRepository,
    InMemoryPostRepository, InMemoryRepository, InMemoryUserRepository,
};
pub use store::InMemoryDatabase;
