//! # Blogicum Core
//!
//! The domain layer of Blogicum.
//! This crate contains the entities, the post visibility filter, the ownership
//! guard and the ports that infrastructure implements. It has no
//! infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod forms;
pub mod ownership;
pub mod pagination;
pub mod ports;
pub mod visibility;

pub use error::{FormErrors, RepoError};
pub use ownership::Ownership;
pub use pagination::{Page, PageRequest, POSTS_PER_PAGE};
pub use visibility::PostFilter;
