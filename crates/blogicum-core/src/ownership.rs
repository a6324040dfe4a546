//! Ownership guard for mutating actions on posts and comments.

use uuid::Uuid;

/// Outcome of comparing the requester with a record's author.
///
/// Callers never turn a failed check into an error page: `NotOwner` sends the
/// requester back to the post, `Anonymous` sends them to the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owner,
    NotOwner,
    Anonymous,
}

/// Compare the authenticated requester (if any) with the record's author.
pub fn check(actor: Option<Uuid>, author_id: Uuid) -> Ownership {
    match actor {
        None => Ownership::Anonymous,
        Some(id) if id == author_id => Ownership::Owner,
        Some(_) => Ownership::NotOwner,
    }
}
