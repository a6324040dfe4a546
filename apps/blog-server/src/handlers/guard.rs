//! Login and ownership checks for mutating routes.
//!
//! A failed check is answered with a redirect, never an error page.

use actix_web::{HttpRequest, HttpResponse, http::header};
use blogicum_core::domain::User;
use blogicum_core::ownership::{self, Ownership};
use blogicum_core::ports::BaseRepository;
use uuid::Uuid;

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub const LOGIN_URL: &str = "/auth/login/";

pub fn post_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

/// 302 Found to `location`.
pub fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

/// Send the visitor to the login page, returning here afterwards.
pub fn redirect_to_login(req: &HttpRequest) -> HttpResponse {
    redirect(format!("{LOGIN_URL}?next={}", req.path()))
}

/// The signed-in visitor, or the login redirect to send instead.
pub fn login_required<'a>(
    identity: &'a OptionalIdentity,
    req: &HttpRequest,
) -> Result<&'a Identity, HttpResponse> {
    identity.0.as_ref().ok_or_else(|| redirect_to_login(req))
}

/// Load the signed-in user's account. A token for a deleted account counts
/// as anonymous.
pub async fn session_user(
    state: &AppState,
    identity: &OptionalIdentity,
    req: &HttpRequest,
) -> AppResult<Result<User, HttpResponse>> {
    let identity = match login_required(identity, req) {
        Ok(identity) => identity,
        Err(redirect) => return Ok(Err(redirect)),
    };

    let user = state.users.find_by_id(identity.user_id).await?;
    if user.is_none() {
        tracing::debug!(username = %identity.username, "Token for a deleted account");
    }

    Ok(user.ok_or_else(|| redirect_to_login(req)))
}

/// Allow only the author of a record under post `post_id` to mutate it.
pub fn authorize(
    identity: &OptionalIdentity,
    req: &HttpRequest,
    author_id: Uuid,
    post_id: Uuid,
) -> Result<(), HttpResponse> {
    match ownership::check(identity.user_id(), author_id) {
        Ownership::Owner => Ok(()),
        Ownership::NotOwner => {
            tracing::warn!(
                path = req.path(),
                user_id = ?identity.user_id(),
                "Refusing change by non-author"
            );
            Err(redirect(post_url(post_id)))
        }
        Ownership::Anonymous => Err(redirect_to_login(req)),
    }
}
