//! Public profiles and editing your own.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;

use blogicum_core::forms::ProfileForm;
use blogicum_core::ports::{BaseRepository, UserRepository};
use blogicum_core::visibility::PostFilter;
use blogicum_shared::dto::{FormIntent, FormPage, ProfilePage};

use super::guard;
use super::posts::PageQuery;
use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /profile/{username}/
///
/// The owner sees every post they wrote, drafts included.
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {username} not found")))?;

    let filter = PostFilter::profile(user.id, identity.user_id(), Utc::now());
    let posts = views::list_posts(&state, &filter, query.page).await?;

    Ok(HttpResponse::Ok().json(ProfilePage {
        profile: views::user_response(&user),
        posts,
    }))
}

/// GET /edit_profile/
pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    Ok(match guard::session_user(&state, &identity, &req).await? {
        Ok(user) => HttpResponse::Ok().json(FormPage::new(FormIntent::Edit, ProfileForm::from_user(&user))),
        Err(redirect) => redirect,
    })
}

/// POST /edit_profile/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<ProfileForm>,
) -> AppResult<HttpResponse> {
    let mut user = match guard::session_user(&state, &identity, &req).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let wanted = body.username.trim();
    let username_taken = wanted != user.username
        && state.users.find_by_username(wanted).await?.is_some();

    body.into_inner().clean(username_taken)?.apply_to(&mut user);
    let user = state.users.update(user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Profile updated");

    Ok(guard::redirect(guard::profile_url(&user.username)))
}
