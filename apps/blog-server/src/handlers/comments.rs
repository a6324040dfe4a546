//! Comment creation and the author-only edit/delete forms.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_core::domain::Comment;
use blogicum_core::forms::CommentForm;
use blogicum_core::ports::{BaseRepository, PostRepository};
use blogicum_core::visibility;
use blogicum_shared::dto::{FormIntent, FormPage};

use super::guard;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /posts/{id}/comment/
pub async fn add(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let author = match guard::session_user(&state, &identity, &req).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let post_id = path.into_inner();

    // Only posts the author can see accept comments.
    let visible = state
        .posts
        .find_listing(post_id)
        .await?
        .is_some_and(|l| visibility::can_view(&l.post, &l.category, Some(author.id), Utc::now()));
    if !visible {
        return Err(AppError::NotFound(format!("Post {post_id} not found")));
    }

    let text = body.clean()?;
    let comment = state.comments.create(Comment::new(post_id, author.id, text)).await?;

    tracing::info!(comment_id = %comment.id, %post_id, "Comment added");

    Ok(guard::redirect(guard::post_url(post_id)))
}

/// GET /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    form_page(&req, &state, &identity, path.into_inner(), FormIntent::Edit).await
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let mut comment = match owned_comment(&req, &state, &identity, path.into_inner()).await? {
        Ok(comment) => comment,
        Err(redirect) => return Ok(redirect),
    };

    comment.text = body.clean()?;
    let comment = state.comments.update(comment).await?;

    tracing::info!(comment_id = %comment.id, "Comment updated");

    Ok(guard::redirect(guard::post_url(comment.post_id)))
}

/// GET /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    form_page(&req, &state, &identity, path.into_inner(), FormIntent::Delete).await
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let comment = match owned_comment(&req, &state, &identity, path.into_inner()).await? {
        Ok(comment) => comment,
        Err(redirect) => return Ok(redirect),
    };

    state.comments.delete(comment.id).await?;

    tracing::info!(comment_id = %comment.id, "Comment deleted");

    Ok(guard::redirect(guard::post_url(comment.post_id)))
}

async fn form_page(
    req: &HttpRequest,
    state: &AppState,
    identity: &OptionalIdentity,
    ids: (Uuid, Uuid),
    intent: FormIntent,
) -> AppResult<HttpResponse> {
    Ok(match owned_comment(req, state, identity, ids).await? {
        Ok(comment) => HttpResponse::Ok().json(FormPage::new(
            intent,
            CommentForm {
                text: comment.text,
            },
        )),
        Err(redirect) => redirect,
    })
}

/// Load a comment of post `post_id` the requester may change.
async fn owned_comment(
    req: &HttpRequest,
    state: &AppState,
    identity: &OptionalIdentity,
    (post_id, comment_id): (Uuid, Uuid),
) -> AppResult<Result<Comment, HttpResponse>> {
    if let Err(redirect) = guard::login_required(identity, req) {
        return Ok(Err(redirect));
    }

    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|c| c.post_id == post_id)
        .ok_or_else(|| AppError::NotFound(format!("Comment {comment_id} not found")))?;

    Ok(guard::authorize(identity, req, comment.author_id, post_id).map(|()| comment))
}
