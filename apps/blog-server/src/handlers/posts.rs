//! Post pages: index, detail and the author-only create/edit/delete forms.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use blogicum_core::domain::Post;
use blogicum_core::forms::{PostChoices, PostForm};
use blogicum_core::ports::{BaseRepository, CommentRepository, PostRepository};
use blogicum_core::visibility::{self, PostFilter};
use blogicum_shared::dto::{CommentFormResponse, FormIntent, FormPage, IndexPage, PostDetailPage};

use super::guard;
use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = views::list_posts(&state, &PostFilter::index(Utc::now()), query.page).await?;

    Ok(HttpResponse::Ok().json(IndexPage { posts }))
}

/// GET /posts/{id}/
///
/// Authors can open their own drafts; everyone else gets 404 for them.
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let listing = state
        .posts
        .find_listing(post_id)
        .await?
        .filter(|l| visibility::can_view(&l.post, &l.category, identity.user_id(), Utc::now()))
        .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

    let comments = state.comments.find_by_post(post_id).await?;

    Ok(HttpResponse::Ok().json(PostDetailPage {
        post: views::post_response(listing),
        comments: comments.into_iter().map(views::comment_response).collect(),
        comment_form: identity.0.as_ref().map(|_| CommentFormResponse::default()),
    }))
}

/// GET /posts/create/
pub async fn create_form(req: HttpRequest, identity: OptionalIdentity) -> HttpResponse {
    match guard::login_required(&identity, &req) {
        Ok(_) => HttpResponse::Ok().json(FormPage::new(FormIntent::Create, PostForm::default())),
        Err(redirect) => redirect,
    }
}

/// POST /posts/create/
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let author = match guard::session_user(&state, &identity, &req).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let form = body.into_inner();
    let draft = form.clean(post_choices(&state, &form).await?)?;
    let post = state.posts.create(draft.into_post(author.id)).await?;

    tracing::info!(post_id = %post.id, author = %author.username, "Post created");

    Ok(guard::redirect(guard::profile_url(&author.username)))
}

/// GET /posts/{id}/edit/
pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    form_page(&req, &state, &identity, path.into_inner(), FormIntent::Edit).await
}

/// POST /posts/{id}/edit/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let mut post = match owned_post(&req, &state, &identity, path.into_inner()).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };

    let form = body.into_inner();
    let draft = form.clean(post_choices(&state, &form).await?)?;
    draft.apply_to(&mut post);
    let post = state.posts.update(post).await?;

    tracing::info!(post_id = %post.id, "Post updated");

    Ok(guard::redirect(guard::post_url(post.id)))
}

/// GET /posts/{id}/delete/
pub async fn delete_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    form_page(&req, &state, &identity, path.into_inner(), FormIntent::Delete).await
}

/// POST /posts/{id}/delete/
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = match owned_post(&req, &state, &identity, path.into_inner()).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };

    state.posts.delete(post.id).await?;

    let author = state.users.find_by_id(post.author_id).await?;
    tracing::info!(post_id = %post.id, "Post deleted");

    Ok(match author {
        Some(author) => guard::redirect(guard::profile_url(&author.username)),
        None => guard::redirect("/"),
    })
}

/// The edit and delete pages show the same pre-filled form.
async fn form_page(
    req: &HttpRequest,
    state: &AppState,
    identity: &OptionalIdentity,
    post_id: Uuid,
    intent: FormIntent,
) -> AppResult<HttpResponse> {
    Ok(match owned_post(req, state, identity, post_id).await? {
        Ok(post) => HttpResponse::Ok().json(FormPage::new(intent, PostForm::from_post(&post))),
        Err(redirect) => redirect,
    })
}

/// Load a post the requester may change. `Ok(Err(_))` is the redirect to
/// send when they may not.
async fn owned_post(
    req: &HttpRequest,
    state: &AppState,
    identity: &OptionalIdentity,
    post_id: Uuid,
) -> AppResult<Result<Post, HttpResponse>> {
    if let Err(redirect) = guard::login_required(identity, req) {
        return Ok(Err(redirect));
    }

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

    Ok(guard::authorize(identity, req, post.author_id, post.id).map(|()| post))
}

async fn post_choices(state: &AppState, form: &PostForm) -> AppResult<PostChoices> {
    let category_exists = match form.category_id() {
        Some(id) => state.categories.find_by_id(id).await?.is_some(),
        None => false,
    };
    let location_exists = match form.location_id() {
        Some(id) => state.locations.find_by_id(id).await?.is_some(),
        None => false,
    };

    Ok(PostChoices {
        category_exists,
        location_exists,
    })
}
