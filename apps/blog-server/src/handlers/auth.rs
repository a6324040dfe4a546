//! Registration and login.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use std::sync::Arc;

use blogicum_core::domain::User;
use blogicum_core::forms::{LoginForm, RegistrationForm};
use blogicum_core::ports::{BaseRepository, PasswordService, TokenService, UserRepository};
use blogicum_shared::dto::{AuthResponse, FormIntent, FormPage};

use super::guard;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    /// Only same-site paths are echoed back.
    fn local_next(&self) -> Option<String> {
        self.next
            .as_deref()
            .filter(|next| next.starts_with('/') && !next.starts_with("//"))
            .map(str::to_string)
    }
}

/// GET /auth/registration/
pub async fn registration_form() -> HttpResponse {
    HttpResponse::Ok().json(FormPage::new(FormIntent::Create, RegistrationForm::default()))
}

/// GET /auth/login/
///
/// Where anonymous users are sent by the login guard, with `?next=` naming
/// the page they asked for.
pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    HttpResponse::Ok()
        .json(FormPage::new(FormIntent::Create, LoginForm::default()).with_next(query.local_next()))
}

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegistrationForm>,
) -> AppResult<HttpResponse> {
    let username_taken = state
        .users
        .find_by_username(body.username.trim())
        .await?
        .is_some();

    let registration = body.clean(username_taken)?;

    let password_hash = password_service
        .hash(&registration.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .users
        .create(User::new(registration.username, password_hash))
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(guard::redirect("/"))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginForm>,
) -> AppResult<HttpResponse> {
    body.clean()?;

    let user = state
        .users
        .find_by_username(body.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service
        .verify(&body.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::debug!(username = %user.username, "Rejected login");
        return Err(AppError::Unauthorized);
    }

    let token = token_service
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}
