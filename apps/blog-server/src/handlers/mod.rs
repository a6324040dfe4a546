//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod guard;
mod health;
mod posts;
mod profiles;
mod views;

#[cfg(test)]
mod tests;

use actix_web::{HttpRequest, HttpResponse, web};

use crate::middleware::error::{self, AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error))
        .app_data(web::PathConfig::default().error_handler(error::path_error))
        .app_data(web::QueryConfig::default().error_handler(error::query_error))
        .default_service(web::to(not_found));

    cfg.route("/", web::get().to(posts::index))
        .route("/health/", web::get().to(health::health_check))
        .service(
            web::scope("/posts")
                // Before `/{id}/`, which would otherwise try to parse "create".
                .service(
                    web::resource("/create/")
                        .route(web::get().to(posts::create_form))
                        .route(web::post().to(posts::create)),
                )
                .route("/{id}/", web::get().to(posts::detail))
                .service(
                    web::resource("/{id}/edit/")
                        .route(web::get().to(posts::edit_form))
                        .route(web::post().to(posts::edit)),
                )
                .service(
                    web::resource("/{id}/delete/")
                        .route(web::get().to(posts::delete_form))
                        .route(web::post().to(posts::delete)),
                )
                .route("/{id}/comment/", web::post().to(comments::add))
                .service(
                    web::resource("/{post_id}/edit_comment/{comment_id}/")
                        .route(web::get().to(comments::edit_form))
                        .route(web::post().to(comments::edit)),
                )
                .service(
                    web::resource("/{post_id}/delete_comment/{comment_id}/")
                        .route(web::get().to(comments::delete_form))
                        .route(web::post().to(comments::delete)),
                ),
        )
        .route("/category/{slug}/", web::get().to(categories::category_posts))
        .route("/profile/{username}/", web::get().to(profiles::profile))
        .service(
            web::resource("/edit_profile/")
                .route(web::get().to(profiles::edit_form))
                .route(web::post().to(profiles::edit)),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/registration/")
                        .route(web::get().to(auth::registration_form))
                        .route(web::post().to(auth::register)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                ),
        );
}

async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!("No page at {}", req.path())))
}
