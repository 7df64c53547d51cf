//! HTTP handlers and route configuration.

mod auth;
mod health;
mod users;

use actix_web::web;

use tollgate_core::domain::User;
use tollgate_shared::dto::UserResponse;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/token")
                        .route(web::post().to(auth::login))
                        .route(web::put().to(auth::refresh))
                        .route(web::delete().to(auth::logout)),
                )
                .route("/register", web::post().to(auth::register))
                .route("/forgot-password", web::post().to(auth::forgot_password))
                .route("/password-recovery", web::post().to(auth::password_recovery))
                .route("/password-reset", web::post().to(auth::password_reset)),
        )
        .service(
            web::scope("/users")
                .route("/me", web::get().to(users::me))
                .route("/{id}", web::get().to(users::get_user))
                .route("/{id}/role", web::put().to(users::assign_role)),
        );
}

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role_id: user.role_id(),
    }
}
