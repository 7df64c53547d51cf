//! Session handlers: token issue, rotation and logout, plus account password flows.

use actix_web::{HttpRequest, HttpResponse, web};

use tollgate_core::AuthError;
use tollgate_core::auth::PasswordReset;
use tollgate_core::domain::IssuedTokens;
use tollgate_shared::dto::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, PasswordRecoveryQuery,
    PasswordResetRequest, PasswordUpdateRequest, RefreshTokenRequest, RegisterUserRequest,
    TokenResponse,
};

use super::user_response;
use crate::cookies::{read_refresh_token, refresh_cookie, removal_cookie};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn token_response(state: &AppState, tokens: IssuedTokens) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(refresh_cookie(&state.cookies, &tokens.refresh_token))
        .json(TokenResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "bearer".to_string(),
            expires_in: tokens.expires_in,
        })
}

/// POST /auth/token - form-encoded username and password.
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginRequest>,
) -> AppResult<HttpResponse> {
    let tokens = state.sessions.login(&form.username, &form.password).await?;
    Ok(token_response(&state, tokens))
}

/// PUT /auth/token
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> AppResult<HttpResponse> {
    let refresh_token = read_refresh_token(&req, &state.cookies, body.map(|b| b.into_inner()))
        .ok_or(AuthError::RefreshTokenNotValid)?;

    let tokens = state.sessions.refresh(&refresh_token).await?;
    Ok(token_response(&state, tokens))
}

/// DELETE /auth/token
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> AppResult<HttpResponse> {
    let refresh_token = read_refresh_token(&req, &state.cookies, body.map(|b| b.into_inner()))
        .ok_or(AuthError::RefreshTokenNotValid)?;

    state.sessions.logout(&refresh_token).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(&state.cookies))
        .json(MessageResponse::new("Logged out")))
}

/// POST /auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .sessions
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok(HttpResponse::Created().json(user_response(&user)))
}

/// POST /auth/forgot-password
///
/// Answers the same whether or not the email is registered.
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> AppResult<HttpResponse> {
    state.sessions.forgot_password(&body.email).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "If the email is registered, a recovery link has been sent",
    )))
}

/// POST /auth/password-recovery?token=...
pub async fn password_recovery(
    state: web::Data<AppState>,
    query: web::Query<PasswordRecoveryQuery>,
    body: web::Json<PasswordUpdateRequest>,
) -> AppResult<HttpResponse> {
    state
        .sessions
        .recover_password(&query.token, &body.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated")))
}

/// POST /auth/password-reset
pub async fn password_reset(
    state: web::Data<AppState>,
    Identity(acting_user): Identity,
    body: web::Json<PasswordResetRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    state
        .sessions
        .reset_password(
            &acting_user,
            PasswordReset {
                new_password: req.new_password,
                current_password: req.password,
                user_id: req.user_id,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated")))
}
