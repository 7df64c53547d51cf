//! Authentication extractors.

use std::future::Future;
use std::pin::Pin;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use tollgate_core::AuthError;
use tollgate_core::domain::User;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated user, resolved from the `Authorization: Bearer` access token.
///
/// ```ignore
/// async fn protected_route(Identity(user): Identity) -> impl Responder {
///     format!("Hello, {}!", user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub User);

/// Authenticated user holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub User);

type ExtractFuture<T> = Pin<Box<dyn Future<Output = Result<T, AppError>>>>;

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return None;
    }
    Some(token.trim().to_string())
}

fn app_state(state: Option<web::Data<AppState>>) -> Result<web::Data<AppState>, AppError> {
    state.ok_or_else(|| AppError::Internal("AppState not found in app data".to_string()))
}

async fn authenticate(
    state: Option<web::Data<AppState>>,
    token: Option<String>,
) -> Result<User, AppError> {
    let state = app_state(state)?;
    let token = token.ok_or(AuthError::NotAuthenticated)?;

    Ok(state.sessions.authenticate(&token).await?)
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move { authenticate(state, token).await.map(Identity) })
    }
}

impl FromRequest for AdminIdentity {
    type Error = AppError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let user = authenticate(state.clone(), token).await?;
            let state = app_state(state)?;
            let admin = state.sessions.access().has_admin_role(user).await?;
            Ok(AdminIdentity(admin))
        })
    }
}
