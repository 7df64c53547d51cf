//! Refresh token cookie transport.

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite, time::Duration};

use tollgate_shared::dto::RefreshTokenRequest;

use crate::config::CookieConfig;

/// Http-only cookie carrying the refresh token.
pub fn refresh_cookie(config: &CookieConfig, refresh_token: &str) -> Cookie<'static> {
    let mut builder = Cookie::build(config.name.clone(), refresh_token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure)
        .max_age(Duration::seconds(config.max_age_seconds));

    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }

    builder.finish()
}

/// Expired cookie with the same name, domain and path, so the client drops it.
pub fn removal_cookie(config: &CookieConfig) -> Cookie<'static> {
    let mut cookie = refresh_cookie(config, "");
    cookie.make_removal();
    cookie
}

/// Cookie first, then the `refresh_token` field of a JSON body.
pub fn read_refresh_token(
    req: &HttpRequest,
    config: &CookieConfig,
    body: Option<RefreshTokenRequest>,
) -> Option<String> {
    req.cookie(&config.name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| body.and_then(|b| b.refresh_token))
        .filter(|v| !v.is_empty())
}
