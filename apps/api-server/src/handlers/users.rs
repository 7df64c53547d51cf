//! User handlers. Each route applies the self-or-admin rule or requires admin.

use actix_web::{HttpResponse, web};

use tollgate_shared::dto::AssignRoleRequest;

use super::user_response;
use crate::middleware::auth::{AdminIdentity, Identity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /users/me
pub async fn me(Identity(user): Identity) -> HttpResponse {
    HttpResponse::Ok().json(user_response(&user))
}

/// GET /users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    Identity(acting_user): Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user = state
        .sessions
        .get_user(&acting_user, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}

/// PUT /users/{id}/role
pub async fn assign_role(
    state: web::Data<AppState>,
    AdminIdentity(admin): AdminIdentity,
    path: web::Path<i64>,
    body: web::Json<AssignRoleRequest>,
) -> AppResult<HttpResponse> {
    let user = state
        .sessions
        .assign_role(admin, path.into_inner(), &body.role)
        .await?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test, web};

    use tollgate_shared::dto::UserResponse;

    use crate::handlers::configure_routes;
    use crate::testing::{ADMIN_PASSWORD, TestApp, USER_PASSWORD, test_app};

    async fn bearer_for(app: &TestApp, username: &str, password: &str) -> String {
        let tokens = app.state.sessions.login(username, password).await.unwrap();
        format!("Bearer {}", tokens.access_token)
    }

    #[actix_web::test]
    async fn test_me_requires_bearer_token() {
        let app = test_app().await;
        let service = test::init_service(
            App::new()
                .app_data(web::Data::new(app.state.clone()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/users/me").to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let bearer = bearer_for(&app, "bea", USER_PASSWORD).await;
        let req = test::TestRequest::get()
            .uri("/users/me")
            .insert_header((header::AUTHORIZATION, bearer))
            .to_request();
        let me: UserResponse = test::call_and_read_body_json(&service, req).await;

        assert_eq!(me.id, app.regular.id);
        assert_eq!(me.role_id, app.regular.role_id());
    }

    #[actix_web::test]
    async fn test_get_user_is_self_or_admin() {
        let app = test_app().await;
        let service = test::init_service(
            App::new()
                .app_data(web::Data::new(app.state.clone()))
                .configure(configure_routes),
        )
        .await;

        let user_bearer = bearer_for(&app, "bea", USER_PASSWORD).await;
        let admin_bearer = bearer_for(&app, "admin", ADMIN_PASSWORD).await;

        let req = test::TestRequest::get()
            .uri(&format!("/users/{}", app.admin.id))
            .insert_header((header::AUTHORIZATION, user_bearer))
            .to_request();
        assert_eq!(
            test::call_service(&service, req).await.status(),
            StatusCode::FORBIDDEN
        );

        let req = test::TestRequest::get()
            .uri(&format!("/users/{}", app.regular.id))
            .insert_header((header::AUTHORIZATION, admin_bearer.clone()))
            .to_request();
        assert_eq!(
            test::call_service(&service, req).await.status(),
            StatusCode::OK
        );

        let req = test::TestRequest::get()
            .uri("/users/999")
            .insert_header((header::AUTHORIZATION, admin_bearer))
            .to_request();
        assert_eq!(
            test::call_service(&service, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn test_assign_role_is_admin_only() {
        let app = test_app().await;
        let service = test::init_service(
            App::new()
                .app_data(web::Data::new(app.state.clone()))
                .configure(configure_routes),
        )
        .await;

        let user_bearer = bearer_for(&app, "bea", USER_PASSWORD).await;
        let admin_bearer = bearer_for(&app, "admin", ADMIN_PASSWORD).await;
        let uri = format!("/users/{}/role", app.regular.id);

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, user_bearer))
            .set_json(serde_json::json!({ "role": "admin" }))
            .to_request();
        assert_eq!(
            test::call_service(&service, req).await.status(),
            StatusCode::FORBIDDEN
        );

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, admin_bearer))
            .set_json(serde_json::json!({ "role": "admin" }))
            .to_request();
        let updated: UserResponse = test::call_and_read_body_json(&service, req).await;

        assert_eq!(updated.role_id, app.admin.role_id());
    }
}
