use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let Some(config) = req.app_data::<Data<Config>>().cloned() else {
        return Ok(req.error_response(AppError::internal("App config missing")));
    };

    let header_value = match req.headers().get("Authorization").map(|h| h.to_str()) {
        Some(Ok(h)) => h,
        Some(Err(_)) => {
            return Ok(req.error_response(AppError::unauthorized(
                "Invalid Authorization header encoding",
            )));
        }
        None => {
            return Ok(req.error_response(AppError::unauthorized("Not authorized, no token")));
        }
    };

    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return Ok(req.error_response(AppError::unauthorized(
            "Authorization header must start with Bearer",
        )));
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return Ok(req.error_response(AppError::unauthorized(
                "Not authorized, token failed",
            )));
        }
    };

    let Some(role) = Role::from_id(claims.role) else {
        return Ok(req.error_response(AppError::unauthorized("Invalid role")));
    };

    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
    });

    next.call(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::generate_access_token;
    use crate::config::tests::sample_config;
    use actix_web::middleware::from_fn;
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};

    async fn whoami(user: AuthUser) -> HttpResponse {
        HttpResponse::Ok().body(user.username)
    }

    #[actix_web::test]
    async fn admits_valid_tokens_only() {
        let config = sample_config();
        let token =
            generate_access_token(3, "jdoe".into(), Role::User, &config.jwt_secret, 600).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(config))
                .wrap(from_fn(auth_middleware))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let missing = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let forged = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        assert_eq!(test::call_service(&app, forged).await.status(), StatusCode::UNAUTHORIZED);

        let ok = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, ok).await;
        assert_eq!(body, "jdoe");
    }
}
