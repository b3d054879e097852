use actix_web::{HttpResponse, web};

use crate::api::pdf_attachment;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::document::{PdfRenderer, assets, offer_letter_filename};
use crate::error::AppError;
use crate::service::offer_letter::{self, CreateOfferLetter, UpdateOfferLetter};
use crate::store::MySqlStore;

#[utoipa::path(
    post,
    path = "/api/offer-letters",
    request_body = CreateOfferLetter,
    responses(
        (status = 201, description = "Offer letter created", body = OfferLetter),
        (status = 400, description = "Validation error"),
        (status = 404, description = "No user with that employee number"),
        (status = 409, description = "The employee already has an offer letter")
    ),
    security(("bearer_auth" = [])),
    tag = "Offer Letter"
)]
pub async fn create_offer_letter(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    body: web::Json<CreateOfferLetter>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let letter =
        offer_letter::create_letter(store.get_ref(), &config.company, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(letter))
}

#[utoipa::path(
    get,
    path = "/api/offer-letters",
    responses(
        (status = 200, description = "All offer letters, newest first", body = [OfferLetter]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Offer Letter"
)]
pub async fn list_offer_letters(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let letters = offer_letter::list_letters(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(letters))
}

#[utoipa::path(
    get,
    path = "/api/offer-letters/user/{user_id}",
    params(("user_id", description = "User ID")),
    responses(
        (status = 200, body = OfferLetter),
        (status = 404, description = "No offer letter found for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Offer Letter"
)]
pub async fn user_offer_letter(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    auth.require_self_or_admin(user_id)?;

    let letter = offer_letter::letter_for_user(store.get_ref(), user_id).await?;
    Ok(HttpResponse::Ok().json(letter))
}

#[utoipa::path(
    get,
    path = "/api/offer-letters/{id}",
    params(("id", description = "Offer letter ID")),
    responses(
        (status = 200, body = OfferLetter),
        (status = 404, description = "Offer letter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Offer Letter"
)]
pub async fn get_offer_letter(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let letter = offer_letter::get_letter(store.get_ref(), path.into_inner()).await?;
    auth.require_self_or_admin(letter.user_id)?;

    Ok(HttpResponse::Ok().json(letter))
}

#[utoipa::path(
    put,
    path = "/api/offer-letters/{id}",
    request_body = UpdateOfferLetter,
    params(("id", description = "Offer letter ID")),
    responses(
        (status = 200, description = "Offer letter updated", body = OfferLetter),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Offer letter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Offer Letter"
)]
pub async fn update_offer_letter(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
    body: web::Json<UpdateOfferLetter>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let letter =
        offer_letter::update_letter(store.get_ref(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(letter))
}

#[utoipa::path(
    delete,
    path = "/api/offer-letters/{id}",
    params(("id", description = "Offer letter ID")),
    responses(
        (status = 200, description = "Offer letter deleted"),
        (status = 404, description = "Offer letter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Offer Letter"
)]
pub async fn delete_offer_letter(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    offer_letter::delete_letter(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Offer letter deleted successfully"
    })))
}

#[utoipa::path(
    get,
    path = "/api/offer-letters/{id}/download",
    params(("id", description = "Offer letter ID")),
    responses(
        (status = 200, description = "PDF attachment", content_type = "application/pdf"),
        (status = 404, description = "Offer letter not found"),
        (status = 500, description = "Error generating PDF")
    ),
    security(("bearer_auth" = [])),
    tag = "Offer Letter"
)]
pub async fn download_offer_letter(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    renderer: web::Data<PdfRenderer>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let letter = offer_letter::get_letter(store.get_ref(), path.into_inner()).await?;
    auth.require_self_or_admin(letter.user_id)?;

    let pdf = offer_letter::render_letter(renderer.get_ref(), assets::company_logo(), &letter)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, offer_letter_id = letter.id, "Offer letter PDF failed")
        })?;

    Ok(pdf_attachment(pdf, offer_letter_filename(&letter)))
}
