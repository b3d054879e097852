use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::pdf_attachment;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::document::{PdfRenderer, assets, salary_slip_filename};
use crate::error::AppError;
use crate::service::salary::{self, CreateSalarySlip, UpdateSalarySlip};
use crate::store::MySqlStore;

#[derive(Deserialize, IntoParams)]
pub struct PeriodQuery {
    /// Month name, e.g. `June`
    pub month: String,
    pub year: i32,
}

#[utoipa::path(
    get,
    path = "/api/salary/all",
    responses(
        (status = 200, description = "All salary slips, newest period first", body = [SalarySlip]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn list_all_slips(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let slips = salary::list_all(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(slips))
}

#[utoipa::path(
    post,
    path = "/api/salary/user/{user_id}",
    request_body = CreateSalarySlip,
    params(("user_id", description = "User ID")),
    responses(
        (status = 201, description = "Salary slip created", body = SalarySlip),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 409, description = "A slip already exists for this period")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn create_slip(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    body: web::Json<CreateSalarySlip>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let slip = salary::create_slip(
        store.get_ref(),
        &config.company,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Created().json(slip))
}

#[utoipa::path(
    get,
    path = "/api/salary/user/{user_id}",
    params(("user_id", description = "User ID")),
    responses(
        (status = 200, description = "Slips of one user, newest period first", body = [SalarySlip]),
        (status = 403),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn list_user_slips(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    auth.require_self_or_admin(user_id)?;

    let slips = salary::list_for_user(store.get_ref(), user_id).await?;
    Ok(HttpResponse::Ok().json(slips))
}

#[utoipa::path(
    get,
    path = "/api/salary/user/{user_id}/recent",
    params(("user_id", description = "User ID")),
    responses(
        (status = 200, description = "Most recent slip", body = SalarySlip),
        (status = 404, description = "No slips for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn latest_user_slip(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    auth.require_self_or_admin(user_id)?;

    let slip = salary::latest_for_user(store.get_ref(), user_id).await?;
    Ok(HttpResponse::Ok().json(slip))
}

#[utoipa::path(
    get,
    path = "/api/salary/user/{user_id}/period",
    params(("user_id", description = "User ID"), PeriodQuery),
    responses(
        (status = 200, description = "Slip for the requested month", body = SalarySlip),
        (status = 400, description = "Unknown month"),
        (status = 404, description = "No slip for this period")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn user_slip_for_period(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    auth.require_self_or_admin(user_id)?;

    let slip = salary::for_period(store.get_ref(), user_id, &query.month, query.year).await?;
    Ok(HttpResponse::Ok().json(slip))
}

#[utoipa::path(
    get,
    path = "/api/salary/{id}",
    params(("id", description = "Salary slip ID")),
    responses(
        (status = 200, body = SalarySlip),
        (status = 403),
        (status = 404, description = "Salary slip not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn get_slip(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let slip = salary::get_slip(store.get_ref(), path.into_inner()).await?;
    auth.require_self_or_admin(slip.user_id)?;

    Ok(HttpResponse::Ok().json(slip))
}

#[utoipa::path(
    put,
    path = "/api/salary/{id}",
    request_body = UpdateSalarySlip,
    params(("id", description = "Salary slip ID")),
    responses(
        (status = 200, description = "Salary slip updated", body = SalarySlip),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Salary slip not found"),
        (status = 409, description = "Target period already has a slip")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn update_slip(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
    body: web::Json<UpdateSalarySlip>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let slip = salary::update_slip(store.get_ref(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(slip))
}

#[utoipa::path(
    delete,
    path = "/api/salary/{id}",
    params(("id", description = "Salary slip ID")),
    responses(
        (status = 200, description = "Salary slip deleted"),
        (status = 404, description = "Salary slip not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn delete_slip(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    salary::delete_slip(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Salary slip deleted successfully"
    })))
}

#[utoipa::path(
    get,
    path = "/api/salary/{id}/download",
    params(("id", description = "Salary slip ID")),
    responses(
        (status = 200, description = "PDF attachment", content_type = "application/pdf"),
        (status = 404, description = "Salary slip not found"),
        (status = 500, description = "Error generating PDF")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn download_slip(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    renderer: web::Data<PdfRenderer>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let slip = salary::get_slip(store.get_ref(), path.into_inner()).await?;
    auth.require_self_or_admin(slip.user_id)?;

    let pdf = salary::render_slip(
        renderer.get_ref(),
        &config.company,
        assets::company_logo(),
        &slip,
    )
    .await
    .inspect_err(|e| tracing::error!(error = %e, slip_id = slip.id, "Salary slip PDF failed"))?;

    Ok(pdf_attachment(pdf, salary_slip_filename(&slip)))
}
