use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        auth::AuthUser,
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    error::AppError,
    model::{employee::EmployeeProfile, role::Role, user::NewUser},
    models::{ChangePassword, LoginReq, LoginResponse, RegisterUser},
    store::{MySqlStore, UserStore},
    utils::{identity_cache, identity_filter, identity_filter::Identity},
};

const MIN_PASSWORD_LEN: usize = 6;
pub const DUPLICATE_USER: &str = "User with this email, username or employee number already exists";

fn hash(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

fn check_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// true  => value AVAILABLE
/// false => value TAKEN (or unknown because the database failed)
pub async fn is_identity_available(store: &MySqlStore, identity: Identity, value: &str) -> bool {
    // Cuckoo filter: a miss is a definite "never seen"
    if !identity_filter::might_exist(identity, value) {
        return true;
    }

    // Moka cache: a hit is a definite "taken"
    if identity_cache::is_taken(identity, value).await {
        return false;
    }

    match store.identity_exists(identity, value).await {
        Ok(true) => {
            identity_cache::mark_taken(identity, value).await;
            false
        }
        Ok(false) => true,
        Err(e) => {
            warn!(error = %e, identity = identity.as_ref(), "Identity lookup failed");
            false
        }
    }
}

/// Fails with `Conflict` on the first identity that is already taken.
pub async fn ensure_identities_available(
    store: &MySqlStore,
    candidates: &[(Identity, &str)],
) -> Result<(), AppError> {
    for &(identity, value) in candidates {
        if !is_identity_available(store, identity, value).await {
            return Err(AppError::conflict(format!(
                "{} '{}' already exists",
                identity.label(),
                value.trim()
            )));
        }
    }
    Ok(())
}

pub async fn remember_identities(candidates: &[(Identity, &str)]) {
    for &(identity, value) in candidates {
        identity_filter::insert(identity, value);
        identity_cache::mark_taken(identity, value).await;
    }
}

pub async fn forget_identities(candidates: &[(Identity, &str)]) {
    for &(identity, value) in candidates {
        identity_filter::remove(identity, value);
        identity_cache::forget(identity, value).await;
    }
}

fn identities<'a>(username: &'a str, email: &'a str, profile: &'a EmployeeProfile) -> Vec<(Identity, &'a str)> {
    let mut ids = vec![(Identity::Username, username), (Identity::Email, email)];
    if let Some(emp_no) = profile.emp_no.as_deref() {
        ids.push((Identity::EmpNo, emp_no));
    }
    ids
}

/// Login with e-mail and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Bearer token and the user profile", body = LoginResponse),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, body),
    fields(email = %body.email)
)]
pub async fn login(
    body: web::Json<LoginReq>,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let email = body.email.trim();
    if email.is_empty() || body.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(AppError::validation("Email and password are required"));
    }

    let Some(user) = store.find_user_by_email(email).await? else {
        info!("Invalid credentials: user not found");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    if let Err(e) = verify_password(&body.password, &user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let Some(role) = user.role() else {
        warn!(user_id = user.id, role_id = user.role_id, "User has an unknown role");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    debug!(user_id = user.id, "Generating access token");
    let token = generate_access_token(
        user.id,
        user.username.clone(),
        role,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))?;

    info!(user_id = user.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: user.into_public(),
    }))
}

/// Admin creates a user account with its employee profile
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Username, e-mail or employee number taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn register(
    auth: AuthUser,
    body: web::Json<RegisterUser>,
    store: web::Data<MySqlStore>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let body = body.into_inner();
    let username = body.username.trim();
    let email = body.email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(AppError::validation("Username and email are required"));
    }
    check_password_strength(&body.password)?;

    let profile = body.employee_details.normalized();
    profile.validate().map_err(AppError::Validation)?;

    let ids = identities(username, email, &profile);
    ensure_identities_available(store.get_ref(), &ids).await?;

    let new_user = NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash(&body.password)?,
        role: body.role.unwrap_or(Role::User),
        profile: profile.clone(),
    };

    let id = store
        .insert_user(&new_user)
        .await
        .map_err(|e| AppError::from_store(e, DUPLICATE_USER))?;

    remember_identities(&ids).await;
    info!(user_id = id, created_by = auth.user_id, "User registered");

    let user = store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully",
        "user": user.into_public(),
    })))
}

/// Change the caller's own password
#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Old password is incorrect or new password too short")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    auth: AuthUser,
    body: web::Json<ChangePassword>,
    store: web::Data<MySqlStore>,
) -> Result<HttpResponse, AppError> {
    let user = store
        .find_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if verify_password(&body.old_password, &user.password).is_err() {
        return Err(AppError::validation("Old password is incorrect"));
    }
    check_password_strength(&body.new_password)?;

    store
        .update_password(user.id, &hash(&body.new_password)?)
        .await?;

    info!(user_id = user.id, "Password changed");
    Ok(HttpResponse::Ok().json(json!({ "message": "Password changed successfully" })))
}

/// Seeds an admin from `ADMIN_EMAIL`/`ADMIN_PASSWORD` when the database has none.
pub async fn ensure_initial_admin(store: &MySqlStore, config: &Config) -> anyhow::Result<()> {
    if store.admin_exists().await? {
        return Ok(());
    }

    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        warn!("No admin account exists and ADMIN_EMAIL/ADMIN_PASSWORD are not set");
        return Ok(());
    };

    if store.find_user_by_email(email).await?.is_some() {
        warn!(email = %email, "ADMIN_EMAIL belongs to a non-admin account; not seeding");
        return Ok(());
    }

    let admin = NewUser {
        username: "Super Admin".to_string(),
        email: email.clone(),
        password_hash: hash_password(password)
            .map_err(|e| anyhow::anyhow!("Password hashing failed: {e}"))?,
        role: Role::Admin,
        profile: EmployeeProfile::default(),
    };
    let id = store.insert_user(&admin).await?;

    remember_identities(&[(Identity::Username, &admin.username), (Identity::Email, email)]).await;
    info!(user_id = id, "Initial admin user created");
    Ok(())
}
