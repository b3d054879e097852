use actix_web::{HttpResponse, web};
use serde_json::{Map, Value};

use crate::auth::auth::AuthUser;
use crate::auth::handlers::{
    DUPLICATE_USER, ensure_identities_available, forget_identities, remember_identities,
};
use crate::error::AppError;
use crate::model::employee::Gender;
use crate::model::role::Role;
use crate::model::user::{User, UserRecord};
use crate::store::{MySqlStore, UserStore};
use crate::utils::db_utils::build_update_sql;
use crate::utils::identity_filter::Identity;

/// Columns an admin may change through `PUT /users/{id}`.
const USER_COLUMNS: &[&str] = &[
    "username", "email", "role_id",
    "employee_name", "emp_no", "date_of_joining", "pan_no", "pf_no", "pf_uan_no", "esic_no",
    "aadhar_no", "gender", "designation", "department", "grade", "vertical", "division",
    "location", "payment_mode", "bank_name", "bank_account_no", "permanent_address",
    "current_address",
];

const REQUIRED_COLUMNS: &[&str] = &["username", "email"];

/// Turns a client patch into column values: `role` becomes `role_id`, the
/// nested `employee_details` object is flattened, strings are trimmed and
/// blanks become NULL.
fn normalize_user_update(payload: Value) -> Result<Map<String, Value>, AppError> {
    let Value::Object(mut obj) = payload else {
        return Err(AppError::validation("Payload must be a JSON object"));
    };

    if let Some(details) = obj.remove("employee_details") {
        match details {
            Value::Object(fields) => obj.extend(fields),
            Value::Null => {}
            _ => return Err(AppError::validation("employee_details must be an object")),
        }
    }

    let mut out = Map::with_capacity(obj.len());
    for (key, value) in obj {
        if key == "role" {
            let role: Role = serde_json::from_value(value)
                .map_err(|_| AppError::validation("Invalid role. Expected admin or user"))?;
            out.insert("role_id".into(), Value::from(role.id()));
            continue;
        }

        let value = match value {
            Value::String(s) if s.trim().is_empty() => Value::Null,
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        };

        if value.is_null() && REQUIRED_COLUMNS.contains(&key.as_str()) {
            return Err(AppError::validation(format!("{key} must not be empty")));
        }

        match (key.as_str(), &value) {
            ("gender", Value::String(g)) => {
                g.parse::<Gender>().map_err(|_| {
                    AppError::validation(format!("Invalid gender: {g}. Expected Male, Female or Other"))
                })?;
            }
            ("date_of_joining", Value::String(d)) => {
                chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| {
                    AppError::validation("date_of_joining must be formatted as YYYY-MM-DD")
                })?;
            }
            _ => {}
        }

        out.insert(key, value);
    }

    Ok(out)
}

fn identity_of(user: &UserRecord, identity: Identity) -> Option<&str> {
    match identity {
        Identity::Username => Some(&user.username),
        Identity::Email => Some(&user.email),
        Identity::EmpNo => user.profile.emp_no.as_deref(),
    }
}

/// Identities whose value the patch actually changes: `(identity, old, new)`.
fn changed_identities<'a>(
    current: &'a UserRecord,
    changes: &'a Map<String, Value>,
) -> Vec<(Identity, Option<&'a str>, Option<&'a str>)> {
    [Identity::Username, Identity::Email, Identity::EmpNo]
        .into_iter()
        .filter_map(|identity| {
            let new = changes.get(identity.column())?.as_str();
            let old = identity_of(current, identity);
            let same = match (old, new) {
                (Some(o), Some(n)) => o.eq_ignore_ascii_case(n),
                (None, None) => true,
                _ => false,
            };
            (!same).then_some((identity, old, new))
        })
        .collect()
}

async fn require_user(store: &MySqlStore, user_id: u64) -> Result<UserRecord, AppError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn list_users(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let users: Vec<User> = store
        .list_users()
        .await?
        .into_iter()
        .map(UserRecord::into_public)
        .collect();
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id", description = "User ID")),
    responses(
        (status = 200, body = User),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn get_user(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let user = require_user(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user.into_public()))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    request_body(
        content = Object,
        description = "Any of `username`, `email`, `role` and `employee_details` fields",
        example = json!({"role": "admin", "employee_details": {"designation": "Team Lead"}})
    ),
    params(("id", description = "User ID")),
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username, e-mail or employee number taken")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update_user(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let user_id = path.into_inner();
    let current = require_user(store.get_ref(), user_id).await?;
    let changes = normalize_user_update(body.into_inner())?;

    let changed = changed_identities(&current, &changes);
    let claimed: Vec<(Identity, &str)> = changed
        .iter()
        .filter_map(|&(identity, _, new)| Some((identity, new?)))
        .collect();
    ensure_identities_available(store.get_ref(), &claimed).await?;

    let update = build_update_sql("users", &Value::Object(changes.clone()), USER_COLUMNS, "id", user_id)?;
    store
        .update_user(update)
        .await
        .map_err(|e| AppError::from_store(e, DUPLICATE_USER))?;

    let released: Vec<(Identity, &str)> = changed
        .iter()
        .filter_map(|&(identity, old, _)| Some((identity, old?)))
        .collect();
    forget_identities(&released).await;
    remember_identities(&claimed).await;

    tracing::info!(user_id, updated_by = auth.user_id, "User updated");

    let user = require_user(store.get_ref(), user_id).await?;
    Ok(HttpResponse::Ok().json(user.into_public()))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id", description = "User ID")),
    responses(
        (status = 200, description = "User removed together with their slips and offer letter"),
        (status = 403, description = "Admins cannot delete their own account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn delete_user(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let user_id = path.into_inner();
    if user_id == auth.user_id {
        return Err(AppError::forbidden(
            "You cannot delete your own admin account through this route",
        ));
    }

    let user = require_user(store.get_ref(), user_id).await?;
    if !store.delete_user(user_id).await? {
        return Err(AppError::not_found("User not found"));
    }

    let released = [
        (Identity::Username, Some(user.username.as_str())),
        (Identity::Email, Some(user.email.as_str())),
        (Identity::EmpNo, user.profile.emp_no.as_deref()),
    ];
    let released: Vec<(Identity, &str)> = released
        .into_iter()
        .filter_map(|(identity, value)| Some((identity, value?)))
        .collect();
    forget_identities(&released).await;

    tracing::info!(user_id, deleted_by = auth.user_id, "User removed");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "User removed successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeProfile;
    use chrono::Utc;
    use serde_json::json;

    fn record() -> UserRecord {
        UserRecord {
            id: 5,
            username: "jdoe".into(),
            email: "jdoe@corp.com".into(),
            password: String::new(),
            role_id: Role::User.id(),
            profile: EmployeeProfile {
                emp_no: Some("EMP-5".into()),
                ..Default::default()
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn flattens_details_and_maps_role() {
        let changes = normalize_user_update(json!({
            "role": "admin",
            "employee_details": { "designation": "  Lead ", "pan_no": "" }
        }))
        .unwrap();

        assert_eq!(changes.get("role_id"), Some(&json!(1)));
        assert_eq!(changes.get("designation"), Some(&json!("Lead")));
        assert_eq!(changes.get("pan_no"), Some(&Value::Null));
        assert!(!changes.contains_key("role"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(normalize_user_update(json!({ "role": "root" })).is_err());
        assert!(normalize_user_update(json!({ "gender": "Robot" })).is_err());
        assert!(normalize_user_update(json!({ "date_of_joining": "01/02/2024" })).is_err());
        assert!(normalize_user_update(json!({ "email": "  " })).is_err());
        assert!(normalize_user_update(json!("text")).is_err());
    }

    #[test]
    fn unknown_columns_fail_the_whitelist() {
        let changes = normalize_user_update(json!({ "password": "x" })).unwrap();
        let err = build_update_sql("users", &Value::Object(changes), USER_COLUMNS, "id", 5);
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn only_changed_identities_are_checked() {
        let current = record();
        let changes = normalize_user_update(json!({
            "username": "JDOE",
            "email": "new@corp.com",
            "employee_details": { "emp_no": null }
        }))
        .unwrap();

        let changed = changed_identities(&current, &changes);
        assert_eq!(
            changed,
            vec![
                (Identity::Email, Some("jdoe@corp.com"), Some("new@corp.com")),
                (Identity::EmpNo, Some("EMP-5"), None),
            ]
        );
    }
}
