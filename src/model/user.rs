use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::employee::EmployeeProfile;
use super::role::Role;

/// Row as stored; carries the password hash and never leaves the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: u8,
    #[sqlx(flatten)]
    pub profile: EmployeeProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    pub role: Role,
    pub employee_details: EmployeeProfile,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Who a document was issued to, attached to offer letter reads.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserSummary {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    #[schema(example = "John Doe")]
    pub employee_name: Option<String>,
    #[schema(example = "EMP-001")]
    pub emp_no: Option<String>,
}

impl From<&UserRecord> for UserSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            employee_name: user.profile.employee_name.clone(),
            emp_no: user.profile.emp_no.clone(),
        }
    }
}

/// A user about to be inserted; `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub profile: EmployeeProfile,
}

impl UserRecord {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn into_public(self) -> User {
        User {
            id: self.id,
            role: Role::from_id(self.role_id).unwrap_or(Role::User),
            username: self.username,
            email: self.email,
            employee_details: self.profile,
            created_at: self.created_at,
        }
    }

    /// Display name used on documents: profile name, then username.
    pub fn display_name(&self) -> &str {
        self.profile
            .employee_name
            .as_deref()
            .unwrap_or(&self.username)
    }
}
