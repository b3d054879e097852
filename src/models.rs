use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::employee::EmployeeProfile;
use crate::model::role::Role;
use crate::model::user::User;

#[derive(Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "admin@company.com")]
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterUser {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    pub password: String,
    /// Defaults to `user`
    pub role: Option<Role>,
    #[serde(default)]
    pub employee_details: EmployeeProfile,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,
}
