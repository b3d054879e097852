use crate::model::employee::{EmployeeProfile, Gender};
use crate::model::money::Money;
use crate::model::month::Month;
use crate::model::offer_letter::{OfferLetter, OfferLetterType};
use crate::model::role::Role;
use crate::model::salary::{
    AttendanceDays, Deductions, DeductionsUpdate, Earnings, EarningsUpdate, EmployeeSnapshot,
    SalarySlip, SalaryTotals,
};
use crate::model::user::{User, UserSummary};
use crate::models::{ChangePassword, LoginReq, LoginResponse, RegisterUser};
use crate::service::offer_letter::{CreateOfferLetter, UpdateOfferLetter};
use crate::service::salary::{CreateSalarySlip, UpdateSalarySlip};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

/// Registers the `bearer_auth` scheme referenced by protected paths.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll HRM API",
        version = "1.0.0",
        description = r#"
## Payroll & HR Document Service

Issues monthly **salary slips** and **offer letters** for the employees of one company,
and renders both as printable PDF documents.

### Key Features
- **Salary Slips**
  - One slip per employee per month, itemized earnings and deductions
  - Gross, total deductions and net pay computed server side, net pay spelled out in words
- **Offer Letters**
  - Internship (with or without stipend) and employment offers, one per employee
- **User Management**
  - Accounts carry the employee profile printed on every document

### Security
All endpoints except login require a **JWT Bearer** token.
Writes are limited to **Admin**; employees can read and download their own documents.

### Response Format
- JSON bodies in snake_case, errors as `{"message": "..."}`
- Downloads as `application/pdf` attachments

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::register,
        crate::auth::handlers::change_password,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,

        crate::api::salary::list_all_slips,
        crate::api::salary::create_slip,
        crate::api::salary::list_user_slips,
        crate::api::salary::latest_user_slip,
        crate::api::salary::user_slip_for_period,
        crate::api::salary::get_slip,
        crate::api::salary::update_slip,
        crate::api::salary::delete_slip,
        crate::api::salary::download_slip,

        crate::api::offer_letter::create_offer_letter,
        crate::api::offer_letter::list_offer_letters,
        crate::api::offer_letter::user_offer_letter,
        crate::api::offer_letter::get_offer_letter,
        crate::api::offer_letter::update_offer_letter,
        crate::api::offer_letter::delete_offer_letter,
        crate::api::offer_letter::download_offer_letter
    ),
    components(
        schemas(
            LoginReq,
            LoginResponse,
            RegisterUser,
            ChangePassword,
            User,
            UserSummary,
            Role,
            EmployeeProfile,
            Gender,
            Money,
            Month,
            Earnings,
            Deductions,
            EarningsUpdate,
            DeductionsUpdate,
            AttendanceDays,
            EmployeeSnapshot,
            SalaryTotals,
            SalarySlip,
            CreateSalarySlip,
            UpdateSalarySlip,
            OfferLetterType,
            OfferLetter,
            CreateOfferLetter,
            UpdateOfferLetter
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, registration and password APIs"),
        (name = "User", description = "User and employee profile management APIs"),
        (name = "Salary", description = "Salary slip APIs"),
        (name = "Offer Letter", description = "Offer letter APIs"),
    )
)]
pub struct ApiDoc;
