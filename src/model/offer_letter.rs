use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::money::Money;
use super::user::UserSummary;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OfferLetterType {
    InternshipZeroStipend,
    InternshipStipend,
    EmployeeSalary,
}

impl OfferLetterType {
    pub fn is_internship(self) -> bool {
        matches!(
            self,
            OfferLetterType::InternshipZeroStipend | OfferLetterType::InternshipStipend
        )
    }

    /// Paid offers must carry an amount.
    pub fn is_paid(self) -> bool {
        !matches!(self, OfferLetterType::InternshipZeroStipend)
    }

    /// `employee-salary` style tag used in download filenames.
    pub fn file_tag(self) -> String {
        self.as_ref().replace('_', "-")
    }
}

impl TryFrom<String> for OfferLetterType {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct OfferLetter {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "John Doe")]
    pub candidate_name: String,
    pub candidate_address: Option<String>,
    /// Employee number the letter was issued against
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(value_type = String, format = "date")]
    pub offer_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "Web Developer Trainee")]
    pub position: String,
    #[sqlx(try_from = "String")]
    pub offer_letter_type: OfferLetterType,
    pub stipend: Option<Money>,
    #[schema(example = "Ten Thousand Rupees Only")]
    pub stipend_in_words: Option<String>,
    #[schema(example = "8 Weeks")]
    pub internship_period: Option<String>,
    pub supervisor_name: Option<String>,
    pub company_name: String,
    pub company_address: String,
    pub hr_name: String,
    pub hr_designation: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
    /// Present on reads while the account still exists
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// A validated letter that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOfferLetter {
    pub user_id: u64,
    pub candidate_name: String,
    pub candidate_address: Option<String>,
    pub employee_id: String,
    pub offer_date: NaiveDate,
    pub start_date: NaiveDate,
    pub position: String,
    pub offer_letter_type: OfferLetterType,
    pub stipend: Option<Money>,
    pub stipend_in_words: Option<String>,
    pub internship_period: Option<String>,
    pub supervisor_name: Option<String>,
    pub company_name: String,
    pub company_address: String,
    pub hr_name: String,
    pub hr_designation: String,
}

impl OfferLetter {
    pub fn to_new(&self) -> NewOfferLetter {
        NewOfferLetter {
            user_id: self.user_id,
            candidate_name: self.candidate_name.clone(),
            candidate_address: self.candidate_address.clone(),
            employee_id: self.employee_id.clone(),
            offer_date: self.offer_date,
            start_date: self.start_date,
            position: self.position.clone(),
            offer_letter_type: self.offer_letter_type,
            stipend: self.stipend,
            stipend_in_words: self.stipend_in_words.clone(),
            internship_period: self.internship_period.clone(),
            supervisor_name: self.supervisor_name.clone(),
            company_name: self.company_name.clone(),
            company_address: self.company_address.clone(),
            hr_name: self.hr_name.clone(),
            hr_designation: self.hr_designation.clone(),
        }
    }
}
