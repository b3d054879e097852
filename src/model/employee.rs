use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Payroll attributes of a user, owned by user management and read by the
/// salary-slip and offer-letter pipelines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "employee_name": "John Doe",
        "emp_no": "EMP-001",
        "date_of_joining": "2024-01-01",
        "pan_no": "ABCDE1234F",
        "designation": "Software Engineer",
        "department": "Engineering",
        "location": "Gandhinagar",
        "payment_mode": "Bank Transfer",
        "bank_name": "State Bank",
        "bank_account_no": "000123456789"
    })
)]
pub struct EmployeeProfile {
    pub employee_name: Option<String>,
    pub emp_no: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub date_of_joining: Option<NaiveDate>,
    pub pan_no: Option<String>,
    pub pf_no: Option<String>,
    pub pf_uan_no: Option<String>,
    pub esic_no: Option<String>,
    pub aadhar_no: Option<String>,
    #[schema(example = "Male")]
    pub gender: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub grade: Option<String>,
    pub vertical: Option<String>,
    pub division: Option<String>,
    pub location: Option<String>,
    pub payment_mode: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_no: Option<String>,
    pub permanent_address: Option<String>,
    pub current_address: Option<String>,
}

impl EmployeeProfile {
    /// Trims every text field and drops the ones left empty.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.employee_name,
            &mut self.emp_no,
            &mut self.pan_no,
            &mut self.pf_no,
            &mut self.pf_uan_no,
            &mut self.esic_no,
            &mut self.aadhar_no,
            &mut self.gender,
            &mut self.designation,
            &mut self.department,
            &mut self.grade,
            &mut self.vertical,
            &mut self.division,
            &mut self.location,
            &mut self.payment_mode,
            &mut self.bank_name,
            &mut self.bank_account_no,
            &mut self.permanent_address,
            &mut self.current_address,
        ] {
            *field = field
                .take()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(gender) = &self.gender {
            gender
                .parse::<Gender>()
                .map_err(|_| format!("Invalid gender: {gender}. Expected Male, Female or Other"))?;
        }
        Ok(())
    }

    /// Preferred postal address for letters.
    pub fn address(&self) -> Option<&str> {
        self.permanent_address
            .as_deref()
            .or(self.current_address.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_and_drops_blank_fields() {
        let profile = EmployeeProfile {
            employee_name: Some("  Jane Roe ".into()),
            pan_no: Some("   ".into()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(profile.employee_name.as_deref(), Some("Jane Roe"));
        assert_eq!(profile.pan_no, None);
    }

    #[test]
    fn rejects_unknown_gender() {
        let profile = EmployeeProfile {
            gender: Some("Robot".into()),
            ..Default::default()
        };
        assert!(profile.validate().is_err());

        let ok = EmployeeProfile {
            gender: Some("Female".into()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn prefers_permanent_address() {
        let profile = EmployeeProfile {
            permanent_address: Some("Permanent".into()),
            current_address: Some("Current".into()),
            ..Default::default()
        };
        assert_eq!(profile.address(), Some("Permanent"));

        let current_only = EmployeeProfile {
            current_address: Some("Current".into()),
            ..Default::default()
        };
        assert_eq!(current_only.address(), Some("Current"));
    }
}
