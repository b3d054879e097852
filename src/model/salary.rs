use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::money::Money;
use super::month::Month;
use super::user::UserRecord;

/// Itemized earnings of a slip. Absent components default to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Earnings {
    pub basic: Money,
    pub dearness_allowance: Money,
    pub house_rent_allowance: Money,
    pub conveyance_allowance: Money,
    pub medical_allowance: Money,
    pub special_allowance: Money,
    pub uniform_allowance: Money,
    pub internet_allowance: Money,
    pub fuel_allowance: Money,
    pub children_education_allowance: Money,
    pub other_allowance: Money,
}

impl Earnings {
    /// Components in the order they are printed on the slip.
    pub fn components(&self) -> [(&'static str, Money); 11] {
        [
            ("Basic", self.basic),
            ("Dearness Allowance", self.dearness_allowance),
            ("House Rent Allowance", self.house_rent_allowance),
            ("Conveyance Allowance", self.conveyance_allowance),
            ("Medical Allowance", self.medical_allowance),
            ("Special Allowance", self.special_allowance),
            ("Uniform Allowance", self.uniform_allowance),
            ("Internet Allowance", self.internet_allowance),
            ("Fuel Allowance", self.fuel_allowance),
            ("Children Education Allowance", self.children_education_allowance),
            ("Other Allowance", self.other_allowance),
        ]
    }
}

/// Itemized deductions of a slip. Absent components default to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Deductions {
    pub professional_tax: Money,
    pub tax_deducted_at_source: Money,
    pub employee_provident_fund: Money,
    /// Labour welfare fund
    pub lwf: Money,
    pub leave: Money,
}

impl Deductions {
    pub fn components(&self) -> [(&'static str, Money); 5] {
        [
            ("Professional Tax", self.professional_tax),
            ("Tax Deducted at Source", self.tax_deducted_at_source),
            ("Employee Provident Fund", self.employee_provident_fund),
            ("LWF", self.lwf),
            ("Leave", self.leave),
        ]
    }
}

/// Partial earnings for updates; only the given components change.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EarningsUpdate {
    pub basic: Option<Money>,
    pub dearness_allowance: Option<Money>,
    pub house_rent_allowance: Option<Money>,
    pub conveyance_allowance: Option<Money>,
    pub medical_allowance: Option<Money>,
    pub special_allowance: Option<Money>,
    pub uniform_allowance: Option<Money>,
    pub internet_allowance: Option<Money>,
    pub fuel_allowance: Option<Money>,
    pub children_education_allowance: Option<Money>,
    pub other_allowance: Option<Money>,
}

impl EarningsUpdate {
    pub fn apply_to(&self, target: &mut Earnings) {
        let pairs = [
            (&mut target.basic, self.basic),
            (&mut target.dearness_allowance, self.dearness_allowance),
            (&mut target.house_rent_allowance, self.house_rent_allowance),
            (&mut target.conveyance_allowance, self.conveyance_allowance),
            (&mut target.medical_allowance, self.medical_allowance),
            (&mut target.special_allowance, self.special_allowance),
            (&mut target.uniform_allowance, self.uniform_allowance),
            (&mut target.internet_allowance, self.internet_allowance),
            (&mut target.fuel_allowance, self.fuel_allowance),
            (&mut target.children_education_allowance, self.children_education_allowance),
            (&mut target.other_allowance, self.other_allowance),
        ];
        for (slot, value) in pairs {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DeductionsUpdate {
    pub professional_tax: Option<Money>,
    pub tax_deducted_at_source: Option<Money>,
    pub employee_provident_fund: Option<Money>,
    pub lwf: Option<Money>,
    pub leave: Option<Money>,
}

impl DeductionsUpdate {
    pub fn apply_to(&self, target: &mut Deductions) {
        let pairs = [
            (&mut target.professional_tax, self.professional_tax),
            (&mut target.tax_deducted_at_source, self.tax_deducted_at_source),
            (&mut target.employee_provident_fund, self.employee_provident_fund),
            (&mut target.lwf, self.lwf),
            (&mut target.leave, self.leave),
        ];
        for (slot, value) in pairs {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

/// Day counts printed on the slip. Half days are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(default)]
pub struct AttendanceDays {
    pub total_number_of_days: Option<f64>,
    pub working_days: Option<f64>,
    pub paid_days: Option<f64>,
    pub lop_days: Option<f64>,
    pub refund_days: Option<f64>,
    pub arrear_days: Option<f64>,
}

impl AttendanceDays {
    pub fn values(&self) -> [Option<f64>; 6] {
        [
            self.total_number_of_days,
            self.working_days,
            self.paid_days,
            self.lop_days,
            self.refund_days,
            self.arrear_days,
        ]
    }

    /// Overwrites only the counts present in `other`.
    pub fn merge(&mut self, other: &AttendanceDays) {
        let pairs = [
            (&mut self.total_number_of_days, other.total_number_of_days),
            (&mut self.working_days, other.working_days),
            (&mut self.paid_days, other.paid_days),
            (&mut self.lop_days, other.lop_days),
            (&mut self.refund_days, other.refund_days),
            (&mut self.arrear_days, other.arrear_days),
        ];
        for (slot, value) in pairs {
            if value.is_some() {
                *slot = value;
            }
        }
    }
}

/// Employee profile as it was when the slip was last written.
///
/// The live profile can move on after that; reads overlay the live profile
/// underneath this snapshot (see [`EmployeeSnapshot::overlay_on`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeSnapshot {
    pub employee_name: String,
    pub emp_no: Option<String>,
    pub employee_email: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub date_of_joining: Option<NaiveDate>,
    pub pan_no: Option<String>,
    pub pf_no: Option<String>,
    pub pf_uan_no: Option<String>,
    pub esic_no: Option<String>,
    pub aadhar_no: Option<String>,
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
}

impl EmployeeSnapshot {
    pub fn from_user(user: &UserRecord) -> Self {
        let p = user.profile.clone();
        Self {
            employee_name: user.display_name().to_string(),
            emp_no: p.emp_no,
            employee_email: Some(user.email.clone()),
            date_of_joining: p.date_of_joining,
            pan_no: p.pan_no,
            pf_no: p.pf_no,
            pf_uan_no: p.pf_uan_no,
            esic_no: p.esic_no,
            aadhar_no: p.aadhar_no,
            gender: p.gender,
            designation: p.designation,
            department: p.department,
            grade: p.grade,
            vertical: p.vertical,
            division: p.division,
            location: p.location,
            payment_mode: p.payment_mode,
            bank_name: p.bank_name,
            bank_account_no: p.bank_account_no,
        }
    }

    /// Merges profile-then-record: fields present on `self` win, missing or
    /// blank ones fall back to `live`.
    pub fn overlay_on(self, live: &EmployeeSnapshot) -> Self {
        fn pick(own: Option<String>, live: &Option<String>) -> Option<String> {
            own.filter(|v| !v.trim().is_empty()).or_else(|| live.clone())
        }

        Self {
            employee_name: if self.employee_name.trim().is_empty() {
                live.employee_name.clone()
            } else {
                self.employee_name
            },
            emp_no: pick(self.emp_no, &live.emp_no),
            employee_email: pick(self.employee_email, &live.employee_email),
            date_of_joining: self.date_of_joining.or(live.date_of_joining),
            pan_no: pick(self.pan_no, &live.pan_no),
            pf_no: pick(self.pf_no, &live.pf_no),
            pf_uan_no: pick(self.pf_uan_no, &live.pf_uan_no),
            esic_no: pick(self.esic_no, &live.esic_no),
            aadhar_no: pick(self.aadhar_no, &live.aadhar_no),
            gender: pick(self.gender, &live.gender),
            designation: pick(self.designation, &live.designation),
            department: pick(self.department, &live.department),
            grade: pick(self.grade, &live.grade),
            vertical: pick(self.vertical, &live.vertical),
            division: pick(self.division, &live.division),
            location: pick(self.location, &live.location),
            payment_mode: pick(self.payment_mode, &live.payment_mode),
            bank_name: pick(self.bank_name, &live.bank_name),
            bank_account_no: pick(self.bank_account_no, &live.bank_account_no),
        }
    }
}

/// Derived amounts; always recomputed from the components on write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryTotals {
    pub gross_salary: Money,
    pub total_deductions: Money,
    pub net_salary: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct SalarySlip {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub user_id: u64,
    #[sqlx(try_from = "String")]
    pub month: Month,
    #[schema(example = 6)]
    pub month_numeric: u8,
    #[schema(example = 2025)]
    pub year: i32,
    pub company_name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub employee: EmployeeSnapshot,
    pub salary_ctc: Money,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub days: AttendanceDays,
    #[sqlx(json)]
    pub earnings: Earnings,
    #[sqlx(json)]
    pub deductions: Deductions,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub totals: SalaryTotals,
    #[schema(example = "One Thousand Five Hundred Rupees Only")]
    pub net_salary_in_words: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

/// A fully computed slip that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSalarySlip {
    pub user_id: u64,
    pub month: Month,
    pub year: i32,
    pub company_name: String,
    pub employee: EmployeeSnapshot,
    pub salary_ctc: Money,
    pub days: AttendanceDays,
    pub earnings: Earnings,
    pub deductions: Deductions,
    pub totals: SalaryTotals,
    pub net_salary_in_words: String,
}

impl NewSalarySlip {
    pub fn month_numeric(&self) -> u8 {
        self.month.numeric()
    }
}

impl SalarySlip {
    /// The writable part of a stored slip.
    pub fn to_new(&self) -> NewSalarySlip {
        NewSalarySlip {
            user_id: self.user_id,
            month: self.month,
            year: self.year,
            company_name: self.company_name.clone(),
            employee: self.employee.clone(),
            salary_ctc: self.salary_ctc,
            days: self.days.clone(),
            earnings: self.earnings.clone(),
            deductions: self.deductions.clone(),
            totals: self.totals,
            net_salary_in_words: self.net_salary_in_words.clone(),
        }
    }
}
