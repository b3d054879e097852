use std::collections::HashMap;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::config::CompanyDefaults;
use crate::document::{PageLayout, PdfRenderer, render_salary_slip};
use crate::error::{AppError, Result};
use crate::model::money::Money;
use crate::model::month::Month;
use crate::model::salary::{
    AttendanceDays, Deductions, DeductionsUpdate, Earnings, EarningsUpdate, EmployeeSnapshot,
    NewSalarySlip, SalarySlip,
};
use crate::model::user::UserRecord;
use crate::payroll::{amount_in_words, slip_totals};
use crate::store::{SalaryStore, UserStore};

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSalarySlip {
    #[schema(example = "June")]
    pub month: String,
    #[schema(example = 2025)]
    pub year: i32,
    /// Defaults to the configured company name
    pub company_name: Option<String>,
    #[serde(default)]
    pub salary_ctc: Money,
    #[serde(flatten)]
    pub days: AttendanceDays,
    #[serde(default)]
    pub earnings: Earnings,
    #[serde(default)]
    pub deductions: Deductions,
}

/// Partial update; only the given fields change. Totals and words are always
/// recomputed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateSalarySlip {
    #[schema(example = "July")]
    pub month: Option<String>,
    pub year: Option<i32>,
    pub company_name: Option<String>,
    pub salary_ctc: Option<Money>,
    #[serde(flatten)]
    pub days: AttendanceDays,
    pub earnings: Option<EarningsUpdate>,
    pub deductions: Option<DeductionsUpdate>,
}

/// Accepts `june`, `JUNE` and ` June `.
pub fn parse_month(raw: &str) -> Result<Month> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let normalized = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect::<String>(),
        None => return Err(AppError::validation("Month is required")),
    };
    normalized
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid month name: {raw}")))
}

fn validate_year(year: i32) -> Result<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Year must be between {MIN_YEAR} and {MAX_YEAR}"
        )))
    }
}

fn validate_slip(slip: &NewSalarySlip) -> Result<()> {
    validate_year(slip.year)?;

    let components = std::iter::once(("Salary CTC", slip.salary_ctc))
        .chain(slip.earnings.components())
        .chain(slip.deductions.components());
    for (label, amount) in components {
        if amount.is_negative() {
            return Err(AppError::validation(format!("{label} must not be negative")));
        }
        if amount.as_rupees() > Money::MAX_RUPEES {
            return Err(AppError::validation(format!(
                "{label} must not exceed {}",
                Money::MAX_RUPEES
            )));
        }
    }

    for days in slip.days.values().into_iter().flatten() {
        if !days.is_finite() || days < 0.0 {
            return Err(AppError::validation("Day counts must be non-negative numbers"));
        }
    }

    if slip.company_name.trim().is_empty() {
        return Err(AppError::validation("Company name is required"));
    }
    if slip.employee.employee_name.trim().is_empty() {
        return Err(AppError::validation("Employee name is required"));
    }
    Ok(())
}

/// Runs aggregation and words rendering, then validates the finished record.
/// Nothing reaches the store unless this succeeds.
fn finalize(mut slip: NewSalarySlip) -> Result<NewSalarySlip> {
    validate_slip(&slip)?;
    slip.totals = slip_totals(&slip.earnings, &slip.deductions)
        .ok_or_else(|| AppError::validation("Salary amounts are too large to total"))?;
    if slip.totals.net_salary.is_negative() {
        return Err(AppError::validation("Total deductions exceed gross salary"));
    }
    slip.net_salary_in_words = amount_in_words(slip.totals.net_salary);
    Ok(slip)
}

fn conflict_message(month: Month, year: i32) -> String {
    format!(
        "Salary slip for {month} {year} already exists for this user. Please edit the existing one."
    )
}

/// Overlays the live profile underneath the stored snapshot.
fn with_live_profile(mut slip: SalarySlip, user: Option<&UserRecord>) -> SalarySlip {
    if let Some(user) = user {
        slip.employee = slip.employee.overlay_on(&EmployeeSnapshot::from_user(user));
    }
    slip
}

async fn require_user<S: UserStore>(store: &S, user_id: u64) -> Result<UserRecord> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

async fn stored_slip<S: SalaryStore>(store: &S, id: u64) -> Result<SalarySlip> {
    store
        .find_slip(id)
        .await?
        .ok_or_else(|| AppError::not_found("Salary slip not found"))
}

pub async fn create_slip<S>(
    store: &S,
    company: &CompanyDefaults,
    user_id: u64,
    req: CreateSalarySlip,
) -> Result<SalarySlip>
where
    S: UserStore + SalaryStore,
{
    let month = parse_month(&req.month)?;
    validate_year(req.year)?;
    let user = require_user(store, user_id).await?;

    if store
        .find_slip_for_period(user_id, month, req.year)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(conflict_message(month, req.year)));
    }

    let slip = finalize(NewSalarySlip {
        user_id,
        month,
        year: req.year,
        company_name: req
            .company_name
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| company.name.clone()),
        employee: EmployeeSnapshot::from_user(&user),
        salary_ctc: req.salary_ctc,
        days: req.days,
        earnings: req.earnings,
        deductions: req.deductions,
        totals: Default::default(),
        net_salary_in_words: String::new(),
    })?;

    // The unique index still decides when two creates race past the check
    let id = store
        .insert_slip(&slip)
        .await
        .map_err(|e| AppError::from_store(e, &conflict_message(month, slip.year)))?;

    tracing::info!(slip_id = id, user_id, %month, year = slip.year, "Salary slip created");
    stored_slip(store, id).await
}

pub async fn update_slip<S>(store: &S, id: u64, req: UpdateSalarySlip) -> Result<SalarySlip>
where
    S: UserStore + SalaryStore,
{
    let current = stored_slip(store, id).await?;
    let user = require_user(store, current.user_id).await?;

    let mut slip = current.to_new();
    if let Some(month) = &req.month {
        slip.month = parse_month(month)?;
    }
    if let Some(year) = req.year {
        slip.year = year;
    }
    if (slip.month, slip.year) != (current.month, current.year) {
        let occupied = store
            .find_slip_for_period(slip.user_id, slip.month, slip.year)
            .await?
            .is_some_and(|other| other.id != id);
        if occupied {
            return Err(AppError::conflict(conflict_message(slip.month, slip.year)));
        }
    }

    if let Some(company_name) = req.company_name {
        slip.company_name = company_name.trim().to_string();
    }
    if let Some(ctc) = req.salary_ctc {
        slip.salary_ctc = ctc;
    }
    slip.days.merge(&req.days);
    if let Some(update) = &req.earnings {
        update.apply_to(&mut slip.earnings);
    }
    if let Some(update) = &req.deductions {
        update.apply_to(&mut slip.deductions);
    }
    // Re-snapshot so the record reflects the profile at the time of this write
    slip.employee = EmployeeSnapshot::from_user(&user);

    let slip = finalize(slip)?;
    let found = store
        .replace_slip(id, &slip)
        .await
        .map_err(|e| AppError::from_store(e, &conflict_message(slip.month, slip.year)))?;
    if !found {
        return Err(AppError::not_found("Salary slip not found"));
    }

    tracing::info!(slip_id = id, user_id = slip.user_id, "Salary slip updated");
    stored_slip(store, id).await
}

pub async fn get_slip<S>(store: &S, id: u64) -> Result<SalarySlip>
where
    S: UserStore + SalaryStore,
{
    let slip = stored_slip(store, id).await?;
    let user = store.find_user(slip.user_id).await?;
    Ok(with_live_profile(slip, user.as_ref()))
}

pub async fn list_for_user<S>(store: &S, user_id: u64) -> Result<Vec<SalarySlip>>
where
    S: UserStore + SalaryStore,
{
    let user = require_user(store, user_id).await?;
    let slips = store.list_slips_for_user(user_id).await?;
    Ok(slips
        .into_iter()
        .map(|s| with_live_profile(s, Some(&user)))
        .collect())
}

pub async fn latest_for_user<S>(store: &S, user_id: u64) -> Result<SalarySlip>
where
    S: UserStore + SalaryStore,
{
    let user = require_user(store, user_id).await?;
    let slip = store
        .latest_slip_for_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("No recent salary slip found for this user"))?;
    Ok(with_live_profile(slip, Some(&user)))
}

pub async fn for_period<S>(store: &S, user_id: u64, month: &str, year: i32) -> Result<SalarySlip>
where
    S: UserStore + SalaryStore,
{
    let month = parse_month(month)?;
    let user = require_user(store, user_id).await?;
    let slip = store
        .find_slip_for_period(user_id, month, year)
        .await?
        .ok_or_else(|| {
            AppError::not_found("Salary slip not found for the specified month and year")
        })?;
    Ok(with_live_profile(slip, Some(&user)))
}

pub async fn list_all<S>(store: &S) -> Result<Vec<SalarySlip>>
where
    S: UserStore + SalaryStore,
{
    let slips = store.list_all_slips().await?;

    let mut users: HashMap<u64, Option<UserRecord>> = HashMap::new();
    let mut out = Vec::with_capacity(slips.len());
    for slip in slips {
        if !users.contains_key(&slip.user_id) {
            let user = store.find_user(slip.user_id).await?;
            users.insert(slip.user_id, user);
        }
        let user = users.get(&slip.user_id).and_then(Option::as_ref);
        out.push(with_live_profile(slip, user));
    }
    Ok(out)
}

pub async fn delete_slip<S: SalaryStore>(store: &S, id: u64) -> Result<()> {
    if !store.delete_slip(id).await? {
        return Err(AppError::not_found("Salary slip not found"));
    }
    tracing::info!(slip_id = id, "Salary slip deleted");
    Ok(())
}

/// Slip as an A4 PDF.
pub async fn render_slip(
    renderer: &PdfRenderer,
    company: &CompanyDefaults,
    logo: Option<&str>,
    slip: &SalarySlip,
) -> Result<Vec<u8>> {
    let html = render_salary_slip(slip, company, logo);
    let pdf = renderer.render(&html, PageLayout::SALARY_SLIP).await?;
    Ok(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::salary_slip::tests::sample_company;
    use crate::model::employee::EmployeeProfile;
    use crate::store::memory::MemoryStore;

    fn profile(name: &str) -> EmployeeProfile {
        EmployeeProfile {
            employee_name: Some(name.into()),
            emp_no: Some("EMP-001".into()),
            designation: Some("Engineer".into()),
            ..Default::default()
        }
    }

    fn request(month: &str, year: i32, basic: f64) -> CreateSalarySlip {
        CreateSalarySlip {
            month: month.into(),
            year,
            company_name: None,
            salary_ctc: Money::from_rupees(30_000.0),
            days: AttendanceDays::default(),
            earnings: Earnings {
                basic: Money::from_rupees(basic),
                ..Default::default()
            },
            deductions: Deductions::default(),
        }
    }

    #[actix_web::test]
    async fn create_computes_totals_and_words() {
        let store = MemoryStore::default();
        let user_id = store.add_user("jdoe", profile("John Doe"));

        let mut req = request("June", 2025, 1_600.5);
        req.deductions.professional_tax = Money::from_rupees(100.0);
        let slip = create_slip(&store, &sample_company(), user_id, req).await.unwrap();

        assert_eq!(slip.month, Month::June);
        assert_eq!(slip.month_numeric, 6);
        assert_eq!(slip.company_name, "Acme Tech");
        assert_eq!(slip.employee.employee_name, "John Doe");
        assert_eq!(slip.totals.gross_salary, Money::from_rupees(1_600.5));
        assert_eq!(slip.totals.total_deductions, Money::from_rupees(100.0));
        assert_eq!(slip.totals.net_salary, Money::from_rupees(1_500.5));
        assert_eq!(
            slip.net_salary_in_words,
            "One Thousand Five Hundred Rupees Only and Fifty Paise Only"
        );
    }

    #[actix_web::test]
    async fn duplicate_period_conflicts_but_other_periods_succeed() {
        let store = MemoryStore::default();
        let company = sample_company();
        let user_id = store.add_user("jdoe", profile("John Doe"));

        create_slip(&store, &company, user_id, request("June", 2025, 1000.0))
            .await
            .unwrap();

        let dup = create_slip(&store, &company, user_id, request("june", 2025, 2000.0)).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        assert!(create_slip(&store, &company, user_id, request("July", 2025, 1000.0)).await.is_ok());
        assert!(create_slip(&store, &company, user_id, request("June", 2024, 1000.0)).await.is_ok());

        let other = store.add_user("asmith", profile("Anna Smith"));
        assert!(create_slip(&store, &company, other, request("June", 2025, 1000.0)).await.is_ok());
    }

    #[actix_web::test]
    async fn store_index_catches_duplicates_past_the_precheck() {
        let store = MemoryStore::default();
        let user_id = store.add_user("jdoe", profile("John Doe"));
        let slip = create_slip(&store, &sample_company(), user_id, request("June", 2025, 1000.0))
            .await
            .unwrap();

        let err = store.insert_slip(&slip.to_new()).await.unwrap_err();
        let mapped = AppError::from_store(err, &conflict_message(Month::June, 2025));
        assert!(matches!(mapped, AppError::Conflict(m) if m.contains("June 2025")));
    }

    #[actix_web::test]
    async fn rejects_invalid_input_before_writing() {
        let store = MemoryStore::default();
        let company = sample_company();
        let user_id = store.add_user("jdoe", profile("John Doe"));

        let bad_month = create_slip(&store, &company, user_id, request("Smarch", 2025, 10.0)).await;
        assert!(matches!(bad_month, Err(AppError::Validation(_))));

        let negative = create_slip(&store, &company, user_id, request("June", 2025, -1.0)).await;
        assert!(matches!(negative, Err(AppError::Validation(_))));

        let mut overdrawn = request("June", 2025, 100.0);
        overdrawn.deductions.leave = Money::from_rupees(150.0);
        let overdrawn = create_slip(&store, &company, user_id, overdrawn).await;
        assert!(matches!(overdrawn, Err(AppError::Validation(_))));

        let mut bad_days = request("June", 2025, 100.0);
        bad_days.days.lop_days = Some(-0.5);
        let bad_days = create_slip(&store, &company, user_id, bad_days).await;
        assert!(matches!(bad_days, Err(AppError::Validation(_))));

        assert!(store.list_all_slips().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn oversized_amounts_are_rejected_without_panicking() {
        let store = MemoryStore::default();
        let company = sample_company();
        let user_id = store.add_user("jdoe", profile("John Doe"));

        let mut huge = request("June", 2025, 1e17);
        huge.earnings.dearness_allowance = Money::from_rupees(1e17);
        let huge = create_slip(&store, &company, user_id, huge).await;
        assert!(matches!(huge, Err(AppError::Validation(m)) if m.starts_with("Basic")));

        // Every component at the ceiling still totals exactly
        let mut ceiling = request("June", 2025, Money::MAX_RUPEES);
        ceiling.earnings.dearness_allowance = Money::from_rupees(Money::MAX_RUPEES);
        ceiling.earnings.house_rent_allowance = Money::from_rupees(Money::MAX_RUPEES);
        let slip = create_slip(&store, &company, user_id, ceiling).await.unwrap();
        assert_eq!(slip.totals.gross_salary, Money::from_rupees(3.0 * Money::MAX_RUPEES));
    }

    #[actix_web::test]
    async fn unknown_user_and_slip_are_not_found() {
        let store = MemoryStore::default();
        let missing_user = create_slip(&store, &sample_company(), 42, request("June", 2025, 1.0)).await;
        assert!(matches!(missing_user, Err(AppError::NotFound(_))));

        let missing_slip = update_slip(&store, 42, UpdateSalarySlip::default()).await;
        assert!(matches!(missing_slip, Err(AppError::NotFound(_))));

        assert!(matches!(get_slip(&store, 42).await, Err(AppError::NotFound(_))));
        assert!(matches!(delete_slip(&store, 42).await, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn update_recomputes_words_from_new_net() {
        let store = MemoryStore::default();
        let user_id = store.add_user("jdoe", profile("John Doe"));
        let slip = create_slip(&store, &sample_company(), user_id, request("June", 2025, 1_000.0))
            .await
            .unwrap();
        assert_eq!(slip.net_salary_in_words, "One Thousand Rupees Only");

        let update = UpdateSalarySlip {
            earnings: Some(EarningsUpdate {
                medical_allowance: Some(Money::from_rupees(21.0)),
                ..Default::default()
            }),
            deductions: Some(DeductionsUpdate {
                lwf: Some(Money::from_rupees(0.75)),
                ..Default::default()
            }),
            ..Default::default()
        };
        let updated = update_slip(&store, slip.id, update).await.unwrap();

        assert_eq!(updated.earnings.basic, Money::from_rupees(1_000.0));
        assert_eq!(updated.totals.net_salary, Money::from_rupees(1_020.25));
        assert_eq!(
            updated.net_salary_in_words,
            "One Thousand Twenty Rupees Only and Twenty Five Paise Only"
        );
    }

    #[actix_web::test]
    async fn moving_onto_an_occupied_period_conflicts() {
        let store = MemoryStore::default();
        let company = sample_company();
        let user_id = store.add_user("jdoe", profile("John Doe"));
        create_slip(&store, &company, user_id, request("June", 2025, 1.0)).await.unwrap();
        let july = create_slip(&store, &company, user_id, request("July", 2025, 1.0))
            .await
            .unwrap();

        let moved = update_slip(
            &store,
            july.id,
            UpdateSalarySlip {
                month: Some("June".into()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(moved, Err(AppError::Conflict(_))));

        let renamed = update_slip(
            &store,
            july.id,
            UpdateSalarySlip {
                month: Some("August".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.month, Month::August);
        assert_eq!(renamed.month_numeric, 8);
    }

    #[actix_web::test]
    async fn reads_overlay_current_profile_and_updates_resnapshot() {
        let store = MemoryStore::default();
        let user_id = store.add_user("jdoe", profile("John Doe"));
        let slip = create_slip(&store, &sample_company(), user_id, request("June", 2025, 1.0))
            .await
            .unwrap();
        assert_eq!(slip.employee.pan_no, None);

        store.set_profile(
            user_id,
            EmployeeProfile {
                pan_no: Some("ABCDE1234F".into()),
                designation: Some("Senior Engineer".into()),
                ..profile("John Doe")
            },
        );

        // Stored designation wins; the missing PAN comes from the live profile
        let read = get_slip(&store, slip.id).await.unwrap();
        assert_eq!(read.employee.designation.as_deref(), Some("Engineer"));
        assert_eq!(read.employee.pan_no.as_deref(), Some("ABCDE1234F"));

        let updated = update_slip(&store, slip.id, UpdateSalarySlip::default()).await.unwrap();
        assert_eq!(updated.employee.designation.as_deref(), Some("Senior Engineer"));
    }

    #[actix_web::test]
    async fn lists_newest_period_first() {
        let store = MemoryStore::default();
        let company = sample_company();
        let user_id = store.add_user("jdoe", profile("John Doe"));
        for (m, y) in [("March", 2025), ("December", 2024), ("June", 2025)] {
            create_slip(&store, &company, user_id, request(m, y, 1.0)).await.unwrap();
        }

        let periods: Vec<_> = list_for_user(&store, user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.month, s.year))
            .collect();
        assert_eq!(
            periods,
            vec![(Month::June, 2025), (Month::March, 2025), (Month::December, 2024)]
        );

        let latest = latest_for_user(&store, user_id).await.unwrap();
        assert_eq!((latest.month, latest.year), (Month::June, 2025));

        let march = for_period(&store, user_id, "march", 2025).await.unwrap();
        assert_eq!(march.month, Month::March);
        assert!(matches!(
            for_period(&store, user_id, "April", 2025).await,
            Err(AppError::NotFound(_))
        ));

        assert_eq!(list_all(&store).await.unwrap().len(), 3);
    }

    #[test]
    fn parses_month_names_loosely() {
        assert_eq!(parse_month(" june ").unwrap(), Month::June);
        assert_eq!(parse_month("SEPTEMBER").unwrap(), Month::September);
        assert!(parse_month("").is_err());
        assert!(parse_month("Jun").is_err());
    }
}
