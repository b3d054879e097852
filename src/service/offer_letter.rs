use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::config::CompanyDefaults;
use crate::document::{PageLayout, PdfRenderer, render_offer_letter};
use crate::error::{AppError, Result};
use crate::model::money::Money;
use crate::model::offer_letter::{NewOfferLetter, OfferLetter, OfferLetterType};
use crate::model::user::UserSummary;
use crate::payroll::amount_in_words;
use crate::store::{OfferLetterStore, UserStore};

const ALREADY_ISSUED: &str =
    "An offer letter already exists for this employee. Please update the existing one or delete it first.";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOfferLetter {
    /// Employee number of the user the letter is issued to
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(value_type = String, format = "date", example = "2025-06-01")]
    pub offer_date: NaiveDate,
    #[schema(value_type = String, format = "date", example = "2025-06-16")]
    pub start_date: NaiveDate,
    #[schema(example = "Web Developer Trainee")]
    pub position: String,
    pub offer_letter_type: OfferLetterType,
    /// Monthly stipend, or annual salary for employment offers
    pub stipend: Option<Money>,
    #[schema(example = "8 Weeks")]
    pub internship_period: Option<String>,
    pub supervisor_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateOfferLetter {
    pub candidate_name: Option<String>,
    pub candidate_address: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub offer_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    pub position: Option<String>,
    pub offer_letter_type: Option<OfferLetterType>,
    pub stipend: Option<Money>,
    pub internship_period: Option<String>,
    pub supervisor_name: Option<String>,
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub hr_name: Option<String>,
    pub hr_designation: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(AppError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Applies the per-type rules and renders the amount in words:
///
/// * paid types need a non-negative amount, the zero-stipend type drops it
/// * internship types need a period, employment offers drop it
fn finalize(mut letter: NewOfferLetter) -> Result<NewOfferLetter> {
    require_text(&letter.candidate_name, "Candidate name")?;
    require_text(&letter.employee_id, "Employee ID")?;
    require_text(&letter.position, "Position")?;

    let kind = letter.offer_letter_type;
    if kind.is_paid() {
        let amount = letter.stipend.ok_or_else(|| {
            AppError::validation(format!(
                "Stipend/Salary is required for a {} offer",
                kind.as_ref().replace('_', " ")
            ))
        })?;
        if amount.is_negative() {
            return Err(AppError::validation("Stipend/Salary must not be negative"));
        }
        letter.stipend_in_words = Some(amount_in_words(amount));
    } else {
        letter.stipend = None;
        letter.stipend_in_words = Some(amount_in_words(Money::ZERO));
    }

    letter.internship_period = trimmed(letter.internship_period);
    if kind.is_internship() {
        if letter.internship_period.is_none() {
            return Err(AppError::validation(
                "Internship period is required for an internship offer",
            ));
        }
    } else {
        letter.internship_period = None;
    }

    Ok(letter)
}

async fn stored_letter<S: OfferLetterStore>(store: &S, id: u64) -> Result<OfferLetter> {
    store
        .find_offer_letter(id)
        .await?
        .ok_or_else(|| AppError::not_found("Offer letter not found"))
}

/// Issues the letter to the user holding `req.employee_id`. Candidate name
/// and address come from that user's profile.
pub async fn create_letter<S>(
    store: &S,
    company: &CompanyDefaults,
    req: CreateOfferLetter,
) -> Result<OfferLetter>
where
    S: UserStore + OfferLetterStore,
{
    let emp_no = req.employee_id.trim();
    require_text(emp_no, "Employee ID")?;
    require_text(&req.position, "Position")?;

    let user = store.find_user_by_emp_no(emp_no).await?.ok_or_else(|| {
        AppError::not_found(format!("User with employee ID {emp_no} not found"))
    })?;

    if store.find_offer_letter_for_user(user.id).await?.is_some() {
        return Err(AppError::conflict(ALREADY_ISSUED));
    }

    let letter = finalize(NewOfferLetter {
        user_id: user.id,
        candidate_name: user.display_name().to_string(),
        candidate_address: user.profile.address().map(str::to_string),
        employee_id: emp_no.to_string(),
        offer_date: req.offer_date,
        start_date: req.start_date,
        position: req.position.trim().to_string(),
        offer_letter_type: req.offer_letter_type,
        stipend: req.stipend,
        stipend_in_words: None,
        internship_period: req.internship_period,
        supervisor_name: trimmed(req.supervisor_name)
            .or_else(|| Some(company.supervisor_name.clone())),
        company_name: company.name.clone(),
        company_address: company.address.clone(),
        hr_name: company.hr_name.clone(),
        hr_designation: company.hr_designation.clone(),
    })?;

    let id = store
        .insert_offer_letter(&letter)
        .await
        .map_err(|e| AppError::from_store(e, ALREADY_ISSUED))?;

    tracing::info!(offer_letter_id = id, user_id = user.id, kind = %letter.offer_letter_type, "Offer letter created");
    stored_letter(store, id).await
}

pub async fn update_letter<S: OfferLetterStore>(
    store: &S,
    id: u64,
    req: UpdateOfferLetter,
) -> Result<OfferLetter> {
    let mut letter = stored_letter(store, id).await?.to_new();

    if let Some(name) = req.candidate_name {
        letter.candidate_name = name.trim().to_string();
    }
    if req.candidate_address.is_some() {
        letter.candidate_address = trimmed(req.candidate_address);
    }
    if let Some(date) = req.offer_date {
        letter.offer_date = date;
    }
    if let Some(date) = req.start_date {
        letter.start_date = date;
    }
    if let Some(position) = req.position {
        letter.position = position.trim().to_string();
    }
    if let Some(kind) = req.offer_letter_type {
        letter.offer_letter_type = kind;
    }
    if req.stipend.is_some() {
        letter.stipend = req.stipend;
    }
    if req.internship_period.is_some() {
        letter.internship_period = req.internship_period;
    }
    if req.supervisor_name.is_some() {
        letter.supervisor_name = trimmed(req.supervisor_name);
    }
    for (slot, value) in [
        (&mut letter.company_name, req.company_name),
        (&mut letter.company_address, req.company_address),
        (&mut letter.hr_name, req.hr_name),
        (&mut letter.hr_designation, req.hr_designation),
    ] {
        if let Some(v) = trimmed(value) {
            *slot = v;
        }
    }

    let letter = finalize(letter)?;
    let found = store
        .replace_offer_letter(id, &letter)
        .await
        .map_err(|e| AppError::from_store(e, ALREADY_ISSUED))?;
    if !found {
        return Err(AppError::not_found("Offer letter not found"));
    }

    tracing::info!(offer_letter_id = id, "Offer letter updated");
    stored_letter(store, id).await
}

async fn with_user<S: UserStore>(store: &S, mut letter: OfferLetter) -> Result<OfferLetter> {
    letter.user = store
        .find_user(letter.user_id)
        .await?
        .as_ref()
        .map(UserSummary::from);
    Ok(letter)
}

pub async fn get_letter<S>(store: &S, id: u64) -> Result<OfferLetter>
where
    S: UserStore + OfferLetterStore,
{
    let letter = stored_letter(store, id).await?;
    with_user(store, letter).await
}

pub async fn letter_for_user<S>(store: &S, user_id: u64) -> Result<OfferLetter>
where
    S: UserStore + OfferLetterStore,
{
    let letter = store
        .find_offer_letter_for_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("No offer letter found for this user"))?;
    with_user(store, letter).await
}

pub async fn list_letters<S>(store: &S) -> Result<Vec<OfferLetter>>
where
    S: UserStore + OfferLetterStore,
{
    let letters = store.list_offer_letters().await?;
    let mut out = Vec::with_capacity(letters.len());
    for letter in letters {
        out.push(with_user(store, letter).await?);
    }
    Ok(out)
}

pub async fn delete_letter<S: OfferLetterStore>(store: &S, id: u64) -> Result<()> {
    if !store.delete_offer_letter(id).await? {
        return Err(AppError::not_found("Offer letter not found"));
    }
    tracing::info!(offer_letter_id = id, "Offer letter deleted");
    Ok(())
}

pub async fn render_letter(
    renderer: &PdfRenderer,
    logo: Option<&str>,
    letter: &OfferLetter,
) -> Result<Vec<u8>> {
    let html = render_offer_letter(letter, logo);
    let pdf = renderer.render(&html, PageLayout::OFFER_LETTER).await?;
    Ok(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::salary_slip::tests::sample_company;
    use crate::model::employee::EmployeeProfile;
    use crate::store::memory::MemoryStore;

    fn store_with_employee(emp_no: &str) -> (MemoryStore, u64) {
        let store = MemoryStore::default();
        let id = store.add_user(
            "jdoe",
            EmployeeProfile {
                employee_name: Some("John Doe".into()),
                emp_no: Some(emp_no.into()),
                current_address: Some("12 Lake View".into()),
                ..Default::default()
            },
        );
        (store, id)
    }

    fn request(kind: OfferLetterType) -> CreateOfferLetter {
        CreateOfferLetter {
            employee_id: "EMP-001".into(),
            offer_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
            position: "Web Developer Trainee".into(),
            offer_letter_type: kind,
            stipend: None,
            internship_period: Some("8 Weeks".into()),
            supervisor_name: None,
        }
    }

    #[actix_web::test]
    async fn creates_from_employee_profile() {
        let (store, user_id) = store_with_employee("EMP-001");
        let mut req = request(OfferLetterType::InternshipStipend);
        req.stipend = Some(Money::from_rupees(10_000.0));

        let letter = create_letter(&store, &sample_company(), req).await.unwrap();
        assert_eq!(letter.user_id, user_id);
        assert_eq!(letter.candidate_name, "John Doe");
        assert_eq!(letter.candidate_address.as_deref(), Some("12 Lake View"));
        assert_eq!(letter.stipend_in_words.as_deref(), Some("Ten Thousand Rupees Only"));
        assert_eq!(letter.supervisor_name.as_deref(), Some("Ravi Shah"));
        assert_eq!(letter.hr_name, "Asha Rao");
    }

    #[actix_web::test]
    async fn second_letter_for_same_employee_conflicts() {
        let (store, _) = store_with_employee("EMP-001");
        let company = sample_company();

        create_letter(&store, &company, request(OfferLetterType::InternshipZeroStipend))
            .await
            .unwrap();
        let dup = create_letter(&store, &company, request(OfferLetterType::InternshipZeroStipend)).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }

    #[actix_web::test]
    async fn unknown_employee_number_is_not_found() {
        let (store, _) = store_with_employee("EMP-001");
        let mut req = request(OfferLetterType::InternshipZeroStipend);
        req.employee_id = "EMP-404".into();

        let err = create_letter(&store, &sample_company(), req).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn enforces_type_rules() {
        let (store, _) = store_with_employee("EMP-001");
        let company = sample_company();

        let unpaid_salary = create_letter(&store, &company, request(OfferLetterType::EmployeeSalary)).await;
        assert!(matches!(unpaid_salary, Err(AppError::Validation(_))));

        let mut no_period = request(OfferLetterType::InternshipZeroStipend);
        no_period.internship_period = Some("  ".into());
        let no_period = create_letter(&store, &company, no_period).await;
        assert!(matches!(no_period, Err(AppError::Validation(_))));

        let mut salaried = request(OfferLetterType::EmployeeSalary);
        salaried.stipend = Some(Money::from_rupees(600_000.0));
        let letter = create_letter(&store, &company, salaried).await.unwrap();
        assert_eq!(letter.internship_period, None);
        assert_eq!(
            letter.stipend_in_words.as_deref(),
            Some("Six Hundred Thousand Rupees Only")
        );
    }

    #[actix_web::test]
    async fn zero_stipend_drops_amount() {
        let (store, _) = store_with_employee("EMP-001");
        let mut req = request(OfferLetterType::InternshipZeroStipend);
        req.stipend = Some(Money::from_rupees(500.0));

        let letter = create_letter(&store, &sample_company(), req).await.unwrap();
        assert_eq!(letter.stipend, None);
        assert_eq!(letter.stipend_in_words.as_deref(), Some("Zero Rupees Only"));
    }

    #[actix_web::test]
    async fn update_switches_type_and_rewrites_words() {
        let (store, _) = store_with_employee("EMP-001");
        let letter = create_letter(&store, &sample_company(), request(OfferLetterType::InternshipZeroStipend))
            .await
            .unwrap();

        let missing_amount = update_letter(
            &store,
            letter.id,
            UpdateOfferLetter {
                offer_letter_type: Some(OfferLetterType::InternshipStipend),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(missing_amount, Err(AppError::Validation(_))));

        let updated = update_letter(
            &store,
            letter.id,
            UpdateOfferLetter {
                offer_letter_type: Some(OfferLetterType::EmployeeSalary),
                stipend: Some(Money::from_rupees(21.5)),
                position: Some("Software Engineer".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.position, "Software Engineer");
        assert_eq!(updated.internship_period, None);
        assert_eq!(
            updated.stipend_in_words.as_deref(),
            Some("Twenty One Rupees Only and Fifty Paise Only")
        );
    }

    #[actix_web::test]
    async fn lookups_and_delete() {
        let (store, user_id) = store_with_employee("EMP-001");
        let letter = create_letter(&store, &sample_company(), request(OfferLetterType::InternshipZeroStipend))
            .await
            .unwrap();

        assert_eq!(letter.user, None);
        let read = letter_for_user(&store, user_id).await.unwrap();
        assert_eq!(read.id, letter.id);
        let summary = read.user.expect("issuing user attached");
        assert_eq!(summary.username, "jdoe");
        assert_eq!(summary.employee_name.as_deref(), Some("John Doe"));
        assert_eq!(summary.emp_no.as_deref(), Some("EMP-001"));

        let listed = list_letters(&store).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user.as_ref().map(|u| u.id), Some(user_id));
        assert_eq!(get_letter(&store, letter.id).await.unwrap().user, listed[0].user);

        delete_letter(&store, letter.id).await.unwrap();
        assert!(matches!(get_letter(&store, letter.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(letter_for_user(&store, user_id).await, Err(AppError::NotFound(_))));
        assert!(matches!(delete_letter(&store, letter.id).await, Err(AppError::NotFound(_))));
    }
}
