//! In-process store for service tests. Enforces the same unique keys as the
//! MySQL schema.

use std::sync::Mutex;

use chrono::Utc;

use super::{OfferLetterStore, SalaryStore, StoreError, StoreResult, UserStore};
use crate::model::employee::EmployeeProfile;
use crate::model::month::Month;
use crate::model::offer_letter::{NewOfferLetter, OfferLetter};
use crate::model::role::Role;
use crate::model::salary::{NewSalarySlip, SalarySlip};
use crate::model::user::UserRecord;

#[derive(Default)]
struct Tables {
    next_id: u64,
    users: Vec<UserRecord>,
    slips: Vec<SalarySlip>,
    letters: Vec<OfferLetter>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

fn slip_from_new(id: u64, slip: &NewSalarySlip) -> SalarySlip {
    let now = Utc::now();
    SalarySlip {
        id,
        user_id: slip.user_id,
        month: slip.month,
        month_numeric: slip.month_numeric(),
        year: slip.year,
        company_name: slip.company_name.clone(),
        employee: slip.employee.clone(),
        salary_ctc: slip.salary_ctc,
        days: slip.days.clone(),
        earnings: slip.earnings.clone(),
        deductions: slip.deductions.clone(),
        totals: slip.totals,
        net_salary_in_words: slip.net_salary_in_words.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn letter_from_new(id: u64, l: &NewOfferLetter) -> OfferLetter {
    let now = Utc::now();
    OfferLetter {
        id,
        user_id: l.user_id,
        candidate_name: l.candidate_name.clone(),
        candidate_address: l.candidate_address.clone(),
        employee_id: l.employee_id.clone(),
        offer_date: l.offer_date,
        start_date: l.start_date,
        position: l.position.clone(),
        offer_letter_type: l.offer_letter_type,
        stipend: l.stipend,
        stipend_in_words: l.stipend_in_words.clone(),
        internship_period: l.internship_period.clone(),
        supervisor_name: l.supervisor_name.clone(),
        company_name: l.company_name.clone(),
        company_address: l.company_address.clone(),
        hr_name: l.hr_name.clone(),
        hr_designation: l.hr_designation.clone(),
        created_at: now,
        updated_at: now,
        user: None,
    }
}

fn newest_period_first(slips: &mut [SalarySlip]) {
    slips.sort_by(|a, b| {
        (b.year, b.month_numeric, b.id).cmp(&(a.year, a.month_numeric, a.id))
    });
}

impl MemoryStore {
    /// Adds a user with the given profile and returns its id.
    pub fn add_user(&self, username: &str, profile: EmployeeProfile) -> u64 {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let now = Utc::now();
        t.users.push(UserRecord {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: String::new(),
            role_id: Role::User.id(),
            profile,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn set_profile(&self, user_id: u64, profile: EmployeeProfile) {
        let mut t = self.tables.lock().unwrap();
        if let Some(user) = t.users.iter_mut().find(|u| u.id == user_id) {
            user.profile = profile;
        }
    }
}

impl UserStore for MemoryStore {
    async fn find_user(&self, id: u64) -> StoreResult<Option<UserRecord>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_emp_no(&self, emp_no: &str) -> StoreResult<Option<UserRecord>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users
            .iter()
            .find(|u| u.profile.emp_no.as_deref() == Some(emp_no))
            .cloned())
    }
}

impl SalaryStore for MemoryStore {
    async fn insert_slip(&self, slip: &NewSalarySlip) -> StoreResult<u64> {
        let mut t = self.tables.lock().unwrap();
        let taken = t.slips.iter().any(|s| {
            s.user_id == slip.user_id && s.month == slip.month && s.year == slip.year
        });
        if taken {
            return Err(StoreError::Conflict);
        }
        let id = t.next_id();
        t.slips.push(slip_from_new(id, slip));
        Ok(id)
    }

    async fn find_slip(&self, id: u64) -> StoreResult<Option<SalarySlip>> {
        let t = self.tables.lock().unwrap();
        Ok(t.slips.iter().find(|s| s.id == id).cloned())
    }

    async fn find_slip_for_period(
        &self,
        user_id: u64,
        month: Month,
        year: i32,
    ) -> StoreResult<Option<SalarySlip>> {
        let t = self.tables.lock().unwrap();
        Ok(t.slips
            .iter()
            .find(|s| s.user_id == user_id && s.month == month && s.year == year)
            .cloned())
    }

    async fn latest_slip_for_user(&self, user_id: u64) -> StoreResult<Option<SalarySlip>> {
        Ok(self.list_slips_for_user(user_id).await?.into_iter().next())
    }

    async fn list_slips_for_user(&self, user_id: u64) -> StoreResult<Vec<SalarySlip>> {
        let mut slips: Vec<_> = {
            let t = self.tables.lock().unwrap();
            t.slips.iter().filter(|s| s.user_id == user_id).cloned().collect()
        };
        newest_period_first(&mut slips);
        Ok(slips)
    }

    async fn list_all_slips(&self) -> StoreResult<Vec<SalarySlip>> {
        let mut slips = self.tables.lock().unwrap().slips.clone();
        newest_period_first(&mut slips);
        Ok(slips)
    }

    async fn replace_slip(&self, id: u64, slip: &NewSalarySlip) -> StoreResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let clash = t.slips.iter().any(|s| {
            s.id != id && s.user_id == slip.user_id && s.month == slip.month && s.year == slip.year
        });
        if clash {
            return Err(StoreError::Conflict);
        }
        match t.slips.iter_mut().find(|s| s.id == id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = slip_from_new(id, slip);
                existing.created_at = created_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_slip(&self, id: u64) -> StoreResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let before = t.slips.len();
        t.slips.retain(|s| s.id != id);
        Ok(t.slips.len() != before)
    }
}

impl OfferLetterStore for MemoryStore {
    async fn insert_offer_letter(&self, letter: &NewOfferLetter) -> StoreResult<u64> {
        let mut t = self.tables.lock().unwrap();
        let taken = t.letters.iter().any(|l| {
            l.user_id == letter.user_id || l.employee_id == letter.employee_id
        });
        if taken {
            return Err(StoreError::Conflict);
        }
        let id = t.next_id();
        t.letters.push(letter_from_new(id, letter));
        Ok(id)
    }

    async fn find_offer_letter(&self, id: u64) -> StoreResult<Option<OfferLetter>> {
        let t = self.tables.lock().unwrap();
        Ok(t.letters.iter().find(|l| l.id == id).cloned())
    }

    async fn find_offer_letter_for_user(&self, user_id: u64) -> StoreResult<Option<OfferLetter>> {
        let t = self.tables.lock().unwrap();
        Ok(t.letters.iter().find(|l| l.user_id == user_id).cloned())
    }

    async fn list_offer_letters(&self) -> StoreResult<Vec<OfferLetter>> {
        let mut letters = self.tables.lock().unwrap().letters.clone();
        letters.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(letters)
    }

    async fn replace_offer_letter(&self, id: u64, letter: &NewOfferLetter) -> StoreResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let clash = t.letters.iter().any(|l| {
            l.id != id && (l.user_id == letter.user_id || l.employee_id == letter.employee_id)
        });
        if clash {
            return Err(StoreError::Conflict);
        }
        match t.letters.iter_mut().find(|l| l.id == id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = letter_from_new(id, letter);
                existing.created_at = created_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_offer_letter(&self, id: u64) -> StoreResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let before = t.letters.len();
        t.letters.retain(|l| l.id != id);
        Ok(t.letters.len() != before)
    }
}
