use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::MySqlPool;

use super::{OfferLetterStore, SalaryStore, StoreError, StoreResult, UserStore};
use crate::model::month::Month;
use crate::model::offer_letter::{NewOfferLetter, OfferLetter};
use crate::model::role::Role;
use crate::model::salary::{NewSalarySlip, SalarySlip};
use crate::model::user::{NewUser, UserRecord};
use crate::utils::db_utils::{execute_update, SqlUpdate};
use crate::utils::identity_filter::Identity;

const SLIP_COLUMNS: [&str; 37] = [
    "user_id", "month", "month_numeric", "year", "company_name",
    "employee_name", "emp_no", "employee_email", "date_of_joining", "pan_no", "pf_no",
    "pf_uan_no", "esic_no", "aadhar_no", "gender", "designation", "department", "grade",
    "vertical", "division", "location", "payment_mode", "bank_name", "bank_account_no",
    "salary_ctc", "total_number_of_days", "working_days", "paid_days", "lop_days",
    "refund_days", "arrear_days",
    "earnings", "deductions", "gross_salary", "total_deductions", "net_salary",
    "net_salary_in_words",
];

const OFFER_LETTER_COLUMNS: [&str; 16] = [
    "user_id", "candidate_name", "candidate_address", "employee_id", "offer_date",
    "start_date", "position", "offer_letter_type", "stipend", "stipend_in_words",
    "internship_period", "supervisor_name", "company_name", "company_address", "hr_name",
    "hr_designation",
];

const PROFILE_COLUMNS: [&str; 20] = [
    "employee_name", "emp_no", "date_of_joining", "pan_no", "pf_no", "pf_uan_no", "esic_no",
    "aadhar_no", "gender", "designation", "department", "grade", "vertical", "division",
    "location", "payment_mode", "bank_name", "bank_account_no", "permanent_address",
    "current_address",
];

const SLIP_ORDER: &str = "ORDER BY year DESC, month_numeric DESC, id DESC";

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    )
}

fn replace_sql(table: &str, columns: &[&str]) -> String {
    let set = columns
        .iter()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {table} SET {set} WHERE id = ?")
}

type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

fn bind_slip<'q>(query: MySqlQuery<'q>, slip: &'q NewSalarySlip) -> MySqlQuery<'q> {
    let e = &slip.employee;
    let d = &slip.days;
    query
        .bind(slip.user_id)
        .bind(slip.month.as_ref())
        .bind(slip.month_numeric())
        .bind(slip.year)
        .bind(&slip.company_name)
        .bind(&e.employee_name)
        .bind(&e.emp_no)
        .bind(&e.employee_email)
        .bind(e.date_of_joining)
        .bind(&e.pan_no)
        .bind(&e.pf_no)
        .bind(&e.pf_uan_no)
        .bind(&e.esic_no)
        .bind(&e.aadhar_no)
        .bind(&e.gender)
        .bind(&e.designation)
        .bind(&e.department)
        .bind(&e.grade)
        .bind(&e.vertical)
        .bind(&e.division)
        .bind(&e.location)
        .bind(&e.payment_mode)
        .bind(&e.bank_name)
        .bind(&e.bank_account_no)
        .bind(slip.salary_ctc)
        .bind(d.total_number_of_days)
        .bind(d.working_days)
        .bind(d.paid_days)
        .bind(d.lop_days)
        .bind(d.refund_days)
        .bind(d.arrear_days)
        .bind(Json(&slip.earnings))
        .bind(Json(&slip.deductions))
        .bind(slip.totals.gross_salary)
        .bind(slip.totals.total_deductions)
        .bind(slip.totals.net_salary)
        .bind(&slip.net_salary_in_words)
}

fn bind_offer_letter<'q>(query: MySqlQuery<'q>, letter: &'q NewOfferLetter) -> MySqlQuery<'q> {
    query
        .bind(letter.user_id)
        .bind(&letter.candidate_name)
        .bind(&letter.candidate_address)
        .bind(&letter.employee_id)
        .bind(letter.offer_date)
        .bind(letter.start_date)
        .bind(&letter.position)
        .bind(letter.offer_letter_type.as_ref())
        .bind(letter.stipend)
        .bind(&letter.stipend_in_words)
        .bind(&letter.internship_period)
        .bind(&letter.supervisor_name)
        .bind(&letter.company_name)
        .bind(&letter.company_address)
        .bind(&letter.hr_name)
        .bind(&letter.hr_designation)
}

/// MySQL-backed store. Unique indexes in the schema are the source of truth
/// for duplicate detection.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, table: &str, id: u64) -> StoreResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
        let found = sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    async fn delete_by_id(&self, table: &str, id: u64) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {table} WHERE id = ?");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- user management ----

    pub async fn insert_user(&self, user: &NewUser) -> StoreResult<u64> {
        let mut columns = vec!["username", "email", "password", "role_id"];
        columns.extend(PROFILE_COLUMNS);

        let p = &user.profile;
        let result = sqlx::query(&insert_sql("users", &columns))
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.id())
            .bind(&p.employee_name)
            .bind(&p.emp_no)
            .bind(p.date_of_joining)
            .bind(&p.pan_no)
            .bind(&p.pf_no)
            .bind(&p.pf_uan_no)
            .bind(&p.esic_no)
            .bind(&p.aadhar_no)
            .bind(&p.gender)
            .bind(&p.designation)
            .bind(&p.department)
            .bind(&p.grade)
            .bind(&p.vertical)
            .bind(&p.division)
            .bind(&p.location)
            .bind(&p.payment_mode)
            .bind(&p.bank_name)
            .bind(&p.bank_account_no)
            .bind(&p.permanent_address)
            .bind(&p.current_address)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;

        Ok(result.last_insert_id())
    }

    pub async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Applies a whitelisted partial update built by `build_update_sql`.
    pub async fn update_user(&self, update: SqlUpdate) -> StoreResult<()> {
        execute_update(&self.pool, update)
            .await
            .map_err(StoreError::from_write)?;
        Ok(())
    }

    pub async fn update_password(&self, user_id: u64, password_hash: &str) -> StoreResult<()> {
        sqlx::query("UPDATE users SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Slips and offer letters go with the user (`ON DELETE CASCADE`).
    pub async fn delete_user(&self, user_id: u64) -> StoreResult<bool> {
        self.delete_by_id("users", user_id).await
    }

    pub async fn identity_exists(&self, identity: Identity, value: &str) -> StoreResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM users WHERE {} = ? LIMIT 1)",
            identity.column()
        );
        let found = sqlx::query_scalar::<_, bool>(&sql)
            .bind(value.trim())
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    pub async fn admin_exists(&self) -> StoreResult<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE role_id = ?)",
        )
        .bind(Role::Admin.id())
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }
}

impl UserStore for MySqlStore {
    async fn find_user(&self, id: u64) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_emp_no(&self, emp_no: &str) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE emp_no = ?")
            .bind(emp_no)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

impl SalaryStore for MySqlStore {
    async fn insert_slip(&self, slip: &NewSalarySlip) -> StoreResult<u64> {
        let sql = insert_sql("salary_slips", &SLIP_COLUMNS);
        let result = bind_slip(sqlx::query(&sql), slip)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;
        Ok(result.last_insert_id())
    }

    async fn find_slip(&self, id: u64) -> StoreResult<Option<SalarySlip>> {
        let slip = sqlx::query_as::<_, SalarySlip>("SELECT * FROM salary_slips WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(slip)
    }

    async fn find_slip_for_period(
        &self,
        user_id: u64,
        month: Month,
        year: i32,
    ) -> StoreResult<Option<SalarySlip>> {
        let slip = sqlx::query_as::<_, SalarySlip>(
            "SELECT * FROM salary_slips WHERE user_id = ? AND month = ? AND year = ?",
        )
        .bind(user_id)
        .bind(month.as_ref())
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;
        Ok(slip)
    }

    async fn latest_slip_for_user(&self, user_id: u64) -> StoreResult<Option<SalarySlip>> {
        let sql = format!("SELECT * FROM salary_slips WHERE user_id = ? {SLIP_ORDER} LIMIT 1");
        let slip = sqlx::query_as::<_, SalarySlip>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(slip)
    }

    async fn list_slips_for_user(&self, user_id: u64) -> StoreResult<Vec<SalarySlip>> {
        let sql = format!("SELECT * FROM salary_slips WHERE user_id = ? {SLIP_ORDER}");
        let slips = sqlx::query_as::<_, SalarySlip>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(slips)
    }

    async fn list_all_slips(&self) -> StoreResult<Vec<SalarySlip>> {
        let sql = format!("SELECT * FROM salary_slips {SLIP_ORDER}");
        let slips = sqlx::query_as::<_, SalarySlip>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(slips)
    }

    async fn replace_slip(&self, id: u64, slip: &NewSalarySlip) -> StoreResult<bool> {
        let sql = replace_sql("salary_slips", &SLIP_COLUMNS);
        let result = bind_slip(sqlx::query(&sql), slip)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;

        // MySQL reports zero affected rows when nothing changed
        if result.rows_affected() > 0 {
            Ok(true)
        } else {
            self.exists("salary_slips", id).await
        }
    }

    async fn delete_slip(&self, id: u64) -> StoreResult<bool> {
        self.delete_by_id("salary_slips", id).await
    }
}

impl OfferLetterStore for MySqlStore {
    async fn insert_offer_letter(&self, letter: &NewOfferLetter) -> StoreResult<u64> {
        let sql = insert_sql("offer_letters", &OFFER_LETTER_COLUMNS);
        let result = bind_offer_letter(sqlx::query(&sql), letter)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;
        Ok(result.last_insert_id())
    }

    async fn find_offer_letter(&self, id: u64) -> StoreResult<Option<OfferLetter>> {
        let letter = sqlx::query_as::<_, OfferLetter>("SELECT * FROM offer_letters WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(letter)
    }

    async fn find_offer_letter_for_user(&self, user_id: u64) -> StoreResult<Option<OfferLetter>> {
        let letter =
            sqlx::query_as::<_, OfferLetter>("SELECT * FROM offer_letters WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(letter)
    }

    async fn list_offer_letters(&self) -> StoreResult<Vec<OfferLetter>> {
        let letters = sqlx::query_as::<_, OfferLetter>(
            "SELECT * FROM offer_letters ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(letters)
    }

    async fn replace_offer_letter(&self, id: u64, letter: &NewOfferLetter) -> StoreResult<bool> {
        let sql = replace_sql("offer_letters", &OFFER_LETTER_COLUMNS);
        let result = bind_offer_letter(sqlx::query(&sql), letter)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;

        if result.rows_affected() > 0 {
            Ok(true)
        } else {
            self.exists("offer_letters", id).await
        }
    }

    async fn delete_offer_letter(&self, id: u64) -> StoreResult<bool> {
        self.delete_by_id("offer_letters", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_sql_has_one_placeholder_per_column() {
        let sql = insert_sql("salary_slips", &SLIP_COLUMNS);
        assert_eq!(sql.matches('?').count(), SLIP_COLUMNS.len());
        assert!(sql.starts_with("INSERT INTO salary_slips (user_id, month, month_numeric"));
    }

    #[test]
    fn replace_sql_binds_id_last() {
        let sql = replace_sql("offer_letters", &OFFER_LETTER_COLUMNS);
        assert_eq!(sql.matches('?').count(), OFFER_LETTER_COLUMNS.len() + 1);
        assert!(sql.ends_with("hr_designation = ? WHERE id = ?"));
    }
}
