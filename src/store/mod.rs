//! Persistence seams for the pipelines. Uniqueness lives in the store: a
//! second slip for the same (user, month, year) or a second offer letter for
//! the same user fails with [`StoreError::Conflict`].

use thiserror::Error;

use crate::model::month::Month;
use crate::model::offer_letter::{NewOfferLetter, OfferLetter};
use crate::model::salary::{NewSalarySlip, SalarySlip};
use crate::model::user::UserRecord;

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key")]
    Conflict,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classifies a write failure; unique index violations become `Conflict`.
    pub fn from_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict,
            _ => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait UserStore {
    async fn find_user(&self, id: u64) -> StoreResult<Option<UserRecord>>;

    async fn find_user_by_emp_no(&self, emp_no: &str) -> StoreResult<Option<UserRecord>>;
}

pub trait SalaryStore {
    async fn insert_slip(&self, slip: &NewSalarySlip) -> StoreResult<u64>;

    async fn find_slip(&self, id: u64) -> StoreResult<Option<SalarySlip>>;

    async fn find_slip_for_period(
        &self,
        user_id: u64,
        month: Month,
        year: i32,
    ) -> StoreResult<Option<SalarySlip>>;

    async fn latest_slip_for_user(&self, user_id: u64) -> StoreResult<Option<SalarySlip>>;

    /// Newest period first.
    async fn list_slips_for_user(&self, user_id: u64) -> StoreResult<Vec<SalarySlip>>;

    /// Newest period first.
    async fn list_all_slips(&self) -> StoreResult<Vec<SalarySlip>>;

    /// Overwrites every writable column. `false` when `id` does not exist.
    async fn replace_slip(&self, id: u64, slip: &NewSalarySlip) -> StoreResult<bool>;

    async fn delete_slip(&self, id: u64) -> StoreResult<bool>;
}

pub trait OfferLetterStore {
    async fn insert_offer_letter(&self, letter: &NewOfferLetter) -> StoreResult<u64>;

    async fn find_offer_letter(&self, id: u64) -> StoreResult<Option<OfferLetter>>;

    async fn find_offer_letter_for_user(&self, user_id: u64) -> StoreResult<Option<OfferLetter>>;

    /// Most recently created first.
    async fn list_offer_letters(&self) -> StoreResult<Vec<OfferLetter>>;

    async fn replace_offer_letter(&self, id: u64, letter: &NewOfferLetter) -> StoreResult<bool>;

    async fn delete_offer_letter(&self, id: u64) -> StoreResult<bool>;
}
