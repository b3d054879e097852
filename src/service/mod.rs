//! Salary-slip and offer-letter pipelines. Callers are expected to have done
//! their own authorization; nothing here checks roles.

pub mod offer_letter;
pub mod salary;
