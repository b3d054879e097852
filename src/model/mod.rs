pub mod employee;
pub mod money;
pub mod month;
pub mod offer_letter;
pub mod role;
pub mod salary;
pub mod user;
