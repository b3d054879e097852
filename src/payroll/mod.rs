//! Salary computation: component aggregation and amount-to-words rendering.

pub mod aggregator;
pub mod words;

pub use aggregator::slip_totals;
pub use words::amount_in_words;
