//! HTML templates for salary slips and offer letters, and their PDF rendering.

pub mod assets;
pub mod html;
pub mod offer_letter;
pub mod pdf;
pub mod salary_slip;

pub use offer_letter::{offer_letter_filename, render_offer_letter};
pub use pdf::{PageLayout, PdfRenderer};
pub use salary_slip::{render_salary_slip, salary_slip_filename};
