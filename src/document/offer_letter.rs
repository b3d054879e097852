use crate::model::offer_letter::{OfferLetter, OfferLetterType};

use super::html::{date, escape, text_or_na};

const STYLE: &str = r#"
body { font-family: 'Times New Roman', serif; margin: 0; padding: 0; font-size: 10pt; line-height: 1.4; color: #333; position: relative; }
.watermark { position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); width: 70%; opacity: 0.08; z-index: -1; }
.container { max-width: 700px; margin: 0 auto; padding: 20px 15px; position: relative; z-index: 1; }
.header { text-align: center; margin-bottom: 15px; border-bottom: 1px solid #ccc; padding-bottom: 8px; position: relative; padding-left: 90px; }
.header img { position: absolute; left: 0; top: 0; height: 70px; object-fit: contain; }
.header h1 { margin: 0; font-size: 15pt; color: #000; text-transform: uppercase; }
.header p { margin: 1px 0; font-size: 8.5pt; color: #555; }
.recipient p { margin: 0; }
.subject { font-weight: bold; text-align: center; margin: 15px 0; font-size: 11pt; text-decoration: underline; }
.content p { margin-bottom: 8px; text-align: justify; }
.signature { margin-top: 25px; }
.signature p { margin: 0; }
.signature .bold { font-weight: bold; }
.acceptance { margin-top: 40px; border-top: 1px solid #ccc; padding-top: 15px; }
.acceptance p { margin-bottom: 10px; }
"#;

/// Type-dependent paragraphs of a letter, already escaped.
struct Wording {
    subject: &'static str,
    intro: String,
    commencement: String,
    remuneration: String,
    acceptance_term: &'static str,
}

/// Letters print the company name without a trailing `LLP`.
fn short_company_name(name: &str) -> &str {
    let name = name.trim();
    name.strip_suffix(" LLP").unwrap_or(name)
}

fn amount_line(letter: &OfferLetter) -> String {
    let amount = letter
        .stipend
        .map(|s| s.to_string())
        .unwrap_or_else(|| "0.00".to_string());
    let words = letter
        .stipend_in_words
        .as_deref()
        .unwrap_or("Zero Rupees Only")
        .to_uppercase();
    format!("INR {amount} ({})", escape(&words))
}

fn wording(letter: &OfferLetter) -> Wording {
    let company = escape(short_company_name(&letter.company_name));
    let start = date(letter.start_date);
    let position = escape(&letter.position);

    match letter.offer_letter_type {
        OfferLetterType::InternshipZeroStipend | OfferLetterType::InternshipStipend => Wording {
            subject: "Internship Offer Letter",
            intro: format!(
                "We are pleased to offer you an Internship at {company}. This letter outlines the terms &amp; conditions of your internship."
            ),
            commencement: format!(
                "Your internship with {company} will commence on <strong>{start}</strong>."
            ),
            remuneration: if letter.offer_letter_type.is_paid() {
                format!("Stipend: {}", amount_line(letter))
            } else {
                "Stipend: This is an <strong>unpaid internship</strong>.".to_string()
            },
            acceptance_term: "Internship",
        },
        OfferLetterType::EmployeeSalary => Wording {
            subject: "Offer Letter - Employment",
            intro: format!(
                "We are pleased to offer you the position of {position} at {company}. This letter outlines the terms &amp; conditions of your employment."
            ),
            commencement: format!("Your employment with {company} will commence on {start}."),
            remuneration: format!("Salary: {} per annum.", amount_line(letter)),
            acceptance_term: "Employment",
        },
    }
}

/// Renders an offer letter. Subject, intro, commencement, remuneration and
/// acceptance wording follow the letter type.
pub fn render_offer_letter(letter: &OfferLetter, logo: Option<&str>) -> String {
    let w = wording(letter);
    let candidate = text_or_na(Some(&letter.candidate_name));
    let company_full = escape(letter.company_name.trim());
    let company_short = escape(short_company_name(&letter.company_name));

    let (watermark, logo_tag) = match logo {
        Some(src) => {
            let src = escape(src);
            (
                format!(r#"<img src="{src}" alt="Watermark" class="watermark">"#),
                format!(r#"<img src="{src}" alt="Company Logo">"#),
            )
        }
        None => (String::new(), String::new()),
    };

    let address_lines: String = letter
        .company_address
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let period = match (&letter.internship_period, letter.offer_letter_type.is_internship()) {
        (Some(p), true) if !p.trim().is_empty() => {
            format!("<p>Internship Period: {}</p>", escape(p.trim()))
        }
        _ => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{subject} - {candidate}</title>
<style>{STYLE}</style>
</head>
<body>
{watermark}
<div class="container">
  <div class="header">
    {logo_tag}
    <h1>{company_short}</h1>
    <p>{address}</p>
  </div>
  <div class="recipient">
    <p>To,</p>
    <p>{candidate}</p>
    <p>{candidate_address}</p>
    <p>{offer_date}</p>
  </div>
  <div class="subject">{subject}</div>
  <div class="content">
    <p>Dear {candidate},</p>
    <p>{intro}</p>
    <p>{commencement}</p>
    <p>Position: {position}</p>
    <p>{remuneration}</p>
    {period}
    <p>We are excited to welcome you to {company_short} and look forward to your contributions to our team. If you have any questions about this offer letter, please do not hesitate to contact us. Please sign and return a copy of this letter to signify your acceptance of this offer.</p>
  </div>
  <div class="signature">
    <p>Sincerely,</p>
    <p class="bold">{hr_name}</p>
    <p class="bold">{hr_designation}</p>
    <p class="bold">{company_full}</p>
  </div>
  <div class="acceptance">
    <p>Acceptance by {candidate}</p>
    <p>I have read and understood the terms and conditions of this offer letter and accept the {acceptance_term} at {company_full}.</p>
    <p>Signature: _________________________</p>
    <p>Date: _________________________</p>
  </div>
</div>
</body>
</html>"#,
        subject = w.subject,
        address = escape(&address_lines),
        candidate_address = text_or_na(letter.candidate_address.as_deref()),
        offer_date = date(letter.offer_date),
        intro = w.intro,
        commencement = w.commencement,
        position = escape(&letter.position),
        remuneration = w.remuneration,
        hr_name = escape(&letter.hr_name),
        hr_designation = escape(&letter.hr_designation),
        acceptance_term = w.acceptance_term,
    )
}

/// `employee-salary_John_Doe_EMP-001.pdf`
pub fn offer_letter_filename(letter: &OfferLetter) -> String {
    let name = letter
        .candidate_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!(
        "{}_{}_{}.pdf",
        letter.offer_letter_type.file_tag(),
        name,
        letter.employee_id
    )
}
