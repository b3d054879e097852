use std::fmt::Write;

use crate::config::CompanyDefaults;
use crate::model::salary::SalarySlip;

use super::html::{amount, date_or_na, days_or_na, escape, text_or_na};

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 0; padding: 0; font-size: 8px; color: #333; }
.container { border: 1px solid #ccc; padding: 10px; box-sizing: border-box; background-color: #fff; }
.header { text-align: center; margin-bottom: 10px; border-bottom: 1px solid #333; padding-bottom: 5px; position: relative; }
.header img { position: absolute; left: 10px; top: 0; height: 60px; }
.header h1 { margin: 0; font-size: 16px; color: #000; text-transform: uppercase; }
.header p { margin: 2px 0; font-size: 8px; color: #555; }
.payslip-title { text-align: center; background-color: #eee; padding: 5px; margin-bottom: 10px; font-size: 12px; font-weight: bold; border: 1px solid #ddd; }
.details { width: 100%; border-collapse: collapse; margin-bottom: 10px; }
.details td { padding: 4px; border: 1px solid #ddd; vertical-align: top; }
.details td.label { width: 120px; font-weight: bold; background-color: #f9f9f9; }
.components { width: 100%; border-collapse: collapse; margin-bottom: 10px; }
.components th, .components td { border: 1px solid #ddd; padding: 4px; text-align: left; }
.components th { background-color: #f0f0f0; font-weight: bold; text-align: center; }
.total-row td { font-weight: bold; background-color: #e6e6e6; }
.net { margin-top: 10px; border: 1px solid #ddd; padding: 5px; background-color: #f9f9f9; }
.net p { margin: 3px 0; font-size: 9px; }
.net strong { font-size: 10px; color: #000; }
.footer { text-align: center; margin-top: 20px; font-size: 7px; color: #777; }
"#;

fn detail_row(out: &mut String, left: (&str, &str), right: (&str, &str)) {
    let _ = write!(
        out,
        r#"<tr><td class="label">{}:</td><td>{}</td><td class="label">{}:</td><td>{}</td></tr>"#,
        left.0, left.1, right.0, right.1
    );
}

/// Renders a stored slip into a self-contained A4 page.
///
/// `logo` is a `data:` URI; when absent the header is text only.
pub fn render_salary_slip(
    slip: &SalarySlip,
    company: &CompanyDefaults,
    logo: Option<&str>,
) -> String {
    let e = &slip.employee;
    let company_name = text_or_na(Some(&slip.company_name));
    let employee_name = text_or_na(Some(&e.employee_name));
    let period = format!("{} {}", slip.month, slip.year);

    let mut details = String::new();
    detail_row(&mut details, ("Emp. No", &text_or_na(e.emp_no.as_deref())), ("Employee Name", &employee_name));
    detail_row(&mut details, ("Designation", &text_or_na(e.designation.as_deref())), ("Department", &text_or_na(e.department.as_deref())));
    detail_row(&mut details, ("Location", &text_or_na(e.location.as_deref())), ("Date of Joining", &date_or_na(e.date_of_joining)));
    detail_row(&mut details, ("PAN No", &text_or_na(e.pan_no.as_deref())), ("PF No", &text_or_na(e.pf_no.as_deref())));
    detail_row(&mut details, ("PF UAN No", &text_or_na(e.pf_uan_no.as_deref())), ("ESIC No", &text_or_na(e.esic_no.as_deref())));
    detail_row(&mut details, ("Aadhar No", &text_or_na(e.aadhar_no.as_deref())), ("Gender", &text_or_na(e.gender.as_deref())));
    detail_row(&mut details, ("Grade", &text_or_na(e.grade.as_deref())), ("Vertical", &text_or_na(e.vertical.as_deref())));
    detail_row(&mut details, ("Division", &text_or_na(e.division.as_deref())), ("Payment Mode", &text_or_na(e.payment_mode.as_deref())));
    detail_row(&mut details, ("Bank Name", &text_or_na(e.bank_name.as_deref())), ("Bank A/C No", &text_or_na(e.bank_account_no.as_deref())));

    let d = &slip.days;
    let mut days = String::new();
    detail_row(&mut days, ("Total Number Of Days", &days_or_na(d.total_number_of_days)), ("Working Days", &days_or_na(d.working_days)));
    detail_row(&mut days, ("Paid Days", &days_or_na(d.paid_days)), ("LOP Days", &days_or_na(d.lop_days)));
    detail_row(&mut days, ("Refund Days", &days_or_na(d.refund_days)), ("Arrear Days", &days_or_na(d.arrear_days)));

    // Earnings and deductions share rows; the shorter column is padded.
    let earnings = slip.earnings.components();
    let deductions = slip.deductions.components();
    let mut rows = String::new();
    for (i, (label, value)) in earnings.iter().enumerate() {
        let (d_label, d_value) = match deductions.get(i) {
            Some((l, v)) => (*l, amount(*v)),
            None => ("", String::new()),
        };
        let value = amount(*value);
        let _ = write!(
            rows,
            "<tr><td>{label}</td><td>-</td><td>{value}</td><td>0.00</td><td>{value}</td><td>{d_label}</td><td>{d_value}</td></tr>"
        );
    }

    let logo_tag = logo
        .map(|src| format!(r#"<img src="{}" alt="Company Logo">"#, escape(src)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Salary Slip - {employee_name} - {period}</title>
<style>{STYLE}</style>
</head>
<body>
<div class="container">
  <div class="header">
    {logo_tag}
    <h1>{company_name}</h1>
    <p>CIN: {cin}</p>
    <p>Address: {address}</p>
  </div>
  <div class="payslip-title">Payslip for the month of {period_upper}</div>
  <table class="details">{details}</table>
  <table class="details">{days}</table>
  <table class="components">
    <thead>
      <tr><th>Earnings</th><th>Monthly Rate (INR)</th><th>Current Month (INR)</th><th>Arrears (INR)</th><th>Total (INR)</th><th>Deductions</th><th>Total (INR)</th></tr>
    </thead>
    <tbody>
      {rows}
      <tr class="total-row">
        <td colspan="4" style="text-align: right;">Gross Earnings (INR)</td><td>{gross}</td>
        <td style="text-align: right;">Total Deductions (INR)</td><td>{total_deductions}</td>
      </tr>
    </tbody>
  </table>
  <div class="net">
    <p><strong>SALARY (CTC)/ PM:</strong> {ctc}</p>
    <p><strong>Net Salary Payable (INR):</strong> {net}</p>
    <p><strong>Net Salary Payable (In words):</strong> {net_words}</p>
  </div>
  <div class="footer">
    <p>THIS IS A COMPUTER GENERATED PAYSLIP AND DOES NOT REQUIRE SIGNATURE AND STAMP</p>
  </div>
</div>
</body>
</html>"#,
        cin = text_or_na(Some(&company.cin)),
        address = text_or_na(Some(&company.address)),
        period_upper = period.to_uppercase(),
        gross = amount(slip.totals.gross_salary),
        total_deductions = amount(slip.totals.total_deductions),
        ctc = amount(slip.salary_ctc),
        net = amount(slip.totals.net_salary),
        net_words = escape(&slip.net_salary_in_words),
    )
}

/// `John_Doe_SalarySlip_June_2025.pdf`
pub fn salary_slip_filename(slip: &SalarySlip) -> String {
    let name = slip.employee.employee_name.trim();
    let name = if name.is_empty() {
        "SalarySlip".to_string()
    } else {
        name.split_whitespace().collect::<Vec<_>>().join("_")
    };
    format!("{name}_SalarySlip_{}_{}.pdf", slip.month, slip.year)
}
