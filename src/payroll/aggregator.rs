use crate::model::money::Money;
use crate::model::salary::{Deductions, Earnings, SalaryTotals};

/// `gross = Σ earnings`, `total_deductions = Σ deductions`,
/// `net = gross - total_deductions`.
///
/// Missing components are simply not yielded and count as zero. No sign
/// checks happen here; request validation owns that. Returns `None` when a
/// sum leaves the representable range.
pub fn aggregate<E, D>(earnings: E, deductions: D) -> Option<SalaryTotals>
where
    E: IntoIterator<Item = Money>,
    D: IntoIterator<Item = Money>,
{
    let gross_salary = checked_sum(earnings)?;
    let total_deductions = checked_sum(deductions)?;

    Some(SalaryTotals {
        gross_salary,
        total_deductions,
        net_salary: gross_salary.checked_sub(total_deductions)?,
    })
}

fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
    amounts
        .into_iter()
        .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount))
}

pub fn slip_totals(earnings: &Earnings, deductions: &Deductions) -> Option<SalaryTotals> {
    aggregate(
        earnings.components().map(|(_, amount)| amount),
        deductions.components().map(|(_, amount)| amount),
    )
}
