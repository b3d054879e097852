use std::borrow::Cow;

use chrono::NaiveDate;

use crate::model::money::Money;

pub const NOT_AVAILABLE: &str = "N/A";

/// Escapes text for element content and double-quoted attributes.
pub fn escape(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escaped text, or `N/A` when missing or blank.
pub fn text_or_na(value: Option<&str>) -> Cow<'_, str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => escape(v),
        _ => Cow::Borrowed(NOT_AVAILABLE),
    }
}

pub fn amount(value: Money) -> String {
    value.to_string()
}

pub fn amount_or_zero(value: Option<Money>) -> String {
    value.unwrap_or(Money::ZERO).to_string()
}

/// Day counts print as `22` or `21.5`.
pub fn days_or_na(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn date(value: NaiveDate) -> String {
    value.format("%d %b %Y").to_string()
}

pub fn date_or_na(value: Option<NaiveDate>) -> String {
    value.map(date).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
