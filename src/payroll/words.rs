use crate::model::money::Money;

const ONES: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const SCALES: [(u64, &str); 5] = [
    (1_000_000_000_000_000, "Quadrillion"),
    (1_000_000_000_000, "Trillion"),
    (1_000_000_000, "Billion"),
    (1_000_000, "Million"),
    (1_000, "Thousand"),
];

fn push_below_hundred(n: u64, out: &mut Vec<&'static str>) {
    debug_assert!(n < 100);
    if n < 20 {
        out.push(ONES[n as usize]);
    } else {
        out.push(TENS[(n / 10) as usize]);
        if n % 10 != 0 {
            out.push(ONES[(n % 10) as usize]);
        }
    }
}

fn push_below_thousand(n: u64, out: &mut Vec<&'static str>) {
    debug_assert!(n < 1000);
    let hundreds = n / 100;
    let rest = n % 100;
    if hundreds > 0 {
        out.push(ONES[hundreds as usize]);
        out.push("Hundred");
    }
    if rest > 0 {
        push_below_hundred(rest, out);
    }
}

/// Spells a whole number: `1500` -> `One Thousand Five Hundred`.
pub fn number_to_words(mut n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut words = Vec::new();
    for (scale, name) in SCALES {
        let chunk = n / scale;
        if chunk > 0 {
            // u64::MAX tops out at eighteen quadrillion, so chunks stay < 1000
            push_below_thousand(chunk, &mut words);
            words.push(name);
            n %= scale;
        }
    }
    if n > 0 {
        push_below_thousand(n, &mut words);
    }

    words.join(" ")
}

/// `"<Rupees> Rupees Only"`, followed by `" and <Paise> Paise Only"` when the
/// paise part is non-zero.
pub fn amount_in_words(amount: Money) -> String {
    let mut out = String::new();
    if amount.is_negative() {
        out.push_str("Minus ");
    }
    out.push_str(&number_to_words(amount.rupee_part()));
    out.push_str(" Rupees Only");

    let paise = amount.paise_part();
    if paise > 0 {
        out.push_str(" and ");
        out.push_str(&number_to_words(paise));
        out.push_str(" Paise Only");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero() {
        assert_eq!(amount_in_words(Money::ZERO), "Zero Rupees Only");
    }

    #[test]
    fn whole_rupees() {
        assert_eq!(
            amount_in_words(Money::from_rupees(1500.0)),
            "One Thousand Five Hundred Rupees Only"
        );
    }

    #[test]
    fn rupees_and_paise() {
        assert_eq!(
            amount_in_words(Money::from_rupees(1500.50)),
            "One Thousand Five Hundred Rupees Only and Fifty Paise Only"
        );
    }

    #[test]
    fn paise_only_keeps_zero_rupees() {
        assert_eq!(
            amount_in_words(Money::from_paise(5)),
            "Zero Rupees Only and Five Paise Only"
        );
    }

    #[test]
    fn spells_compound_numbers() {
        assert_eq!(number_to_words(21), "Twenty One");
        assert_eq!(number_to_words(100), "One Hundred");
        assert_eq!(number_to_words(115), "One Hundred Fifteen");
        assert_eq!(number_to_words(100_000), "One Hundred Thousand");
        assert_eq!(number_to_words(1_000_001), "One Million One");
        assert_eq!(
            number_to_words(41_955),
            "Forty One Thousand Nine Hundred Fifty Five"
        );
        assert_eq!(
            number_to_words(2_305_000_019),
            "Two Billion Three Hundred Five Million Nineteen"
        );
    }

    #[test]
    fn every_word_is_capitalized() {
        let words = amount_in_words(Money::from_rupees(987_654_321.99));
        for word in words.split_whitespace() {
            let first = word.chars().next().unwrap();
            assert!(first.is_ascii_uppercase() || word == "and", "{word} in {words}");
        }
    }
}
