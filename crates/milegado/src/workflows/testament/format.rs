//! Chilean-Spanish formatting for dates, numbers and legal numbering.

use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const CLAUSE_ORDINALS: [&str; 12] = [
    "PRIMERO",
    "SEGUNDO",
    "TERCERO",
    "CUARTO",
    "QUINTO",
    "SEXTO",
    "SÉPTIMO",
    "OCTAVO",
    "NOVENO",
    "DÉCIMO",
    "UNDÉCIMO",
    "DUODÉCIMO",
];

/// `19 de octubre de 2026`
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// `03-05-1980`
pub fn short_date(date: NaiveDate) -> String {
    format!("{:02}-{:02}-{}", date.day(), date.month(), date.year())
}

/// Upper-case roman numeral. Zero renders as an empty string.
pub fn roman(mut value: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut numeral = String::new();
    for (weight, symbol) in TABLE {
        while value >= weight {
            numeral.push_str(symbol);
            value -= weight;
        }
    }
    numeral
}

/// Ordinal word used to number clauses, 1-based.
pub fn clause_ordinal(position: u32) -> String {
    match position
        .checked_sub(1)
        .and_then(|index| CLAUSE_ORDINALS.get(index as usize))
    {
        Some(word) => (*word).to_string(),
        None => format!("CLÁUSULA {position}"),
    }
}

/// Dot-grouped thousands, `100000000` → `100.000.000`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}

/// Percentages drop a trailing `.0` and use a decimal comma otherwise.
pub fn percentage(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}").replace('.', ",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn dates_use_chilean_conventions() {
        assert_eq!(long_date(date(2026, 10, 19)), "19 de octubre de 2026");
        assert_eq!(long_date(date(2025, 1, 1)), "1 de enero de 2025");
        assert_eq!(short_date(date(1980, 5, 3)), "03-05-1980");
    }

    #[test]
    fn roman_numerals_cover_section_range() {
        let numerals: Vec<String> = (1..=7).map(roman).collect();
        assert_eq!(numerals, ["I", "II", "III", "IV", "V", "VI", "VII"]);
        assert_eq!(roman(14), "XIV");
        assert_eq!(roman(0), "");
    }

    #[test]
    fn clause_ordinals_fall_back_past_table() {
        assert_eq!(clause_ordinal(1), "PRIMERO");
        assert_eq!(clause_ordinal(6), "SEXTO");
        assert_eq!(clause_ordinal(13), "CLÁUSULA 13");
        assert_eq!(clause_ordinal(0), "CLÁUSULA 0");
    }

    #[test]
    fn numbers_group_and_trim() {
        assert_eq!(thousands(100_000_000), "100.000.000");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1.000");
        assert_eq!(percentage(50.0), "50");
        assert_eq!(percentage(33.333), "33,33");
    }
}
