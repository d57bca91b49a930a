/// Modulus-11 check of a Chilean RUT such as `12.345.678-5`.
///
/// Dots and dashes are ignored. The last character is the check digit,
/// `K` standing for 10 and `0` for 11.
pub fn is_valid_rut(raw: &str) -> bool {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != '-')
        .collect();

    if cleaned.chars().count() < 8 {
        return false;
    }

    let mut chars: Vec<char> = cleaned.chars().collect();
    let Some(check) = chars.pop() else {
        return false;
    };

    match check_digit(&chars) {
        Some(expected) => expected == check.to_ascii_uppercase(),
        None => false,
    }
}

fn check_digit(body: &[char]) -> Option<char> {
    let mut sum = 0u32;
    let mut multiplier = 2;

    for c in body.iter().rev() {
        sum += c.to_digit(10)? * multiplier;
        multiplier = if multiplier == 7 { 2 } else { multiplier + 1 };
    }

    match 11 - (sum % 11) {
        11 => Some('0'),
        10 => Some('K'),
        digit => char::from_digit(digit, 10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_formatted_and_bare_ruts() {
        assert!(is_valid_rut("12.345.678-5"));
        assert!(is_valid_rut("123456785"));
        assert!(is_valid_rut("11.111.111-1"));
        assert!(is_valid_rut("9.876.543-3"));
    }

    #[test]
    fn check_digit_k_is_case_insensitive() {
        assert!(is_valid_rut("10.000.013-K"));
        assert!(is_valid_rut("10000013-k"));
    }

    #[test]
    fn rejects_wrong_check_digit_short_input_and_letters() {
        assert!(!is_valid_rut("12.345.678-9"));
        assert!(!is_valid_rut("1.234-5"));
        assert!(!is_valid_rut("12.3A5.678-5"));
        assert!(!is_valid_rut(""));
    }
}
