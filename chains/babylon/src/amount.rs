//! Human-decimal ↔ base-unit conversion for BBN.
//!
//! Conversion truncates toward zero: digits beyond the sixth decimal place
//! are dropped, never rounded. `format_display` therefore does not round-trip
//! inputs with sub-unit precision (`"0.0000019"` → `1` ubbn → `"0.000001"`).
//! This lossy behaviour is intentional.

use core_logic::ConfigError;

/// 1 BBN = 1,000,000 ubbn
pub const BASE_UNITS_PER_TOKEN: u128 = 1_000_000;
pub const DECIMALS: usize = 6;
pub const DISPLAY_DENOM: &str = "BBN";
pub const BASE_DENOM: &str = "ubbn";

/// Parses a positive decimal string and converts it to base units, flooring
/// anything below one base unit.
///
/// Accepts plain decimals only (`"10"`, `"0.001"`, `".5"`, `"1."`, `"+2"`).
/// Zero, negatives, exponents and trailing garbage are `InvalidAmount`.
pub fn to_base_units(human: &str) -> Result<u128, ConfigError> {
    let invalid = || ConfigError::InvalidAmount {
        input: human.to_string(),
    };

    let trimmed = human.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (unsigned, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid());
    }

    let is_positive = whole.bytes().chain(fraction.bytes()).any(|b| b != b'0');
    if !is_positive {
        return Err(invalid());
    }

    let whole_units: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };

    // Keep the first six fractional digits, right-padded with zeros
    let kept: String = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(DECIMALS)
        .collect();
    let fractional_units: u128 = kept.parse().map_err(|_| invalid())?;

    whole_units
        .checked_mul(BASE_UNITS_PER_TOKEN)
        .and_then(|v| v.checked_add(fractional_units))
        .ok_or_else(invalid)
}

/// Base units rendered as a plain decimal token amount, e.g. `1500000` → `"1.5"`.
pub fn format_human(base_units: u128) -> String {
    let whole = base_units / BASE_UNITS_PER_TOKEN;
    let fraction = base_units % BASE_UNITS_PER_TOKEN;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", fraction, width = DECIMALS);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Inserts thousands separators: `1500000` → `"1,500,000"`.
pub fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `"1.5 BBN (1,500,000 ubbn)"`
pub fn format_display(base_units: u128) -> String {
    format!(
        "{} {} ({} {})",
        format_human(base_units),
        DISPLAY_DENOM,
        group_thousands(base_units),
        BASE_DENOM
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base_units_scales_by_one_million() {
        assert_eq!(to_base_units("1").unwrap(), 1_000_000);
        assert_eq!(to_base_units("0.001").unwrap(), 1_000);
        assert_eq!(to_base_units("1.5").unwrap(), 1_500_000);
        assert_eq!(to_base_units("10").unwrap().to_string(), "10000000");
        assert_eq!(to_base_units(" 2.25 ").unwrap(), 2_250_000);
        assert_eq!(to_base_units(".5").unwrap(), 500_000);
        assert_eq!(to_base_units("3.").unwrap(), 3_000_000);
        assert_eq!(to_base_units("+4").unwrap(), 4_000_000);
    }

    #[test]
    fn test_to_base_units_floors_sub_unit_precision() {
        assert_eq!(to_base_units("0.0000001").unwrap(), 0);
        assert_eq!(to_base_units("0.0000019").unwrap(), 1);
        assert_eq!(to_base_units("1.2345679").unwrap(), 1_234_567);
    }

    #[test]
    fn test_decimal_parsing_is_exact() {
        // 0.29 * 1e6 is 289999.99999999994 in binary floating point
        assert_eq!(to_base_units("0.29").unwrap(), 290_000);
        assert_eq!(to_base_units("0.57").unwrap(), 570_000);
    }

    #[test]
    fn test_to_base_units_rejects_non_positive_and_garbage() {
        for input in ["0", "0.0", "000", "-1", "-0.5", "", " ", ".", "abc", "1.2.3", "1e3", "1,5", "NaN", "inf"] {
            assert_eq!(
                to_base_units(input),
                Err(ConfigError::InvalidAmount {
                    input: input.to_string()
                }),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_to_base_units_overflow_is_invalid() {
        let huge = "9".repeat(40);
        assert!(to_base_units(&huge).is_err());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format_display(1_500_000), "1.5 BBN (1,500,000 ubbn)");
        assert_eq!(format_display(1_000), "0.001 BBN (1,000 ubbn)");
        assert_eq!(format_display(0), "0 BBN (0 ubbn)");
        assert_eq!(format_display(123), "0.000123 BBN (123 ubbn)");
    }

    #[test]
    fn test_display_round_trip_is_lossy_below_one_unit() {
        let base = to_base_units("1.5").unwrap();
        assert_eq!(format_human(base), "1.5");

        let base = to_base_units("0.0000019").unwrap();
        assert_eq!(format_human(base), "0.000001");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(12_345_678), "12,345,678");
    }
}
