//! Man-yen (万円) display formatting

use mitsumori_types::CostRange;

pub const YEN_PER_MAN: f64 = 10_000.0;

/// Range delimiter used when writing cost bands back out
pub const RANGE_DELIMITER: char = '〜';

pub fn yen_to_man(yen: f64) -> f64 {
    yen / YEN_PER_MAN
}

pub fn man_to_yen(man: f64) -> f64 {
    man * YEN_PER_MAN
}

/// Render a yen amount as man-yen, rounded to one decimal place.
///
/// Zero is written as "0円". A whole result drops its fraction: 120000 gives
/// "12万円" and 125000 gives "12.5万円". Amounts must not be negative.
pub fn format_man_yen(amount_yen: f64) -> String {
    if amount_yen == 0.0 || !amount_yen.is_finite() {
        return "0円".to_string();
    }
    debug_assert!(amount_yen > 0.0, "negative amount {}", amount_yen);
    let man = (yen_to_man(amount_yen) * 10.0).round() / 10.0;
    format!("{}万円", man)
}

/// Render a range as a single amount or "<min>〜<max>".
pub fn format_cost_range(range: CostRange) -> String {
    if range.is_single() {
        format_man_yen(range.min)
    } else {
        format!(
            "{}{}{}",
            format_man_yen(range.min),
            RANGE_DELIMITER,
            format_man_yen(range.max)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_man() {
        assert_eq!(format_man_yen(120000.0), "12万円");
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_man_yen(0.0), "0円");
    }

    #[test]
    fn test_format_one_decimal() {
        assert_eq!(format_man_yen(125000.0), "12.5万円");
    }

    #[test]
    fn test_format_rounds_half_up() {
        assert_eq!(format_man_yen(123456.0), "12.3万円");
        assert_eq!(format_man_yen(125500.0), "12.6万円");
        assert_eq!(format_man_yen(1050.0), "0.1万円");
    }

    #[test]
    fn test_format_small_amount_rounds_to_zero_man() {
        assert_eq!(format_man_yen(400.0), "0万円");
    }

    #[test]
    fn test_format_range_single() {
        assert_eq!(format_cost_range(CostRange::single(30000.0)), "3万円");
    }

    #[test]
    fn test_format_range_band() {
        assert_eq!(
            format_cost_range(CostRange::new(80000.0, 110000.0)),
            "8万円〜11万円"
        );
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(yen_to_man(150000.0), 15.0);
        assert_eq!(man_to_yen(12.5), 125000.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "negative amount")]
    fn test_format_rejects_negative_in_debug() {
        format_man_yen(-300.0);
    }
}
