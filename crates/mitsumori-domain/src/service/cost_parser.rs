//! Cost string parsing (概算金額の文字列 → CostRange)
//!
//! Generator output is free text such as "5万円〜8万円", "約120000円" or
//! "１２.５万円". Parsing never fails: anything without a number is zero.

use std::sync::LazyLock;

use mitsumori_types::CostRange;
use regex::Regex;

use super::man_yen::YEN_PER_MAN;

/// Full-width ASCII block (！ .. ～)
const FULL_WIDTH_FIRST: u32 = 0xFF01;
const FULL_WIDTH_LAST: u32 = 0xFF5E;
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;

const MAN_MARKER: char = '万';

/// Unsigned decimal, ASCII digits only
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("number pattern is valid"));

/// Map full-width ASCII-range characters to their half-width forms.
pub fn normalize_width(input: &str) -> String {
    input.chars().map(to_half_width).collect()
}

fn to_half_width(c: char) -> char {
    let code = c as u32;
    if (FULL_WIDTH_FIRST..=FULL_WIDTH_LAST).contains(&code) {
        char::from_u32(code - FULL_WIDTH_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

/// Parse a free-form cost string into a yen range.
///
/// If the string mentions "万" every number is read in man-yen. The first
/// number is the minimum, the second the maximum; further numbers are ignored.
pub fn parse_cost_range(input: &str) -> CostRange {
    let normalized = normalize_width(input);
    let factor = if normalized.contains(MAN_MARKER) {
        YEN_PER_MAN
    } else {
        1.0
    };

    let mut tokens = NUMBER_RE
        .find_iter(&normalized)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .map(|n| n * factor);

    match (tokens.next(), tokens.next()) {
        (None, _) => CostRange::zero(),
        (Some(single), None) => CostRange::single(single),
        (Some(first), Some(second)) if first <= second => CostRange::new(first, second),
        // Keep min <= max when the generator writes the band backwards
        (Some(first), Some(second)) => CostRange::new(second, first),
    }
}

/// A line item after cost recovery
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    pub name: String,
    pub range: CostRange,
}

/// Parse a line item's cost, recovering prices embedded in the name column.
///
/// When the cost column yields nothing but the name has a number in it, the
/// name is parsed instead. On success the name is cut before its first digit.
pub fn resolve_line_item(name: &str, cost: &str) -> ResolvedItem {
    let range = parse_cost_range(cost);
    if !range.is_zero() {
        return ResolvedItem {
            name: name.to_string(),
            range,
        };
    }

    let normalized_name = normalize_width(name);
    let first_digit = normalized_name.chars().position(|c| c.is_ascii_digit());
    if let Some(index) = first_digit {
        let from_name = parse_cost_range(name);
        if !from_name.is_zero() {
            tracing::debug!(name, "cost recovered from name column");
            let display: String = name.chars().take(index).collect();
            return ResolvedItem {
                name: display.trim().to_string(),
                range: from_name,
            };
        }
    }

    ResolvedItem {
        name: name.to_string(),
        range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_man_yen_range() {
        assert_eq!(parse_cost_range("5万円〜8万円"), CostRange::new(50000.0, 80000.0));
    }

    #[test]
    fn test_plain_yen_with_prefix() {
        assert_eq!(parse_cost_range("約120000円"), CostRange::single(120000.0));
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(parse_cost_range(""), CostRange::zero());
        assert_eq!(parse_cost_range("要相談"), CostRange::zero());
    }

    #[test]
    fn test_decimal_man_yen() {
        assert_eq!(parse_cost_range("12.5万円"), CostRange::single(125000.0));
    }

    #[test]
    fn test_full_width_digits_and_tilde() {
        assert_eq!(parse_cost_range("５万円～８万円"), CostRange::new(50000.0, 80000.0));
        assert_eq!(parse_cost_range("１２．５万円"), CostRange::single(125000.0));
    }

    #[test]
    fn test_extra_tokens_ignored() {
        assert_eq!(
            parse_cost_range("3万円〜5万円(税抜、2日間)"),
            CostRange::new(30000.0, 50000.0)
        );
    }

    #[test]
    fn test_man_marker_anywhere_scales_all_tokens() {
        // The marker applies even to a token written without it
        assert_eq!(parse_cost_range("30〜50万円"), CostRange::new(300000.0, 500000.0));
    }

    #[test]
    fn test_commas_split_tokens() {
        assert_eq!(parse_cost_range("1,200万円"), CostRange::new(10000.0, 2000000.0));
        assert_eq!(parse_cost_range("3,5"), CostRange::new(3.0, 5.0));
        // "000" is its own token; the pair is then ordered
        assert_eq!(parse_cost_range("120,000円"), CostRange::new(0.0, 120.0));
    }

    #[test]
    fn test_reversed_band_is_ordered() {
        assert_eq!(parse_cost_range("8万円〜5万円"), CostRange::new(50000.0, 80000.0));
    }

    #[test]
    fn test_non_ascii_digits_ignored() {
        // Arabic-Indic digits are not decimal tokens here
        assert_eq!(parse_cost_range("٣٤"), CostRange::zero());
    }

    #[test]
    fn test_normalize_width_leaves_other_chars() {
        assert_eq!(normalize_width("ＡＢＣ１２３　万円"), "ABC123　万円");
    }

    #[test]
    fn test_resolve_uses_cost_column() {
        let item = resolve_line_item("クロス張替え", "8万円");
        assert_eq!(item.name, "クロス張替え");
        assert_eq!(item.range, CostRange::single(80000.0));
    }

    #[test]
    fn test_resolve_falls_back_to_name() {
        let item = resolve_line_item("床材工事 15万円", "");
        assert_eq!(item.name, "床材工事");
        assert_eq!(item.range, CostRange::single(150000.0));
    }

    #[test]
    fn test_resolve_full_width_name() {
        let item = resolve_line_item("外壁塗装　１２万円〜１５万円", "未定");
        assert_eq!(item.name, "外壁塗装");
        assert_eq!(item.range, CostRange::new(120000.0, 150000.0));
    }

    #[test]
    fn test_resolve_name_without_digits_keeps_zero() {
        let item = resolve_line_item("諸経費", "");
        assert_eq!(item.name, "諸経費");
        assert!(item.range.is_zero());
    }

    #[test]
    fn test_resolve_name_with_zero_amount_untouched() {
        let item = resolve_line_item("撤去 0円", "");
        assert_eq!(item.name, "撤去 0円");
        assert!(item.range.is_zero());
    }
}
