//! Property checks for the quotation engine over generated inputs

use mitsumori_domain::model::EditableLineItem;
use mitsumori_domain::service::{
    format_cost_range, format_man_yen, parse_cost_range, QuotationPanel,
};
use mitsumori_types::{CostRange, LineItem, QuotationResult};

/// Half a tenth of a man-yen
const TOLERANCE_YEN: f64 = 500.0;

fn amounts() -> Vec<f64> {
    let mut values = vec![0.0, 1.0, 999.0, 5000.0, 10000.0, 12345.0, 99999.0];
    for i in 1..=40 {
        values.push(i as f64 * 7_351.0);
        values.push(i as f64 * 125_000.0);
    }
    values
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE_YEN
}

/// Strings without digits always parse to zero
#[test]
fn test_no_tokens_is_zero() {
    for s in ["", "未定", "要見積", "万円", "〜", "約　円", "ＡＢＣ"] {
        assert_eq!(parse_cost_range(s), CostRange::zero(), "input: {:?}", s);
    }
}

/// One token without 万 is read in yen
#[test]
fn test_single_token_yen() {
    for n in [0u64, 7, 980, 45000, 120000, 3_500_000] {
        let s = format!("約{}円", n);
        assert_eq!(parse_cost_range(&s), CostRange::single(n as f64), "input: {}", s);
    }
}

/// Two ordered tokens with 万 are scaled by 10,000
#[test]
fn test_two_tokens_man_yen() {
    for (a, b) in [(1u64, 2u64), (5, 8), (30, 30), (80, 120), (0, 4)] {
        let s = format!("{}万円〜{}万円", a, b);
        assert_eq!(
            parse_cost_range(&s),
            CostRange::new(a as f64 * 10000.0, b as f64 * 10000.0),
            "input: {}",
            s
        );
    }
}

/// Formatting then re-parsing stays within the display rounding
#[test]
fn test_format_parse_round_trip() {
    let values = amounts();
    for &min in &values {
        for &max in values.iter().filter(|&&v| v >= min).take(5) {
            let text = format_cost_range(CostRange::new(min, max));
            let parsed = parse_cost_range(&text);
            assert!(close(parsed.min, min), "{} -> {:?} (min {})", text, parsed, min);
            assert!(close(parsed.max, max), "{} -> {:?} (max {})", text, parsed, max);
        }
    }
}

/// Single amounts survive a round trip too
#[test]
fn test_single_amount_round_trip() {
    for amount in amounts() {
        let parsed = parse_cost_range(&format_man_yen(amount));
        assert!(close(parsed.min, amount) && close(parsed.max, amount), "{}", amount);
    }
}

/// Editing without changes reproduces the committed quotation
#[test]
fn test_edit_save_idempotent() {
    let original = QuotationResult {
        items: vec![
            LineItem::new("解体・撤去", "約120000円"),
            LineItem::new("クロス張替え", "12.5万円〜18万円"),
            LineItem::new("床材工事 15万円", ""),
            LineItem::new("諸経費", "要相談"),
        ],
        total_cost_range: "39.5万円〜45万円".to_string(),
        notes: "税別".to_string(),
    };

    let mut panel = QuotationPanel::with_result(original.clone());
    panel.start_edit().unwrap();
    let saved = panel.save_edit().unwrap().clone();

    assert_eq!(saved.items.len(), original.items.len());
    assert_eq!(saved.notes, original.notes);
    for (before, after) in original.items.iter().zip(&saved.items) {
        let b = mitsumori_domain::service::resolve_line_item(&before.name, &before.cost_range);
        let a = parse_cost_range(&after.cost_range);
        assert!(close(a.min, b.range.min) && close(a.max, b.range.max));
    }
    let total = parse_cost_range(&saved.total_cost_range);
    assert!(close(total.min, 395000.0), "{:?}", total);
    assert!(close(total.max, 450000.0), "{:?}", total);

    // A second cycle changes nothing further
    panel.start_edit().unwrap();
    let again = panel.save_edit().unwrap().clone();
    assert_eq!(again, saved);
}

/// The total tracks every add/edit/delete exactly
#[test]
fn test_total_invariant_under_edits() {
    let mut panel = QuotationPanel::with_result(QuotationResult {
        items: vec![LineItem::new("外壁塗装", "80万円〜120万円")],
        ..Default::default()
    });
    let session = panel.start_edit().unwrap();

    let mut step = 0u32;
    for round in 0..30u32 {
        let index = session.add_item();
        session.set_cost_min(index, round as f64 * 0.5).unwrap();
        session.set_cost_max(index, round as f64 * 0.75 + 1.0).unwrap();
        if round % 4 == 3 {
            session.remove_item(round as usize % session.items().len()).unwrap();
        }
        if round % 5 == 0 {
            session.set_name(0, format!("項目{}", round)).unwrap();
        }
        step += 1;

        let expected_min: f64 = session.items().iter().map(|i: &EditableLineItem| i.cost_min).sum();
        let expected_max: f64 = session.items().iter().map(|i| i.cost_max).sum();
        let total = session.total();
        assert_eq!(total.min, expected_min, "step {}", step);
        assert_eq!(total.max, expected_max, "step {}", step);
    }
}

/// The worked example: (5,8) + (3,3) man-yen
#[test]
fn test_two_item_total_scenario() {
    let mut panel = QuotationPanel::with_result(QuotationResult::default());
    let session = panel.start_edit().unwrap();
    let a = session.add_item();
    session.set_cost_min(a, 5.0).unwrap();
    session.set_cost_max(a, 8.0).unwrap();
    let b = session.add_item();
    session.set_cost_min(b, 3.0).unwrap();
    session.set_cost_max(b, 3.0).unwrap();

    let total = session.total();
    assert_eq!((total.min, total.max), (8.0, 11.0));
    assert_eq!(panel.save_edit().unwrap().total_cost_range, "8万円〜11万円");
}
