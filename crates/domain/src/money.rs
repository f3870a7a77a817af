//! # 金額表示
//!
//! 金額はルピー表記で表示する。整数額は小数なし（`₹600`）、
//! 端数があれば小数 2 桁（`₹1250.50`）。

/// 金額をルピー表記にする
pub fn format_rupees(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("₹{rounded:.0}")
    } else {
        format!("₹{rounded:.2}")
    }
}

/// 金額が無ければ `N/A`
pub fn format_rupees_or_na(amount: Option<f64>) -> String {
    amount.map_or_else(|| "N/A".to_string(), format_rupees)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(600.0, "₹600")]
    #[case(1250.5, "₹1250.50")]
    #[case(0.0, "₹0")]
    #[case(99.999, "₹100")]
    #[case(12.346, "₹12.35")]
    fn test_ルピー表記(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(format_rupees(amount), expected);
    }

    #[test]
    fn test_金額なしはna() {
        assert_eq!(format_rupees_or_na(None), "N/A");
    }
}
