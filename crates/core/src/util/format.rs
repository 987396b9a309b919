const TEN: f64 = 10.0;
const HUNDRED: f64 = 100.0;

/// Compact human representation of a number: 1_234_000 -> "1.23M".
///
/// Uses k/M/B/T suffixes, keeps two, one, or zero decimals depending on
/// the leading magnitude, and collapses anything at or above 1e15 to
/// "INF". Missing input renders as the empty string so table cells stay
/// blank instead of showing a placeholder.
pub fn short_rep(number: Option<f64>) -> String {
    let num = match number {
        Some(n) if n.is_finite() => n,
        _ => return String::new(),
    };

    if num == 0.0 {
        return "0.00".to_string();
    }

    unit_short_rep(num)
}

fn unit_short_rep(num: f64) -> String {
    let sign = if num < 0.0 { "-" } else { "" };
    let num = num.abs();

    const UNITS: [(f64, &str); 5] = [
        (1e12, "T"),
        (1e9, "B"),
        (1e6, "M"),
        (1e3, "k"),
        (1e0, ""),
    ];

    if num >= 1e15 {
        return format!("{sign}INF");
    }

    for (threshold, unit) in UNITS {
        if num >= threshold {
            let val = num / threshold;
            return if val < TEN {
                format!("{sign}{val:.2}{unit}")
            } else if val < HUNDRED {
                format!("{sign}{val:.1}{unit}")
            } else {
                format!("{sign}{val:.0}{unit}")
            };
        }
    }

    format!("{sign}{num:.2}")
}

#[cfg(test)]
mod tests {
    use super::short_rep;

    #[test]
    fn none_is_blank() {
        assert_eq!(short_rep(None), "");
        assert_eq!(short_rep(Some(f64::NAN)), "");
    }

    #[test]
    fn zero_keeps_decimals() {
        assert_eq!(short_rep(Some(0.0)), "0.00");
    }

    #[test]
    fn unit_suffixes() {
        assert_eq!(short_rep(Some(1_234.0)), "1.23k");
        assert_eq!(short_rep(Some(12_345.0)), "12.3k");
        assert_eq!(short_rep(Some(123_456.0)), "123k");
        assert_eq!(short_rep(Some(1_234_000.0)), "1.23M");
        assert_eq!(short_rep(Some(2_500_000_000.0)), "2.50B");
        assert_eq!(short_rep(Some(7.2e12)), "7.20T");
    }

    #[test]
    fn negative_carries_sign() {
        assert_eq!(short_rep(Some(-1_234.0)), "-1.23k");
    }

    #[test]
    fn huge_is_inf() {
        assert_eq!(short_rep(Some(1e15)), "INF");
        assert_eq!(short_rep(Some(-1e16)), "-INF");
    }

    #[test]
    fn small_values_pass_through() {
        assert_eq!(short_rep(Some(3.14159)), "3.14");
        assert_eq!(short_rep(Some(42.5)), "42.5");
        assert_eq!(short_rep(Some(999.4)), "999");
    }
}
