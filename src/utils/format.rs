/// Fixed-precision display of an amount. Stored values are never rounded.
pub fn money(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}

pub fn opt_money(value: Option<f64>, precision: usize) -> String {
    money(value.unwrap_or(0.0), precision)
}

/// Cuts `s` to `width` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_digit_by_default() {
        assert_eq!(money(150.0, 1), "150.0");
        assert_eq!(money(1234.56, 1), "1234.6");
        assert_eq!(opt_money(None, 2), "0.00");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("Senior Manager", 20), "Senior Manager");
        assert_eq!(truncate("Delivery Head", 5), "Deli…");
        assert_eq!(truncate("Zoë Ångström", 4), "Zoë…");
    }
}
