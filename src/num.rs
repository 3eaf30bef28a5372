/// Canonical text for a numeric literal: integer-valued floats collapse to
/// plain integers, everything else takes the shortest round-trippable form.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        let mut buf = itoa::Buffer::new();
        return buf.format(value as i64).to_string();
    }
    let mut buf = ryu::Buffer::new();
    buf.format(value).to_string()
}

pub fn format_integer(value: i64) -> String {
    let mut buf = itoa::Buffer::new();
    buf.format(value).to_string()
}

/// JSON number for `value`, collapsing integer-valued floats to integers
/// so re-encoded coordinates match the source text.
pub fn number_value(value: f64) -> serde_json::Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        return serde_json::Value::from(value as i64);
    }
    serde_json::Value::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(1.0, "1")]
    #[case(42.0, "42")]
    #[case(-13.0, "-13")]
    #[case(0.0, "0")]
    #[case(-0.0, "0")]
    #[case(1.5, "1.5")]
    #[case(0.001, "0.001")]
    #[case(f64::NAN, "0")]
    #[case(f64::INFINITY, "0")]
    fn formats(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_number(value), expected);
    }

    #[rstest::rstest]
    fn integers() {
        assert_eq!(format_integer(360), "360");
        assert_eq!(format_integer(-90), "-90");
    }
}
