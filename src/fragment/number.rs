use crate::{Error, Result};

/// Returns the exact substring consumed by the JSON number grammar starting
/// at `offset`. The span is lexed only; the caller hands it to a strict
/// decoder, so spans the grammar cannot justify (`-`, `1.`) fail there.
pub(crate) fn number_span(text: &str, offset: usize) -> Result<&str> {
    let bytes = text.as_bytes();
    let mut idx = offset;

    if bytes.get(idx) == Some(&b'-') {
        idx += 1;
    }

    match bytes.get(idx) {
        // A leading zero never takes more digits, so `01` stops after `0`.
        Some(b'0') => idx += 1,
        Some(b'1'..=b'9') => {
            while matches!(bytes.get(idx), Some(b'0'..=b'9')) {
                idx += 1;
            }
        }
        _ => {}
    }

    if bytes.get(idx) == Some(&b'.') {
        idx += 1;
        while matches!(bytes.get(idx), Some(b'0'..=b'9')) {
            idx += 1;
        }
    }

    if matches!(bytes.get(idx), Some(b'e' | b'E')) {
        idx += 1;
        if matches!(bytes.get(idx), Some(b'+' | b'-')) {
            idx += 1;
        }
        if !matches!(bytes.get(idx), Some(b'0'..=b'9')) {
            return Err(Error::InvalidExponent { offset: idx });
        }
        while matches!(bytes.get(idx), Some(b'0'..=b'9')) {
            idx += 1;
        }
    }

    Ok(&text[offset..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case("42", "42")]
    #[case("42 trailing", "42")]
    #[case("-12.5e+3]", "-12.5e+3")]
    #[case("0", "0")]
    #[case("01", "0")]
    #[case("-0.5,", "-0.5")]
    #[case("3.14rest", "3.14")]
    #[case("1E9}", "1E9")]
    #[case("9001", "9001")]
    fn spans(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(number_span(input, 0).unwrap(), expected);
    }

    #[rstest::rstest]
    #[case("1e")]
    #[case("1e+")]
    #[case("1e-x")]
    #[case("2.5Etail")]
    fn malformed_exponent(#[case] input: &str) {
        assert!(matches!(
            number_span(input, 0),
            Err(Error::InvalidExponent { .. })
        ));
    }

    #[rstest::rstest]
    fn span_decodes_like_a_full_document() {
        for input in ["42 x", "-7.25]", "1e3,", "0.0001 ", "123456789"] {
            let span = number_span(input, 0).unwrap();
            let lexed: serde_json::Value = serde_json::from_str(span).unwrap();
            let direct: serde_json::Value = serde_json::from_str(span.trim()).unwrap();
            assert_eq!(lexed, direct);
        }
    }
}
