//! Reading a handle's logical value from its state attribute.
//!
//! Parsing is lenient: a missing or malformed attribute reads as `0` so the
//! convergence loop never has to deal with a read failure.

use tracing::warn;

use crate::SliderHandle;

/// Current logical value of `handle`. Never fails.
pub async fn read_value<H: SliderHandle>(handle: &H) -> f64 {
    match handle.value_text().await {
        Ok(Some(raw)) => parse_value(&raw),
        Ok(None) => 0.0,
        Err(e) => {
            warn!("reading value of {} failed, using 0: {}", handle.label(), e);
            0.0
        }
    }
}

/// Parse the longest numeric prefix of `raw`, e.g. `"42.5px"` -> `42.5`.
///
/// Returns `0` when there is no numeric prefix or the result is not finite.
pub fn parse_value(raw: &str) -> f64 {
    let s = raw.trim();
    let end = numeric_prefix_len(s.as_bytes());
    match s[..end].parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn numeric_prefix_len(b: &[u8]) -> usize {
    let digits = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    i = digits(i);
    let mut mantissa = i > int_start;

    if i < b.len() && b[i] == b'.' {
        let frac_start = i + 1;
        let frac_end = digits(frac_start);
        if frac_end > frac_start || mantissa {
            mantissa = true;
            i = frac_end;
        }
    }
    if !mantissa {
        return 0;
    }

    // Exponent only counts if at least one digit follows it.
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_end = digits(j);
        if exp_end > j {
            i = exp_end;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Geometry, Rect, Result};

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_value("42"), 42.0);
        assert_eq!(parse_value("-3.25"), -3.25);
        assert_eq!(parse_value("+7"), 7.0);
        assert_eq!(parse_value(".5"), 0.5);
        assert_eq!(parse_value("5."), 5.0);
        assert_eq!(parse_value("1e2"), 100.0);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_value("  12.5\n"), 12.5);
    }

    #[test]
    fn test_parse_numeric_prefix() {
        assert_eq!(parse_value("42.5px"), 42.5);
        assert_eq!(parse_value("100 USD"), 100.0);
        assert_eq!(parse_value("3e"), 3.0);
        assert_eq!(parse_value("3e+"), 3.0);
        assert_eq!(parse_value("1.2.3"), 1.2);
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(parse_value(""), 0.0);
        assert_eq!(parse_value("abc"), 0.0);
        assert_eq!(parse_value("-"), 0.0);
        assert_eq!(parse_value("."), 0.0);
        assert_eq!(parse_value("NaN"), 0.0);
        assert_eq!(parse_value("Infinity"), 0.0);
        assert_eq!(parse_value("$10"), 0.0);
    }

    #[test]
    fn test_parse_overflow_is_zero() {
        assert_eq!(parse_value("1e999"), 0.0);
    }

    enum Attr {
        Missing,
        Text(&'static str),
        Broken,
    }

    impl Geometry for Attr {
        async fn bounding_box(&self) -> Result<Option<Rect>> {
            Ok(None)
        }
    }

    impl SliderHandle for Attr {
        async fn value_text(&self) -> Result<Option<String>> {
            match self {
                Attr::Missing => Ok(None),
                Attr::Text(s) => Ok(Some((*s).to_string())),
                Attr::Broken => Err(Error::Gesture("detached".into())),
            }
        }
        fn label(&self) -> String {
            "attr".into()
        }
    }

    #[tokio::test]
    async fn test_read_value_is_lenient() {
        assert_eq!(read_value(&Attr::Text("37")).await, 37.0);
        assert_eq!(read_value(&Attr::Text("n/a")).await, 0.0);
        assert_eq!(read_value(&Attr::Missing).await, 0.0);
        assert_eq!(read_value(&Attr::Broken).await, 0.0);
    }
}
