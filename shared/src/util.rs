/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Local wall-clock time as `HH:MM`, the format the backend stores on orders
pub fn now_hhmm() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

/// Parse an operator-typed number, accepting `,` as the decimal separator.
///
/// Returns `None` for blank, non-numeric or non-finite input.
pub fn parse_number_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whether `text` is a 24h `HH:MM` time
pub fn is_hhmm(text: &str) -> bool {
    chrono::NaiveTime::parse_from_str(text, "%H:%M").is_ok() && text.len() == 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_text() {
        assert_eq!(parse_number_text("12,50"), Some(12.5));
        assert_eq!(parse_number_text(" 7.25 "), Some(7.25));
        assert_eq!(parse_number_text("3"), Some(3.0));
        assert_eq!(parse_number_text(""), None);
        assert_eq!(parse_number_text("abc"), None);
        assert_eq!(parse_number_text("inf"), None);
    }

    #[test]
    fn test_is_hhmm() {
        assert!(is_hhmm("09:30"));
        assert!(is_hhmm("23:59"));
        assert!(!is_hhmm("24:00"));
        assert!(!is_hhmm("9:30"));
        assert!(!is_hhmm("09:30:00"));
        assert!(!is_hhmm("abc"));
    }

    #[test]
    fn test_now_hhmm_shape() {
        assert!(is_hhmm(&now_hhmm()));
    }
}
