//! Flattening of provider date representations into plain strings.

use serde_json::Value;

use crate::models::value_text;

/// Render a provider date as text.
///
/// Strings and numbers pass through unchanged. Objects carrying
/// `date-parts` (`{"date-parts": [[2023, 1, 15]]}`) render as `YYYY-MM-DD`,
/// `YYYY-MM` or `YYYY` depending on how many parts are present. Objects
/// wrapping a `value` are unwrapped. Everything else has no date.
pub fn flatten_date(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => {
            if let Some(parts) = obj.get("date-parts") {
                render_date_parts(parts)
            } else {
                obj.get("value").and_then(flatten_date)
            }
        }
        _ => None,
    }
}

fn render_date_parts(parts: &Value) -> Option<String> {
    let first = parts.as_array()?.first()?.as_array()?;
    let mut numbers = first.iter().map(date_part);

    let year = numbers.next().flatten()?;
    let month = numbers.next().flatten();
    let day = numbers.next().flatten();

    Some(match (month, day) {
        (Some(m), Some(d)) => format!("{}-{:02}-{:02}", year, m, d),
        (Some(m), None) => format!("{}-{:02}", year, m),
        _ => year.to_string(),
    })
}

/// Parts arrive as numbers, occasionally as numeric strings. Zero means unknown.
fn date_part(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value_text(value).and_then(|s| s.trim().parse().ok()))
        .filter(|n| *n != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_date_parts() {
        assert_eq!(
            flatten_date(&json!({"date-parts": [[2023, 1, 15]]})).as_deref(),
            Some("2023-01-15")
        );
    }

    #[test]
    fn test_year_month() {
        assert_eq!(
            flatten_date(&json!({"date-parts": [[2023, 1]]})).as_deref(),
            Some("2023-01")
        );
    }

    #[test]
    fn test_year_only() {
        assert_eq!(
            flatten_date(&json!({"date-parts": [[2023]]})).as_deref(),
            Some("2023")
        );
    }

    #[test]
    fn test_zero_parts_are_unknown() {
        assert_eq!(
            flatten_date(&json!({"date-parts": [[2023, 0, 0]]})).as_deref(),
            Some("2023")
        );
        assert_eq!(
            flatten_date(&json!({"date-parts": [[2023, 5, 0]]})).as_deref(),
            Some("2023-05")
        );
        assert_eq!(flatten_date(&json!({"date-parts": [[0, 1, 1]]})), None);
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(flatten_date(&json!("March 2019")).as_deref(), Some("March 2019"));
        assert_eq!(flatten_date(&json!(2019)).as_deref(), Some("2019"));
    }

    #[test]
    fn test_numeric_string_parts() {
        assert_eq!(
            flatten_date(&json!({"date-parts": [["2020", "7", "4"]]})).as_deref(),
            Some("2020-07-04")
        );
    }

    #[test]
    fn test_wrapped_value() {
        assert_eq!(
            flatten_date(&json!({"value": {"date-parts": [[1999, 12]]}})).as_deref(),
            Some("1999-12")
        );
    }

    #[test]
    fn test_no_date() {
        assert_eq!(flatten_date(&json!(null)), None);
        assert_eq!(flatten_date(&json!("")), None);
        assert_eq!(flatten_date(&json!(true)), None);
        assert_eq!(flatten_date(&json!({"date-parts": [[null]]})), None);
        assert_eq!(flatten_date(&json!({"date-parts": []})), None);
        assert_eq!(flatten_date(&json!({"timestamp": 1})), None);
        assert_eq!(flatten_date(&json!(["2020"])), None);
    }
}
