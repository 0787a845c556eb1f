//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a rupee amount with Indian digit grouping, e.g. `125000` as `1,25,000`.
///
/// Usage in templates: `{{ stats.total_revenue|rupees }}`
#[askama::filter_fn]
pub fn rupees(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(group_indian(&value.to_string()))
}

fn group_indian(raw: &str) -> String {
    let (sign, unsigned) = raw.strip_prefix('-').map_or(("", raw), |rest| ("-", rest));
    let (whole, fraction) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(w, f)| (w, Some(f)));

    if whole.len() <= 3 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return raw.to_string();
    }

    let (head, last_three) = whole.split_at(whole.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, back) = rest.split_at(rest.len() - 2);
        groups.push(back);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();

    let mut out = format!("{sign}{},{last_three}", groups.join(","));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::group_indian;

    #[test]
    fn test_indian_grouping() {
        assert_eq!(group_indian("0"), "0");
        assert_eq!(group_indian("999"), "999");
        assert_eq!(group_indian("1000"), "1,000");
        assert_eq!(group_indian("125000"), "1,25,000");
        assert_eq!(group_indian("12345678.5"), "1,23,45,678.5");
        assert_eq!(group_indian("-45000"), "-45,000");
        assert_eq!(group_indian("n/a"), "n/a");
    }
}
