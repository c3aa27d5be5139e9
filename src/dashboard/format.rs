//! Display formatting shared by the API, the CLI and the UI

use chrono::NaiveDate;

/// Format a money value as `₦1,234.56`
///
/// Two decimals, comma thousands separators, sign before the symbol.
pub fn format_currency(symbol: &str, value: f64) -> String {
    if !value.is_finite() {
        return format!("{}0.00", symbol);
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, group_thousands(whole), frac)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `Apr 20, 2022`
pub fn format_due_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `Apr 20`, the chart axis label
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Topbar title for a sidebar tab: first letter uppercased
pub fn tab_title(tab: &str) -> String {
    let mut chars = tab.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
