//! Display formatting
//!
//! Numbers use en-US compact notation (`1.2K`, `3.45M`) with at most two
//! fraction digits. Fees arrive in stroops and are shown in XLM.
//! Dates are rendered in UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// 1 XLM = 10,000,000 stroops
pub const STROOPS_PER_LUMEN: f64 = 10_000_000.0;

const COMPACT_UNITS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberFormat {
    pub is_percentage: bool,
    pub is_stroop: bool,
}

impl NumberFormat {
    pub const PLAIN: Self = Self {
        is_percentage: false,
        is_stroop: false,
    };
    pub const PERCENTAGE: Self = Self {
        is_percentage: true,
        is_stroop: false,
    };
    pub const STROOP: Self = Self {
        is_percentage: false,
        is_stroop: true,
    };
}

/// Format a metric value.
///
/// Percentages get two decimals and `%`; stroop amounts are converted to XLM.
pub fn format_number(num: f64, options: NumberFormat) -> String {
    if options.is_percentage {
        return format!("{num:.2}%");
    }
    if options.is_stroop {
        return format!("{} XLM", compact(num / STROOPS_PER_LUMEN));
    }
    compact(num)
}

/// en-US compact notation with up to two fraction digits
pub fn compact(num: f64) -> String {
    if !num.is_finite() {
        return num.to_string();
    }
    let sign = if num < 0.0 { "-" } else { "" };
    let abs = num.abs();

    let mut unit: Option<usize> = COMPACT_UNITS.iter().rposition(|(scale, _)| abs >= *scale);
    loop {
        let scale = unit.map(|i| COMPACT_UNITS[i].0).unwrap_or(1.0);
        let rounded = round2(abs / scale);
        // 999.999 rounds to 1000: promote to the next unit
        let next = unit.map(|i| i + 1).unwrap_or(0);
        if rounded >= 1000.0 && next < COMPACT_UNITS.len() {
            unit = Some(next);
            continue;
        }
        let suffix = unit.map(|i| COMPACT_UNITS[i].1).unwrap_or("");
        let digits = trim_fraction(format!("{rounded:.2}"));
        if digits == "0" {
            return "0".to_string();
        }
        return format!("{sign}{digits}{suffix}");
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn trim_fraction(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Signed percentage change. `None` means there was no baseline to compare against.
pub fn format_percentage_with_sign(change: Option<f64>) -> String {
    match change {
        None => "+∞".to_string(),
        Some(n) => {
            let sign = if n >= 0.0 { "+" } else { "" };
            format!("{sign}{n:.2}%")
        }
    }
}

/// `abcdef...uvwxyz` for hashes longer than 12 characters
pub fn truncate_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() <= 12 {
        return hash.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}...{tail}")
}

/// Contract header form: first 6 and last 4 characters
pub fn truncate_contract_id(contract_id: &str) -> String {
    let chars: Vec<char> = contract_id.chars().collect();
    if chars.len() <= 10 {
        return contract_id.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub fn convert_stroops_to_lumens(stroops: f64) -> String {
    format!("{:.2} XLM", stroops / STROOPS_PER_LUMEN)
}

pub fn camel_to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase();
        out.extend(c.to_lowercase());
    }
    out
}

/// Lenient timestamp parsing: RFC 3339, naive ISO date-time, or plain date
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `Jan 5, 2024, 03:04:05 PM`
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y, %I:%M:%S %p").to_string()
}

/// [`format_datetime`] over a string; unparseable input is returned unchanged
pub fn format_date(date: &str) -> String {
    parse_date(date)
        .map(|dt| format_datetime(&dt))
        .unwrap_or_else(|| date.to_string())
}

/// `Jan 5` or `Jan 5, 2024`
pub fn format_short_date(date: &str, include_year: bool) -> String {
    match parse_date(date) {
        Some(dt) if include_year => dt.format("%b %-d, %Y").to_string(),
        Some(dt) => dt.format("%b %-d").to_string(),
        None => date.to_string(),
    }
}
