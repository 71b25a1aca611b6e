//! Amount and date normalization for raw statement cells.
//!
//! Both are best-effort and never fail: an unreadable amount becomes zero
//! (which callers treat as "no transaction"), an unreadable date is passed
//! through as trimmed text.

use billsheet_core::BillInfo;
use chrono::Datelike;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("number regex"))
}

fn full_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([0-9]{4})[-/年]([0-9]{1,2})[-/月]([0-9]{1,2})").expect("full date regex")
    })
}

fn partial_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]{1,2})[-/月]([0-9]{1,2})").expect("partial date regex"))
}

/// Parse a currency cell such as `"-1,731.52"`, `"¥25.20"` or `"25.20(CN)"`.
///
/// The result is negative when the text carries a minus sign or one of
/// `outflow_markers`; the magnitude is the first number in the text. A number
/// too large for `Decimal` also reads as zero; use `checked_amount` to tell
/// the two apart.
pub fn parse_amount(raw: &str, outflow_markers: &[String]) -> Decimal {
    checked_amount(raw, outflow_markers).unwrap_or(Decimal::ZERO)
}

/// Like `parse_amount`, but fails when the number does not fit in a `Decimal`.
pub fn checked_amount(raw: &str, outflow_markers: &[String]) -> Result<Decimal, rust_decimal::Error> {
    let cleaned = raw.replace(['¥', '￥', ','], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let negative = cleaned.contains('-') || outflow_markers.iter().any(|m| cleaned.contains(m.as_str()));

    let Some(m) = number_re().find(cleaned) else {
        return Ok(Decimal::ZERO);
    };
    let value = Decimal::from_str(m.as_str())?.abs();
    if value.is_zero() {
        return Ok(Decimal::ZERO);
    }

    Ok(if negative { -value } else { value })
}

/// Year/month of the statement, used to date `MM/DD` cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateContext {
    pub year: Option<i32>,
    /// Two-digit billing month, e.g. `"01"`
    pub month: Option<String>,
}

impl DateContext {
    pub fn from_bill_info(info: &BillInfo) -> Self {
        Self {
            year: info.billing_year(),
            month: info.billing_month_number().map(|m| format!("{:0>2}", m)),
        }
    }

    pub fn normalize(&self, raw: &str) -> String {
        parse_date_context(raw, self.year, self.month.as_deref())
    }
}

/// Normalize a statement date to `YYYY-MM-DD`.
///
/// `YYYY-MM-DD`, `YYYY/MM/DD` and `YYYY年MM月DD` are zero-padded as-is. Partial
/// `MM/DD` dates take their year from `year_context` (else the current year),
/// minus one for a December transaction on a January statement. Anything else
/// comes back trimmed and unchanged.
pub fn parse_date_context(raw: &str, year_context: Option<i32>, month_context: Option<&str>) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Some(caps) = full_date_re().captures(raw) {
        return format!("{}-{:0>2}-{:0>2}", &caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = partial_date_re().captures(raw) {
        let month = format!("{:0>2}", &caps[1]);
        let day = format!("{:0>2}", &caps[2]);

        let mut year = year_context.unwrap_or_else(|| chrono::Local::now().year());
        if month_context.is_some_and(|m| m.trim() == "01") && month == "12" {
            year -= 1;
        }
        return format!("{year}-{month}-{day}");
    }

    raw.to_string()
}
