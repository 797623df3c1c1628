//! Display mapping for the frontend: style tokens per status, source and risk
//! tier, plus en-GB / GBP formatting.
//!
//! Every lookup is an exhaustive `match`. A new status or source without a
//! style does not compile.

use chrono::{DateTime, Datelike, Utc};

use crate::models::{InvoiceSource, InvoiceStatus, RiskTier};

pub const PLACEHOLDER: &str = "—";

const MONTHS_EN_GB: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sept", "Oct", "Nov", "Dec",
];

pub fn status_style(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Overdue => "bg-rose-50 text-rose-700 border-rose-100",
        InvoiceStatus::DueSoon => "bg-amber-50 text-amber-700 border-amber-100",
        InvoiceStatus::Upcoming => "bg-emerald-50 text-emerald-700 border-emerald-100",
        InvoiceStatus::Paid => "bg-slate-100 text-slate-700 border-slate-200",
        InvoiceStatus::Archived => "bg-slate-100 text-slate-500 border-slate-200",
    }
}

pub fn source_style(source: InvoiceSource) -> &'static str {
    match source {
        InvoiceSource::Upload => "bg-cyan-50 text-cyan-700 border-cyan-100",
        InvoiceSource::Email => "bg-indigo-50 text-indigo-700 border-indigo-100",
    }
}

pub fn risk_style(risk: RiskTier) -> &'static str {
    match risk {
        RiskTier::High => "border-rose-100 bg-rose-50 text-rose-700",
        RiskTier::Medium => "border-amber-100 bg-amber-50 text-amber-700",
        RiskTier::Low => "border-emerald-100 bg-emerald-50 text-emerald-700",
    }
}

pub fn risk_label(risk: RiskTier) -> &'static str {
    match risk {
        RiskTier::High => "High risk",
        RiskTier::Medium => "Medium risk",
        RiskTier::Low => "Low risk",
    }
}

/// Whole pounds with thousands separators, e.g. `£7,800`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.abs().round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0.0 && rounded > 0 {
        format!("-£{}", grouped)
    } else {
        format!("£{}", grouped)
    }
}

/// `01 Dec`
pub fn format_short_date(date: DateTime<Utc>) -> String {
    format!("{:02} {}", date.day(), month_name(date))
}

/// `01 Dec 2024`
pub fn format_long_date(date: DateTime<Utc>) -> String {
    format!("{:02} {} {}", date.day(), month_name(date), date.year())
}

pub fn format_optional_date(date: Option<DateTime<Utc>>) -> String {
    date.map(format_long_date)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn month_name(date: DateTime<Utc>) -> &'static str {
    MONTHS_EN_GB[date.month0() as usize]
}
