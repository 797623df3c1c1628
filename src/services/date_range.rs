use chrono::{DateTime, Duration, Utc};

use crate::models::{DateRangeFilter, Invoice, RawInvoice};
use crate::services::presentation::{format_long_date, format_optional_date};

impl DateRangeFilter {
    pub const ALL: [DateRangeFilter; 4] = [
        DateRangeFilter::All,
        DateRangeFilter::Last30Days,
        DateRangeFilter::Last90Days,
        DateRangeFilter::Last12Months,
    ];

    /// Length of the window in days, `None` for "all".
    pub fn days(self) -> Option<i64> {
        match self {
            DateRangeFilter::All => None,
            DateRangeFilter::Last30Days => Some(30),
            DateRangeFilter::Last90Days => Some(90),
            DateRangeFilter::Last12Months => Some(365),
        }
    }

    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|days| now - Duration::days(days))
    }

    pub fn contains(self, date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match self.start(now) {
            None => true,
            Some(start) => date.is_some_and(|d| d >= start && d <= now),
        }
    }
}

/// Whether the invoice's reference date (due, else issue) lies in
/// `[now - N days, now]`. Invoices without a usable date only pass "all".
pub fn is_invoice_in_date_range(invoice: &Invoice, range: DateRangeFilter, now: DateTime<Utc>) -> bool {
    range.contains(invoice.reference_date(), now)
}

/// Same rule for a record that has not been normalized yet.
pub fn is_raw_invoice_in_date_range(invoice: &RawInvoice, range: DateRangeFilter, now: DateTime<Utc>) -> bool {
    range.contains(invoice.reference_date(), now)
}

pub fn format_range_label(range: DateRangeFilter, now: DateTime<Utc>) -> String {
    match range.start(now) {
        None => "All time".to_string(),
        Some(start) => format!("{} – {}", format_long_date(start), format_long_date(now)),
    }
}

/// Reference date for table cells, `—` when there is none.
pub fn display_date(invoice: &Invoice) -> String {
    format_optional_date(invoice.reference_date())
}
