use chrono::{DateTime, Utc};

use crate::models::{
    DateRangeFilter, DocumentDetail, DocumentFilterOptions, DocumentFilters, DocumentRow, Invoice, InvoiceCategory,
    InvoiceSource, InvoiceStatus,
};
use crate::services::date_range::{display_date, is_invoice_in_date_range};
use crate::services::presentation::{
    format_currency, format_optional_date, source_style, status_style, PLACEHOLDER,
};

pub const NOTES_PLACEHOLDER: &str = "Add internal context or routing notes here.";

/// Status choices offered by the documents filter bar. Archived invoices are
/// only reachable through "All".
pub const STATUS_FILTER_OPTIONS: [InvoiceStatus; 4] = [
    InvoiceStatus::Upcoming,
    InvoiceStatus::Overdue,
    InvoiceStatus::Paid,
    InvoiceStatus::DueSoon,
];

pub const CATEGORY_FILTER_OPTIONS: [InvoiceCategory; 6] = InvoiceCategory::ALL;
pub const SOURCE_FILTER_OPTIONS: [InvoiceSource; 2] = InvoiceSource::ALL;

/// Filter bar choices. "All" is implied by an unset filter and is not listed.
pub fn filter_options() -> DocumentFilterOptions {
    DocumentFilterOptions {
        date_ranges: DateRangeFilter::ALL.to_vec(),
        statuses: STATUS_FILTER_OPTIONS.to_vec(),
        categories: CATEGORY_FILTER_OPTIONS.to_vec(),
        sources: SOURCE_FILTER_OPTIONS.to_vec(),
    }
}

impl DocumentFilters {
    pub fn matches(&self, invoice: &Invoice, now: DateTime<Utc>) -> bool {
        let supplier = self.supplier.trim().to_lowercase();
        is_invoice_in_date_range(invoice, self.date_range, now)
            && self.status.map_or(true, |s| invoice.status == s)
            && self.category.map_or(true, |c| invoice.category == c)
            && self.source.map_or(true, |s| invoice.source == s)
            && (supplier.is_empty() || invoice.supplier.to_lowercase().contains(&supplier))
    }
}

pub fn filter_documents<'a>(
    invoices: &'a [Invoice],
    filters: &DocumentFilters,
    now: DateTime<Utc>,
) -> Vec<&'a Invoice> {
    invoices
        .iter()
        .filter(|inv| filters.matches(inv, now))
        .collect()
}

pub fn document_row(invoice: &Invoice) -> DocumentRow {
    DocumentRow {
        id: invoice.id.clone(),
        date: display_date(invoice),
        supplier: invoice.supplier.clone(),
        invoice_number: invoice.invoice_number.clone(),
        amount: format_currency(invoice.amount),
        due_date: format_optional_date(invoice.due_date),
        status: invoice.status,
        status_style: status_style(invoice.status),
        category: invoice.category,
        source: invoice.source,
        source_style: source_style(invoice.source),
    }
}

pub fn list_documents(invoices: &[Invoice], filters: &DocumentFilters, now: DateTime<Utc>) -> Vec<DocumentRow> {
    filter_documents(invoices, filters, now)
        .into_iter()
        .map(document_row)
        .collect()
}

/// Drawer contents for a single invoice.
pub fn document_detail(invoice: &Invoice) -> DocumentDetail {
    let optional_amount = |value: Option<f64>| {
        value
            .map(format_currency)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };

    DocumentDetail {
        invoice: invoice.clone(),
        title: format!("{} · {}", invoice.supplier, invoice.invoice_number),
        amount_due: format_currency(invoice.amount),
        subtotal: optional_amount(invoice.subtotal),
        tax: optional_amount(invoice.tax),
        issue_date: format_optional_date(invoice.issue_date),
        due_date: format_optional_date(invoice.due_date),
        status_style: status_style(invoice.status),
        source_style: source_style(invoice.source),
        notes: invoice
            .notes
            .clone()
            .unwrap_or_else(|| NOTES_PLACEHOLDER.to_string()),
        confidence: invoice
            .confidence
            .map(|c| format!("{}%", (c * 100.0).clamp(0.0, 100.0).round() as u32))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}
