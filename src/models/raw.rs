use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::{Invoice, InvoiceCategory, InvoiceSource, InvoiceStatus};
use crate::utils::{days_until, parse_decimal, parse_instant};

/// Week key for invoices that carry neither a week id nor a due date.
pub const UNSCHEDULED_WEEK: &str = "unscheduled";

/// Invoices due within this many days default to "Due soon" when the source
/// did not send a status.
const DUE_SOON_DAYS: i64 = 7;

#[derive(Debug, Error, PartialEq)]
pub enum InvoiceError {
    #[error("invoice is missing a supplier")]
    MissingSupplier,

    #[error("invoice is missing an amount")]
    MissingAmount,

    #[error("invalid {field}: '{value}'")]
    InvalidAmount { field: &'static str, value: String },

    #[error("{field} must not be negative (found {value})")]
    NegativeAmount { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    fn resolve(&self, field: &'static str) -> Result<f64, InvoiceError> {
        let value = match self {
            RawAmount::Number(value) => *value,
            RawAmount::Text(text) => parse_decimal(text).map_err(|_| InvoiceError::InvalidAmount {
                field,
                value: text.clone(),
            })?,
        };
        if !value.is_finite() {
            return Err(InvoiceError::InvalidAmount {
                field,
                value: value.to_string(),
            });
        }
        if value < 0.0 {
            return Err(InvoiceError::NegativeAmount { field, value });
        }
        Ok(value)
    }
}

/// Invoice as it arrives from seed files or the upload backend. Most fields
/// exist in a snake_case and a camelCase spelling, and a record may carry
/// both. Each spelling is its own field; [`RawInvoice::normalize`] takes the
/// first non-blank one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawInvoice {
    pub id: Option<RawId>,
    pub supplier: Option<String>,
    #[serde(rename = "supplierName")]
    pub supplier_name_camel: Option<String>,
    pub supplier_name: Option<String>,
    pub invoice_number: Option<String>,
    #[serde(rename = "invoiceNumber")]
    pub invoice_number_camel: Option<String>,
    pub amount: Option<RawAmount>,
    pub subtotal: Option<RawAmount>,
    pub tax: Option<RawAmount>,
    #[serde(rename = "dueDateIso")]
    pub due_date_iso_camel: Option<String>,
    pub due_date_iso: Option<String>,
    pub due_date: Option<String>,
    #[serde(rename = "dueDate")]
    pub due_date_camel: Option<String>,
    #[serde(rename = "issueDate")]
    pub issue_date_camel: Option<String>,
    pub issue_date: Option<String>,
    pub week_id: Option<String>,
    #[serde(rename = "weekId")]
    pub week_id_camel: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub category: Option<InvoiceCategory>,
    pub source: Option<InvoiceSource>,
    pub notes: Option<String>,
    pub file_path: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path_camel: Option<String>,
    pub confidence: Option<f64>,
}

impl RawInvoice {
    fn due_candidates(&self) -> [Option<&String>; 4] {
        [
            self.due_date_iso_camel.as_ref(),
            self.due_date_iso.as_ref(),
            self.due_date.as_ref(),
            self.due_date_camel.as_ref(),
        ]
    }

    fn issue_candidates(&self) -> [Option<&String>; 2] {
        [self.issue_date_camel.as_ref(), self.issue_date.as_ref()]
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        first_instant(self.due_candidates())
    }

    pub fn issue_date(&self) -> Option<DateTime<Utc>> {
        first_instant(self.issue_candidates())
    }

    /// First parseable date along the full fallback chain, due dates before
    /// issue dates.
    pub fn reference_date(&self) -> Option<DateTime<Utc>> {
        self.due_date().or_else(|| self.issue_date())
    }

    pub fn normalize(self, now: DateTime<Utc>) -> Result<Invoice, InvoiceError> {
        let supplier = first_text([
            self.supplier.as_ref(),
            self.supplier_name_camel.as_ref(),
            self.supplier_name.as_ref(),
        ])
        .ok_or(InvoiceError::MissingSupplier)?;

        let amount = self
            .amount
            .as_ref()
            .ok_or(InvoiceError::MissingAmount)?
            .resolve("amount")?;
        let subtotal = self.subtotal.as_ref().map(|a| a.resolve("subtotal")).transpose()?;
        let tax = self.tax.as_ref().map(|a| a.resolve("tax")).transpose()?;

        let due_date = self.due_date();
        let issue_date = self.issue_date();

        let week_id = first_text([self.week_id.as_ref(), self.week_id_camel.as_ref()])
            .unwrap_or_else(|| derive_week_id(due_date));

        let status = self
            .status
            .unwrap_or_else(|| derive_status(due_date, now));

        let id = match self.id {
            Some(RawId::Text(text)) if !text.trim().is_empty() => text,
            Some(RawId::Number(number)) => number.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        Ok(Invoice {
            id,
            supplier,
            invoice_number: first_text([self.invoice_number.as_ref(), self.invoice_number_camel.as_ref()])
                .unwrap_or_default(),
            amount,
            subtotal,
            tax,
            issue_date,
            due_date,
            week_id,
            status,
            category: self.category.unwrap_or_default(),
            source: self.source.unwrap_or_default(),
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            file_path: first_text([self.file_path.as_ref(), self.file_path_camel.as_ref()]),
            file_hash: None,
            confidence: self.confidence,
        })
    }
}

fn first_instant<'a, const N: usize>(candidates: [Option<&'a String>; N]) -> Option<DateTime<Utc>> {
    candidates
        .into_iter()
        .flatten()
        .find_map(|raw| parse_instant(raw))
}

fn first_text<const N: usize>(candidates: [Option<&String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn derive_week_id(due_date: Option<DateTime<Utc>>) -> String {
    match due_date {
        Some(due) => {
            let week = due.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        None => UNSCHEDULED_WEEK.to_string(),
    }
}

fn derive_status(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> InvoiceStatus {
    match due_date.map(|due| days_until(due, now)) {
        Some(days) if days < 0 => InvoiceStatus::Overdue,
        Some(days) if days <= DUE_SOON_DAYS => InvoiceStatus::DueSoon,
        _ => InvoiceStatus::Upcoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()
    }

    fn raw(value: serde_json::Value) -> RawInvoice {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn normalizes_camel_case_record() {
        let invoice = raw(json!({
            "id": "inv-1",
            "supplier": "Northwind Utilities",
            "invoiceNumber": "NW-2291",
            "amount": 420.0,
            "dueDate": "2024-12-05",
            "issueDate": "2024-11-05",
            "weekId": "w2",
            "status": "Due soon",
            "category": "Utilities",
            "source": "Email"
        }))
        .normalize(now())
        .unwrap();

        assert_eq!(invoice.id, "inv-1");
        assert_eq!(invoice.invoice_number, "NW-2291");
        assert_eq!(invoice.week_id, "w2");
        assert_eq!(invoice.status, InvoiceStatus::DueSoon);
        assert_eq!(invoice.category, InvoiceCategory::Utilities);
        assert_eq!(invoice.source, InvoiceSource::Email);
        assert_eq!(invoice.due_date, Some(Utc.with_ymd_and_hms(2024, 12, 5, 0, 0, 0).unwrap()));
        assert_eq!(invoice.issue_date, Some(Utc.with_ymd_and_hms(2024, 11, 5, 0, 0, 0).unwrap()));
    }

    #[test]
    fn iso_due_date_wins_over_legacy_spellings() {
        let record = raw(json!({
            "supplier": "Aurora Marketing",
            "amount": 100,
            "due_date_iso": "2024-12-10T00:00:00Z",
            "due_date": "2024-12-20",
            "dueDate": "2024-12-30"
        }));
        assert_eq!(
            record.due_date(),
            Some(Utc.with_ymd_and_hms(2024, 12, 10, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn unparseable_candidate_falls_through_to_next() {
        let record = raw(json!({
            "supplier": "Aurora Marketing",
            "amount": 100,
            "dueDateIso": "soon",
            "issue_date": "2024-11-01"
        }));
        assert_eq!(record.due_date(), None);
        assert_eq!(
            record.reference_date(),
            Some(Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn fills_defaults_for_sparse_upload_payload() {
        let invoice = raw(json!({
            "id": 42,
            "supplier_name": "  Streamline Legal ",
            "amount": "1,250.00",
            "due_date": "2024-11-20"
        }))
        .normalize(now())
        .unwrap();

        assert_eq!(invoice.id, "42");
        assert_eq!(invoice.supplier, "Streamline Legal");
        assert_eq!(invoice.amount, 1250.0);
        assert_eq!(invoice.category, InvoiceCategory::Other);
        assert_eq!(invoice.source, InvoiceSource::Upload);
        assert_eq!(invoice.status, InvoiceStatus::Overdue);
        assert_eq!(invoice.week_id, "2024-W47");
        assert_eq!(invoice.invoice_number, "");
    }

    #[test]
    fn accepts_both_spellings_in_one_record() {
        let invoice = raw(json!({
            "supplier": "",
            "supplierName": "Streamline Legal",
            "supplier_name": "Streamline Legal LLP",
            "invoice_number": "SL-1",
            "invoiceNumber": "SL-1-OLD",
            "week_id": " ",
            "weekId": "w2",
            "filePath": "/tmp/sl-1.pdf",
            "file_path": "/tmp/sl-1-copy.pdf",
            "amount": 950,
            "due_date": "2024-12-12",
            "dueDate": "2024-12-12"
        }))
        .normalize(now())
        .unwrap();

        assert_eq!(invoice.supplier, "Streamline Legal");
        assert_eq!(invoice.invoice_number, "SL-1");
        assert_eq!(invoice.week_id, "w2");
        assert_eq!(invoice.file_path.as_deref(), Some("/tmp/sl-1-copy.pdf"));
    }

    #[test]
    fn derives_status_from_due_date() {
        assert_eq!(derive_status(None, now()), InvoiceStatus::Upcoming);
        assert_eq!(
            derive_status(Some(Utc.with_ymd_and_hms(2024, 12, 6, 0, 0, 0).unwrap()), now()),
            InvoiceStatus::DueSoon
        );
        assert_eq!(
            derive_status(Some(Utc.with_ymd_and_hms(2024, 12, 20, 0, 0, 0).unwrap()), now()),
            InvoiceStatus::Upcoming
        );
    }

    #[test]
    fn generates_id_and_unscheduled_week_when_missing() {
        let invoice = raw(json!({ "supplier": "Supplier X", "amount": 10 }))
            .normalize(now())
            .unwrap();
        assert!(uuid::Uuid::parse_str(&invoice.id).is_ok());
        assert_eq!(invoice.week_id, UNSCHEDULED_WEEK);
        assert_eq!(invoice.reference_date(), None);
    }

    #[test]
    fn rejects_invalid_records() {
        assert_eq!(
            raw(json!({ "amount": 10 })).normalize(now()),
            Err(InvoiceError::MissingSupplier)
        );
        assert_eq!(
            raw(json!({ "supplier": "X" })).normalize(now()),
            Err(InvoiceError::MissingAmount)
        );
        assert_eq!(
            raw(json!({ "supplier": "X", "amount": -5 })).normalize(now()),
            Err(InvoiceError::NegativeAmount { field: "amount", value: -5.0 })
        );
        assert!(matches!(
            raw(json!({ "supplier": "X", "amount": 5, "tax": "lots" })).normalize(now()),
            Err(InvoiceError::InvalidAmount { field: "tax", .. })
        ));
    }

    #[test]
    fn unknown_status_is_rejected_at_the_boundary() {
        let parsed = serde_json::from_value::<RawInvoice>(json!({
            "supplier": "X",
            "amount": 5,
            "status": "Disputed"
        }));
        assert!(parsed.is_err());
    }
}
