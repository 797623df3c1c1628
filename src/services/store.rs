use thiserror::Error;

use crate::models::{Invoice, InvoiceStatus, WeekLabels};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("invoice {0} not found")]
    NotFound(String),
}

/// Owner of the invoice list behind every view. Invoices only move through
/// [`InvoiceStore::mark_paid`] and [`InvoiceStore::archive`]; nothing is
/// deleted.
#[derive(Debug, Clone, Default)]
pub struct InvoiceStore {
    invoices: Vec<Invoice>,
    week_labels: WeekLabels,
}

impl InvoiceStore {
    pub fn new(invoices: Vec<Invoice>, week_labels: WeekLabels) -> Self {
        InvoiceStore {
            invoices,
            week_labels,
        }
    }

    pub fn all(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn week_labels(&self) -> &WeekLabels {
        &self.week_labels
    }

    pub fn get(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|inv| inv.id == id)
    }

    pub fn find_by_file_hash(&self, hash: &str) -> Option<&Invoice> {
        self.invoices
            .iter()
            .find(|inv| inv.file_hash.as_deref() == Some(hash))
    }

    pub fn mark_paid(&mut self, id: &str) -> Result<Invoice, StoreError> {
        self.set_status(id, InvoiceStatus::Paid)
    }

    pub fn archive(&mut self, id: &str) -> Result<Invoice, StoreError> {
        self.set_status(id, InvoiceStatus::Archived)
    }

    /// Adds an invoice created from an upload. An invoice with the same id is
    /// replaced in place.
    pub fn insert(&mut self, invoice: Invoice) {
        match self.invoices.iter_mut().find(|inv| inv.id == invoice.id) {
            Some(existing) => *existing = invoice,
            None => self.invoices.push(invoice),
        }
    }

    fn set_status(&mut self, id: &str, status: InvoiceStatus) -> Result<Invoice, StoreError> {
        let invoice = self
            .invoices
            .iter_mut()
            .find(|inv| inv.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let previous = invoice.status;
        invoice.status = status;
        tracing::info!(invoice_id = %id, from = %previous, to = %status, "invoice status changed");
        Ok(invoice.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::invoice;

    fn store() -> InvoiceStore {
        InvoiceStore::new(
            vec![
                invoice("a", 100.0, InvoiceStatus::Upcoming, "w1", None),
                invoice("b", 200.0, InvoiceStatus::Overdue, "w1", None),
            ],
            WeekLabels::new(),
        )
    }

    #[test]
    fn marks_paid_and_archives() {
        let mut store = store();
        assert_eq!(store.mark_paid("a").unwrap().status, InvoiceStatus::Paid);
        assert_eq!(store.archive("b").unwrap().status, InvoiceStatus::Archived);
        assert_eq!(store.get("a").map(|i| i.status), Some(InvoiceStatus::Paid));
        assert_eq!(store.all().len(), 2);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut store = store();
        assert_eq!(store.archive("zzz"), Err(StoreError::NotFound("zzz".to_string())));
    }

    #[test]
    fn insert_appends_or_replaces() {
        let mut store = store();
        let mut uploaded = invoice("c", 50.0, InvoiceStatus::Upcoming, "w2", None);
        uploaded.file_hash = Some("abc".to_string());
        store.insert(uploaded);
        assert_eq!(store.all().len(), 3);
        assert_eq!(store.find_by_file_hash("abc").map(|i| i.id.as_str()), Some("c"));

        store.insert(invoice("a", 999.0, InvoiceStatus::Upcoming, "w1", None));
        assert_eq!(store.all().len(), 3);
        assert_eq!(store.all()[0].amount, 999.0);
    }
}
