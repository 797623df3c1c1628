use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use crate::models::{Invoice, RawInvoice, WeekLabels};
use crate::services::store::InvoiceStore;

const DEMO_INVOICES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/seed/demo_invoices.json"));

pub fn demo_week_labels() -> WeekLabels {
    [
        ("w-4", "Week of 28 Oct"),
        ("w-2", "Week of 11 Nov"),
        ("w-1", "Week of 18 Nov"),
        ("w0", "Week of 25 Nov"),
        ("w1", "Week of 2 Dec"),
        ("w2", "Week of 9 Dec"),
        ("w3", "Week of 16 Dec"),
        ("w4", "Week of 23 Dec"),
    ]
    .into_iter()
    .collect()
}

/// Demo invoices, run through the same normalization as upload responses.
pub fn demo_invoices(now: DateTime<Utc>) -> Result<Vec<Invoice>> {
    let raw: Vec<RawInvoice> = serde_json::from_str(DEMO_INVOICES)?;
    raw.into_iter()
        .enumerate()
        .map(|(i, record)| {
            record
                .normalize(now)
                .map_err(|e| anyhow!("Demo invoice #{}: {}", i, e))
        })
        .collect()
}

pub fn demo_store(now: DateTime<Utc>) -> Result<InvoiceStore> {
    Ok(InvoiceStore::new(demo_invoices(now)?, demo_week_labels()))
}
