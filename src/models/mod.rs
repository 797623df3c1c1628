mod raw;

pub use raw::{InvoiceError, RawAmount, RawId, RawInvoice, UNSCHEDULED_WEEK};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Overdue,
    #[serde(rename = "Due soon")]
    DueSoon,
    Upcoming,
    Paid,
    Archived,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Overdue,
        InvoiceStatus::DueSoon,
        InvoiceStatus::Upcoming,
        InvoiceStatus::Paid,
        InvoiceStatus::Archived,
    ];

    /// Neither paid nor archived.
    pub fn is_payable(self) -> bool {
        !matches!(self, InvoiceStatus::Paid | InvoiceStatus::Archived)
    }

    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Overdue => "Overdue",
            InvoiceStatus::DueSoon => "Due soon",
            InvoiceStatus::Upcoming => "Upcoming",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Archived => "Archived",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InvoiceCategory {
    Rent,
    Utilities,
    Marketing,
    Staff,
    Software,
    #[default]
    Other,
}

impl InvoiceCategory {
    pub const ALL: [InvoiceCategory; 6] = [
        InvoiceCategory::Rent,
        InvoiceCategory::Utilities,
        InvoiceCategory::Marketing,
        InvoiceCategory::Staff,
        InvoiceCategory::Software,
        InvoiceCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InvoiceCategory::Rent => "Rent",
            InvoiceCategory::Utilities => "Utilities",
            InvoiceCategory::Marketing => "Marketing",
            InvoiceCategory::Staff => "Staff",
            InvoiceCategory::Software => "Software",
            InvoiceCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InvoiceSource {
    #[default]
    Upload,
    Email,
}

impl InvoiceSource {
    pub const ALL: [InvoiceSource; 2] = [InvoiceSource::Upload, InvoiceSource::Email];

    pub fn label(self) -> &'static str {
        match self {
            InvoiceSource::Upload => "Upload",
            InvoiceSource::Email => "Email",
        }
    }
}

/// Canonical invoice. Only built through [`RawInvoice::normalize`], so every
/// date has already been resolved and every amount is non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub supplier: String,
    pub invoice_number: String,
    pub amount: f64,
    pub subtotal: Option<f64>,
    pub tax: Option<f64>,
    pub issue_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub week_id: String,
    pub status: InvoiceStatus,
    pub category: InvoiceCategory,
    pub source: InvoiceSource,
    pub notes: Option<String>,
    pub file_path: Option<String>,
    pub file_hash: Option<String>,
    pub confidence: Option<f64>,
}

impl Invoice {
    pub fn is_payable(&self) -> bool {
        self.status.is_payable()
    }

    /// Date used for relative date-range filtering: due date, else issue date.
    pub fn reference_date(&self) -> Option<DateTime<Utc>> {
        self.due_date.or(self.issue_date)
    }
}

/// Display labels for week identifiers. Unknown ids render as themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekLabels(HashMap<String, String>);

impl WeekLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, week_id: impl Into<String>, label: impl Into<String>) {
        self.0.insert(week_id.into(), label.into());
    }

    pub fn label(&self, week_id: &str) -> String {
        self.0
            .get(week_id)
            .cloned()
            .unwrap_or_else(|| week_id.to_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for WeekLabels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        WeekLabels(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    pub week_id: String,
    pub label: String,
    pub total: f64,
    pub invoices: Vec<Invoice>,
    pub risk: RiskTier,
    pub risk_style: &'static str,
    pub risk_label: &'static str,
}

/// One bar of the weekly outgoing chart. `bar_height` is in pixels, scaled
/// against the largest week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub amount: f64,
    pub bar_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowTimeline {
    pub weeks: Vec<WeekSummary>,
    pub trend: Vec<TrendPoint>,
    pub max_outgoing: f64,
    pub highest_week: f64,
    pub total_outgoing: f64,
    pub overdue_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DueWindow {
    pub count: usize,
    pub total: f64,
}

/// Row of the dashboard's "needs attention" list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttentionItem {
    pub invoice: Invoice,
    pub amount: String,
    pub due: String,
    pub days_left: Option<i64>,
    pub status_style: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub due_in_7_days: DueWindow,
    pub due_in_30_days: DueWindow,
    pub overdue: DueWindow,
    pub largest_upcoming: Option<Invoice>,
    pub attention: Vec<AttentionItem>,
    pub week_totals: Vec<TrendPoint>,
    pub max_outgoing: f64,
}

/// Relative window used by the documents list and the header range label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeFilter {
    #[default]
    All,
    Last30Days,
    Last90Days,
    Last12Months,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentFilters {
    #[serde(default)]
    pub date_range: DateRangeFilter,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    pub category: Option<InvoiceCategory>,
    #[serde(default)]
    pub source: Option<InvoiceSource>,
    #[serde(default)]
    pub supplier: String,
}

/// Choices offered by the documents filter bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentFilterOptions {
    pub date_ranges: Vec<DateRangeFilter>,
    pub statuses: Vec<InvoiceStatus>,
    pub categories: Vec<InvoiceCategory>,
    pub sources: Vec<InvoiceSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRow {
    pub id: String,
    pub date: String,
    pub supplier: String,
    pub invoice_number: String,
    pub amount: String,
    pub due_date: String,
    pub status: InvoiceStatus,
    pub status_style: &'static str,
    pub category: InvoiceCategory,
    pub source: InvoiceSource,
    pub source_style: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentDetail {
    pub invoice: Invoice,
    pub title: String,
    pub amount_due: String,
    pub subtotal: String,
    pub tax: String,
    pub issue_date: String,
    pub due_date: String,
    pub status_style: &'static str,
    pub source_style: &'static str,
    pub notes: String,
    pub confidence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub environment: Environment,
    pub app_origin: String,
    pub upload_bases: Option<Vec<String>>,
    pub today: Option<DateTime<Utc>>,
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadState {
    pub status: UploadStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailIntake {
    pub connected: bool,
    pub paused: bool,
}

impl Default for EmailIntake {
    fn default() -> Self {
        EmailIntake {
            connected: true,
            paused: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub endpoint_index: Option<usize>,
    pub endpoint: Option<String>,
    pub invoice: Option<Invoice>,
    pub duplicate: bool,
    pub state: UploadState,
}
