use chrono::{DateTime, Utc};

use crate::models::{AttentionItem, DashboardSummary, DueWindow, Invoice, InvoiceStatus, WeekLabels};
use crate::services::cashflow::{group_by_week, max_outgoing, payable, trend};
use crate::services::presentation::{format_currency, format_short_date, status_style, PLACEHOLDER};
use crate::utils::days_until;

/// Attention list length on the dashboard.
pub const ATTENTION_LIMIT: usize = 5;
/// Invoices due within this many days (or already past due) need attention.
pub const ATTENTION_DAYS: i64 = 5;

fn days_left(invoice: &Invoice, now: DateTime<Utc>) -> Option<i64> {
    invoice.due_date.map(|due| days_until(due, now))
}

/// Count and total of invoices due between today and `max_days` from now.
pub fn due_within(invoices: &[&Invoice], now: DateTime<Utc>, max_days: i64) -> DueWindow {
    invoices
        .iter()
        .filter(|inv| days_left(inv, now).is_some_and(|d| (0..=max_days).contains(&d)))
        .fold(DueWindow::default(), |acc, inv| DueWindow {
            count: acc.count + 1,
            total: acc.total + inv.amount,
        })
}

pub fn overdue(invoices: &[&Invoice]) -> DueWindow {
    invoices
        .iter()
        .filter(|inv| inv.status == InvoiceStatus::Overdue)
        .fold(DueWindow::default(), |acc, inv| DueWindow {
            count: acc.count + 1,
            total: acc.total + inv.amount,
        })
}

/// Biggest non-overdue invoice. On ties the first one wins.
pub fn largest_upcoming<'a>(invoices: &[&'a Invoice]) -> Option<&'a Invoice> {
    invoices
        .iter()
        .copied()
        .filter(|inv| inv.status != InvoiceStatus::Overdue)
        .fold(None, |best: Option<&Invoice>, curr| match best {
            Some(prev) if curr.amount <= prev.amount => Some(prev),
            _ => Some(curr),
        })
}

/// Overdue invoices plus anything due within [`ATTENTION_DAYS`], earliest due
/// date first, capped at [`ATTENTION_LIMIT`]. Invoices without a due date sort
/// last.
pub fn attention(invoices: &[&Invoice], now: DateTime<Utc>) -> Vec<Invoice> {
    let mut selected: Vec<&Invoice> = invoices
        .iter()
        .copied()
        .filter(|inv| {
            inv.status == InvoiceStatus::Overdue
                || days_left(inv, now).is_some_and(|d| d <= ATTENTION_DAYS)
        })
        .collect();
    selected.sort_by_key(|inv| (inv.due_date.is_none(), inv.due_date));
    selected
        .into_iter()
        .take(ATTENTION_LIMIT)
        .cloned()
        .collect()
}

/// Display row for the attention list: `£420`, `26 Nov`, days left.
pub fn attention_item(invoice: Invoice, now: DateTime<Utc>) -> AttentionItem {
    AttentionItem {
        amount: format_currency(invoice.amount),
        due: invoice
            .due_date
            .map(format_short_date)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        days_left: days_left(&invoice, now),
        status_style: status_style(invoice.status),
        invoice,
    }
}

pub fn build_dashboard_summary(invoices: &[Invoice], labels: &WeekLabels, now: DateTime<Utc>) -> DashboardSummary {
    let payable: Vec<&Invoice> = payable(invoices).collect();
    let weeks = group_by_week(payable.iter().copied(), labels);
    let week_totals = trend(&weeks);
    let max_outgoing = max_outgoing(&week_totals);

    DashboardSummary {
        due_in_7_days: due_within(&payable, now, 7),
        due_in_30_days: due_within(&payable, now, 30),
        overdue: overdue(&payable),
        largest_upcoming: largest_upcoming(&payable).cloned(),
        attention: attention(&payable, now)
            .into_iter()
            .map(|invoice| attention_item(invoice, now))
            .collect(),
        week_totals,
        max_outgoing,
    }
}
