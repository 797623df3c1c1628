//! Weekly cashflow aggregation.
//!
//! Payable invoices are bucketed by week id in the order the weeks are first
//! seen, summed, and each week total is classified against fixed risk
//! thresholds.

use std::collections::HashMap;

use crate::models::{CashflowTimeline, Invoice, InvoiceStatus, RiskTier, TrendPoint, WeekLabels, WeekSummary};
use crate::services::presentation::{risk_label, risk_style};

pub const HIGH_RISK_THRESHOLD: f64 = 6500.0;
pub const MEDIUM_RISK_THRESHOLD: f64 = 3500.0;

const MIN_BAR_HEIGHT: f64 = 40.0;
const MAX_BAR_HEIGHT: f64 = 160.0;

pub fn classify_risk(total: f64) -> RiskTier {
    if total >= HIGH_RISK_THRESHOLD {
        RiskTier::High
    } else if total >= MEDIUM_RISK_THRESHOLD {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

pub fn payable<'a>(invoices: &'a [Invoice]) -> impl Iterator<Item = &'a Invoice> + 'a {
    invoices.iter().filter(|inv| inv.is_payable())
}

/// Groups the given invoices by week id. Weeks keep first-encounter order and
/// each week keeps its invoices in encounter order.
pub fn group_by_week<'a, I>(invoices: I, labels: &WeekLabels) -> Vec<WeekSummary>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut weeks: Vec<WeekSummary> = Vec::new();

    for invoice in invoices {
        let slot = *index.entry(invoice.week_id.as_str()).or_insert_with(|| {
            weeks.push(WeekSummary {
                week_id: invoice.week_id.clone(),
                label: labels.label(&invoice.week_id),
                total: 0.0,
                invoices: Vec::new(),
                risk: RiskTier::Low,
                risk_style: risk_style(RiskTier::Low),
                risk_label: risk_label(RiskTier::Low),
            });
            weeks.len() - 1
        });
        let week = &mut weeks[slot];
        week.total += invoice.amount;
        week.invoices.push(invoice.clone());
    }

    for week in weeks.iter_mut() {
        week.risk = classify_risk(week.total);
        week.risk_style = risk_style(week.risk);
        week.risk_label = risk_label(week.risk);
    }
    weeks
}

/// Largest week total, or 1 so proportional scaling never divides by zero.
pub fn max_outgoing(points: &[TrendPoint]) -> f64 {
    points
        .iter()
        .map(|p| p.amount)
        .reduce(f64::max)
        .unwrap_or(1.0)
}

/// Bar height in pixels for the timeline chart.
pub fn bar_height(amount: f64, max: f64) -> f64 {
    let max = if max > 0.0 { max } else { 1.0 };
    (amount / max * MAX_BAR_HEIGHT).max(MIN_BAR_HEIGHT)
}

/// One chart point per week, bars scaled against the largest week total.
pub fn trend(weeks: &[WeekSummary]) -> Vec<TrendPoint> {
    let max = weeks.iter().map(|w| w.total).reduce(f64::max).unwrap_or(1.0);
    weeks
        .iter()
        .map(|w| TrendPoint {
            label: w.label.clone(),
            amount: w.total,
            bar_height: bar_height(w.total, max),
        })
        .collect()
}

pub fn build_cashflow_timeline(invoices: &[Invoice], labels: &WeekLabels) -> CashflowTimeline {
    let weeks = group_by_week(payable(invoices), labels);
    let trend = trend(&weeks);
    let max_outgoing = max_outgoing(&trend);
    let highest_week = weeks.iter().map(|w| w.total).reduce(f64::max).unwrap_or(0.0);
    let total_outgoing = payable(invoices).map(|inv| inv.amount).sum();
    let overdue_count = invoices
        .iter()
        .filter(|inv| inv.status == InvoiceStatus::Overdue)
        .count();

    tracing::debug!(
        weeks = weeks.len(),
        total_outgoing,
        overdue_count,
        "built cashflow timeline"
    );

    CashflowTimeline {
        weeks,
        trend,
        max_outgoing,
        highest_week,
        total_outgoing,
        overdue_count,
    }
}
