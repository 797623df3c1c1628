use crate::models::{CashflowTimeline, DashboardSummary, DateRangeFilter};
use crate::services::date_range::format_range_label;
use crate::services::state::AppState;
use tauri::State;

#[tauri::command]
pub async fn get_dashboard_summary(state: State<'_, AppState>) -> Result<DashboardSummary, String> {
    state.dashboard_summary().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_cashflow_timeline(state: State<'_, AppState>) -> Result<CashflowTimeline, String> {
    state.cashflow_timeline().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_range_label(range: DateRangeFilter, state: State<'_, AppState>) -> Result<String, String> {
    Ok(format_range_label(range, state.now()))
}
