use crate::models::{EmailIntake, Settings};
use crate::services::state::AppState;
use tauri::State;

#[tauri::command]
pub async fn get_settings(state: State<'_, AppState>) -> Result<Settings, String> {
    state.settings().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_email_intake(state: State<'_, AppState>) -> Result<EmailIntake, String> {
    state.email_intake().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_email_connection(state: State<'_, AppState>) -> Result<EmailIntake, String> {
    state.toggle_email_connection().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_email_pause(state: State<'_, AppState>) -> Result<EmailIntake, String> {
    state.toggle_email_pause().map_err(|e| e.to_string())
}
