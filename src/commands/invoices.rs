use crate::models::{
    DocumentDetail, DocumentFilterOptions, DocumentFilters, DocumentRow, Invoice, UploadOutcome, UploadState,
};
use crate::services::documents::filter_options;
use crate::services::state::AppState;
use std::path::PathBuf;
use tauri::{AppHandle, Emitter, State};

#[tauri::command]
pub async fn get_documents(
    filters: Option<DocumentFilters>,
    state: State<'_, AppState>,
) -> Result<Vec<DocumentRow>, String> {
    state
        .documents(&filters.unwrap_or_default())
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_document_filter_options() -> Result<DocumentFilterOptions, String> {
    Ok(filter_options())
}

#[tauri::command]
pub async fn get_document_detail(invoice_id: String, state: State<'_, AppState>) -> Result<DocumentDetail, String> {
    state.document_detail(&invoice_id).map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn mark_invoice_paid(
    invoice_id: String,
    state: State<'_, AppState>,
    app: AppHandle,
) -> Result<Invoice, String> {
    let invoice = state.mark_paid(&invoice_id).map_err(|e| e.to_string())?;
    let _ = app.emit("invoice-updated", invoice.clone());
    Ok(invoice)
}

#[tauri::command]
pub async fn archive_invoice(
    invoice_id: String,
    state: State<'_, AppState>,
    app: AppHandle,
) -> Result<Invoice, String> {
    let invoice = state.archive(&invoice_id).map_err(|e| e.to_string())?;
    let _ = app.emit("invoice-updated", invoice.clone());
    Ok(invoice)
}

#[tauri::command]
pub async fn upload_invoice(
    path: String,
    state: State<'_, AppState>,
    app: AppHandle,
) -> Result<UploadOutcome, String> {
    let outcome = state
        .upload_file(&PathBuf::from(&path))
        .await
        .map_err(|e| e.to_string())?;
    if let (false, Some(invoice)) = (outcome.duplicate, &outcome.invoice) {
        let _ = app.emit("invoice-created", invoice.clone());
    }
    Ok(outcome)
}

#[tauri::command]
pub async fn get_upload_state(state: State<'_, AppState>) -> Result<UploadState, String> {
    state.upload_state().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn pick_invoice_file() -> Result<Option<String>, String> {
    let selection = rfd::FileDialog::new()
        .add_filter("Invoices", &["pdf", "png", "jpg", "jpeg"])
        .pick_file()
        .map(|path| path.to_string_lossy().to_string());
    Ok(selection)
}

#[tauri::command]
pub async fn open_invoice_file(path: String) -> Result<(), String> {
    open::that(path).map_err(|e| e.to_string())?;
    Ok(())
}
