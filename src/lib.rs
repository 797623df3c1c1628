pub mod models;
pub mod services;
pub mod utils;

#[cfg(feature = "tauri")]
pub mod commands;

#[cfg(test)]
mod test_support;

#[cfg(feature = "tauri")]
pub fn run() {
    use anyhow::anyhow;
    use tauri::Manager;

    use crate::models::Settings;
    use crate::services::seed::demo_store;
    use crate::services::state::AppState;
    use crate::services::store::InvoiceStore;

    utils::init_tracing();

    tauri::Builder::default()
        .setup(|app| {
            let settings = Settings::from_env().map_err(|e| anyhow!("Settings: {}", e))?;
            let store = if settings.seed_demo_data {
                demo_store(settings.clock().now())?
            } else {
                InvoiceStore::default()
            };
            tracing::info!(
                environment = ?settings.environment,
                invoices = store.all().len(),
                "starting cashdesk"
            );
            app.manage(AppState::new(store, settings));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::dashboard::get_dashboard_summary,
            commands::dashboard::get_cashflow_timeline,
            commands::dashboard::get_range_label,
            commands::invoices::get_documents,
            commands::invoices::get_document_filter_options,
            commands::invoices::get_document_detail,
            commands::invoices::mark_invoice_paid,
            commands::invoices::archive_invoice,
            commands::invoices::upload_invoice,
            commands::invoices::get_upload_state,
            commands::invoices::pick_invoice_file,
            commands::invoices::open_invoice_file,
            commands::settings::get_settings,
            commands::settings::get_email_intake,
            commands::settings::toggle_email_connection,
            commands::settings::toggle_email_pause,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
