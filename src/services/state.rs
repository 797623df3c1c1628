use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::models::{
    CashflowTimeline, DashboardSummary, DocumentDetail, DocumentFilters, DocumentRow, EmailIntake, Invoice,
    Settings, UploadOutcome, UploadState, UploadStatus,
};
use crate::services::cashflow::build_cashflow_timeline;
use crate::services::dashboard::build_dashboard_summary;
use crate::services::documents::{document_detail, list_documents};
use crate::services::settings::Clock;
use crate::services::store::InvoiceStore;
use crate::services::upload::UploadClient;
use crate::utils::sha256_file;

pub const UPLOADING_MESSAGE: &str = "Uploading invoice…";
pub const UPLOADED_MESSAGE: &str = "File uploaded successfully.";
pub const DUPLICATE_MESSAGE: &str = "This file has already been uploaded.";
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Please try again.";

impl EmailIntake {
    /// Connecting or disconnecting always clears the pause.
    pub fn toggle_connection(&mut self) {
        self.connected = !self.connected;
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        if self.connected {
            self.paused = !self.paused;
        }
    }
}

pub struct AppState {
    pub store: Arc<Mutex<InvoiceStore>>,
    pub settings: Arc<Mutex<Settings>>,
    clock: Clock,
    email: Mutex<EmailIntake>,
    upload: Mutex<UploadState>,
}

impl AppState {
    pub fn new(store: InvoiceStore, settings: Settings) -> Self {
        let clock = settings.clock();
        AppState {
            store: Arc::new(Mutex::new(store)),
            settings: Arc::new(Mutex::new(settings)),
            clock,
            email: Mutex::new(EmailIntake::default()),
            upload: Mutex::new(UploadState::default()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(self.settings.lock().map_err(|_| anyhow!("Settings lock"))?.clone())
    }

    pub fn dashboard_summary(&self) -> Result<DashboardSummary> {
        let store = self.store.lock().map_err(|_| anyhow!("Store lock"))?;
        Ok(build_dashboard_summary(store.all(), store.week_labels(), self.now()))
    }

    pub fn cashflow_timeline(&self) -> Result<CashflowTimeline> {
        let store = self.store.lock().map_err(|_| anyhow!("Store lock"))?;
        Ok(build_cashflow_timeline(store.all(), store.week_labels()))
    }

    pub fn documents(&self, filters: &DocumentFilters) -> Result<Vec<DocumentRow>> {
        let store = self.store.lock().map_err(|_| anyhow!("Store lock"))?;
        Ok(list_documents(store.all(), filters, self.now()))
    }

    pub fn document_detail(&self, id: &str) -> Result<DocumentDetail> {
        let store = self.store.lock().map_err(|_| anyhow!("Store lock"))?;
        let invoice = store
            .get(id)
            .ok_or_else(|| anyhow!("Invoice {} not found", id))?;
        Ok(document_detail(invoice))
    }

    pub fn mark_paid(&self, id: &str) -> Result<Invoice> {
        let mut store = self.store.lock().map_err(|_| anyhow!("Store lock"))?;
        Ok(store.mark_paid(id)?)
    }

    pub fn archive(&self, id: &str) -> Result<Invoice> {
        let mut store = self.store.lock().map_err(|_| anyhow!("Store lock"))?;
        Ok(store.archive(id)?)
    }

    pub fn email_intake(&self) -> Result<EmailIntake> {
        Ok(*self.email.lock().map_err(|_| anyhow!("Email lock"))?)
    }

    pub fn toggle_email_connection(&self) -> Result<EmailIntake> {
        let mut email = self.email.lock().map_err(|_| anyhow!("Email lock"))?;
        email.toggle_connection();
        tracing::info!(connected = email.connected, "email intake toggled");
        Ok(*email)
    }

    pub fn toggle_email_pause(&self) -> Result<EmailIntake> {
        let mut email = self.email.lock().map_err(|_| anyhow!("Email lock"))?;
        email.toggle_pause();
        tracing::info!(paused = email.paused, "email intake pause toggled");
        Ok(*email)
    }

    pub fn upload_state(&self) -> Result<UploadState> {
        Ok(self.upload.lock().map_err(|_| anyhow!("Upload lock"))?.clone())
    }

    fn set_upload_state(&self, status: UploadStatus, message: &str) -> Result<UploadState> {
        let mut guard = self.upload.lock().map_err(|_| anyhow!("Upload lock"))?;
        *guard = UploadState {
            status,
            message: Some(message.to_string()),
        };
        Ok(guard.clone())
    }

    /// Uploads a local invoice file. A file whose hash matches an invoice
    /// already in the store is not sent again.
    pub async fn upload_file(&self, path: &Path) -> Result<UploadOutcome> {
        let file_path = path.to_string_lossy().to_string();
        let file_hash = sha256_file(path)?;

        let existing = {
            let store = self.store.lock().map_err(|_| anyhow!("Store lock"))?;
            store.find_by_file_hash(&file_hash).cloned()
        };
        if let Some(existing) = existing {
            tracing::info!(file = %file_path, invoice_id = %existing.id, "file already uploaded");
            let state = self.set_upload_state(UploadStatus::Success, DUPLICATE_MESSAGE)?;
            return Ok(UploadOutcome {
                endpoint_index: None,
                endpoint: None,
                invoice: Some(existing),
                duplicate: true,
                state,
            });
        }

        let client = UploadClient::new(&self.settings()?.upload_bases());
        self.set_upload_state(UploadStatus::Uploading, UPLOADING_MESSAGE)?;

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.set_upload_state(UploadStatus::Error, UPLOAD_FAILED_MESSAGE)?;
                return Err(anyhow!("Read {}: {}", file_path, err));
            }
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("invoice")
            .to_string();

        match client.upload(&file_name, bytes, self.now()).await {
            Ok((index, endpoint, invoice)) => {
                let invoice = match invoice {
                    Some(mut invoice) => {
                        invoice.file_path = Some(file_path.clone());
                        invoice.file_hash = Some(file_hash);
                        let mut store = self.store.lock().map_err(|_| anyhow!("Store lock"))?;
                        store.insert(invoice.clone());
                        tracing::info!(invoice_id = %invoice.id, "invoice created from upload");
                        Some(invoice)
                    }
                    None => None,
                };
                let state = self.set_upload_state(UploadStatus::Success, UPLOADED_MESSAGE)?;
                Ok(UploadOutcome {
                    endpoint_index: Some(index),
                    endpoint: Some(endpoint),
                    invoice,
                    duplicate: false,
                    state,
                })
            }
            Err(err) => {
                self.set_upload_state(UploadStatus::Error, UPLOAD_FAILED_MESSAGE)?;
                Err(err.into())
            }
        }
    }
}
