use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use jsonschema::JSONSchema;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use thiserror::Error;

use crate::models::{Invoice, RawInvoice};

pub const UPLOAD_PATH: &str = "/api/upload-invoice";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Upload failed. Please try again.")]
    AllEndpointsFailed { attempts: usize },
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub invoice: Option<Value>,
}

/// `{base}/api/upload-invoice` for each base, in order.
pub fn upload_endpoints(bases: &[String]) -> Vec<String> {
    bases
        .iter()
        .map(|base| format!("{}{}", base.trim().trim_end_matches('/'), UPLOAD_PATH))
        .collect()
}

/// Tries each endpoint once, in order, and stops at the first success. Every
/// failure is logged and otherwise swallowed.
pub async fn upload_with_fallback<F, Fut>(
    endpoints: &[String],
    mut attempt: F,
) -> Result<(usize, UploadResponse), UploadError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<UploadResponse>>,
{
    for (index, endpoint) in endpoints.iter().enumerate() {
        match attempt(endpoint.clone()).await {
            Ok(response) => {
                tracing::info!(endpoint = %endpoint, attempt = index + 1, "invoice uploaded");
                return Ok((index, response));
            }
            Err(err) => {
                tracing::warn!(endpoint = %endpoint, error = %err, "upload attempt failed");
            }
        }
    }
    tracing::error!(attempts = endpoints.len(), "upload failed at every endpoint");
    Err(UploadError::AllEndpointsFailed {
        attempts: endpoints.len(),
    })
}

pub struct UploadClient {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

impl UploadClient {
    pub fn new(bases: &[String]) -> Self {
        UploadClient {
            client: reqwest::Client::new(),
            endpoints: upload_endpoints(bases),
        }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Posts the file to the first endpoint that accepts it. Returns the index
    /// and URL of that endpoint with the invoice the backend created, if any.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<(usize, String, Option<Invoice>), UploadError> {
        let client = self.client.clone();
        let name = file_name.to_string();

        let (index, response) = upload_with_fallback(&self.endpoints, |endpoint| {
            let client = client.clone();
            let name = name.clone();
            let body = bytes.clone();
            async move { post_file(&client, &endpoint, name, body).await }
        })
        .await?;

        let invoice = response.invoice.and_then(|value| match parse_uploaded_invoice(value, now) {
            Ok(invoice) => Some(invoice),
            Err(err) => {
                tracing::warn!(error = %err, "upload response carried an unusable invoice");
                None
            }
        });

        Ok((index, self.endpoints[index].clone(), invoice))
    }
}

async fn post_file(client: &reqwest::Client, endpoint: &str, file_name: String, body: Vec<u8>) -> Result<UploadResponse> {
    let part = Part::bytes(body).file_name(file_name.clone());
    let part = match mime_for(&file_name) {
        Some(mime) => part.mime_str(mime)?,
        None => part,
    };
    let form = Form::new().part("file", part);

    let response = client.post(endpoint).multipart(form).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!("Upload failed {} at {}", response.status(), endpoint));
    }

    let body: UploadResponse = response
        .json()
        .await
        .map_err(|e| anyhow!("Invalid JSON from {}: {}", endpoint, e))?;
    Ok(body)
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

fn invoice_schema() -> Result<JSONSchema> {
    let schema = json!({
        "type": "object",
        "required": ["amount"],
        "anyOf": [
            {"required": ["supplier"]},
            {"required": ["supplierName"]},
            {"required": ["supplier_name"]}
        ],
        "properties": {
            "id": {"type": ["string", "integer"]},
            "amount": {"type": ["number", "string"]},
            "subtotal": {"type": ["number", "string", "null"]},
            "tax": {"type": ["number", "string", "null"]},
            "status": {"enum": ["Overdue", "Due soon", "Upcoming", "Paid", "Archived", null]},
            "category": {"enum": ["Rent", "Utilities", "Marketing", "Staff", "Software", "Other", null]},
            "source": {"enum": ["Upload", "Email", null]},
            "confidence": {"type": ["number", "null"]}
        }
    });
    JSONSchema::compile(&schema).map_err(|e| anyhow!("Invalid invoice schema: {}", e))
}

/// Validates the backend's invoice object and normalizes it.
pub fn parse_uploaded_invoice(value: Value, now: DateTime<Utc>) -> Result<Invoice> {
    let schema = invoice_schema()?;
    if !schema.is_valid(&value) {
        return Err(anyhow!("Invoice does not match schema"));
    }
    let raw: RawInvoice = serde_json::from_value(value)?;
    Ok(raw.normalize(now)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceSource, InvoiceStatus};
    use crate::test_support::{canned_http_server, now};

    fn bases() -> Vec<String> {
        vec![
            "http://localhost:5175/cashflow-api/".to_string(),
            "http://185.151.29.141:3002".to_string(),
        ]
    }

    #[test]
    fn builds_endpoints_in_order() {
        assert_eq!(
            upload_endpoints(&bases()),
            vec![
                "http://localhost:5175/cashflow-api/api/upload-invoice".to_string(),
                "http://185.151.29.141:3002/api/upload-invoice".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn falls_through_to_next_endpoint() {
        let endpoints = upload_endpoints(&bases());
        let mut seen = Vec::new();
        let (index, response) = upload_with_fallback(&endpoints, |endpoint| {
            seen.push(endpoint.clone());
            let first = seen.len() == 1;
            async move {
                if first {
                    Err(anyhow!("502 Bad Gateway"))
                } else {
                    Ok(UploadResponse {
                        invoice: Some(json!({"supplier": "Supplier X", "amount": 10})),
                    })
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(index, 1);
        assert_eq!(seen, endpoints);
        assert!(response.invoice.is_some());
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let endpoints = upload_endpoints(&bases());
        let mut calls = 0;
        let (index, _) = upload_with_fallback(&endpoints, |_| {
            calls += 1;
            async { Ok(UploadResponse::default()) }
        })
        .await
        .unwrap();
        assert_eq!(index, 0);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn reports_exhaustion() {
        let endpoints = upload_endpoints(&bases());
        let result = upload_with_fallback(&endpoints, |_| async { Err(anyhow!("offline")) }).await;
        assert!(matches!(result, Err(UploadError::AllEndpointsFailed { attempts: 2 })));

        let result = upload_with_fallback(&[], |_| async { Ok(UploadResponse::default()) }).await;
        assert!(matches!(result, Err(UploadError::AllEndpointsFailed { attempts: 0 })));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_failed_attempt() {
        let client = UploadClient::new(&["http://127.0.0.1:1".to_string()]);
        let result = client.upload("invoice.pdf", b"%PDF-1.4".to_vec(), now()).await;
        assert!(matches!(result, Err(UploadError::AllEndpointsFailed { attempts: 1 })));
    }

    #[tokio::test]
    async fn bad_gateway_falls_back_to_next_base() {
        let (gateway, gateway_request) = canned_http_server("502 Bad Gateway", "text/plain", "bad gateway").await;
        let (direct, direct_request) = canned_http_server(
            "200 OK",
            "application/json",
            r#"{"invoice":{"id":"up-7","supplier":"Streamline Legal","amount":950,"dueDate":"2024-12-12"}}"#,
        )
        .await;

        let client = UploadClient::new(&[gateway, direct.clone()]);
        let (index, endpoint, invoice) = client
            .upload("scan.pdf", b"%PDF-1.4 scan".to_vec(), now())
            .await
            .unwrap();

        assert_eq!(index, 1);
        assert_eq!(endpoint, format!("{}{}", direct, UPLOAD_PATH));
        let invoice = invoice.unwrap();
        assert_eq!(invoice.id, "up-7");
        assert_eq!(invoice.amount, 950.0);

        assert!(gateway_request.await.unwrap().starts_with("POST /api/upload-invoice"));
        let request = direct_request.await.unwrap();
        assert!(request.contains(r#"name="file""#));
        assert!(request.contains(r#"filename="scan.pdf""#));
        assert!(request.contains("application/pdf"));
        assert!(request.contains("%PDF-1.4 scan"));
    }

    #[tokio::test]
    async fn html_body_is_a_failed_attempt() {
        let (base, _request) = canned_http_server("200 OK", "text/html", "<html><body>Login</body></html>").await;
        let client = UploadClient::new(&[base]);
        let result = client.upload("scan.pdf", b"%PDF-1.4".to_vec(), now()).await;
        assert!(matches!(result, Err(UploadError::AllEndpointsFailed { attempts: 1 })));
    }

    #[tokio::test]
    async fn success_without_invoice_object() {
        let (base, _request) = canned_http_server("200 OK", "application/json", r#"{"ok":true}"#).await;
        let client = UploadClient::new(&[base]);
        let (index, _, invoice) = client.upload("scan.pdf", b"%PDF-1.4".to_vec(), now()).await.unwrap();
        assert_eq!(index, 0);
        assert!(invoice.is_none());
    }

    #[test]
    fn accepts_invoice_with_both_field_spellings() {
        let invoice = parse_uploaded_invoice(
            json!({
                "supplier": "Streamline Legal",
                "supplierName": "Streamline Legal",
                "invoiceNumber": "SL-1",
                "invoice_number": "SL-1",
                "weekId": "w2",
                "week_id": "w2",
                "amount": 950
            }),
            now(),
        )
        .unwrap();
        assert_eq!(invoice.invoice_number, "SL-1");
        assert_eq!(invoice.week_id, "w2");
    }

    #[test]
    fn parses_backend_invoice() {
        let invoice = parse_uploaded_invoice(
            json!({
                "id": "up-1",
                "supplier": "Streamline Legal",
                "amount": "950.00",
                "due_date_iso": "2024-12-12T00:00:00Z",
                "status": "Upcoming"
            }),
            now(),
        )
        .unwrap();
        assert_eq!(invoice.id, "up-1");
        assert_eq!(invoice.amount, 950.0);
        assert_eq!(invoice.status, InvoiceStatus::Upcoming);
        assert_eq!(invoice.source, InvoiceSource::Upload);
    }

    #[test]
    fn rejects_backend_invoice_outside_schema() {
        assert!(parse_uploaded_invoice(json!({"amount": 5}), now()).is_err());
        assert!(parse_uploaded_invoice(
            json!({"supplier": "X", "amount": 5, "status": "Disputed"}),
            now()
        )
        .is_err());
        assert!(parse_uploaded_invoice(json!("not an object"), now()).is_err());
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(mime_for("scan.PDF"), Some("application/pdf"));
        assert_eq!(mime_for("photo.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for("notes"), None);
    }
}
