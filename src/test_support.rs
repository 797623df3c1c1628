use chrono::{DateTime, TimeZone, Utc};

use crate::models::{Invoice, InvoiceCategory, InvoiceSource, InvoiceStatus};

/// Fixed "today" shared by the unit tests.
pub fn now() -> DateTime<Utc> {
    day(2024, 12, 1)
}

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn invoice(
    id: &str,
    amount: f64,
    status: InvoiceStatus,
    week_id: &str,
    due_date: Option<DateTime<Utc>>,
) -> Invoice {
    Invoice {
        id: id.to_string(),
        supplier: format!("Supplier {}", id.to_uppercase()),
        invoice_number: format!("INV-{}", id),
        amount,
        subtotal: None,
        tax: None,
        issue_date: None,
        due_date,
        week_id: week_id.to_string(),
        status,
        category: InvoiceCategory::Other,
        source: InvoiceSource::Upload,
        notes: None,
        file_path: None,
        file_hash: None,
        confidence: None,
    }
}

/// Serves one canned HTTP response on an ephemeral local port. The handle
/// resolves to the raw request the server received.
pub async fn canned_http_server(
    status: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    use tokio::io::AsyncWriteExt;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (base, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    use tokio::io::AsyncReadExt;

    let mut received = Vec::new();
    let mut chunk = [0u8; 4096];
    while !request_complete(&received) {
        let read = socket.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        received.extend_from_slice(&chunk[..read]);
    }
    String::from_utf8_lossy(&received).to_string()
}

fn request_complete(received: &[u8]) -> bool {
    let Some(header_end) = received.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&received[..header_end]).to_ascii_lowercase();
    let body_len = received.len() - header_end - 4;
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok());
    match content_length {
        Some(expected) => body_len >= expected,
        None if headers.contains("transfer-encoding: chunked") => received.ends_with(b"0\r\n\r\n"),
        None => true,
    }
}
