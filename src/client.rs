// File: ./src/client.rs
// Google Sheets v4 adapter implementing the row store boundary.
use crate::config::Config;
use crate::error::StoreError;
use crate::model::{Column, RowPosition, Task, TaskDraft, now_time_string};
use crate::store::RowStore;

use http::header::CONTENT_TYPE;
use http::{Method, Request, Uri};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use tower_http::auth::AddAuthorization;

type HttpsClient = AddAuthorization<
    Client<
        hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
        String,
    >,
>;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Clone, Debug)]
pub struct SheetsClient {
    http: HttpsClient,
    api_base: String,
    spreadsheet_id: String,
    sheet_name: String,
    timeout: Duration,
    // Numeric id of the worksheet, needed by batchUpdate. Looked up once.
    sheet_gid: Arc<OnceCell<i64>>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

impl SheetsClient {
    pub fn new(config: &Config) -> Result<Self, String> {
        if config.spreadsheet_id.is_empty() {
            return Err("No spreadsheet_id configured.".to_string());
        }

        let api_base = config.api_base.trim_end_matches('/').to_string();
        let base_uri: Uri = api_base
            .parse()
            .map_err(|e: http::uri::InvalidUri| e.to_string())?;

        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);

        // Plain http endpoints (local proxies, test servers) don't need roots.
        if root_store.is_empty() && base_uri.scheme_str() != Some("http") {
            return Err("No valid system certificates found.".to_string());
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http_client = Client::builder(TokioExecutor::new()).build(https_connector);
        let auth_client = AddAuthorization::bearer(http_client, &config.access_token);

        Ok(Self {
            http: auth_client,
            api_base,
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
            sheet_gid: Arc::new(OnceCell::new()),
        })
    }

    // --- URL HELPERS ---

    /// A1 range on our worksheet, quoted so names with spaces work.
    fn a1(&self, cells: &str) -> String {
        format!("'{}'!{}", self.sheet_name.replace('\'', "''"), cells)
    }

    fn values_url(&self, range: &str, query: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}",
            self.api_base,
            self.spreadsheet_id,
            encode_component(range),
            query
        )
    }

    fn batch_update_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.api_base, self.spreadsheet_id
        )
    }

    // --- TRANSPORT ---

    async fn send(&self, method: Method, url: &str, body: Option<Value>) -> Result<Value, StoreError> {
        let uri: Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| StoreError::unavailable(e.to_string()))?;
        let payload = body.map(|b| b.to_string()).unwrap_or_default();

        let request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.http.clone().oneshot(request))
            .await
            .map_err(|_| StoreError::unavailable(format!("{} timed out", method)))?
            .map_err(|e| StoreError::unavailable(format!("{} failed: {}", method, e)))?;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| StoreError::unavailable(format!("Body Error: {}", e)))?
            .to_bytes();

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            tracing::warn!(%status, %method, "sheets request rejected");
            return Err(StoreError::unavailable(format!("HTTP {}: {}", status, text.trim())));
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| StoreError::unavailable(format!("Decode: {}", e)))
    }

    async fn batch_update(&self, requests: Value) -> Result<(), StoreError> {
        let url = self.batch_update_url();
        self.send(Method::POST, &url, Some(json!({ "requests": requests })))
            .await
            .map(|_| ())
    }

    async fn sheet_gid(&self) -> Result<i64, StoreError> {
        self.sheet_gid
            .get_or_try_init(|| async {
                let url = format!(
                    "{}/v4/spreadsheets/{}?fields={}",
                    self.api_base,
                    self.spreadsheet_id,
                    encode_component("sheets.properties(sheetId,title)")
                );
                let raw = self.send(Method::GET, &url, None).await?;
                let meta: SpreadsheetMeta = serde_json::from_value(raw)
                    .map_err(|e| StoreError::unavailable(format!("Decode: {}", e)))?;
                meta.sheets
                    .into_iter()
                    .find(|s| s.properties.title == self.sheet_name)
                    .map(|s| s.properties.sheet_id)
                    .ok_or_else(|| {
                        StoreError::unavailable(format!("No worksheet named '{}'", self.sheet_name))
                    })
            })
            .await
            .copied()
    }
}

impl RowStore for SheetsClient {
    async fn read_all(&self) -> Result<Vec<Task>, StoreError> {
        let url = self.values_url(&self.a1("A2:F"), "");
        let raw = self.send(Method::GET, &url, None).await?;
        let range: ValueRange = serde_json::from_value(raw)
            .map_err(|e| StoreError::unavailable(format!("Decode: {}", e)))?;

        let tasks: Vec<Task> = range
            .values
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.iter().map(cell_to_string).collect();
                Task::from_row(&cells)
            })
            .collect();
        tracing::debug!(rows = tasks.len(), "read sheet");
        Ok(tasks)
    }

    async fn insert_at_head(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let gid = self.sheet_gid().await?;
        let task = draft.clone().into_task(now_time_string());

        let cells: Vec<Value> = task
            .to_row()
            .into_iter()
            .map(|c| json!({ "userEnteredValue": { "stringValue": c } }))
            .collect();

        // One batch so a failed write can't leave an empty row behind.
        let requests = json!([
            {
                "insertDimension": {
                    "range": { "sheetId": gid, "dimension": "ROWS", "startIndex": 1, "endIndex": 2 },
                    "inheritFromBefore": false
                }
            },
            {
                "updateCells": {
                    "start": { "sheetId": gid, "rowIndex": 1, "columnIndex": 0 },
                    "rows": [ { "values": cells } ],
                    "fields": "userEnteredValue"
                }
            }
        ]);
        self.batch_update(requests).await?;
        tracing::info!(task = %task.task, date = %task.date, "inserted row");
        Ok(task)
    }

    async fn update_cell(
        &self,
        pos: RowPosition,
        column: Column,
        value: &str,
    ) -> Result<(), StoreError> {
        let range = self.a1(&format!("{}{}", column.letter(), pos.sheet_row()));
        let url = self.values_url(&range, "?valueInputOption=RAW");
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": [[value]] });
        self.send(Method::PUT, &url, Some(body)).await?;
        tracing::info!(%pos, column = column.header(), "updated cell");
        Ok(())
    }

    async fn delete_row(&self, pos: RowPosition) -> Result<(), StoreError> {
        let gid = self.sheet_gid().await?;
        let start = pos.sheet_row() - 1;
        let requests = json!([
            {
                "deleteDimension": {
                    "range": { "sheetId": gid, "dimension": "ROWS", "startIndex": start, "endIndex": start + 1 }
                }
            }
        ]);
        self.batch_update(requests).await?;
        tracing::info!(%pos, "deleted row");
        Ok(())
    }
}

fn cell_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Percent-encodes a path or query component, keeping A1 punctuation readable.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'!' | b':' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_sheet_ranges() {
        assert_eq!(encode_component("'Sheet1'!A2:F"), "%27Sheet1%27!A2:F");
        assert_eq!(encode_component("'My Tasks'!C5"), "%27My%20Tasks%27!C5");
    }

    #[test]
    fn non_string_cells_are_stringified() {
        assert_eq!(cell_to_string(&json!("a")), "a");
        assert_eq!(cell_to_string(&json!(12)), "12");
        assert_eq!(cell_to_string(&Value::Null), "");
    }

    #[test]
    fn requires_spreadsheet_id() {
        let config = Config::default();
        assert!(SheetsClient::new(&config).is_err());
    }
}
