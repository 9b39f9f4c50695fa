use std::future::Future;

use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::error;
use url::Url;

use crate::error::{Error, Result};
use crate::utils::a1::A1Range;

pub type Rows = Vec<Vec<JsonValue>>;

/// A tab requested at creation time.
#[derive(Debug, Clone, Serialize)]
pub struct TabSpec {
    pub title: String,
    pub row_count: u32,
    pub column_count: u32,
}

#[derive(Debug, Clone)]
pub struct NewSpreadsheet {
    pub title: String,
    pub tabs: Vec<TabSpec>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionRole {
    Reader,
    Commenter,
    #[default]
    Writer,
    Owner,
}

/// The subset of the Sheets and Drive APIs the synchronizer and export use.
pub trait SheetsApi: Send + Sync {
    /// Creates a document and returns its id.
    fn create_spreadsheet(&self, doc: &NewSpreadsheet) -> impl Future<Output = Result<String>> + Send;

    fn get_values(&self, spreadsheet_id: &str, range: &A1Range) -> impl Future<Output = Result<Rows>> + Send;

    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
        values: Rows,
    ) -> impl Future<Output = Result<()>> + Send;

    fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
        values: Rows,
    ) -> impl Future<Output = Result<()>> + Send;

    fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<JsonValue>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn add_permission(
        &self,
        spreadsheet_id: &str,
        email: &str,
        role: PermissionRole,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// REST client bound to one OAuth access token.
#[derive(Clone)]
pub struct GoogleSheetsClient {
    client: Client,
    sheets_base_url: String,
    drive_base_url: String,
    access_token: String,
}

#[derive(Deserialize)]
struct CreatedSpreadsheet {
    #[serde(rename = "spreadsheetId")]
    spreadsheet_id: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Rows,
}

impl GoogleSheetsClient {
    pub fn new(
        client: Client,
        sheets_base_url: impl Into<String>,
        drive_base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            sheets_base_url: sheets_base_url.into(),
            drive_base_url: drive_base_url.into(),
            access_token: access_token.into(),
        }
    }

    fn endpoint(&self, base: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(base)
            .map_err(|e| Error::Config(format!("Invalid provider base URL {}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Provider base URL cannot be a base: {}", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url> {
        self.endpoint(
            &self.sheets_base_url,
            &["v4", "spreadsheets", spreadsheet_id, "values", range],
        )
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.bearer_auth(&self.access_token).send().await.map_err(|e| {
            error!(operation, error = %e, "Sheets request failed");
            Error::Reqwest(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<JsonValue>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);
        error!(operation, status = status.as_u16(), %message, "Sheets provider error");
        Err(Error::Provider {
            status: status.as_u16(),
            message,
        })
    }
}

impl SheetsApi for GoogleSheetsClient {
    async fn create_spreadsheet(&self, doc: &NewSpreadsheet) -> Result<String> {
        let url = self.endpoint(&self.sheets_base_url, &["v4", "spreadsheets"])?;
        let sheets: Vec<JsonValue> = doc
            .tabs
            .iter()
            .map(|tab| {
                json!({
                    "properties": {
                        "title": tab.title,
                        "gridProperties": {
                            "rowCount": tab.row_count,
                            "columnCount": tab.column_count,
                        }
                    }
                })
            })
            .collect();

        let mut body = json!({ "properties": { "title": doc.title } });
        if !sheets.is_empty() {
            body["sheets"] = JsonValue::Array(sheets);
        }

        let response = self
            .send("spreadsheets.create", self.client.post(url).json(&body))
            .await?;
        let created: CreatedSpreadsheet = response.json().await?;
        Ok(created.spreadsheet_id)
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &A1Range) -> Result<Rows> {
        let url = self.values_url(spreadsheet_id, &range.to_string())?;
        let response = self
            .send("spreadsheets.values.get", self.client.get(url))
            .await?;
        let body: ValueRange = response.json().await?;
        Ok(body.values)
    }

    async fn update_values(&self, spreadsheet_id: &str, range: &A1Range, values: Rows) -> Result<()> {
        let range = range.to_string();
        let url = self.values_url(spreadsheet_id, &range)?;
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": values });
        self.send(
            "spreadsheets.values.update",
            self.client
                .put(url)
                .query(&[("valueInputOption", "RAW")])
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn append_values(&self, spreadsheet_id: &str, range: &A1Range, values: Rows) -> Result<()> {
        let url = self.values_url(spreadsheet_id, &format!("{}:append", range))?;
        let body = json!({ "majorDimension": "ROWS", "values": values });
        self.send(
            "spreadsheets.values.append",
            self.client
                .post(url)
                .query(&[("valueInputOption", "RAW")])
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<JsonValue>) -> Result<()> {
        let url = self.endpoint(
            &self.sheets_base_url,
            &["v4", "spreadsheets", &format!("{}:batchUpdate", spreadsheet_id)],
        )?;
        self.send(
            "spreadsheets.batchUpdate",
            self.client.post(url).json(&json!({ "requests": requests })),
        )
        .await?;
        Ok(())
    }

    async fn add_permission(&self, spreadsheet_id: &str, email: &str, role: PermissionRole) -> Result<()> {
        let url = self.endpoint(
            &self.drive_base_url,
            &["drive", "v3", "files", spreadsheet_id, "permissions"],
        )?;
        let body = json!({ "type": "user", "role": role, "emailAddress": email });
        self.send("drive.permissions.create", self.client.post(url).json(&body))
            .await?;
        Ok(())
    }
}
