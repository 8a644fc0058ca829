// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The spreadsheet gateway: reading sheets through the visualization API,
//! and appending attendance rows through the Apps Script endpoint.

use std::future::Future;
use std::time::Duration;

use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;

use crate::config::Config;
use crate::error::Fallible;
use crate::error::fail;
use crate::ingest::Row;
use crate::types::record::AttendanceRecord;

/// Something that can durably store one attendance record.
///
/// Failures are reported as `false`, never as errors.
pub trait RecordWriter {
    fn write(&self, record: &AttendanceRecord) -> impl Future<Output = bool> + Send;
}

#[derive(Clone)]
pub struct SheetClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    write_url: Option<String>,
    simulated_write_delay: Duration,
}

impl SheetClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.sheets_base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            write_url: config.write_url().map(str::to_string),
            simulated_write_delay: Duration::from_millis(config.simulated_write_delay_ms),
        }
    }

    pub fn sheet_url(&self, sheet: &str) -> String {
        format!(
            "{}/{}/gviz/tq?tqx=out:json&sheet={}",
            self.base_url,
            self.spreadsheet_id,
            utf8_percent_encode(sheet, NON_ALPHANUMERIC)
        )
    }

    /// Fetch every row of a sheet. Any failure is logged and yields no rows.
    pub async fn fetch_rows(&self, sheet: &str) -> Vec<Row> {
        match self.try_fetch_rows(sheet).await {
            Ok(rows) => {
                log::debug!("Fetched {} rows from sheet '{sheet}'.", rows.len());
                rows
            }
            Err(e) => {
                log::error!("Error fetching sheet '{sheet}': {e}");
                Vec::new()
            }
        }
    }

    async fn try_fetch_rows(&self, sheet: &str) -> Fallible<Vec<Row>> {
        let response = self.http.get(self.sheet_url(sheet)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return fail(format!("sheet request returned {status}"));
        }
        let body = response.text().await?;
        parse_gviz(&body)
    }
}

impl RecordWriter for SheetClient {
    async fn write(&self, record: &AttendanceRecord) -> bool {
        let Some(url) = &self.write_url else {
            log::warn!("No write_url configured. Simulating a successful write.");
            sleep(self.simulated_write_delay).await;
            return true;
        };
        match self.http.post(url).json(record).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                log::error!(
                    "Error submitting attendance for {}: status {}",
                    record.student_id,
                    response.status()
                );
                false
            }
            Err(e) => {
                log::error!(
                    "Error submitting attendance for {}: {e}",
                    record.student_id
                );
                false
            }
        }
    }
}

#[derive(Deserialize)]
struct GvizResponse {
    table: GvizTable,
}

#[derive(Deserialize)]
struct GvizTable {
    #[serde(default)]
    cols: Vec<GvizColumn>,
    #[serde(default)]
    rows: Vec<GvizRow>,
}

#[derive(Deserialize)]
struct GvizColumn {
    #[serde(default)]
    label: String,
}

#[derive(Deserialize)]
struct GvizRow {
    #[serde(default)]
    c: Vec<Option<GvizCell>>,
}

#[derive(Deserialize)]
struct GvizCell {
    #[serde(default)]
    v: Value,
}

/// Parse a visualization API response. The JSON payload is wrapped in a
/// JavaScript callback, e.g. `setResponse({...});`.
pub fn parse_gviz(body: &str) -> Fallible<Vec<Row>> {
    let start = body.find('(');
    let end = body.rfind(')');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &body[start + 1..end],
        _ => return fail("response is not a visualization API payload"),
    };
    let response: GvizResponse = serde_json::from_str(json)?;
    let keys: Vec<String> = response
        .table
        .cols
        .iter()
        .enumerate()
        .map(|(i, col)| column_key(&col.label, i))
        .collect();
    let rows = response
        .table
        .rows
        .into_iter()
        .map(|row| {
            row.c
                .into_iter()
                .enumerate()
                .map(|(i, cell)| {
                    let key = keys.get(i).cloned().unwrap_or_else(|| format!("col_{i}"));
                    let value = cell.map(|cell| cell.v).unwrap_or(Value::Null);
                    (key, value)
                })
                .collect::<Row>()
        })
        .collect();
    Ok(rows)
}

/// Column labels are lowercased with spaces turned into underscores.
/// Unlabelled columns are keyed by position.
fn column_key(label: &str, index: usize) -> String {
    let key = label.to_lowercase().replace(' ', "_");
    if key.is_empty() {
        format!("col_{index}")
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"/*O_o*/
google.visualization.Query.setResponse({"version":"0.6","reqId":"0","status":"ok","table":{"cols":[{"id":"A","label":"NISN","type":"number"},{"id":"B","label":"Nama","type":"string"},{"id":"C","label":"Rombongan Belajar","type":"string"},{"id":"D","label":"","type":"string"}],"rows":[{"c":[{"v":12345.0,"f":"12345"},{"v":"Siti (X)"},null,{"v":"extra"}]},{"c":[{"v":678.0},{"v":"Agus"},{"v":"X-2"}]}],"parsedNumHeaders":1}});"#;

    #[test]
    fn test_parse_gviz() -> Fallible<()> {
        let rows = parse_gviz(PAYLOAD)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("nisn"), Some(&serde_json::json!(12345.0)));
        assert_eq!(rows[0].get("nama"), Some(&serde_json::json!("Siti (X)")));
        assert_eq!(rows[0].get("rombongan_belajar"), Some(&Value::Null));
        assert_eq!(rows[0].get("col_3"), Some(&serde_json::json!("extra")));
        assert_eq!(rows[1].get("rombongan_belajar"), Some(&serde_json::json!("X-2")));
        Ok(())
    }

    #[test]
    fn test_parse_gviz_garbage() {
        assert!(parse_gviz("").is_err());
        assert!(parse_gviz("<html>Sign in</html>").is_err());
        assert!(parse_gviz("setResponse({\"status\":\"error\"});").is_err());
    }

    #[test]
    fn test_sheet_url() -> Fallible<()> {
        let config = Config::from_toml(
            "spreadsheet_id = \"abc\"\nsheets_base_url = \"http://localhost:1234/d/\"",
        )?;
        let client = SheetClient::new(&config);
        assert_eq!(
            client.sheet_url("Data Guru"),
            "http://localhost:1234/d/abc/gviz/tq?tqx=out:json&sheet=Data%20Guru"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_simulated_write() -> Fallible<()> {
        let config = Config::from_toml("spreadsheet_id = \"abc\"\nsimulated_write_delay_ms = 0")?;
        let client = SheetClient::new(&config);
        let record = AttendanceRecord {
            student_id: "1".to_string(),
            student_name: "A".to_string(),
            class_name: "X".to_string(),
            group_name: "X-1".to_string(),
            lesson_hour: "1".to_string(),
            status: crate::types::status::Status::Present,
            date: "15/03/2024".to_string(),
            recorded_by: "budi".to_string(),
        };
        assert!(client.write(&record).await);
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_sheet_yields_no_rows() -> Fallible<()> {
        let port = portpicker::pick_unused_port().unwrap();
        let config = Config::from_toml(&format!(
            "spreadsheet_id = \"abc\"\nsheets_base_url = \"http://127.0.0.1:{port}\""
        ))?;
        let client = SheetClient::new(&config);
        assert!(client.fetch_rows("Data Guru").await.is_empty());
        Ok(())
    }
}
