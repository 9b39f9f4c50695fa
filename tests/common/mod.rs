#![allow(dead_code)]
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use campusflow_backend::config::Config;
use campusflow_backend::error::{Error, Result};
use campusflow_backend::models::attendance::Student;
use campusflow_backend::models::event::Event;
use campusflow_backend::services::sheets_client::{NewSpreadsheet, PermissionRole, Rows, SheetsApi};
use campusflow_backend::utils::a1::A1Range;
use serde_json::{json, Value as JsonValue};

type Grid = Vec<Vec<JsonValue>>;

#[derive(Debug, Default)]
pub struct Document {
    pub title: String,
    pub tabs: HashMap<String, Grid>,
    pub requests: Vec<JsonValue>,
    pub permissions: Vec<(String, PermissionRole)>,
}

/// Spreadsheet provider kept in memory. Reads yield to the scheduler so
/// concurrent writers interleave the way they would over the network.
#[derive(Default)]
pub struct InMemorySheets {
    docs: Mutex<HashMap<String, Document>>,
    next_id: AtomicU32,
    fail_summary_writes: AtomicBool,
}

fn is_blank(v: &JsonValue) -> bool {
    matches!(v, JsonValue::Null) || v.as_str() == Some("")
}

impl InMemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_summary_writes(&self, fail: bool) {
        self.fail_summary_writes.store(fail, Ordering::SeqCst);
    }

    pub fn with_doc<T>(&self, id: &str, f: impl FnOnce(&Document) -> T) -> T {
        let docs = self.docs.lock().unwrap();
        f(docs.get(id).expect("unknown spreadsheet"))
    }

    /// Displayed value of one cell, "" when empty.
    pub fn cell(&self, id: &str, range: &str) -> JsonValue {
        let range = A1Range::parse(range).unwrap();
        self.with_doc(id, |doc| {
            doc.tabs
                .get(&range.sheet)
                .and_then(|grid| grid.get(range.first_row() as usize - 1))
                .and_then(|row| row.get(range.start.col as usize))
                .cloned()
                .unwrap_or(json!(""))
        })
    }

    pub fn row(&self, id: &str, sheet: &str, row: u32) -> Vec<JsonValue> {
        self.with_doc(id, |doc| {
            doc.tabs
                .get(sheet)
                .and_then(|grid| grid.get(row as usize - 1))
                .cloned()
                .unwrap_or_default()
        })
    }

    fn write(grid: &mut Grid, first_row: usize, first_col: usize, values: Rows) {
        for (r, cells) in values.into_iter().enumerate() {
            let row_idx = first_row + r;
            if grid.len() <= row_idx {
                grid.resize(row_idx + 1, Vec::new());
            }
            let row = &mut grid[row_idx];
            for (c, value) in cells.into_iter().enumerate() {
                let col_idx = first_col + c;
                if row.len() <= col_idx {
                    row.resize(col_idx + 1, json!(""));
                }
                row[col_idx] = value;
            }
        }
    }

    fn tab<'a>(&self, docs: &'a mut HashMap<String, Document>, id: &str, sheet: &str) -> Result<&'a mut Grid> {
        let doc = docs
            .get_mut(id)
            .ok_or_else(|| Error::Provider {
                status: 404,
                message: "Requested entity was not found.".into(),
            })?;
        doc.tabs.get_mut(sheet).ok_or_else(|| Error::Provider {
            status: 400,
            message: format!("Unable to parse range: {}", sheet),
        })
    }
}

impl SheetsApi for InMemorySheets {
    async fn create_spreadsheet(&self, doc: &NewSpreadsheet) -> Result<String> {
        let id = format!("sheet-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut tabs = HashMap::new();
        if doc.tabs.is_empty() {
            tabs.insert("Sheet1".to_string(), Grid::new());
        }
        for tab in &doc.tabs {
            tabs.insert(tab.title.clone(), Grid::new());
        }
        self.docs.lock().unwrap().insert(
            id.clone(),
            Document {
                title: doc.title.clone(),
                tabs,
                ..Default::default()
            },
        );
        Ok(id)
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &A1Range) -> Result<Rows> {
        tokio::task::yield_now().await;
        let mut docs = self.docs.lock().unwrap();
        let grid = self.tab(&mut docs, spreadsheet_id, &range.sheet)?;

        let first_row = range.first_row() as usize - 1;
        let last_row = range
            .last_row()
            .map(|r| r as usize)
            .unwrap_or(grid.len())
            .min(grid.len());
        let (first_col, last_col) = (range.start.col as usize, range.last_col() as usize);

        let mut rows: Rows = (first_row..last_row)
            .map(|r| {
                let mut cells: Vec<JsonValue> = (first_col..=last_col)
                    .map(|c| grid[r].get(c).cloned().unwrap_or(json!("")))
                    .collect();
                while cells.last().is_some_and(is_blank) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn update_values(&self, spreadsheet_id: &str, range: &A1Range, values: Rows) -> Result<()> {
        if range.sheet == "Summary" && self.fail_summary_writes.load(Ordering::SeqCst) {
            return Err(Error::Provider {
                status: 503,
                message: "The service is currently unavailable.".into(),
            });
        }
        let mut docs = self.docs.lock().unwrap();
        let grid = self.tab(&mut docs, spreadsheet_id, &range.sheet)?;
        Self::write(grid, range.first_row() as usize - 1, range.start.col as usize, values);
        Ok(())
    }

    /// Appends below the last non-empty row, like the provider's table detection.
    async fn append_values(&self, spreadsheet_id: &str, range: &A1Range, values: Rows) -> Result<()> {
        let mut docs = self.docs.lock().unwrap();
        let grid = self.tab(&mut docs, spreadsheet_id, &range.sheet)?;
        let filled = grid
            .iter()
            .rposition(|row| row.iter().any(|v| !is_blank(v)))
            .map(|i| i + 1)
            .unwrap_or(0);
        Self::write(grid, filled, range.start.col as usize, values);
        Ok(())
    }

    async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<JsonValue>) -> Result<()> {
        let mut docs = self.docs.lock().unwrap();
        let doc = docs.get_mut(spreadsheet_id).ok_or_else(|| Error::Provider {
            status: 404,
            message: "Requested entity was not found.".into(),
        })?;
        doc.requests.extend(requests);
        Ok(())
    }

    async fn add_permission(&self, spreadsheet_id: &str, email: &str, role: PermissionRole) -> Result<()> {
        let mut docs = self.docs.lock().unwrap();
        let doc = docs.get_mut(spreadsheet_id).ok_or_else(|| Error::Provider {
            status: 404,
            message: "File not found".into(),
        })?;
        doc.permissions.push((email.to_string(), role));
        Ok(())
    }
}

pub fn tech_fest() -> Event {
    serde_json::from_value(json!({
        "event_name": "Tech Fest",
        "event_type": "Technical",
        "start_date": "2024-03-01",
        "venue": "Main Auditorium"
    }))
    .unwrap()
}

pub fn student(prn: &str, name: &str) -> Student {
    Student {
        prn: prn.to_string(),
        full_name: name.to_string(),
        department: "CS".to_string(),
        year: "3".to_string(),
        division: "A".to_string(),
        remarks: None,
    }
}

pub const JWT_SECRET: &str = "test-jwt-secret";

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("SERVER_ADDRESS", "127.0.0.1:0"),
        ("SUPABASE_URL", "https://project.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon-key"),
        ("SUPABASE_JWT_SECRET", JWT_SECRET),
        ("API_RPS", "1000"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(move |name| vars.get(name).cloned()).expect("test config")
}
