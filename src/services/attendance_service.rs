use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{json, Value as JsonValue};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::models::attendance::{
    cell_text, AttendanceRow, AttendanceStatus, CheckIn, CheckOut, SheetHandle, Statistics,
    StatisticsOutcome, Student,
};
use crate::models::event::Event;
use crate::services::sheet_requests::{auto_resize_columns, header_band, HEADER_BLUE, SUMMARY_GREEN};
use crate::services::sheets_client::{NewSpreadsheet, PermissionRole, SheetsApi, TabSpec};
use crate::utils::a1::A1Range;
use crate::utils::time;

pub const ATTENDANCE_SHEET: &str = "Attendance";
pub const SUMMARY_SHEET: &str = "Summary";

pub const ATTENDANCE_HEADERS: [&str; 10] = [
    "Sr. No.",
    "PRN",
    "Student Name",
    "Department",
    "Year",
    "Division",
    "Check-in Time",
    "Check-out Time",
    "Status",
    "Remarks",
];

const ATTENDANCE_SHEET_ID: i64 = 0;
const SUMMARY_SHEET_ID: i64 = 1;

const COL_SERIAL: u32 = 0;
const COL_PRN: u32 = 1;
const COL_CHECK_OUT: u32 = 7;
const COL_STATUS: u32 = 8;
const COL_LAST: u32 = 9;

// Summary tab, column B
const SUMMARY_VALUE_COL: u32 = 1;
const STATS_FIRST_ROW: u32 = 8;
const STATS_LAST_ROW: u32 = 11;

type LockMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// One async mutex per spreadsheet; mutations of the same sheet run one at a time.
/// An entry lives only while some caller holds or waits for it.
#[derive(Clone, Default)]
pub struct WriterLocks {
    inner: LockMap,
}

/// Exclusive access to one spreadsheet until dropped.
pub struct WriterGuard {
    guard: Option<OwnedMutexGuard<()>>,
    spreadsheet_id: String,
    map: LockMap,
}

impl WriterLocks {
    pub async fn acquire(&self, spreadsheet_id: &str) -> WriterGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(spreadsheet_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        WriterGuard {
            guard: Some(lock.lock_owned().await),
            spreadsheet_id: spreadsheet_id.to_string(),
            map: self.inner.clone(),
        }
    }

    /// Spreadsheets currently locked or awaited.
    pub fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for WriterGuard {
    fn drop(&mut self) {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        self.guard.take();
        // the map holds the last reference once no other caller cloned it
        if map
            .get(&self.spreadsheet_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.spreadsheet_id);
        }
    }
}

#[derive(Clone, Default)]
pub struct AttendanceService {
    locks: WriterLocks,
}

fn summary_block(event: &Event) -> Vec<Vec<JsonValue>> {
    vec![
        vec![json!("Event Details")],
        vec![json!("Event Name"), json!(event.event_name)],
        vec![json!("Event Type"), json!(event.event_type)],
        vec![json!("Date"), json!(event.start_date)],
        vec![json!("Venue"), json!(event.venue)],
        vec![json!("")],
        vec![json!("Statistics")],
        vec![json!("Total Registered"), json!("0")],
        vec![json!("Present"), json!("0")],
        vec![json!("Absent"), json!("0")],
        vec![json!("Attendance Rate"), json!("0%")],
    ]
}

impl AttendanceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spreadsheets with a mutation in flight.
    pub fn active_writers(&self) -> usize {
        self.locks.tracked()
    }

    /// Creates the two-tab attendance document for an event and lays out its headers.
    pub async fn create_sheet<C: SheetsApi>(&self, client: &C, event: &Event) -> Result<SheetHandle> {
        let doc = NewSpreadsheet {
            title: format!(
                "{} - Attendance - {}",
                event.event_name,
                time::sheet_date(&time::now())
            ),
            tabs: vec![
                TabSpec {
                    title: ATTENDANCE_SHEET.to_string(),
                    row_count: 1000,
                    column_count: 10,
                },
                TabSpec {
                    title: SUMMARY_SHEET.to_string(),
                    row_count: 100,
                    column_count: 5,
                },
            ],
        };

        let spreadsheet_id = client.create_spreadsheet(&doc).await.map_err(|e| {
            error!(event = %event.event_name, error = %e, "Error creating attendance sheet");
            e
        })?;
        let handle = SheetHandle::from_id(spreadsheet_id);

        self.setup_headers(client, &handle, event).await.map_err(|e| {
            error!(spreadsheet_id = %handle.spreadsheet_id, error = %e, "Error setting up headers");
            e
        })?;

        info!(spreadsheet_id = %handle.spreadsheet_id, event = %event.event_name, "Attendance sheet created");
        Ok(handle)
    }

    async fn setup_headers<C: SheetsApi>(&self, client: &C, handle: &SheetHandle, event: &Event) -> Result<()> {
        let id = handle.spreadsheet_id.as_str();
        let headers = vec![ATTENDANCE_HEADERS.iter().map(|h| json!(h)).collect::<Vec<_>>()];

        client
            .update_values(id, &A1Range::row_span(ATTENDANCE_SHEET, 1, 0, COL_LAST), headers)
            .await?;
        client
            .batch_update(
                id,
                vec![
                    header_band(ATTENDANCE_SHEET_ID, 0, HEADER_BLUE, 11, true),
                    auto_resize_columns(ATTENDANCE_SHEET_ID, 0, ATTENDANCE_HEADERS.len() as u32),
                ],
            )
            .await?;
        client
            .update_values(id, &A1Range::block(SUMMARY_SHEET, 0, 1, 1, 11), summary_block(event))
            .await?;
        client
            .batch_update(
                id,
                vec![
                    header_band(SUMMARY_SHEET_ID, 0, SUMMARY_GREEN, 12, false),
                    header_band(SUMMARY_SHEET_ID, 6, SUMMARY_GREEN, 12, false),
                ],
            )
            .await?;
        Ok(())
    }

    /// Appends a "Present" row for the student. Repeated calls add repeated rows.
    pub async fn mark_check_in<C: SheetsApi>(
        &self,
        client: &C,
        handle: &SheetHandle,
        student: &Student,
    ) -> Result<CheckIn> {
        let id = handle.spreadsheet_id.as_str();
        let _writer = self.locks.acquire(id).await;

        let existing = client
            .get_values(id, &A1Range::column(ATTENDANCE_SHEET, COL_SERIAL))
            .await
            .map_err(|e| {
                error!(spreadsheet_id = id, error = %e, "Error marking attendance");
                e
            })?;
        let next_row = if existing.is_empty() {
            2
        } else {
            existing.len() as u32 + 1
        };
        let serial = next_row - 1;
        let checked_in_at = time::sheet_timestamp(time::now());

        let row = vec![vec![
            json!(serial),
            json!(student.prn),
            json!(student.full_name),
            json!(student.department),
            json!(student.year),
            json!(student.division),
            json!(checked_in_at),
            json!(""),
            json!(AttendanceStatus::Present.as_str()),
            json!(student.remarks.clone().unwrap_or_default()),
        ]];

        client
            .append_values(id, &A1Range::row_span(ATTENDANCE_SHEET, next_row, 0, COL_LAST), row)
            .await
            .map_err(|e| {
                error!(spreadsheet_id = id, error = %e, "Error marking attendance");
                e
            })?;
        info!(spreadsheet_id = id, prn = %student.prn, row = next_row, "Attendance marked");

        let statistics = self.refresh_statistics(client, handle).await;

        Ok(CheckIn {
            row: next_row,
            serial,
            checked_in_at,
            statistics,
        })
    }

    /// Stamps the check-out time on the first row holding `prn`.
    pub async fn mark_check_out<C: SheetsApi>(&self, client: &C, handle: &SheetHandle, prn: &str) -> Result<CheckOut> {
        let id = handle.spreadsheet_id.as_str();
        let _writer = self.locks.acquire(id).await;

        let rows = client
            .get_values(id, &A1Range::columns(ATTENDANCE_SHEET, COL_PRN, COL_CHECK_OUT))
            .await
            .map_err(|e| {
                error!(spreadsheet_id = id, error = %e, "Error marking check-out");
                e
            })?;

        let row = rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, cells)| cells.first().map(cell_text).as_deref() == Some(prn))
            .map(|(idx, _)| idx as u32 + 1)
            .ok_or_else(|| Error::NotFound("Student not found in attendance sheet".to_string()))?;

        let checked_out_at = time::sheet_timestamp(time::now());
        client
            .update_values(
                id,
                &A1Range::cell(ATTENDANCE_SHEET, COL_CHECK_OUT, row),
                vec![vec![json!(checked_out_at)]],
            )
            .await
            .map_err(|e| {
                error!(spreadsheet_id = id, error = %e, "Error marking check-out");
                e
            })?;
        info!(spreadsheet_id = id, prn, row, "Check-out recorded");

        Ok(CheckOut { row, checked_out_at })
    }

    /// Recounts the status column and overwrites the four summary cells.
    pub async fn recompute_statistics<C: SheetsApi>(&self, client: &C, handle: &SheetHandle) -> Result<Statistics> {
        let _writer = self.locks.acquire(&handle.spreadsheet_id).await;
        self.write_statistics(client, handle).await
    }

    // Caller must hold the writer lock for `handle`.
    async fn write_statistics<C: SheetsApi>(&self, client: &C, handle: &SheetHandle) -> Result<Statistics> {
        let id = handle.spreadsheet_id.as_str();
        let statuses = client
            .get_values(id, &A1Range::column(ATTENDANCE_SHEET, COL_STATUS))
            .await?;
        let stats = Statistics::from_status_column(&statuses);

        client
            .update_values(
                id,
                &A1Range::block(
                    SUMMARY_SHEET,
                    SUMMARY_VALUE_COL,
                    STATS_FIRST_ROW,
                    SUMMARY_VALUE_COL,
                    STATS_LAST_ROW,
                ),
                vec![
                    vec![json!(stats.total)],
                    vec![json!(stats.present)],
                    vec![json!(stats.absent)],
                    vec![json!(stats.rate_label())],
                ],
            )
            .await?;
        Ok(stats)
    }

    /// Best-effort recomputation run under a check-in's writer lock: failures are
    /// logged and reported, never raised.
    async fn refresh_statistics<C: SheetsApi>(&self, client: &C, handle: &SheetHandle) -> StatisticsOutcome {
        match self.write_statistics(client, handle).await {
            Ok(stats) => StatisticsOutcome::Updated(stats),
            Err(e) => {
                warn!(spreadsheet_id = %handle.spreadsheet_id, error = %e, "Error updating statistics");
                StatisticsOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub async fn attendance_rows<C: SheetsApi>(&self, client: &C, handle: &SheetHandle) -> Result<Vec<AttendanceRow>> {
        let rows = client
            .get_values(
                &handle.spreadsheet_id,
                &A1Range::open_rows(ATTENDANCE_SHEET, 0, 2, COL_LAST),
            )
            .await
            .map_err(|e| {
                error!(spreadsheet_id = %handle.spreadsheet_id, error = %e, "Error getting attendance data");
                e
            })?;
        Ok(rows.iter().map(|cells| AttendanceRow::from_cells(cells)).collect())
    }

    /// Grants each address access in turn; the first failure stops the rest.
    pub async fn share<C: SheetsApi>(
        &self,
        client: &C,
        handle: &SheetHandle,
        emails: &[String],
        role: PermissionRole,
    ) -> Result<()> {
        for email in emails {
            client
                .add_permission(&handle.spreadsheet_id, email, role)
                .await
                .map_err(|e| {
                    error!(spreadsheet_id = %handle.spreadsheet_id, email = %email, error = %e, "Error sharing spreadsheet");
                    e
                })?;
        }
        info!(spreadsheet_id = %handle.spreadsheet_id, count = emails.len(), "Spreadsheet shared");
        Ok(())
    }
}
