use chrono::{DateTime, Local, Utc};

pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Timestamp written into check-in and check-out cells.
pub fn sheet_timestamp(at: DateTime<Local>) -> String {
    at.format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// Date used in document titles and exported submission dates.
pub fn sheet_date<Tz: chrono::TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%d/%m/%Y").to_string()
}

pub fn local_date(at: DateTime<Utc>) -> String {
    sheet_date(&at.with_timezone(&Local))
}
