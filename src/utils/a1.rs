//! A1 notation ranges as used by the Sheets values API.
//!
//! Supports the shapes the service writes and reads: whole columns
//! (`Attendance!A:A`), row spans (`Attendance!A5:J5`), single cells
//! (`Summary!B8`) and open-ended blocks (`Attendance!A2:J`).

use std::fmt;

use crate::error::{Error, Result};

/// Zero-based column, optional one-based row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub col: u32,
    pub row: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub start: CellRef,
    pub end: Option<CellRef>,
}

impl A1Range {
    pub fn cell(sheet: &str, col: u32, row: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            start: CellRef { col, row: Some(row) },
            end: None,
        }
    }

    pub fn column(sheet: &str, col: u32) -> Self {
        Self::columns(sheet, col, col)
    }

    pub fn columns(sheet: &str, first: u32, last: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            start: CellRef { col: first, row: None },
            end: Some(CellRef { col: last, row: None }),
        }
    }

    pub fn block(sheet: &str, first_col: u32, first_row: u32, last_col: u32, last_row: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            start: CellRef {
                col: first_col,
                row: Some(first_row),
            },
            end: Some(CellRef {
                col: last_col,
                row: Some(last_row),
            }),
        }
    }

    pub fn row_span(sheet: &str, row: u32, first_col: u32, last_col: u32) -> Self {
        Self::block(sheet, first_col, row, last_col, row)
    }

    /// From `first_row` down to the last populated row.
    pub fn open_rows(sheet: &str, first_col: u32, first_row: u32, last_col: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            start: CellRef {
                col: first_col,
                row: Some(first_row),
            },
            end: Some(CellRef {
                col: last_col,
                row: None,
            }),
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let (sheet, cells) = input
            .rsplit_once('!')
            .ok_or_else(|| Error::BadRequest(format!("Range without sheet name: {}", input)))?;
        let sheet = sheet.trim_matches('\'');
        if sheet.is_empty() {
            return Err(Error::BadRequest(format!("Range without sheet name: {}", input)));
        }

        let (start, end) = match cells.split_once(':') {
            Some((a, b)) => (parse_cell(a)?, Some(parse_cell(b)?)),
            None => (parse_cell(cells)?, None),
        };

        Ok(Self {
            sheet: sheet.to_string(),
            start,
            end,
        })
    }

    /// Last column covered by the range.
    pub fn last_col(&self) -> u32 {
        self.end.map(|e| e.col).unwrap_or(self.start.col)
    }

    /// First row covered, 1 when the range starts at a bare column.
    pub fn first_row(&self) -> u32 {
        self.start.row.unwrap_or(1)
    }

    /// Last row covered, `None` when the range runs to the end of the sheet.
    pub fn last_row(&self) -> Option<u32> {
        match self.end {
            Some(end) => end.row,
            None => self.start.row,
        }
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, format_cell(&self.start))?;
        if let Some(end) = &self.end {
            write!(f, ":{}", format_cell(end))?;
        }
        Ok(())
    }
}

fn format_cell(cell: &CellRef) -> String {
    match cell.row {
        Some(row) => format!("{}{}", column_letters(cell.col), row),
        None => column_letters(cell.col),
    }
}

fn parse_cell(raw: &str) -> Result<CellRef> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (letters, digits) = raw.split_at(split);

    let col = column_index(letters)
        .ok_or_else(|| Error::BadRequest(format!("Invalid cell reference: {}", raw)))?;
    let row = if digits.is_empty() {
        None
    } else {
        match digits.parse::<u32>() {
            Ok(r) if r > 0 => Some(r),
            _ => return Err(Error::BadRequest(format!("Invalid cell reference: {}", raw))),
        }
    };

    Ok(CellRef { col, row })
}

/// `0 -> "A"`, `25 -> "Z"`, `26 -> "AA"`.
pub fn column_letters(index: u32) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let n = letters.chars().try_fold(0u32, |acc, c| {
        acc.checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
    })?;
    Some(n - 1)
}
