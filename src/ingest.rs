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

//! Turning loosely-typed sheet rows into teachers, students, and attendance
//! records.
//!
//! Cells may be strings, numbers, booleans, or null. Every field is coerced
//! to a string, and a cell that is null, empty, zero, or `false` is treated
//! as missing, so the next alias for the same column is tried. Rows without
//! an identifier are dropped.

use chrono::NaiveDate;
use serde_json::Map;
use serde_json::Value;

use crate::types::date::format_record_date;
use crate::types::record::AttendanceRecord;
use crate::types::status::Status;
use crate::types::student::Student;
use crate::types::teacher::Teacher;

/// One sheet row, keyed by normalized column label.
pub type Row = Map<String, Value>;

const DEFAULT_TEACHER_NAME: &str = "Guru";

pub fn teachers_from_rows(rows: &[Row]) -> Vec<Teacher> {
    rows.iter()
        .map(|row| {
            let username = text(row, &["username", "user_name"]);
            let password = text(row, &["password"]);
            let name = field(row, &["nama", "name", "username"])
                .unwrap_or_else(|| DEFAULT_TEACHER_NAME.to_string())
                .trim()
                .to_string();
            Teacher {
                username,
                password,
                name,
            }
        })
        .filter(|t| !t.username.is_empty())
        .collect()
}

pub fn students_from_rows(rows: &[Row]) -> Vec<Student> {
    rows.iter()
        .map(|row| Student {
            student_id: text(row, &["nisn"]),
            name: text(row, &["nama", "name"]),
            class_name: text(row, &["kelas", "class"]),
            group_name: text(row, &["rombongan_belajar", "rombel", "group"]),
        })
        .filter(|s| !s.student_id.is_empty())
        .collect()
}

/// Attendance rows in newest-first order. The sheet appends, so this is the
/// reverse of the row order.
pub fn history_from_rows(rows: &[Row]) -> Vec<AttendanceRecord> {
    let mut records: Vec<AttendanceRecord> = rows
        .iter()
        .map(|row| AttendanceRecord {
            student_id: text(row, &["nisn"]),
            student_name: text(row, &["nama", "name"]),
            class_name: text(row, &["kelas", "class"]),
            group_name: text(row, &["rombongan_belajar", "rombel"]),
            lesson_hour: text(row, &["jam_pelajaran", "lesson_hour"]),
            status: field(row, &["status_kehadiran", "status"])
                .map(|label| Status::from_label_lenient(&label))
                .unwrap_or(Status::Present),
            date: normalize_date_cell(&text(row, &["tanggal", "date"])),
            recorded_by: text(row, &["username", "teacher_username"]),
        })
        .filter(|r| !r.student_id.is_empty())
        .collect();
    records.reverse();
    records
}

/// The first alias whose cell is present, trimmed. Empty if none is.
fn text(row: &Row, aliases: &[&str]) -> String {
    field(row, aliases)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn field(row: &Row, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|alias| row.get(*alias).and_then(cell_text))
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => b.then(|| "true".to_string()),
        Value::Number(n) => {
            let f = n.as_f64()?;
            if f == 0.0 {
                None
            } else if n.is_i64() || n.is_u64() {
                Some(n.to_string())
            } else if f.fract() == 0.0 {
                // Whole numbers arrive as floats, e.g. a NISN column.
                Some(format!("{f:.0}"))
            } else {
                Some(f.to_string())
            }
        }
        Value::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Date-typed cells come back as `Date(2024,2,15)` with a zero-based month.
/// Rewrite those as `dd/mm/yyyy`; leave everything else alone.
fn normalize_date_cell(text: &str) -> String {
    let Some(inner) = text
        .strip_prefix("Date(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return text.to_string();
    };
    let parts: Vec<i64> = inner
        .split(',')
        .map_while(|part| part.trim().parse().ok())
        .collect();
    if parts.len() < 3 {
        return text.to_string();
    }
    let date = i32::try_from(parts[0]).ok().and_then(|year| {
        let month = u32::try_from(parts[1] + 1).ok()?;
        let day = u32::try_from(parts[2]).ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    });
    match date {
        Some(date) => format_record_date(date),
        None => text.to_string(),
    }
}
