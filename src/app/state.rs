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

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::app::session::Session;
use crate::ingest::history_from_rows;
use crate::sheets::SheetClient;
use crate::summary::GeminiClient;
use crate::types::record::AttendanceRecord;
use crate::types::student::Student;
use crate::types::teacher::Teacher;

#[derive(Clone)]
pub struct ServerState {
    pub sheets: SheetClient,
    pub summarizer: GeminiClient,
    /// Name of the sheet attendance is read from.
    pub attendance_sheet: String,
    pub mutable: Arc<Mutex<MutableState>>,
}

pub struct MutableState {
    pub teachers: Vec<Teacher>,
    pub students: Vec<Student>,
    /// Attendance records, newest first.
    pub history: Vec<AttendanceRecord>,
    /// Whether the history has been fetched from the sheet at least once.
    pub history_loaded: bool,
    /// Logged-in teachers, by session token.
    pub sessions: HashMap<String, Session>,
}

impl ServerState {
    /// Lock the mutable state. Never hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, MutableState> {
        self.mutable.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the attendance history if it has not been loaded yet. Records
    /// submitted before the first load stay in front of the fetched copy
    /// unless the sheet already has them.
    pub async fn ensure_history(&self) {
        if self.lock().history_loaded {
            return;
        }
        let records = self.fetch_history().await;
        let mut mutable = self.lock();
        if !mutable.history_loaded {
            let pending = std::mem::take(&mut mutable.history);
            mutable.history = first_load(pending, records);
            mutable.history_loaded = true;
        }
    }

    /// Replace the in-memory history with a fresh copy of the sheet.
    pub async fn refresh_history(&self) {
        let records = self.fetch_history().await;
        let mut mutable = self.lock();
        mutable.history = records;
        mutable.history_loaded = true;
    }

    async fn fetch_history(&self) -> Vec<AttendanceRecord> {
        log::debug!("Loading attendance history...");
        let rows = self.sheets.fetch_rows(&self.attendance_sheet).await;
        let records = history_from_rows(&rows);
        log::debug!("Loaded {} attendance records.", records.len());
        records
    }
}

/// Combine records merged before the first load with the fetched history.
fn first_load(
    pending: Vec<AttendanceRecord>,
    fetched: Vec<AttendanceRecord>,
) -> Vec<AttendanceRecord> {
    let mut history: Vec<AttendanceRecord> = pending
        .into_iter()
        .filter(|record| !fetched.contains(record))
        .collect();
    history.extend(fetched);
    history
}
