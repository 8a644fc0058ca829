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

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::date::parse_record_date;
use crate::types::status::Status;

/// One attendance event: a student's status in one lesson hour on one day.
///
/// Serializes to the JSON body the sheet's append script expects.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct AttendanceRecord {
    /// The student's NISN. Never empty.
    #[serde(rename = "nisn")]
    pub student_id: String,
    #[serde(rename = "name")]
    pub student_name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(rename = "rombel")]
    pub group_name: String,
    #[serde(rename = "lessonHour")]
    pub lesson_hour: String,
    pub status: Status,
    /// The date as stored in the sheet, `dd/mm/yyyy`.
    pub date: String,
    /// Username of the teacher who submitted the record.
    #[serde(rename = "teacherUsername")]
    pub recorded_by: String,
}

impl AttendanceRecord {
    /// The record's calendar date, or the epoch if the stored text does not
    /// parse.
    pub fn parsed_date(&self) -> NaiveDate {
        parse_record_date(&self.date)
    }
}
