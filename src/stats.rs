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

use serde::Serialize;

use crate::types::record::AttendanceRecord;
use crate::types::status::Status;

/// How many records carry each status.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub present: usize,
    pub excused_leave: usize,
    pub sick: usize,
    pub absent: usize,
}

impl StatusCounts {
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Present => self.present,
            Status::ExcusedLeave => self.excused_leave,
            Status::Sick => self.sick,
            Status::Absent => self.absent,
        }
    }

    pub fn sum(&self) -> usize {
        self.present + self.excused_leave + self.sick + self.absent
    }

    fn increment(&mut self, status: Status) {
        match status {
            Status::Present => self.present += 1,
            Status::ExcusedLeave => self.excused_leave += 1,
            Status::Sick => self.sick += 1,
            Status::Absent => self.absent += 1,
        }
    }
}

/// Aggregate statistics over a non-empty set of records.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub counts: StatusCounts,
    /// Percentage of records marked present, in `[0, 100]`.
    pub attendance_rate: f64,
}

impl Summary {
    /// The rate as shown to users, to one decimal place.
    pub fn rate_display(&self) -> String {
        format!("{:.1}%", self.attendance_rate)
    }

    /// Percentage of records carrying the given status.
    pub fn share(&self, status: Status) -> f64 {
        (self.counts.get(status) as f64 / self.total as f64) * 100.0
    }

    /// The share as shown to users, rounded to a whole percent.
    pub fn share_display(&self, status: Status) -> String {
        format!("{:.0}%", self.share(status))
    }
}

/// Summarize the records. There is no rate for an empty set, so this
/// returns `None` and the caller shows an empty state instead.
pub fn summarize<'a, I>(records: I) -> Option<Summary>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut counts = StatusCounts::default();
    let mut total: usize = 0;
    for record in records {
        counts.increment(record.status);
        total += 1;
    }
    if total == 0 {
        return None;
    }
    debug_assert_eq!(counts.sum(), total);
    let attendance_rate = (counts.present as f64 / total as f64) * 100.0;
    Some(Summary {
        total,
        counts,
        attendance_rate,
    })
}
