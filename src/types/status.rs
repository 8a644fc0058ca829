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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// The outcome recorded for one student in one lesson hour.
///
/// Serialized with the labels the attendance sheet uses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Hadir")]
    Present,
    #[serde(rename = "Izin")]
    ExcusedLeave,
    #[serde(rename = "Sakit")]
    Sick,
    #[serde(rename = "Alpa")]
    Absent,
}

impl Status {
    /// Every status, in the order the attendance form offers them.
    pub const ALL: [Status; 4] = [
        Status::Present,
        Status::ExcusedLeave,
        Status::Sick,
        Status::Absent,
    ];

    /// The sheet label.
    pub fn label(self) -> &'static str {
        match self {
            Status::Present => "Hadir",
            Status::ExcusedLeave => "Izin",
            Status::Sick => "Sakit",
            Status::Absent => "Alpa",
        }
    }

    /// The name shown in the web interface.
    pub fn display_name(self) -> &'static str {
        match self {
            Status::Present => "Present",
            Status::ExcusedLeave => "Excused",
            Status::Sick => "Sick",
            Status::Absent => "Absent",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Status::Present => "present",
            Status::ExcusedLeave => "excused",
            Status::Sick => "sick",
            Status::Absent => "absent",
        }
    }

    /// Read a status label coming from the sheet. Anything unrecognized is
    /// taken to mean the student was present.
    pub fn from_label_lenient(label: &str) -> Status {
        Status::try_from(label).unwrap_or(Status::Present)
    }
}

impl TryFrom<&str> for Status {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        for status in Status::ALL {
            if value.eq_ignore_ascii_case(status.label()) {
                return Ok(status);
            }
        }
        fail(format!("Invalid status: {value}"))
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
