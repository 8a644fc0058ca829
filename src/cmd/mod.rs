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

pub mod export;
pub mod stats;

use clap::Args;

use crate::config::Config;
use crate::error::Fallible;
use crate::error::fail;
use crate::filter::ALL;
use crate::filter::FilterCriteria;
use crate::filter::Period;
use crate::ingest::history_from_rows;
use crate::sheets::SheetClient;
use crate::types::date::parse_input_date;
use crate::types::record::AttendanceRecord;

/// History filters shared by the reporting commands.
#[derive(Args, Clone, Debug)]
pub struct FilterArgs {
    /// Only include this class.
    #[arg(long, default_value = ALL)]
    pub class: String,
    /// Only include this group.
    #[arg(long, default_value = ALL)]
    pub group: String,
    /// Free-text search over name, NISN, class, and date.
    #[arg(long, default_value = "")]
    pub search: String,
    /// Date range preset.
    #[arg(long, value_enum, default_value_t = Period::All)]
    pub period: Period,
    /// Start of a custom range, as yyyy-mm-dd.
    #[arg(long)]
    pub from: Option<String>,
    /// End of a custom range, as yyyy-mm-dd.
    #[arg(long)]
    pub to: Option<String>,
}

impl FilterArgs {
    pub fn criteria(&self) -> Fallible<FilterCriteria> {
        Ok(FilterCriteria {
            class: self.class.clone(),
            group: self.group.clone(),
            search: self.search.clone(),
            period: self.period,
            range_start: parse_flag_date("--from", self.from.as_deref())?,
            range_end: parse_flag_date("--to", self.to.as_deref())?,
        })
    }
}

/// Unlike the date pickers, a malformed date on the command line is an
/// error rather than "no date".
fn parse_flag_date(flag: &str, value: Option<&str>) -> Fallible<Option<chrono::NaiveDate>> {
    match value {
        None => Ok(None),
        Some(text) => match parse_input_date(text) {
            Some(date) => Ok(Some(date)),
            None => fail(format!("{flag}: invalid date '{text}', expected yyyy-mm-dd.")),
        },
    }
}

/// Fetch the attendance history, newest first.
pub async fn load_history(config: &Config) -> Vec<AttendanceRecord> {
    let sheets = SheetClient::new(config);
    let rows = sheets.fetch_rows(&config.sheets.attendance).await;
    history_from_rows(&rows)
}
