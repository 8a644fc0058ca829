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

use crate::cmd::FilterArgs;
use crate::cmd::load_history;
use crate::config::Config;
use crate::error::Fallible;
use crate::filter::filter_records;
use crate::types::date::today;
use crate::types::record::AttendanceRecord;

pub async fn export_history(config: Option<String>, filters: FilterArgs) -> Fallible<()> {
    let config = Config::load(config)?;
    let criteria = filters.criteria()?;
    let history = load_history(&config).await;
    let records: Vec<&AttendanceRecord> = filter_records(&history, &criteria, today());
    log::debug!("Exporting {} of {} records.", records.len(), history.len());
    let json: String = serde_json::to_string_pretty(&records)?;
    println!("{json}");
    Ok(())
}
