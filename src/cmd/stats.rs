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

use crate::cmd::FilterArgs;
use crate::cmd::load_history;
use crate::config::Config;
use crate::error::Fallible;
use crate::filter::FilterCriteria;
use crate::filter::filter_records;
use crate::stats::summarize;
use crate::types::date::today;
use crate::types::record::AttendanceRecord;

pub async fn print_stats(config: Option<String>, filters: FilterArgs) -> Fallible<()> {
    let config = Config::load(config)?;
    let criteria = filters.criteria()?;
    let history = load_history(&config).await;
    match stats_json(&history, &criteria, today())? {
        Some(json) => println!("{json}"),
        None => println!("No attendance records match these filters."),
    }
    Ok(())
}

fn stats_json(
    history: &[AttendanceRecord],
    criteria: &FilterCriteria,
    today: NaiveDate,
) -> Fallible<Option<String>> {
    let records = filter_records(history, criteria, today);
    match summarize(records) {
        Some(summary) => Ok(Some(serde_json::to_string_pretty(&summary)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use serde_json::json;

    use super::*;
    use crate::types::status::Status;

    fn record(class: &str, status: Status) -> AttendanceRecord {
        AttendanceRecord {
            student_id: "1".to_string(),
            student_name: "Agus".to_string(),
            class_name: class.to_string(),
            group_name: "G".to_string(),
            lesson_hour: "1".to_string(),
            status,
            date: "15/03/2024".to_string(),
            recorded_by: "bu.sari".to_string(),
        }
    }

    #[test]
    fn test_stats_json() -> Fallible<()> {
        let history = vec![
            record("X", Status::Present),
            record("X", Status::Absent),
            record("XI", Status::Sick),
        ];
        let criteria = FilterCriteria {
            class: "X".to_string(),
            ..FilterCriteria::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let json = stats_json(&history, &criteria, today)?.unwrap();
        let value: Value = serde_json::from_str(&json)?;
        assert_eq!(
            value,
            json!({
                "total": 2,
                "counts": { "present": 1, "excusedLeave": 0, "sick": 0, "absent": 1 },
                "attendanceRate": 50.0
            })
        );
        Ok(())
    }

    #[test]
    fn test_stats_json_empty() -> Fallible<()> {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        assert_eq!(stats_json(&[], &FilterCriteria::default(), today)?, None);
        Ok(())
    }
}
