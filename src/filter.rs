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

//! Narrowing the attendance history down to what a teacher asked to see.
//!
//! Filtering is a pure function of the records, the criteria, and the date
//! taken as "today". The output preserves input order.

use std::collections::BTreeSet;

use chrono::Datelike;
use chrono::Days;
use chrono::NaiveDate;
use clap::ValueEnum;

use crate::types::date::epoch;
use crate::types::record::AttendanceRecord;

/// Dropdown value meaning "do not filter on this field".
pub const ALL: &str = "all";

/// A named date-range preset.
#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Period {
    /// Every record.
    #[default]
    All,
    /// Records dated today.
    Today,
    /// Records dated seven days ago or later.
    #[value(name = "7days")]
    Last7Days,
    /// Records in the current calendar month.
    #[value(name = "month")]
    ThisMonth,
    /// Records between the chosen start and end dates.
    #[value(name = "custom")]
    Custom,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::All,
        Period::Today,
        Period::Last7Days,
        Period::ThisMonth,
        Period::Custom,
    ];

    /// The value used in query strings.
    pub fn as_param(self) -> &'static str {
        match self {
            Period::All => "all",
            Period::Today => "today",
            Period::Last7Days => "7days",
            Period::ThisMonth => "month",
            Period::Custom => "custom",
        }
    }

    /// Unknown values fall back to [`Period::All`].
    pub fn from_param(value: &str) -> Period {
        Period::ALL
            .into_iter()
            .find(|p| p.as_param() == value)
            .unwrap_or_default()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Period::All => "All time",
            Period::Today => "Today",
            Period::Last7Days => "Last 7 days",
            Period::ThisMonth => "This month",
            Period::Custom => "Custom range",
        }
    }
}

/// What the teacher asked to see.
#[derive(Clone, PartialEq, Debug)]
pub struct FilterCriteria {
    /// An exact class name, or [`ALL`].
    pub class: String,
    /// An exact group name, or [`ALL`].
    pub group: String,
    /// Free-text search. Empty matches everything.
    pub search: String,
    pub period: Period,
    /// Only consulted when `period` is [`Period::Custom`].
    pub range_start: Option<NaiveDate>,
    /// Only consulted when `period` is [`Period::Custom`].
    pub range_end: Option<NaiveDate>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            class: ALL.to_string(),
            group: ALL.to_string(),
            search: String::new(),
            period: Period::All,
            range_start: None,
            range_end: None,
        }
    }
}

impl FilterCriteria {
    /// Whether the record passes every predicate. Predicates are checked in
    /// order and the first failure excludes the record.
    pub fn matches(&self, record: &AttendanceRecord, today: NaiveDate) -> bool {
        if !matches_search(record, &self.search) {
            return false;
        }
        if self.class != ALL && record.class_name != self.class {
            return false;
        }
        if self.group != ALL && record.group_name != self.group {
            return false;
        }
        matches_period(
            record.parsed_date(),
            self.period,
            self.range_start,
            self.range_end,
            today,
        )
    }
}

/// The records matching the criteria, in their original order.
pub fn filter_records<'a>(
    records: &'a [AttendanceRecord],
    criteria: &FilterCriteria,
    today: NaiveDate,
) -> Vec<&'a AttendanceRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record, today))
        .collect()
}

/// Name and class match case-insensitively; the NISN and the raw date text
/// must contain the search verbatim.
pub fn matches_search(record: &AttendanceRecord, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    record.student_name.to_lowercase().contains(&needle)
        || record.student_id.contains(search)
        || record.class_name.to_lowercase().contains(&needle)
        || record.date.contains(search)
}

/// An unparseable date (the epoch) only passes [`Period::All`] and a custom
/// range with neither bound.
pub fn matches_period(
    date: NaiveDate,
    period: Period,
    range_start: Option<NaiveDate>,
    range_end: Option<NaiveDate>,
    today: NaiveDate,
) -> bool {
    if date == epoch() {
        return match period {
            Period::All => true,
            Period::Custom => range_start.is_none() && range_end.is_none(),
            _ => false,
        };
    }
    match period {
        Period::All => true,
        Period::Today => date == today,
        // No upper bound: records dated after today also pass.
        Period::Last7Days => match today.checked_sub_days(Days::new(7)) {
            Some(from) => date >= from,
            None => true,
        },
        Period::ThisMonth => date.year() == today.year() && date.month() == today.month(),
        Period::Custom => match (range_start, range_end) {
            (Some(start), Some(end)) => start <= date && date <= end,
            (Some(start), None) => start <= date,
            (None, Some(end)) => date <= end,
            (None, None) => true,
        },
    }
}

/// Distinct class names, ascending.
pub fn unique_classes(records: &[AttendanceRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.class_name.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Distinct group names, ascending. Restricted to one class unless `class`
/// is [`ALL`].
pub fn available_groups(records: &[AttendanceRecord], class: &str) -> Vec<String> {
    records
        .iter()
        .filter(|r| class == ALL || r.class_name == class)
        .map(|r| r.group_name.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::status::Status;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, name: &str, class: &str, group: &str, date: &str) -> AttendanceRecord {
        AttendanceRecord {
            student_id: id.to_string(),
            student_name: name.to_string(),
            class_name: class.to_string(),
            group_name: group.to_string(),
            lesson_hour: "1".to_string(),
            status: Status::Present,
            date: date.to_string(),
            recorded_by: "budi".to_string(),
        }
    }

    fn sample() -> Vec<AttendanceRecord> {
        vec![
            record("101", "Siti Aminah", "X", "X-1", "15/03/2024"),
            record("102", "Agus Salim", "X", "X-2", "28/02/2024"),
            record("201", "Dewi Lestari", "XI", "XI-1", "01/03/2024"),
            record("202", "Rudi Hartono", "XI", "XI-1", "bad-date"),
        ]
    }

    fn ids(records: &[&AttendanceRecord]) -> Vec<String> {
        records.iter().map(|r| r.student_id.clone()).collect()
    }

    #[test]
    fn test_default_criteria_keep_everything_in_order() {
        let records = sample();
        let result = filter_records(&records, &FilterCriteria::default(), ymd(2024, 3, 20));
        assert_eq!(ids(&result), vec!["101", "102", "201", "202"]);
    }

    #[test]
    fn test_search() {
        let records = sample();
        let today = ymd(2024, 3, 20);
        let search = |s: &str| {
            let criteria = FilterCriteria {
                search: s.to_string(),
                ..FilterCriteria::default()
            };
            ids(&filter_records(&records, &criteria, today))
        };
        assert_eq!(search("siti"), vec!["101"]);
        // Matches the NISN of 201 and 202, and the year of every parseable date.
        assert_eq!(search("20"), vec!["101", "102", "201", "202"]);
        assert_eq!(search("xi"), vec!["201", "202"]);
        assert_eq!(search("28/02"), vec!["102"]);
        assert_eq!(search("nobody"), Vec::<String>::new());
    }

    #[test]
    fn test_class_and_group() {
        let records = sample();
        let today = ymd(2024, 3, 20);
        let criteria = FilterCriteria {
            class: "X".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_records(&records, &criteria, today)), vec!["101", "102"]);
        let criteria = FilterCriteria {
            class: "X".to_string(),
            group: "X-2".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_records(&records, &criteria, today)), vec!["102"]);
        let criteria = FilterCriteria {
            class: "x".to_string(),
            ..FilterCriteria::default()
        };
        assert!(filter_records(&records, &criteria, today).is_empty());
    }

    #[test]
    fn test_today() {
        let today = ymd(2024, 3, 15);
        assert!(matches_period(ymd(2024, 3, 15), Period::Today, None, None, today));
        assert!(!matches_period(ymd(2024, 3, 14), Period::Today, None, None, today));
    }

    #[test]
    fn test_last_seven_days_has_no_upper_bound() {
        let today = ymd(2024, 3, 15);
        let p = |d| matches_period(d, Period::Last7Days, None, None, today);
        assert!(p(ymd(2024, 3, 8)));
        assert!(!p(ymd(2024, 3, 7)));
        assert!(p(ymd(2024, 3, 15)));
        assert!(p(ymd(2024, 4, 30)));
    }

    #[test]
    fn test_this_month() {
        let today = ymd(2024, 3, 15);
        let p = |d| matches_period(d, Period::ThisMonth, None, None, today);
        assert!(p(ymd(2024, 3, 1)));
        assert!(p(ymd(2024, 3, 31)));
        assert!(!p(ymd(2024, 2, 29)));
        assert!(!p(ymd(2023, 3, 15)));
    }

    #[test]
    fn test_custom_range() {
        let today = ymd(2026, 1, 1);
        let start = Some(ymd(2024, 3, 1));
        let end = Some(ymd(2024, 3, 15));
        let p = |d, s, e| matches_period(d, Period::Custom, s, e, today);
        // Start only.
        assert!(p(ymd(2024, 3, 15), start, None));
        assert!(!p(ymd(2024, 2, 28), start, None));
        // Both, inclusive on both ends.
        assert!(p(ymd(2024, 3, 1), start, end));
        assert!(p(ymd(2024, 3, 15), start, end));
        assert!(!p(ymd(2024, 3, 16), start, end));
        // End only.
        assert!(p(ymd(2020, 1, 1), None, end));
        assert!(!p(ymd(2024, 3, 16), None, end));
        // Neither.
        assert!(p(ymd(1999, 1, 1), None, None));
    }

    #[test]
    fn test_custom_range_on_records() {
        let records = sample();
        let criteria = FilterCriteria {
            period: Period::Custom,
            range_start: Some(ymd(2024, 3, 1)),
            ..FilterCriteria::default()
        };
        let result = filter_records(&records, &criteria, ymd(2024, 3, 20));
        assert_eq!(ids(&result), vec!["101", "201"]);
    }

    #[test]
    fn test_unparseable_date_only_passes_all() {
        let records = vec![
            record("1", "A", "X", "X-1", ""),
            record("2", "B", "X", "X-1", "aa/bb/cccc"),
        ];
        let today = ymd(2024, 3, 15);
        for period in [Period::Today, Period::Last7Days, Period::ThisMonth] {
            let criteria = FilterCriteria {
                period,
                ..FilterCriteria::default()
            };
            assert!(filter_records(&records, &criteria, today).is_empty());
        }
        let criteria = FilterCriteria {
            period: Period::Custom,
            range_start: Some(ymd(2024, 1, 1)),
            ..FilterCriteria::default()
        };
        assert!(filter_records(&records, &criteria, today).is_empty());
        let criteria = FilterCriteria {
            period: Period::Custom,
            range_end: Some(ymd(2024, 12, 31)),
            ..FilterCriteria::default()
        };
        assert!(filter_records(&records, &criteria, today).is_empty());
        let criteria = FilterCriteria {
            period: Period::Custom,
            ..FilterCriteria::default()
        };
        assert_eq!(filter_records(&records, &criteria, today).len(), 2);
        assert_eq!(
            filter_records(&records, &FilterCriteria::default(), today).len(),
            2
        );
    }

    #[test]
    fn test_period_params() {
        for period in Period::ALL {
            assert_eq!(Period::from_param(period.as_param()), period);
        }
        assert_eq!(Period::from_param("fortnight"), Period::All);
    }

    #[test]
    fn test_dropdown_values() {
        let records = sample();
        assert_eq!(unique_classes(&records), vec!["X", "XI"]);
        assert_eq!(available_groups(&records, ALL), vec!["X-1", "X-2", "XI-1"]);
        assert_eq!(available_groups(&records, "X"), vec!["X-1", "X-2"]);
        assert!(available_groups(&records, "XII").is_empty());
    }
}
