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

//! Calendar dates as they appear in the attendance sheet (`dd/mm/yyyy`) and
//! in HTML date pickers (`yyyy-mm-dd`).
//!
//! Components are not range-checked. An out-of-range day or month rolls over
//! into the neighbouring month or year, so `32/03/2024` is the 1st of April.

use chrono::Days;
use chrono::Local;
use chrono::Months;
use chrono::NaiveDate;

/// The date unparseable record dates collapse to. Sorts before every real
/// attendance date.
pub fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// The current date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `dd/mm/yyyy` record date. Empty or malformed text yields
/// [`epoch`].
pub fn parse_record_date(text: &str) -> NaiveDate {
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != 3 {
        return epoch();
    }
    match parse_components(parts[2], parts[1], parts[0]) {
        Some(date) => date,
        None => epoch(),
    }
}

/// Parse a `yyyy-mm-dd` date picker value. The empty string means no date
/// was picked.
pub fn parse_input_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let parts: Vec<&str> = text.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    parse_components(parts[0], parts[1], parts[2])
}

/// Render a date the way the sheet stores it.
pub fn format_record_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Render a date the way a date picker expects it.
pub fn format_input_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_components(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    rolled_date(component(year)?, component(month)?, component(day)?)
}

/// A blank component counts as zero. Anything else non-numeric is invalid.
fn component(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        Some(0)
    } else {
        text.parse().ok()
    }
}

/// Build a date from possibly out-of-range components by counting months
/// and days forward (or backward) from the 1st of January.
fn rolled_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let year = i32::try_from(year).ok()?;
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let months = month - 1;
    let start = if months >= 0 {
        start.checked_add_months(Months::new(u32::try_from(months).ok()?))?
    } else {
        start.checked_sub_months(Months::new(u32::try_from(-months).ok()?))?
    };
    let days = day - 1;
    if days >= 0 {
        start.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        start.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_record_date() {
        assert_eq!(parse_record_date("15/03/2024"), ymd(2024, 3, 15));
        assert_eq!(parse_record_date("1/2/2025"), ymd(2025, 2, 1));
    }

    #[test]
    fn test_record_and_input_formats_agree() {
        assert_eq!(
            Some(parse_record_date("15/03/2024")),
            parse_input_date("2024-03-15")
        );
    }

    #[test]
    fn test_unparseable_record_dates() {
        assert_eq!(parse_record_date(""), epoch());
        assert_eq!(parse_record_date("bad-date"), epoch());
        assert_eq!(parse_record_date("15/03"), epoch());
        assert_eq!(parse_record_date("15/03/2024/1"), epoch());
        assert_eq!(parse_record_date("aa/bb/cccc"), epoch());
        assert_eq!(epoch(), ymd(1970, 1, 1));
    }

    #[test]
    fn test_out_of_range_components_roll_over() {
        assert_eq!(parse_record_date("32/03/2024"), ymd(2024, 4, 1));
        assert_eq!(parse_record_date("01/13/2024"), ymd(2025, 1, 1));
        assert_eq!(parse_record_date("00/03/2024"), ymd(2024, 2, 29));
        assert_eq!(parse_record_date("31/02/2023"), ymd(2023, 3, 3));
        assert_eq!(parse_record_date("15/00/2024"), ymd(2023, 12, 15));
        // A blank day is day zero, the last day of the previous month.
        assert_eq!(parse_record_date("/03/2024"), ymd(2024, 2, 29));
    }

    #[test]
    fn test_parse_input_date() {
        assert_eq!(parse_input_date(""), None);
        assert_eq!(parse_input_date("2024-03-01"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_input_date("2024/03/01"), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_record_date(ymd(2024, 3, 5)), "05/03/2024");
        assert_eq!(format_input_date(ymd(2024, 3, 5)), "2024-03-05");
        let date = ymd(2026, 10, 16);
        assert_eq!(parse_record_date(&format_record_date(date)), date);
    }
}
