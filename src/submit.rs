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

//! Taking attendance for one lesson hour of one class group.

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::error::Fallible;
use crate::error::fail;
use crate::sheets::RecordWriter;
use crate::types::record::AttendanceRecord;
use crate::types::status::Status;
use crate::types::student::Student;
use crate::types::teacher::Teacher;

/// The lesson hours a teacher can pick: "1" through "10".
pub fn lesson_hours() -> Vec<String> {
    (1..=10).map(|hour| hour.to_string()).collect()
}

/// Distinct class names among the students, ascending.
pub fn class_options(students: &[Student]) -> Vec<String> {
    students
        .iter()
        .map(|s| s.class_name.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Distinct group names within a class, ascending.
pub fn group_options(students: &[Student], class: &str) -> Vec<String> {
    students
        .iter()
        .filter(|s| s.class_name == class)
        .map(|s| s.group_name.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Every student in the class group, sorted by name.
pub fn roster<'a>(students: &'a [Student], class: &str, group: &str) -> Vec<&'a Student> {
    let mut roster: Vec<&Student> = students
        .iter()
        .filter(|s| s.class_name == class && s.group_name == group)
        .collect();
    roster.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    roster
}

/// Whether every student on a non-empty roster has a status.
pub fn all_marked(roster: &[&Student], marks: &HashMap<String, Status>) -> bool {
    !roster.is_empty() && roster.iter().all(|s| marks.contains_key(&s.student_id))
}

/// Build one record per roster student, in roster order.
pub fn build_records(
    roster: &[&Student],
    marks: &HashMap<String, Status>,
    lesson_hour: &str,
    date: &str,
    teacher: &Teacher,
) -> Fallible<Vec<AttendanceRecord>> {
    if !all_marked(roster, marks) {
        return fail("every student must be marked before submitting.");
    }
    let mut records = Vec::with_capacity(roster.len());
    for student in roster {
        let Some(status) = marks.get(&student.student_id) else {
            return fail(format!("student {} is not marked.", student.student_id));
        };
        records.push(AttendanceRecord {
            student_id: student.student_id.clone(),
            student_name: student.name.clone(),
            class_name: student.class_name.clone(),
            group_name: student.group_name.clone(),
            lesson_hour: lesson_hour.to_string(),
            status: *status,
            date: date.to_string(),
            recorded_by: teacher.username.clone(),
        });
    }
    Ok(records)
}

/// How a submission went as a whole.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    /// Every record was stored.
    Complete,
    /// Some records were stored.
    Partial,
    /// No record was stored.
    Failed,
}

pub struct SubmissionReport {
    /// The records that were stored, in submission order.
    pub posted: Vec<AttendanceRecord>,
    /// How many records could not be stored.
    pub failed: usize,
}

impl SubmissionReport {
    pub fn outcome(&self) -> Outcome {
        if self.failed == 0 {
            Outcome::Complete
        } else if !self.posted.is_empty() {
            Outcome::Partial
        } else {
            Outcome::Failed
        }
    }
}

/// Write the records one at a time, in order. A failed write does not stop
/// the remaining ones.
pub async fn submit_records<W>(writer: &W, records: Vec<AttendanceRecord>) -> SubmissionReport
where
    W: RecordWriter + Sync,
{
    let mut posted = Vec::with_capacity(records.len());
    let mut failed = 0;
    for record in records {
        if writer.write(&record).await {
            posted.push(record);
        } else {
            failed += 1;
        }
    }
    log::info!(
        "Submitted attendance: {} stored, {} failed.",
        posted.len(),
        failed
    );
    SubmissionReport { posted, failed }
}

/// Put newly stored records at the front of the history, keeping their
/// order.
pub fn merge_into_history(history: &mut Vec<AttendanceRecord>, posted: Vec<AttendanceRecord>) {
    history.splice(0..0, posted);
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    struct FakeWriter {
        failing: HashSet<String>,
        written: Mutex<Vec<String>>,
    }

    impl FakeWriter {
        fn failing(ids: &[&str]) -> Self {
            Self {
                failing: ids.iter().map(|id| id.to_string()).collect(),
                written: Mutex::new(Vec::new()),
            }
        }
    }

    impl RecordWriter for FakeWriter {
        async fn write(&self, record: &AttendanceRecord) -> bool {
            self.written
                .lock()
                .unwrap()
                .push(record.student_id.clone());
            !self.failing.contains(&record.student_id)
        }
    }

    fn student(id: &str, name: &str, class: &str, group: &str) -> Student {
        Student {
            student_id: id.to_string(),
            name: name.to_string(),
            class_name: class.to_string(),
            group_name: group.to_string(),
        }
    }

    fn teacher() -> Teacher {
        Teacher {
            username: "budi".to_string(),
            password: "rahasia".to_string(),
            name: "Budi".to_string(),
        }
    }

    fn students() -> Vec<Student> {
        vec![
            student("3", "citra", "X", "X-1"),
            student("1", "Agus", "X", "X-1"),
            student("2", "Bayu", "X", "X-1"),
            student("4", "Dewi", "X", "X-2"),
            student("5", "Eka", "XI", "XI-1"),
        ]
    }

    fn marks(pairs: &[(&str, Status)]) -> HashMap<String, Status> {
        pairs.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    #[test]
    fn test_options() {
        let students = students();
        assert_eq!(class_options(&students), vec!["X", "XI"]);
        assert_eq!(group_options(&students, "X"), vec!["X-1", "X-2"]);
        assert!(group_options(&students, "XII").is_empty());
        assert_eq!(lesson_hours().len(), 10);
        assert_eq!(lesson_hours()[0], "1");
        assert_eq!(lesson_hours()[9], "10");
    }

    #[test]
    fn test_roster_is_sorted_by_name() {
        let students = students();
        let roster = roster(&students, "X", "X-1");
        let names: Vec<&str> = roster.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Agus", "Bayu", "citra"]);
    }

    #[test]
    fn test_all_marked_is_a_conjunction() {
        let students = students();
        let roster = roster(&students, "X", "X-1");
        let partial = marks(&[("1", Status::Present), ("2", Status::Sick)]);
        assert!(!all_marked(&roster, &partial));
        // Marks for students outside the roster do not count.
        let padded = marks(&[
            ("1", Status::Present),
            ("2", Status::Sick),
            ("4", Status::Absent),
        ]);
        assert!(!all_marked(&roster, &padded));
        let full = marks(&[
            ("1", Status::Present),
            ("2", Status::Sick),
            ("3", Status::Absent),
        ]);
        assert!(all_marked(&roster, &full));
        assert!(!all_marked(&[], &full));
    }

    #[test]
    fn test_build_records() -> Fallible<()> {
        let students = students();
        let roster = roster(&students, "X", "X-1");
        let full = marks(&[
            ("1", Status::Present),
            ("2", Status::Sick),
            ("3", Status::Absent),
        ]);
        let records = build_records(&roster, &full, "3", "15/03/2024", &teacher())?;
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].student_id, "1");
        assert_eq!(records[1].status, Status::Sick);
        assert!(records.iter().all(|r| r.lesson_hour == "3"
            && r.date == "15/03/2024"
            && r.recorded_by == "budi"
            && r.group_name == "X-1"));
        let partial = marks(&[("1", Status::Present)]);
        assert!(build_records(&roster, &partial, "3", "15/03/2024", &teacher()).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_submission() -> Fallible<()> {
        let students = students();
        let roster = roster(&students, "X", "X-1");
        let full = marks(&[
            ("1", Status::Present),
            ("2", Status::Sick),
            ("3", Status::Absent),
        ]);
        let records = build_records(&roster, &full, "1", "15/03/2024", &teacher())?;
        let writer = FakeWriter::failing(&["2"]);
        let report = submit_records(&writer, records).await;
        assert_eq!(report.outcome(), Outcome::Partial);
        assert_eq!(report.failed, 1);
        assert_eq!(report.posted.len(), 2);
        // Every write was attempted, in roster order.
        assert_eq!(*writer.written.lock().unwrap(), vec!["1", "2", "3"]);

        let mut history = build_records(
            &roster[..1],
            &full,
            "9",
            "14/03/2024",
            &teacher(),
        )?;
        history.push(history[0].clone());
        let before = history.clone();
        merge_into_history(&mut history, report.posted);
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].student_id, "1");
        assert_eq!(history[1].student_id, "3");
        assert_eq!(&history[2..], &before[..]);
        Ok(())
    }

    #[tokio::test]
    async fn test_outcomes() {
        let students = students();
        let roster = roster(&students, "X", "X-1");
        let full = marks(&[
            ("1", Status::Present),
            ("2", Status::Present),
            ("3", Status::Present),
        ]);
        let records = build_records(&roster, &full, "1", "15/03/2024", &teacher()).unwrap();

        let report = submit_records(&FakeWriter::failing(&[]), records.clone()).await;
        assert_eq!(report.outcome(), Outcome::Complete);
        assert_eq!(report.posted, records);

        let report = submit_records(&FakeWriter::failing(&["1", "2", "3"]), records).await;
        assert_eq!(report.outcome(), Outcome::Failed);
        assert!(report.posted.is_empty());
        assert_eq!(report.failed, 3);
    }
}
