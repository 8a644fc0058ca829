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

use axum::Form;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use maud::Markup;
use maud::html;
use serde::Deserialize;

use crate::app::session::current_teacher;
use crate::app::state::ServerState;
use crate::app::template::Banner;
use crate::app::template::Page;
use crate::app::template::page_template;
use crate::submit::Outcome;
use crate::submit::all_marked;
use crate::submit::build_records;
use crate::submit::class_options;
use crate::submit::group_options;
use crate::submit::lesson_hours;
use crate::submit::merge_into_history;
use crate::submit::roster;
use crate::submit::submit_records;
use crate::types::date::format_record_date;
use crate::types::date::today;
use crate::types::status::Status;
use crate::types::student::Student;
use crate::types::teacher::Teacher;

const STATUS_FIELD_PREFIX: &str = "status-";

#[derive(Deserialize, Default)]
pub struct AttendanceQuery {
    hour: Option<String>,
    class: Option<String>,
    group: Option<String>,
}

/// The lesson hour, class, and group chosen so far. Each step is only kept
/// if it is valid and the step before it was chosen.
#[derive(Clone, Default)]
struct Selection {
    hour: Option<String>,
    class: Option<String>,
    group: Option<String>,
}

impl Selection {
    fn new(students: &[Student], query: AttendanceQuery) -> Self {
        let hour = query.hour.filter(|h| lesson_hours().contains(h));
        let class = hour
            .as_ref()
            .and(query.class)
            .filter(|c| class_options(students).contains(c));
        let group = class.as_ref().and_then(|class| {
            query
                .group
                .filter(|g| group_options(students, class).contains(g))
        });
        Self { hour, class, group }
    }
}

pub async fn attendance_page(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(query): Query<AttendanceQuery>,
) -> Response {
    let Some(teacher) = current_teacher(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    let students = state.lock().students.clone();
    let selection = Selection::new(&students, query);
    let html = attendance_view(&teacher, &students, &selection, &HashMap::new(), None);
    (StatusCode::OK, Html(html.into_string())).into_response()
}

pub async fn submit_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let Some(teacher) = current_teacher(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    let students = state.lock().students.clone();
    let (query, marks) = parse_submission(fields);
    let selection = Selection::new(&students, query);
    let (Some(hour), Some(class), Some(group)) = (
        selection.hour.clone(),
        selection.class.clone(),
        selection.group.clone(),
    ) else {
        let banner = Banner::Error("Choose a lesson hour, class, and group first.".to_string());
        let html = attendance_view(&teacher, &students, &selection, &marks, Some(banner));
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(html.into_string())).into_response();
    };

    let roster = roster(&students, &class, &group);
    let records = match build_records(
        &roster,
        &marks,
        &hour,
        &format_record_date(today()),
        &teacher,
    ) {
        Ok(records) => records,
        Err(_) => {
            let banner = Banner::Error("Mark every student before submitting.".to_string());
            let html = attendance_view(&teacher, &students, &selection, &marks, Some(banner));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(html.into_string())).into_response();
        }
    };

    log::debug!(
        "Submitting {} records for {class} {group}, hour {hour}.",
        records.len()
    );
    let report = submit_records(&state.sheets, records).await;
    let outcome = report.outcome();
    let posted = report.posted.len();
    let failed = report.failed;
    merge_into_history(&mut state.lock().history, report.posted);

    let html = match outcome {
        Outcome::Complete => {
            let banner = Banner::Success(format!(
                "Saved! {posted} attendance records were stored."
            ));
            let selection = Selection {
                group: None,
                ..selection
            };
            attendance_view(&teacher, &students, &selection, &HashMap::new(), Some(banner))
        }
        Outcome::Partial => {
            let banner = Banner::Error(format!(
                "Only {posted} records were saved. {failed} failed."
            ));
            attendance_view(&teacher, &students, &selection, &marks, Some(banner))
        }
        Outcome::Failed => {
            let banner = Banner::Error(
                "Nothing was saved. Check the connection or the Apps Script URL.".to_string(),
            );
            attendance_view(&teacher, &students, &selection, &marks, Some(banner))
        }
    };
    (StatusCode::OK, Html(html.into_string())).into_response()
}

/// Split a submitted roster form into the selection and the marks. Fields
/// with an unknown status are ignored, leaving that student unmarked.
fn parse_submission(fields: Vec<(String, String)>) -> (AttendanceQuery, HashMap<String, Status>) {
    let mut query = AttendanceQuery::default();
    let mut marks = HashMap::new();
    for (name, value) in fields {
        match name.as_str() {
            "hour" => query.hour = Some(value),
            "class" => query.class = Some(value),
            "group" => query.group = Some(value),
            _ => {
                if let Some(student_id) = name.strip_prefix(STATUS_FIELD_PREFIX) {
                    if let Ok(status) = Status::try_from(value.as_str()) {
                        marks.insert(student_id.to_string(), status);
                    }
                }
            }
        }
    }
    (query, marks)
}

fn attendance_view(
    teacher: &Teacher,
    students: &[Student],
    selection: &Selection,
    marks: &HashMap<String, Status>,
    banner: Option<Banner>,
) -> Markup {
    let body = html! {
        @if let Some(banner) = &banner {
            (banner.render())
        }
        div.steps {
            form.step action="/attendance" method="get" {
                label for="hour" { "Lesson hour" }
                select.autosubmit id="hour" name="hour" {
                    option value="" { "Choose a lesson hour" }
                    @for hour in lesson_hours() {
                        option value=(hour) selected[selection.hour.as_ref() == Some(&hour)] { "Hour " (hour) }
                    }
                }
                noscript { input type="submit" value="Choose"; }
            }
            @if let Some(hour) = &selection.hour {
                form.step action="/attendance" method="get" {
                    input type="hidden" name="hour" value=(hour);
                    label for="class" { "Class" }
                    select.autosubmit id="class" name="class" {
                        option value="" { "Choose a class" }
                        @for class in class_options(students) {
                            option value=(class) selected[selection.class.as_ref() == Some(&class)] { (class) }
                        }
                    }
                    noscript { input type="submit" value="Choose"; }
                }
            }
            @if let (Some(hour), Some(class)) = (&selection.hour, &selection.class) {
                form.step action="/attendance" method="get" {
                    input type="hidden" name="hour" value=(hour);
                    input type="hidden" name="class" value=(class);
                    label for="group" { "Group" }
                    select.autosubmit id="group" name="group" {
                        option value="" { "Choose a group" }
                        @for group in group_options(students, class) {
                            option value=(group) selected[selection.group.as_ref() == Some(&group)] { (group) }
                        }
                    }
                    noscript { input type="submit" value="Choose"; }
                }
            }
        }
        @if let (Some(hour), Some(class), Some(group)) = (&selection.hour, &selection.class, &selection.group) {
            (roster_form(hour, class, group, &roster(students, class, group), marks))
        }
    };
    page_template("Take Attendance", teacher, Page::Attendance, body)
}

fn roster_form(
    hour: &str,
    class: &str,
    group: &str,
    roster: &[&Student],
    marks: &HashMap<String, Status>,
) -> Markup {
    let marked = roster
        .iter()
        .filter(|s| marks.contains_key(&s.student_id))
        .count();
    let ready = all_marked(roster, marks);
    html! {
        form id="roster" action="/attendance" method="post" {
            input type="hidden" name="hour" value=(hour);
            input type="hidden" name="class" value=(class);
            input type="hidden" name="group" value=(group);
            div.roster-header {
                h2 { (class) " / " (group) }
                span id="marked-count" { (marked) " / " (roster.len()) " marked" }
            }
            @for student in roster {
                @let field = format!("{STATUS_FIELD_PREFIX}{}", student.student_id);
                div.student {
                    div.student-info {
                        div.student-name { (student.name) }
                        div.student-id { "NISN " (student.student_id) }
                    }
                    div.status-choices {
                        @for status in Status::ALL {
                            @let id = format!("{field}-{}", status.css_class());
                            input type="radio" id=(id) name=(field) value=(status.label())
                                checked[marks.get(&student.student_id) == Some(&status)];
                            label class=(status.css_class()) for=(id) { (status.display_name()) }
                        }
                    }
                }
            }
            input id="submit" type="submit" value=(format!("Submit attendance ({} students)", roster.len())) disabled[!ready];
        }
    }
}
