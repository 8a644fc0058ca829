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

use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use maud::html;
use serde::Deserialize;

use crate::app::session::current_teacher;
use crate::app::state::ServerState;
use crate::app::template::Page;
use crate::app::template::page_template;
use crate::types::student::Student;

#[derive(Deserialize)]
pub struct StudentsQuery {
    #[serde(default)]
    q: String,
}

pub async fn students_page(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(query): Query<StudentsQuery>,
) -> Response {
    let Some(teacher) = current_teacher(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    let (students, total): (Vec<Student>, usize) = {
        let mutable = state.lock();
        let matching = mutable
            .students
            .iter()
            .filter(|s| s.matches_search(&query.q))
            .cloned()
            .collect();
        (matching, mutable.students.len())
    };
    let body = html! {
        form.filters action="/students" method="get" {
            input type="search" name="q" value=(query.q) placeholder="Search by name, NISN, class, or group";
            input type="submit" value="Search";
        }
        p.count { (students.len()) " of " (total) " students" }
        @if students.is_empty() {
            div.empty { "No students found." }
        } @else {
            table {
                thead {
                    tr {
                        th { "NISN" }
                        th { "Name" }
                        th { "Class" }
                        th { "Group" }
                    }
                }
                tbody {
                    @for student in &students {
                        tr {
                            td.mono { (student.student_id) }
                            td { (student.name) }
                            td { (student.class_name) }
                            td { (student.group_name) }
                        }
                    }
                }
            }
        }
    };
    let html = page_template("Students", &teacher, Page::Students, body);
    (StatusCode::OK, Html(html.into_string())).into_response()
}
