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
use maud::Markup;
use maud::html;
use serde::Deserialize;

use crate::app::session::current_teacher;
use crate::app::state::ServerState;
use crate::app::template::Page;
use crate::app::template::page_template;
use crate::filter::ALL;
use crate::filter::FilterCriteria;
use crate::filter::Period;
use crate::filter::available_groups;
use crate::filter::filter_records;
use crate::filter::unique_classes;
use crate::types::date::format_input_date;
use crate::types::date::parse_input_date;
use crate::types::date::today;
use crate::types::record::AttendanceRecord;

#[derive(Deserialize, Default)]
pub struct HistoryQuery {
    q: Option<String>,
    class: Option<String>,
    group: Option<String>,
    period: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl HistoryQuery {
    /// Turn the query into criteria. A group that does not belong to the
    /// chosen class falls back to every group.
    fn criteria(&self, history: &[AttendanceRecord]) -> FilterCriteria {
        let class = match self.class.as_deref() {
            Some(class) if !class.is_empty() => class.to_string(),
            _ => ALL.to_string(),
        };
        let group = match self.group.as_deref() {
            Some(group) if available_groups(history, &class).iter().any(|g| g == group) => {
                group.to_string()
            }
            _ => ALL.to_string(),
        };
        FilterCriteria {
            class,
            group,
            search: self.q.clone().unwrap_or_default(),
            period: self
                .period
                .as_deref()
                .map(Period::from_param)
                .unwrap_or_default(),
            range_start: self.from.as_deref().and_then(parse_input_date),
            range_end: self.to.as_deref().and_then(parse_input_date),
        }
    }
}

pub async fn history_page(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let Some(teacher) = current_teacher(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    state.ensure_history().await;
    let history = state.lock().history.clone();
    let criteria = query.criteria(&history);
    let records = filter_records(&history, &criteria, today());
    let body = html! {
        (filter_form(&history, &criteria))
        div.toolbar {
            p.count { (records.len()) " of " (history.len()) " records" }
            form action="/history/refresh" method="post" {
                input id="refresh" type="submit" value="Refresh";
            }
        }
        @if records.is_empty() {
            div.empty { "No attendance records match these filters." }
        } @else {
            (history_table(&records))
        }
    };
    let html = page_template("Attendance History", &teacher, Page::History, body);
    (StatusCode::OK, Html(html.into_string())).into_response()
}

pub async fn refresh_handler(State(state): State<ServerState>, headers: HeaderMap) -> Redirect {
    if current_teacher(&state, &headers).is_none() {
        return Redirect::to("/login");
    }
    state.refresh_history().await;
    Redirect::to("/history")
}

fn filter_form(history: &[AttendanceRecord], criteria: &FilterCriteria) -> Markup {
    html! {
        form.filters id="history-filters" action="/history" method="get" {
            input type="search" name="q" value=(criteria.search) placeholder="Search by name, NISN, class, or date";
            select.autosubmit id="class-filter" name="class" {
                option value=(ALL) selected[criteria.class == ALL] { "All classes" }
                @for class in unique_classes(history) {
                    option value=(class) selected[criteria.class == class] { (class) }
                }
            }
            select.autosubmit id="group-filter" name="group" {
                option value=(ALL) selected[criteria.group == ALL] { "All groups" }
                @for group in available_groups(history, &criteria.class) {
                    option value=(group) selected[criteria.group == group] { (group) }
                }
            }
            (period_inputs(criteria))
            input type="submit" value="Apply";
        }
    }
}

/// The period selector, plus date inputs when a custom range is chosen.
pub fn period_inputs(criteria: &FilterCriteria) -> Markup {
    html! {
        select.autosubmit name="period" {
            @for period in Period::ALL {
                option value=(period.as_param()) selected[criteria.period == period] { (period.display_name()) }
            }
        }
        @if criteria.period == Period::Custom {
            input type="date" name="from" value=[criteria.range_start.map(format_input_date)];
            input type="date" name="to" value=[criteria.range_end.map(format_input_date)];
        }
    }
}

fn history_table(records: &[&AttendanceRecord]) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { "Date" }
                    th { "Hour" }
                    th { "NISN" }
                    th { "Name" }
                    th { "Class" }
                    th { "Group" }
                    th { "Status" }
                    th { "Teacher" }
                }
            }
            tbody {
                @for record in records {
                    tr {
                        td { (record.date) }
                        td { (record.lesson_hour) }
                        td.mono { (record.student_id) }
                        td { (record.student_name) }
                        td { (record.class_name) }
                        td { (record.group_name) }
                        td { span class={ "badge " (record.status.css_class()) } { (record.status.display_name()) } }
                        td { (record.recorded_by) }
                    }
                }
            }
        }
    }
}
