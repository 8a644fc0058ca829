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
use maud::PreEscaped;
use maud::html;
use serde::Deserialize;

use crate::app::history::period_inputs;
use crate::app::session::current_teacher;
use crate::app::state::ServerState;
use crate::app::template::Page;
use crate::app::template::page_template;
use crate::filter::ALL;
use crate::filter::FilterCriteria;
use crate::filter::Period;
use crate::filter::filter_records;
use crate::filter::unique_classes;
use crate::markdown::markdown_to_html;
use crate::stats::Summary;
use crate::stats::summarize;
use crate::summary::MAX_SUMMARY_RECORDS;
use crate::summary::Summarizer;
use crate::types::date::format_input_date;
use crate::types::date::parse_input_date;
use crate::types::date::today;
use crate::types::record::AttendanceRecord;
use crate::types::status::Status;
use crate::types::teacher::Teacher;

#[derive(Deserialize, Default)]
pub struct AnalysisQuery {
    class: Option<String>,
    period: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl AnalysisQuery {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            class: match self.class.as_deref() {
                Some(class) if !class.is_empty() => class.to_string(),
                _ => ALL.to_string(),
            },
            period: self
                .period
                .as_deref()
                .map(Period::from_param)
                .unwrap_or_default(),
            range_start: self.from.as_deref().and_then(parse_input_date),
            range_end: self.to.as_deref().and_then(parse_input_date),
            ..FilterCriteria::default()
        }
    }
}

/// What the summary panel shows.
enum SummaryPanel {
    /// Nothing requested yet.
    Idle,
    Generated(String),
    Unavailable,
}

pub async fn analysis_page(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(query): Query<AnalysisQuery>,
) -> Response {
    let Some(teacher) = current_teacher(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    state.ensure_history().await;
    let history = state.lock().history.clone();
    let html = analysis_view(&teacher, &history, &query.criteria(), SummaryPanel::Idle);
    (StatusCode::OK, Html(html.into_string())).into_response()
}

pub async fn summary_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Form(query): Form<AnalysisQuery>,
) -> Response {
    let Some(teacher) = current_teacher(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    state.ensure_history().await;
    let history = state.lock().history.clone();
    let criteria = query.criteria();
    let selected: Vec<AttendanceRecord> = filter_records(&history, &criteria, today())
        .into_iter()
        .take(MAX_SUMMARY_RECORDS)
        .cloned()
        .collect();
    let panel = match state.summarizer.summarize(&selected).await {
        Some(text) => SummaryPanel::Generated(text),
        None => SummaryPanel::Unavailable,
    };
    let html = analysis_view(&teacher, &history, &criteria, panel);
    (StatusCode::OK, Html(html.into_string())).into_response()
}

fn analysis_view(
    teacher: &Teacher,
    history: &[AttendanceRecord],
    criteria: &FilterCriteria,
    panel: SummaryPanel,
) -> Markup {
    let records = filter_records(history, criteria, today());
    let summary = summarize(records.iter().copied());
    let body = html! {
        form.filters action="/analysis" method="get" {
            select.autosubmit name="class" {
                option value=(ALL) selected[criteria.class == ALL] { "All classes" }
                @for class in unique_classes(history) {
                    option value=(class) selected[criteria.class == class] { (class) }
                }
            }
            (period_inputs(criteria))
            input type="submit" value="Apply";
        }
        @match &summary {
            Some(summary) => {
                (stat_cards(summary))
                (summary_section(criteria, &panel))
            }
            None => {
                div.empty { "No attendance data for this selection." }
            }
        }
    };
    page_template("Analysis", teacher, Page::Analysis, body)
}

fn stat_cards(summary: &Summary) -> Markup {
    html! {
        div.cards {
            div.card {
                div.card-label { "Records" }
                div.card-value { (summary.total) }
            }
            div.card.rate {
                div.card-label { "Attendance rate" }
                div.card-value { (summary.rate_display()) }
            }
            @for status in Status::ALL {
                div class={ "card " (status.css_class()) } {
                    div.card-label { (status.display_name()) }
                    div.card-value { (summary.counts.get(status)) }
                    div.card-share { (summary.share_display(status)) " of records" }
                }
            }
        }
    }
}

fn summary_section(criteria: &FilterCriteria, panel: &SummaryPanel) -> Markup {
    html! {
        section.summary {
            h2 { "AI summary" }
            form action="/analysis/summary" method="post" {
                input type="hidden" name="class" value=(criteria.class);
                input type="hidden" name="period" value=(criteria.period.as_param());
                @if let Some(from) = criteria.range_start {
                    input type="hidden" name="from" value=(format_input_date(from));
                }
                @if let Some(to) = criteria.range_end {
                    input type="hidden" name="to" value=(format_input_date(to));
                }
                input id="generate-summary" type="submit" value="Generate summary";
            }
            @match panel {
                SummaryPanel::Idle => {}
                SummaryPanel::Generated(text) => {
                    div.summary-text { (PreEscaped(markdown_to_html(text))) }
                }
                SummaryPanel::Unavailable => {
                    div.banner.error { "Sorry, the summary could not be generated right now." }
                }
            }
        }
    }
}
