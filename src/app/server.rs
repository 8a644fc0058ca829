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

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::app::analysis::analysis_page;
use crate::app::analysis::summary_handler;
use crate::app::attendance::attendance_page;
use crate::app::attendance::submit_handler;
use crate::app::history::history_page;
use crate::app::history::refresh_handler;
use crate::app::login::login_handler;
use crate::app::login::login_page;
use crate::app::login::logout_handler;
use crate::app::login::root_handler;
use crate::app::state::MutableState;
use crate::app::state::ServerState;
use crate::app::students::students_page;
use crate::config::Config;
use crate::error::Fallible;
use crate::ingest::students_from_rows;
use crate::ingest::teachers_from_rows;
use crate::sheets::SheetClient;
use crate::summary::GeminiClient;

pub async fn start_server(config: Config, port: Option<u16>, open_browser: bool) -> Fallible<()> {
    let bind = config.bind_address(port)?;
    let state = build_state(&config).await;
    let app = router(state);

    if open_browser {
        tokio::spawn(open_when_ready(bind));
    }

    log::info!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutting down.");
        })
        .await?;
    Ok(())
}

/// Load teachers and students from the spreadsheet. A sheet that cannot be
/// read leaves its list empty.
pub async fn build_state(config: &Config) -> ServerState {
    let sheets = SheetClient::new(config);
    log::debug!("Loading teachers and students...");
    let (teacher_rows, student_rows) = tokio::join!(
        sheets.fetch_rows(&config.sheets.teachers),
        sheets.fetch_rows(&config.sheets.students),
    );
    let teachers = teachers_from_rows(&teacher_rows);
    let students = students_from_rows(&student_rows);
    log::info!(
        "Loaded {} teachers and {} students.",
        teachers.len(),
        students.len()
    );
    if teachers.is_empty() {
        log::warn!("No teachers were loaded, so nobody can log in.");
    }
    ServerState {
        sheets,
        summarizer: GeminiClient::new(&config.summary),
        attendance_sheet: config.sheets.attendance.clone(),
        mutable: Arc::new(Mutex::new(MutableState {
            teachers,
            students,
            history: Vec::new(),
            history_loaded: false,
            sessions: Default::default(),
        })),
    }
}

pub fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/", get(root_handler));
    let app = app.route("/login", get(login_page).post(login_handler));
    let app = app.route("/logout", post(logout_handler));
    let app = app.route("/attendance", get(attendance_page).post(submit_handler));
    let app = app.route("/students", get(students_page));
    let app = app.route("/history", get(history_page));
    let app = app.route("/history/refresh", post(refresh_handler));
    let app = app.route("/analysis", get(analysis_page));
    let app = app.route("/analysis/summary", post(summary_handler));
    let app = app.route("/script.js", get(script));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

async fn open_when_ready(bind: SocketAddr) {
    let url = format!("http://localhost:{}/", bind.port());
    loop {
        if let Ok(stream) = TcpStream::connect(("127.0.0.1", bind.port())).await {
            drop(stream);
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    if let Err(e) = open::that(&url) {
        log::warn!("Could not open {url}: {e}");
    }
}

async fn script() -> (StatusCode, [(HeaderName, &'static str); 1], &'static str) {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/javascript")],
        include_str!("script.js"),
    )
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
