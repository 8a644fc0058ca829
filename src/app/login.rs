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
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use maud::Markup;
use maud::html;
use serde::Deserialize;

use crate::app::session::current_teacher;
use crate::app::session::end_session;
use crate::app::session::expired_session_cookie;
use crate::app::session::session_cookie;
use crate::app::session::start_session;
use crate::app::state::ServerState;
use crate::app::template::bare_template;
use crate::types::teacher::find_teacher;

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub async fn root_handler(State(state): State<ServerState>, headers: HeaderMap) -> Redirect {
    match current_teacher(&state, &headers) {
        Some(_) => Redirect::to("/attendance"),
        None => Redirect::to("/login"),
    }
}

pub async fn login_page(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    if current_teacher(&state, &headers).is_some() {
        return Redirect::to("/attendance").into_response();
    }
    (StatusCode::OK, Html(login_view(None, "").into_string())).into_response()
}

pub async fn login_handler(
    State(state): State<ServerState>,
    Form(form): Form<LoginForm>,
) -> Response {
    let teacher = {
        let mutable = state.lock();
        find_teacher(&mutable.teachers, &form.username, &form.password).cloned()
    };
    match teacher {
        Some(teacher) => {
            let token = start_session(&state, teacher);
            (
                [(SET_COOKIE, session_cookie(&token))],
                Redirect::to("/attendance"),
            )
                .into_response()
        }
        None => {
            log::debug!("Failed login for '{}'.", form.username.trim());
            let message = "Username or password not found in the teachers sheet.";
            let html = login_view(Some(message), &form.username);
            (StatusCode::UNAUTHORIZED, Html(html.into_string())).into_response()
        }
    }
}

pub async fn logout_handler(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    end_session(&state, &headers);
    (
        [(SET_COOKIE, expired_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

fn login_view(error: Option<&str>, username: &str) -> Markup {
    let body = html! {
        div.login {
            h1 { "rollcall" }
            p.subtitle { "Log in with your teacher account." }
            @if let Some(error) = error {
                div.banner.error { (error) }
            }
            form action="/login" method="post" {
                label for="username" { "Username" }
                input id="username" type="text" name="username" value=(username) required autofocus;
                label for="password" { "Password" }
                input id="password" type="password" name="password" required;
                input id="login" type="submit" value="Log in";
            }
        }
    };
    bare_template("Log in", body)
}
