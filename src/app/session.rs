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

//! Cookie-based login sessions.

use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use uuid::Uuid;

use crate::app::state::ServerState;
use crate::types::teacher::Teacher;

pub const SESSION_COOKIE: &str = "rollcall_session";

/// Sessions unused for this long are dropped.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);

pub struct Session {
    pub teacher: Teacher,
    last_seen: Instant,
}

impl Session {
    fn new(teacher: Teacher, now: Instant) -> Self {
        Self {
            teacher,
            last_seen: now,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen) >= SESSION_IDLE_TIMEOUT
    }
}

/// Log a teacher in, returning the new session token. Expired sessions are
/// swept at the same time.
pub fn start_session(state: &ServerState, teacher: Teacher) -> String {
    let token = Uuid::new_v4().to_string();
    let now = Instant::now();
    log::info!("{} logged in.", teacher.username);
    let mut mutable = state.lock();
    prune_expired(&mut mutable.sessions, now);
    mutable
        .sessions
        .insert(token.clone(), Session::new(teacher, now));
    token
}

pub fn end_session(state: &ServerState, headers: &HeaderMap) {
    if let Some(token) = session_token(headers) {
        if let Some(session) = state.lock().sessions.remove(&token) {
            log::info!("{} logged out.", session.teacher.username);
        }
    }
}

/// The teacher the request's session cookie belongs to. Using a session
/// keeps it alive.
pub fn current_teacher(state: &ServerState, headers: &HeaderMap) -> Option<Teacher> {
    let token = session_token(headers)?;
    touch(&mut state.lock().sessions, &token, Instant::now())
}

fn touch(sessions: &mut HashMap<String, Session>, token: &str, now: Instant) -> Option<Teacher> {
    let session = sessions.get_mut(token)?;
    if session.is_expired(now) {
        log::info!("Session for {} expired.", session.teacher.username);
        sessions.remove(token);
        return None;
    }
    session.last_seen = now;
    Some(session.teacher.clone())
}

fn prune_expired(sessions: &mut HashMap<String, Session>, now: Instant) {
    sessions.retain(|_, session| !session.is_expired(now));
}

pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
