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

/// A teacher account, as listed in the teachers sheet.
#[derive(Clone, PartialEq, Debug)]
pub struct Teacher {
    /// Login name. Never empty.
    pub username: String,
    pub password: String,
    /// Display name.
    pub name: String,
}

impl Teacher {
    /// Usernames compare case-insensitively; passwords compare exactly. Both
    /// inputs are trimmed.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username.to_lowercase() == username.trim().to_lowercase()
            && self.password == password.trim()
    }
}

/// Find the teacher matching the given credentials.
pub fn find_teacher<'a>(
    teachers: &'a [Teacher],
    username: &str,
    password: &str,
) -> Option<&'a Teacher> {
    teachers.iter().find(|t| t.matches(username, password))
}
