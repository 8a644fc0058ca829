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

use serde::Serialize;

/// A student enrolled in a class group.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Student {
    /// The student's NISN. Never empty.
    pub student_id: String,
    pub name: String,
    pub class_name: String,
    pub group_name: String,
}

impl Student {
    /// Name, class, and group match case-insensitively; the NISN must
    /// contain the search verbatim.
    pub fn matches_search(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.student_id.contains(search)
            || self.class_name.to_lowercase().contains(&needle)
            || self.group_name.to_lowercase().contains(&needle)
    }
}
