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

use maud::DOCTYPE;
use maud::Markup;
use maud::html;

use crate::types::teacher::Teacher;

/// The pages reachable from the sidebar.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Attendance,
    Students,
    History,
    Analysis,
}

impl Page {
    const ALL: [Page; 4] = [Page::Attendance, Page::Students, Page::History, Page::Analysis];

    fn path(self) -> &'static str {
        match self {
            Page::Attendance => "/attendance",
            Page::Students => "/students",
            Page::History => "/history",
            Page::Analysis => "/analysis",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Page::Attendance => "Take Attendance",
            Page::Students => "Students",
            Page::History => "Attendance History",
            Page::Analysis => "Analysis",
        }
    }
}

fn head(title: &str) -> Markup {
    html! {
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            title { (title) " | rollcall" }
            link rel="stylesheet" href="/style.css";
        }
    }
}

/// A dashboard page: sidebar navigation plus the given body.
pub fn page_template(title: &str, teacher: &Teacher, active: Page, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            (head(title))
            body {
                div.layout {
                    nav.sidebar {
                        div.brand { "rollcall" }
                        ul {
                            @for page in Page::ALL {
                                li {
                                    @if page == active {
                                        a.active href=(page.path()) { (page.label()) }
                                    } @else {
                                        a href=(page.path()) { (page.label()) }
                                    }
                                }
                            }
                        }
                        div.account {
                            div.teacher-name { (teacher.name) }
                            div.teacher-username { "@" (teacher.username) }
                            form action="/logout" method="post" {
                                input id="logout" type="submit" value="Log out";
                            }
                        }
                    }
                    main.content {
                        h1 { (title) }
                        (body)
                    }
                }
                script src="/script.js" {};
            }
        }
    }
}

/// A page outside the dashboard, such as the login form.
pub fn bare_template(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            (head(title))
            body.bare {
                (body)
            }
        }
    }
}

/// A success or error message shown above a page's content.
pub enum Banner {
    Success(String),
    Error(String),
}

impl Banner {
    pub fn render(&self) -> Markup {
        match self {
            Banner::Success(text) => html! { div.banner.success { (text) } },
            Banner::Error(text) => html! { div.banner.error { (text) } },
        }
    }
}
