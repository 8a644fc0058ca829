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

//! Free-text summaries of attendance data, generated by Gemini.

use std::future::Future;

use serde::Deserialize;
use serde::Serialize;

use crate::config::SummaryConfig;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::record::AttendanceRecord;

/// At most this many records are sent to the summary generator.
pub const MAX_SUMMARY_RECORDS: usize = 50;

const SYSTEM_INSTRUCTION: &str =
    "Anda adalah asisten administrasi sekolah yang cermat, ramah, dan suportif.";

/// Something that can describe a set of attendance records in prose.
///
/// Returns `None` when no summary could be produced.
pub trait Summarizer {
    fn summarize(
        &self,
        records: &[AttendanceRecord],
    ) -> impl Future<Output = Option<String>> + Send;
}

/// The prompt sent to the model: one line per record.
pub fn build_prompt(records: &[AttendanceRecord]) -> String {
    let lines: Vec<String> = records
        .iter()
        .take(MAX_SUMMARY_RECORDS)
        .map(|r| format!("- {} ({}): {}", r.student_name, r.class_name, r.status))
        .collect();
    format!(
        "Berikut data absensi siswa yang sedang ditinjau:\n{}\n\n\
         Buat ringkasan singkat dalam Bahasa Indonesia tentang tingkat kehadiran \
         data ini, dan sarankan tindak lanjut untuk siswa yang tidak hadir \
         (Alpa atau Sakit).",
        lines.join("\n")
    )
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &SummaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key(),
        }
    }

    async fn generate(&self, prompt: String) -> Fallible<String> {
        let Some(api_key) = &self.api_key else {
            return fail("no Gemini API key configured.");
        };
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: SYSTEM_INSTRUCTION.to_string() }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt }],
            }],
        };
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return fail(format!("Gemini returned {status}"));
        }
        let response: GenerateResponse = response.json().await?;
        match response.text() {
            Some(text) => Ok(text),
            None => fail("Gemini returned no text."),
        }
    }
}

impl Summarizer for GeminiClient {
    async fn summarize(&self, records: &[AttendanceRecord]) -> Option<String> {
        if records.is_empty() {
            return None;
        }
        let prompt = build_prompt(records);
        match self.generate(prompt).await {
            Ok(text) => Some(text),
            Err(e) => {
                log::error!("Summary generation failed: {e}");
                None
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// The text parts of the first candidate, concatenated.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
