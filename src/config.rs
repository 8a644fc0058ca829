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

use std::env::current_dir;
use std::fs::read_to_string;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

const DEFAULT_CONFIG_FILE: &str = "rollcall.toml";

/// Program configuration, read from a TOML file.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// The ID of the spreadsheet holding the teachers, students, and
    /// attendance sheets.
    pub spreadsheet_id: String,
    /// Base URL of the spreadsheet read API.
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,
    /// The Apps Script endpoint that appends attendance rows. Without one,
    /// writes are simulated.
    #[serde(default)]
    pub write_url: Option<String>,
    /// How long a simulated write takes.
    #[serde(default = "default_simulated_write_delay_ms")]
    pub simulated_write_delay_ms: u64,
    /// Address the web server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub sheets: SheetNames,
    #[serde(default)]
    pub summary: SummaryConfig,
}

/// Names of the sheets (tabs) inside the spreadsheet.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub teachers: String,
    pub students: String,
    pub attendance: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            teachers: "Data Guru".to_string(),
            students: "Data Siswa".to_string(),
            attendance: "Data Kehadiran".to_string(),
        }
    }
}

/// Settings for the Gemini summary generator.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// The API key itself. Takes precedence over `api_key_env`.
    pub api_key: Option<String>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
        }
    }
}

impl SummaryConfig {
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

fn default_sheets_base_url() -> String {
    "https://docs.google.com/spreadsheets/d".to_string()
}

fn default_simulated_write_delay_ms() -> u64 {
    1500
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

impl Config {
    /// Load the configuration from the given path, or from `rollcall.toml`
    /// in the current directory.
    pub fn load(path: Option<String>) -> Fallible<Self> {
        let path: PathBuf = match path {
            Some(path) => PathBuf::from(path),
            None => current_dir()?.join(DEFAULT_CONFIG_FILE),
        };
        if !path.exists() {
            return fail(format!(
                "configuration file {} does not exist.",
                path.display()
            ));
        }
        log::debug!("Loading configuration from {}", path.display());
        let text = read_to_string(&path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(text)?;
        if config.spreadsheet_id.trim().is_empty() {
            return fail("spreadsheet_id is empty.");
        }
        Ok(config)
    }

    /// The write endpoint, if one is configured.
    pub fn write_url(&self) -> Option<&str> {
        self.write_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// The listening address, with the port replaced if one is given.
    pub fn bind_address(&self, port: Option<u16>) -> Fallible<SocketAddr> {
        let mut addr: SocketAddr = self.bind.parse()?;
        if let Some(port) = port {
            addr.set_port(port);
        }
        Ok(addr)
    }
}
