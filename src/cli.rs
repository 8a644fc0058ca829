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

use clap::Parser;

use crate::app::server::start_server;
use crate::cmd::FilterArgs;
use crate::cmd::export::export_history;
use crate::cmd::stats::print_stats;
use crate::config::Config;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Start the attendance web app.
    Serve {
        /// Path to the configuration file. Defaults to `rollcall.toml`.
        #[arg(long)]
        config: Option<String>,
        /// Port to listen on, overriding the configured bind address.
        #[arg(long)]
        port: Option<u16>,
        /// Open the app in a browser once the server is up.
        #[arg(long)]
        open: bool,
    },
    /// Print attendance statistics as JSON.
    Stats {
        /// Path to the configuration file. Defaults to `rollcall.toml`.
        #[arg(long)]
        config: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the attendance history as JSON.
    Export {
        /// Path to the configuration file. Defaults to `rollcall.toml`.
        #[arg(long)]
        config: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve { config, port, open } => {
            let config = Config::load(config)?;
            start_server(config, port, open).await
        }
        Command::Stats { config, filters } => print_stats(config, filters).await,
        Command::Export { config, filters } => export_history(config, filters).await,
    }
}
