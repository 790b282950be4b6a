// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Translate HTML files from the command line, the same way responses
//! are translated when the engine runs inside a server.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use html_i18n_helpers::{Config, Translator, LANGUAGE_HEADER};
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));
    match Args::parse() {
        Args::Translate {
            config,
            accept_language,
            output,
            input,
        } => translate(&config, &accept_language, &input, output.as_deref()),
        Args::Check { config } => check(&config),
    }
}

#[derive(Clone, Debug, Parser)]
enum Args {
    /// Translate an HTML file into the language best matching an Accept-Language header.
    Translate {
        /// The JSON configuration file.
        #[arg(long, default_value = "i18n.json")]
        config: PathBuf,
        /// The Accept-Language header of the simulated request.
        #[arg(long, default_value = "")]
        accept_language: String,
        /// Write the translated page here instead of to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(id = "page.html")]
        input: PathBuf,
    },
    /// Load all catalogs and show how many messages are translated.
    Check {
        /// The JSON configuration file.
        #[arg(long, default_value = "i18n.json")]
        config: PathBuf,
    },
}

fn create_translator(config_file: &Path) -> anyhow::Result<Translator> {
    let config = Config::from_json_file(config_file)
        .with_context(|| format!("Could not read config from {}", config_file.display()))?;
    Translator::new(config).context("Could not load translations")
}

fn translate(
    config_file: &Path,
    accept_language: &str,
    input: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let translator = create_translator(config_file)?;
    let source =
        fs::read(input).with_context(|| format!("Could not read {}", input.display()))?;
    let page = translator
        .translate(&source, accept_language)
        .with_context(|| format!("Could not translate {}", input.display()))?;
    info!("{LANGUAGE_HEADER}: {}", page.language);
    if !page.missing.is_empty() {
        info!(
            "[{}] {} messages without translation",
            page.language,
            page.missing.len()
        );
    }

    match output {
        Some(path) => fs::write(path, &page.body)
            .with_context(|| format!("Could not write {}", path.display()))?,
        None => io::stdout()
            .write_all(page.body.as_bytes())
            .context("Could not write translated page")?,
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn check(config_file: &Path) -> anyhow::Result<()> {
    let translator = create_translator(config_file)?;
    for catalog in translator.catalogs() {
        println!(
            "{}: {} of {} messages translated",
            catalog.language(),
            catalog.translated_count(),
            catalog.messages().len()
        );
    }
    Ok(())
}
