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

//! The translation engine.
//!
//! A [`Translator`] is provisioned once from a [`Config`] and then
//! shared by all requests. Translating a page only reads the catalogs.
//! When catalog updates are enabled, the messages found by each page
//! are merged into the catalog's writer, one language at a time.

use std::sync::{Mutex, PoisonError};

use log::{error, info, warn};
use unic_langid::LanguageIdentifier;

use crate::catalog::{load_catalogs, Catalog, Message};
use crate::config::Config;
use crate::error::Result;
use crate::html::{translate_page, RewriteOptions};
use crate::language::negotiate;
use crate::persist::CatalogWriter;
use crate::resolve::{PassRecord, TranslationPass};

/// The response header carrying the selected language.
pub const LANGUAGE_HEADER: &str = "Language";

/// Only successful or redirecting HTML responses are translated.
pub fn should_translate(status: u16, content_type: &str) -> bool {
    (200..400).contains(&status)
        && content_type
            .trim_start()
            .to_ascii_lowercase()
            .starts_with("text/html")
}

/// The result of [`Translator::translate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPage {
    /// The negotiated language, to be sent in [`LANGUAGE_HEADER`].
    pub language: LanguageIdentifier,
    pub body: String,
    /// Messages on the page without a translation.
    pub missing: Vec<Message>,
}

struct LanguageCatalog {
    catalog: Catalog,
    writer: Mutex<CatalogWriter>,
}

pub struct Translator {
    languages: Vec<LanguageIdentifier>,
    catalogs: Vec<LanguageCatalog>,
    options: RewriteOptions,
    update_translations: bool,
}

impl Translator {
    /// Validate `config` and load a catalog for every language.
    pub fn new(config: Config) -> Result<Translator> {
        let languages = config.validate()?;
        let catalogs = load_catalogs(&config.translations, &languages.source, &languages.targets)?
            .into_iter()
            .map(|mut catalog| {
                let metadata = catalog.take_metadata();
                LanguageCatalog {
                    writer: Mutex::new(CatalogWriter::new(&catalog, metadata)),
                    catalog,
                }
            })
            .collect();
        Ok(Translator {
            languages: languages.targets,
            catalogs,
            options: RewriteOptions {
                markers: config.markers(),
                expose_to_js: config.expose_to_js,
            },
            update_translations: config.update_translations,
        })
    }

    /// The target languages, in configuration order.
    pub fn languages(&self) -> &[LanguageIdentifier] {
        &self.languages
    }

    pub fn catalogs(&self) -> impl Iterator<Item = &Catalog> {
        self.catalogs.iter().map(|entry| &entry.catalog)
    }

    /// The catalog best matching an `Accept-Language` header.
    pub fn negotiate(&self, accept_language: &str) -> &Catalog {
        &self.catalogs[self.negotiate_index(accept_language)].catalog
    }

    fn negotiate_index(&self, accept_language: &str) -> usize {
        // `Config::validate` guarantees at least one language, so
        // index 0 always exists.
        negotiate(accept_language, &self.languages)
            .and_then(|language| self.languages.iter().position(|tag| tag == language))
            .unwrap_or(0)
    }

    /// Translate an HTML page for the given `Accept-Language` header.
    ///
    /// Failing to update the catalog files is logged and does not
    /// affect the returned page.
    pub fn translate(&self, source: &[u8], accept_language: &str) -> Result<TranslatedPage> {
        let catalog = self.negotiate(accept_language);
        let mut pass = TranslationPass::new(catalog);
        let body = translate_page(source, &mut pass, &self.options)?;
        let record = pass.finish();
        let missing = record.missing.clone();
        if self.update_translations {
            self.update_catalog(record);
        }
        Ok(TranslatedPage {
            language: catalog.language().clone(),
            body,
            missing,
        })
    }

    /// Merge `record` into its catalog's writer, save the PO file and
    /// refresh the unused-message report.
    ///
    /// Passes for the same language are serialized. Errors are logged.
    pub fn update_catalog(&self, record: PassRecord) {
        let language = record.language.clone();
        let Some(entry) = self
            .catalogs
            .iter()
            .find(|entry| entry.catalog.language() == &language)
        else {
            warn!("[{language}] no catalog to update");
            return;
        };

        let mut writer = entry.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.merge(record);
        if let Err(err) = writer.save() {
            error!(
                "[{language}] could not save {:?}: {err}",
                entry.catalog.po_path()
            );
        }
        match writer.write_unused_messages() {
            Ok(0) => {}
            Ok(count) => info!(
                "[{language}] {count} unused messages listed in {:?}",
                entry.catalog.unused_messages_path()
            ),
            Err(err) => error!(
                "[{language}] could not write {:?}: {err}",
                entry.catalog.unused_messages_path()
            ),
        }
    }
}
