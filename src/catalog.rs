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

//! In-memory translation catalogs loaded from GNU Gettext PO files.
//!
//! A [`Catalog`] is a read-only view of one `LANGUAGE.po` file. It is
//! built once at startup and shared by every request served in that
//! language. Writing the file back happens separately, see
//! [`crate::persist`].

use std::collections::HashMap;
use std::panic;
use std::path::{Path, PathBuf};

use log::info;
use polib::message::{Message as PoMessage, MessageFlags, MessageView};
use polib::metadata::CatalogMetadata;
use polib::po_file;
use unic_langid::LanguageIdentifier;

use crate::error::{Error, Result};

/// Identity of a message within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub msgctxt: String,
    pub msgid: String,
}

impl MessageKey {
    pub fn new(msgid: &str, msgctxt: &str) -> MessageKey {
        MessageKey {
            msgctxt: String::from(msgctxt),
            msgid: String::from(msgid),
        }
    }
}

/// The plural part of a message. Plural messages are kept so they
/// survive a rewrite of the PO file, but they are never used to
/// translate HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralForms {
    pub msgid_plural: String,
    pub msgstr_plural: Vec<String>,
}

/// A single catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub msgctxt: String,
    pub msgid: String,
    /// Empty when the message is not translated yet.
    pub msgstr: String,
    pub plural: Option<PluralForms>,
    pub comments: String,
    pub source: String,
    pub fuzzy: bool,
}

impl Message {
    /// An untranslated placeholder, as added for newly discovered
    /// strings.
    pub fn placeholder(msgid: &str, msgctxt: &str) -> Message {
        Message {
            msgctxt: String::from(msgctxt),
            msgid: String::from(msgid),
            ..Message::default()
        }
    }

    pub fn key(&self) -> MessageKey {
        MessageKey::new(&self.msgid, &self.msgctxt)
    }

    pub fn is_translated(&self) -> bool {
        match &self.plural {
            Some(plural) => plural.msgstr_plural.iter().any(|msgstr| !msgstr.is_empty()),
            None => !self.msgstr.is_empty(),
        }
    }

    fn from_po(message: &dyn MessageView) -> Message {
        let plural = if message.is_plural() {
            Some(PluralForms {
                msgid_plural: message
                    .msgid_plural()
                    .map(String::from)
                    .unwrap_or_default(),
                msgstr_plural: message
                    .msgstr_plural()
                    .map(|forms| forms.to_vec())
                    .unwrap_or_default(),
            })
        } else {
            None
        };
        Message {
            msgctxt: String::from(message.msgctxt()),
            msgid: String::from(message.msgid()),
            msgstr: String::from(message.msgstr().unwrap_or_default()),
            plural,
            comments: String::from(message.comments()),
            source: String::from(message.source()),
            fuzzy: message.is_fuzzy(),
        }
    }

    pub(crate) fn to_po(&self) -> PoMessage {
        let mut flags = MessageFlags::new();
        if self.fuzzy {
            flags.add_flag("fuzzy");
        }
        match &self.plural {
            Some(plural) => PoMessage::build_plural()
                .with_comments(self.comments.clone())
                .with_source(self.source.clone())
                .with_flags(flags)
                .with_msgctxt(self.msgctxt.clone())
                .with_msgid(self.msgid.clone())
                .with_msgid_plural(plural.msgid_plural.clone())
                .with_msgstr_plural(plural.msgstr_plural.clone())
                .done(),
            None => PoMessage::build_singular()
                .with_comments(self.comments.clone())
                .with_source(self.source.clone())
                .with_flags(flags)
                .with_msgctxt(self.msgctxt.clone())
                .with_msgid(self.msgid.clone())
                .with_msgstr(self.msgstr.clone())
                .done(),
        }
    }
}

/// Translations for one target language.
pub struct Catalog {
    language: LanguageIdentifier,
    source_language: LanguageIdentifier,
    directory: PathBuf,
    metadata: CatalogMetadata,
    messages: Vec<Message>,
    /// Translated singular messages, by `msgctxt` and then `msgid`.
    /// Points at the first translated entry for a key.
    index: HashMap<String, HashMap<String, usize>>,
}

impl Catalog {
    /// Build a catalog from messages already in memory.
    pub fn new(
        language: LanguageIdentifier,
        source_language: LanguageIdentifier,
        directory: &Path,
        metadata: CatalogMetadata,
        messages: Vec<Message>,
    ) -> Catalog {
        let mut index: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for (idx, message) in messages.iter().enumerate() {
            if message.plural.is_some() || message.msgstr.is_empty() {
                continue;
            }
            index
                .entry(message.msgctxt.clone())
                .or_default()
                .entry(message.msgid.clone())
                .or_insert(idx);
        }
        Catalog {
            language,
            source_language,
            directory: directory.to_path_buf(),
            metadata,
            messages,
            index,
        }
    }

    /// Load `<directory>/<language>.po`.
    pub fn load(
        directory: &Path,
        language: &LanguageIdentifier,
        source_language: &LanguageIdentifier,
    ) -> Result<Catalog> {
        let path = po_path(directory, language);
        if !path.is_file() {
            return Err(Error::MissingCatalog {
                language: language.to_string(),
                path,
            });
        }

        let load_error = |message: String| Error::CatalogLoad {
            language: language.to_string(),
            path: path.clone(),
            message,
        };
        // polib panics on headers without the standard Gettext fields.
        let po = match panic::catch_unwind(|| po_file::parse(&path)) {
            Ok(Ok(po)) => po,
            Ok(Err(err)) => return Err(load_error(err.to_string())),
            Err(_) => {
                return Err(load_error(String::from(
                    "the PO header is missing required fields",
                )))
            }
        };
        let messages = po.messages().map(Message::from_po).collect();

        Ok(Catalog::new(
            language.clone(),
            source_language.clone(),
            directory,
            po.metadata,
            messages,
        ))
    }

    pub fn language(&self) -> &LanguageIdentifier {
        &self.language
    }

    pub fn source_language(&self) -> &LanguageIdentifier {
        &self.source_language
    }

    /// Translating into the source language leaves the text alone.
    pub fn is_source_language(&self) -> bool {
        self.language == self.source_language
    }

    pub fn metadata(&self) -> &CatalogMetadata {
        &self.metadata
    }

    /// Move the PO header out of the catalog, leaving an empty one.
    /// The header is only needed when the file is written back.
    pub fn take_metadata(&mut self) -> CatalogMetadata {
        std::mem::take(&mut self.metadata)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages with a non-empty translation.
    pub fn translated_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| message.is_translated())
            .count()
    }

    /// Find the translation of `msgid` in context `msgctxt`.
    ///
    /// Only translated messages are returned: untranslated
    /// placeholders are treated as absent.
    pub fn lookup(&self, msgid: &str, msgctxt: &str) -> Option<&str> {
        let idx = *self.index.get(msgctxt)?.get(msgid)?;
        Some(self.messages[idx].msgstr.as_str())
    }

    /// The `<directory>/<language>.po` file this catalog belongs to.
    pub fn po_path(&self) -> PathBuf {
        po_path(&self.directory, &self.language)
    }

    pub fn unused_messages_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}-unused-messages.yaml", self.language))
    }
}

fn po_path(directory: &Path, language: &LanguageIdentifier) -> PathBuf {
    directory.join(format!("{language}.po"))
}

/// Load one catalog per target language from `directory`.
///
/// The catalogs are returned in the order of `languages`. A missing or
/// malformed PO file is an error: we refuse to serve a language we
/// have no catalog for.
pub fn load_catalogs(
    directory: &Path,
    source_language: &LanguageIdentifier,
    languages: &[LanguageIdentifier],
) -> Result<Vec<Catalog>> {
    languages
        .iter()
        .map(|language| {
            let catalog = Catalog::load(directory, language, source_language)?;
            info!(
                "[{language}] loaded {} translations from {:?}",
                catalog.translated_count(),
                catalog.po_path()
            );
            Ok(catalog)
        })
        .collect()
}
