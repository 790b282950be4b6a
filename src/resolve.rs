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

//! Message resolution for a single translation pass.

use std::collections::HashSet;

use log::debug;
use unic_langid::LanguageIdentifier;

use crate::catalog::{Catalog, Message, MessageKey};
use crate::error::{Error, Result};

/// The bookkeeping of one translation pass over one page.
///
/// The catalog is only read. The messages looked up and the messages
/// found missing are collected here, so concurrent passes over the
/// same catalog never share mutable state.
pub struct TranslationPass<'a> {
    catalog: &'a Catalog,
    seen: HashSet<MessageKey>,
    missing: Vec<Message>,
}

/// What a finished pass learned about its catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassRecord {
    pub language: LanguageIdentifier,
    pub seen: HashSet<MessageKey>,
    pub missing: Vec<Message>,
}

impl<'a> TranslationPass<'a> {
    pub fn new(catalog: &'a Catalog) -> TranslationPass<'a> {
        TranslationPass {
            catalog,
            seen: HashSet::new(),
            missing: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn language(&self) -> &'a LanguageIdentifier {
        self.catalog.language()
    }

    /// Return the `msgstr` for `msgid` in context `msgctxt`.
    ///
    /// Every attempt marks the message as seen, whether it succeeds or
    /// not. An empty `msgid` translates to an empty string and is not
    /// recorded.
    pub fn resolve(&mut self, msgid: &str, msgctxt: &str) -> Result<&'a str> {
        if msgid.is_empty() {
            return Ok("");
        }
        self.seen.insert(MessageKey::new(msgid, msgctxt));
        self.catalog
            .lookup(msgid, msgctxt)
            .ok_or_else(|| Error::MissingTranslation {
                language: self.catalog.language().to_string(),
                msgid: String::from(msgid),
                msgctxt: String::from(msgctxt),
            })
    }

    /// Like [`resolve`](Self::resolve), but a miss is queued as a
    /// missing message instead of returned as an error.
    pub fn lookup(&mut self, msgid: &str, msgctxt: &str) -> Option<&'a str> {
        match self.resolve(msgid, msgctxt) {
            Ok(msgstr) => Some(msgstr),
            Err(err) => {
                debug!("{err}");
                self.missing.push(Message::placeholder(msgid, msgctxt));
                None
            }
        }
    }

    pub fn seen(&self) -> &HashSet<MessageKey> {
        &self.seen
    }

    /// Messages without a translation, in the order they were met.
    pub fn missing(&self) -> &[Message] {
        &self.missing
    }

    pub fn finish(self) -> PassRecord {
        PassRecord {
            language: self.catalog.language().clone(),
            seen: self.seen,
            missing: self.missing,
        }
    }
}
