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

//! Write catalogs back to disk.
//!
//! A [`CatalogWriter`] owns the on-disk state of one PO file: the
//! messages as last written, and the messages seen by all passes
//! merged into it. Newly discovered messages are added as untranslated
//! placeholders so translators can fill them in.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use polib::catalog::Catalog as PoCatalog;
use polib::metadata::CatalogMetadata;
use polib::po_file;
use tempfile::NamedTempFile;
use unic_langid::LanguageIdentifier;

use crate::catalog::{Catalog, Message, MessageKey};
use crate::error::Result;
use crate::resolve::PassRecord;

pub struct CatalogWriter {
    language: LanguageIdentifier,
    po_path: PathBuf,
    unused_messages_path: PathBuf,
    metadata: CatalogMetadata,
    messages: Vec<Message>,
    seen: HashSet<MessageKey>,
    missing: Vec<Message>,
}

impl CatalogWriter {
    /// Create a writer for the file `catalog` was loaded from. The
    /// `metadata` becomes the header of the written file, see
    /// [`Catalog::take_metadata`].
    pub fn new(catalog: &Catalog, metadata: CatalogMetadata) -> CatalogWriter {
        CatalogWriter {
            language: catalog.language().clone(),
            po_path: catalog.po_path(),
            unused_messages_path: catalog.unused_messages_path(),
            metadata,
            messages: catalog.messages().to_vec(),
            seen: HashSet::new(),
            missing: Vec::new(),
        }
    }

    pub fn language(&self) -> &LanguageIdentifier {
        &self.language
    }

    /// The messages as they were last written.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Add what a translation pass learned. Seen messages accumulate
    /// until the writer is dropped, missing messages until the next
    /// [`save`](Self::save).
    pub fn merge(&mut self, record: PassRecord) {
        self.seen.extend(record.seen);
        self.missing.extend(record.missing);
    }

    /// Rewrite the PO file with the missing messages added.
    ///
    /// Untranslated messages which were never seen are dropped, the
    /// missing messages are appended as placeholders, and duplicates
    /// are removed, keeping the first entry. The messages are sorted
    /// by `msgid` and then `msgctxt` so the file is stable across
    /// runs.
    pub fn save(&mut self) -> Result<()> {
        let mut messages = std::mem::take(&mut self.messages);
        messages.retain(|message| message.is_translated() || self.seen.contains(&message.key()));
        messages.append(&mut self.missing);

        let mut keys = HashSet::new();
        messages.retain(|message| keys.insert(message.key()));
        messages.sort_by(|a, b| (&a.msgid, &a.msgctxt).cmp(&(&b.msgid, &b.msgctxt)));
        self.messages = messages;

        let mut catalog = PoCatalog::new(std::mem::take(&mut self.metadata));
        for message in &self.messages {
            catalog.append_or_update(message.to_po());
        }
        let written = write_atomically(&self.po_path, |path| po_file::write(&catalog, path));
        self.metadata = catalog.metadata;
        written
    }

    /// Messages which no pass has looked up.
    pub fn unused_messages(&self) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|message| !self.seen.contains(&message.key()))
            .collect()
    }

    /// Write the unused messages to `<language>-unused-messages.yaml`
    /// and return how many there are. The file is removed when there
    /// are none.
    pub fn write_unused_messages(&self) -> Result<usize> {
        let unused = self.unused_messages();
        if unused.is_empty() {
            match fs::remove_file(&self.unused_messages_path) {
                Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err.into()),
                _ => return Ok(0),
            }
        }

        let mut report = format!("# Generated at {}\n", Local::now().to_rfc3339());
        for message in &unused {
            report.push_str(&unused_entry(message));
        }
        write_atomically(&self.unused_messages_path, |path| fs::write(path, &report))?;
        Ok(unused.len())
    }
}

fn yaml_string(text: &str) -> String {
    // A JSON string is also a valid double-quoted YAML scalar.
    serde_json::Value::from(text).to_string()
}

fn unused_entry(message: &Message) -> String {
    if message.msgctxt.is_empty() {
        format!("- {}\n", yaml_string(&message.msgid))
    } else {
        format!(
            "- {{msgid: {}, msgctxt: {}}}\n",
            yaml_string(&message.msgid),
            yaml_string(&message.msgctxt)
        )
    }
}

/// Write `path` through a temporary file in the same directory, so
/// readers never see a partially written file.
fn write_atomically(path: &Path, write: impl FnOnce(&Path) -> io::Result<()>) -> Result<()> {
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let file = NamedTempFile::new_in(directory)?;
    write(file.path())?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{po_header, FR_PO};
    use crate::language::parse_language;
    use crate::resolve::TranslationPass;
    use pretty_assertions::assert_eq;

    fn load(directory: &Path) -> Catalog {
        Catalog::load(
            directory,
            &parse_language("fr").unwrap(),
            &parse_language("en").unwrap(),
        )
        .unwrap()
    }

    fn create_writer(catalog: &mut Catalog) -> CatalogWriter {
        let metadata = catalog.take_metadata();
        CatalogWriter::new(catalog, metadata)
    }

    fn record(catalog: &Catalog, lookups: &[(&str, &str)]) -> PassRecord {
        let mut pass = TranslationPass::new(catalog);
        for (msgid, msgctxt) in lookups {
            pass.lookup(msgid, msgctxt);
        }
        pass.finish()
    }

    fn keys(messages: &[Message]) -> Vec<(&str, &str, &str)> {
        messages
            .iter()
            .map(|message| {
                (
                    message.msgid.as_str(),
                    message.msgctxt.as_str(),
                    message.msgstr.as_str(),
                )
            })
            .collect()
    }

    #[test]
    fn test_save_adds_missing_and_sorts() {
        let tmpdir = tempfile::tempdir().unwrap();
        fs::write(tmpdir.path().join("fr.po"), FR_PO).unwrap();
        let mut catalog = load(tmpdir.path());

        let mut writer = create_writer(&mut catalog);
        writer.merge(record(
            &catalog,
            &[("works", ""), ("Zebra", ""), ("Apple", "fruit"), ("Zebra", "")],
        ));
        writer.save().unwrap();

        let saved = load(tmpdir.path());
        // "Pending" was never seen and has no translation, so it is
        // gone. The missing messages are added once each.
        assert_eq!(
            keys(saved.messages()),
            vec![
                ("Apple", "fruit", ""),
                ("File", "menu", "Fichier"),
                ("Hello", "", "Bonjour"),
                ("Maybe", "", "Peut-être"),
                ("One apple", "", ""),
                ("Zebra", "", ""),
                ("works", "", "marche"),
            ]
        );
        assert_eq!(keys(writer.messages()), keys(saved.messages()));

        let maybe = &saved.messages()[3];
        assert!(maybe.fuzzy);
        let apples = &saved.messages()[4];
        assert!(apples.plural.is_some());
        assert_eq!(saved.lookup("File", "menu"), Some("Fichier"));
    }

    #[test]
    fn test_save_keeps_seen_placeholders() {
        let tmpdir = tempfile::tempdir().unwrap();
        fs::write(tmpdir.path().join("fr.po"), FR_PO).unwrap();
        let mut catalog = load(tmpdir.path());

        let mut writer = create_writer(&mut catalog);
        writer.merge(record(&catalog, &[("Pending", "")]));
        writer.save().unwrap();

        let saved = load(tmpdir.path());
        assert_eq!(
            saved
                .messages()
                .iter()
                .filter(|message| message.msgid == "Pending")
                .count(),
            1
        );
    }

    #[test]
    fn test_save_deduplicates() {
        let tmpdir = tempfile::tempdir().unwrap();
        fs::write(
            tmpdir.path().join("fr.po"),
            po_header("fr")
                + "msgid \"Hello\"\nmsgstr \"Bonjour\"\n\n\
                   msgctxt \"greeting\"\nmsgid \"Hello\"\nmsgstr \"Salut\"\n",
        )
        .unwrap();
        let mut catalog = load(tmpdir.path());

        let mut writer = create_writer(&mut catalog);
        writer.merge(record(&catalog, &[("Hello", ""), ("Hello", "greeting")]));
        writer.merge(PassRecord {
            missing: vec![
                Message::placeholder("Hello", ""),
                Message::placeholder("Bye", ""),
                Message::placeholder("Bye", ""),
            ],
            ..PassRecord::default()
        });
        writer.save().unwrap();

        assert_eq!(
            keys(writer.messages()),
            vec![
                ("Bye", "", ""),
                ("Hello", "", "Bonjour"),
                ("Hello", "greeting", "Salut"),
            ]
        );
    }

    #[test]
    fn test_save_is_idempotent() {
        let tmpdir = tempfile::tempdir().unwrap();
        fs::write(tmpdir.path().join("fr.po"), FR_PO).unwrap();
        let mut catalog = load(tmpdir.path());
        let path = catalog.po_path();

        let mut writer = create_writer(&mut catalog);
        writer.merge(record(&catalog, &[("works", ""), ("New", "")]));
        writer.save().unwrap();
        let first = fs::read_to_string(&path).unwrap();
        writer.save().unwrap();
        let second = fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
        // The header survives repeated saves.
        let saved = load(tmpdir.path());
        assert_eq!(saved.metadata().project_id_version, "html-i18n-helpers tests");
        assert_eq!(saved.metadata().language_team, "French");

        // A fresh writer over the saved file produces the same file.
        let mut saved = load(tmpdir.path());
        let mut writer = create_writer(&mut saved);
        writer.merge(record(&saved, &[("works", ""), ("New", "")]));
        writer.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_unused_messages() {
        let tmpdir = tempfile::tempdir().unwrap();
        fs::write(tmpdir.path().join("fr.po"), FR_PO).unwrap();
        let mut catalog = load(tmpdir.path());

        let mut writer = create_writer(&mut catalog);
        // Both hits and misses count as used.
        writer.merge(record(&catalog, &[("works", ""), ("Pending", ""), ("Nope", "")]));
        assert_eq!(
            writer
                .unused_messages()
                .iter()
                .map(|message| message.msgid.as_str())
                .collect::<Vec<_>>(),
            vec!["Hello", "File", "Maybe", "One apple"]
        );

        let count = writer.write_unused_messages().unwrap();
        assert_eq!(count, 4);
        let report = fs::read_to_string(catalog.unused_messages_path()).unwrap();
        let mut lines = report.lines();
        assert!(lines.next().unwrap().starts_with("# Generated at "));
        assert_eq!(
            lines.collect::<Vec<_>>(),
            vec![
                r#"- "Hello""#,
                r#"- {msgid: "File", msgctxt: "menu"}"#,
                r#"- "Maybe""#,
                r#"- "One apple""#,
            ]
        );
    }

    #[test]
    fn test_unused_messages_report_removed_when_empty() {
        let tmpdir = tempfile::tempdir().unwrap();
        fs::write(
            tmpdir.path().join("fr.po"),
            po_header("fr")
                + "msgid \"Say \\\"hi\\\"\"\nmsgstr \"Dis \\\"salut\\\"\"\n",
        )
        .unwrap();
        let mut catalog = load(tmpdir.path());
        let report_path = catalog.unused_messages_path();

        let mut writer = create_writer(&mut catalog);
        assert_eq!(writer.write_unused_messages().unwrap(), 1);
        let report = fs::read_to_string(&report_path).unwrap();
        assert!(report.ends_with("- \"Say \\\"hi\\\"\"\n"));

        writer.merge(record(&catalog, &[("Say \"hi\"", "")]));
        assert_eq!(writer.write_unused_messages().unwrap(), 0);
        assert!(!report_path.exists());
        // Removing a report which does not exist is fine.
        assert_eq!(writer.write_unused_messages().unwrap(), 0);
    }
}
