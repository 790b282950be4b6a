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

//! Configuration of the translation engine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use unic_langid::LanguageIdentifier;

use crate::error::{Error, Result};
use crate::html::Markers;
use crate::language::parse_language;

/// Engine configuration, usually read from a JSON file.
///
/// Every field has a default so a configuration only needs to list
/// the `languages`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The directory where the PO files are stored. The files must be
    /// named `LANGUAGE.po`, where `LANGUAGE` is one of `languages`.
    pub translations: PathBuf,
    /// The HTML attribute marking the inner content of an element as
    /// translatable.
    pub html_attribute: String,
    /// The HTML tag whose inner content is translatable.
    pub html_tag: String,
    /// The language the untranslated responses are written in.
    pub source_language: String,
    /// The target languages we should attempt to translate to.
    pub languages: Vec<String>,
    /// Update the PO files with new translatable strings found in the
    /// HTML and write a report of unused messages.
    pub update_translations: bool,
    /// Expose the selected language to JavaScript with a `<script>`.
    pub expose_to_js: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            translations: PathBuf::from("i18n"),
            html_attribute: String::from("i18n"),
            html_tag: String::from("i18n"),
            source_language: String::from("en"),
            languages: Vec::new(),
            update_translations: false,
            expose_to_js: false,
        }
    }
}

/// Language tags of a validated [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Languages {
    pub source: LanguageIdentifier,
    /// Target languages in configuration order. The first one is the
    /// fallback when negotiation finds no match.
    pub targets: Vec<LanguageIdentifier>,
}

impl Config {
    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn markers(&self) -> Markers {
        Markers::new(&self.html_tag, &self.html_attribute)
    }

    /// Check the configuration and parse the language tags.
    ///
    /// This refuses configurations we cannot serve: no languages, a
    /// missing translations directory, or malformed language tags.
    pub fn validate(&self) -> Result<Languages> {
        if self.languages.is_empty() {
            return Err(Error::NoLanguages);
        }

        if !self.translations.is_dir() {
            return Err(Error::TranslationsDirectory(self.translations.clone()));
        }

        let source = parse_language(&self.source_language)?;
        let targets = self
            .languages
            .iter()
            .map(|tag| parse_language(tag))
            .collect::<Result<Vec<_>>>()?;

        Ok(Languages { source, targets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config: Config = serde_json::from_str(r#"{"languages": ["fr"]}"#).unwrap();
        assert_eq!(
            config,
            Config {
                languages: vec![String::from("fr")],
                ..Config::default()
            }
        );
        assert_eq!(config.translations, PathBuf::from("i18n"));
        assert_eq!(config.source_language, "en");
        assert!(!config.update_translations);
    }

    #[test]
    fn test_from_json_file() {
        let tmpdir = tempfile::tempdir().unwrap();
        let path = tmpdir.path().join("i18n.json");
        fs::write(
            &path,
            r#"{
                "translations": "po",
                "html_attribute": "data-i18n",
                "html_tag": "t",
                "source_language": "fr",
                "languages": ["en", "de"],
                "update_translations": true,
                "expose_to_js": true
            }"#,
        )
        .unwrap();

        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.translations, PathBuf::from("po"));
        assert_eq!(config.html_attribute, "data-i18n");
        assert_eq!(config.html_tag, "t");
        assert_eq!(config.languages, vec!["en", "de"]);
        assert!(config.update_translations);
        assert!(config.expose_to_js);
    }

    #[test]
    fn test_from_json_file_malformed() {
        let tmpdir = tempfile::tempdir().unwrap();
        let path = tmpdir.path().join("i18n.json");
        fs::write(&path, r#"{"languages": "fr"}"#).unwrap();
        assert!(matches!(
            Config::from_json_file(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate() {
        let tmpdir = tempfile::tempdir().unwrap();
        let config = Config {
            translations: tmpdir.path().to_path_buf(),
            languages: vec![String::from("fr"), String::from("pt-br")],
            ..Config::default()
        };
        let languages = config.validate().unwrap();
        assert_eq!(languages.source.to_string(), "en");
        assert_eq!(
            languages
                .targets
                .iter()
                .map(|tag| tag.to_string())
                .collect::<Vec<_>>(),
            vec!["fr", "pt-BR"]
        );
    }

    #[test]
    fn test_validate_no_languages() {
        let tmpdir = tempfile::tempdir().unwrap();
        let config = Config {
            translations: tmpdir.path().to_path_buf(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::NoLanguages)));
    }

    #[test]
    fn test_validate_missing_directory() {
        let tmpdir = tempfile::tempdir().unwrap();
        let config = Config {
            translations: tmpdir.path().join("does-not-exist"),
            languages: vec![String::from("fr")],
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::TranslationsDirectory(_))
        ));
    }

    #[test]
    fn test_validate_invalid_language() {
        let tmpdir = tempfile::tempdir().unwrap();
        let config = Config {
            translations: tmpdir.path().to_path_buf(),
            languages: vec![String::from("fr"), String::from("not a tag")],
            ..Config::default()
        };
        match config.validate() {
            Err(Error::InvalidLanguage { tag, .. }) => assert_eq!(tag, "not a tag"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
