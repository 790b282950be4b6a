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

use std::path::PathBuf;

use thiserror::Error;
use unic_langid::LanguageIdentifierError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "No languages provided. List the languages you support \
         (languages that have a LANGUAGE.po file in the translations directory)"
    )]
    NoLanguages,
    #[error("Translations directory {0:?} does not exist or is not a directory")]
    TranslationsDirectory(PathBuf),
    #[error("Invalid language code {tag:?}: {source}")]
    InvalidLanguage {
        tag: String,
        #[source]
        source: LanguageIdentifierError,
    },
    #[error("No translations found for language {language}: {path:?} does not exist")]
    MissingCatalog { language: String, path: PathBuf },
    #[error("While loading translations for {language} from {path:?}: {message}")]
    CatalogLoad {
        language: String,
        path: PathBuf,
        message: String,
    },
    #[error("While parsing output page HTML: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("Cannot find msgstr in {language} with msgid={msgid:?} and msgctxt={msgctxt:?}")]
    MissingTranslation {
        language: String,
        msgid: String,
        msgctxt: String,
    },
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
