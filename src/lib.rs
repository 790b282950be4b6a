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

//! Helpers for translating HTML responses.
//!
//! Pages mark their translatable text with a marker attribute or tag
//! (`i18n` by default):
//!
//! ```html
//! <p i18n>Hello</p>
//! <i18n>World</i18n>
//! <img i18n-attrs i18n:alt="A picture" src="picture.png">
//! <div i18n-keep-on="fr">Only shown in French</div>
//! ```
//!
//! The [`Translator`] selects a language from the `Accept-Language`
//! header, replaces the marked text with translations from GNU Gettext
//! PO files and strips the markers. Optionally, strings without a
//! translation are added to the PO files, so translators can keep up
//! with the source text.

pub mod catalog;
pub mod config;
pub mod error;
pub mod html;
pub mod language;
pub mod persist;
pub mod resolve;
pub mod translator;

pub use config::Config;
pub use error::{Error, Result};
pub use translator::{should_translate, TranslatedPage, Translator, LANGUAGE_HEADER};
