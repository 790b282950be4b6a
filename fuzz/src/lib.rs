use arbitrary::Arbitrary;
use html_i18n_helpers::catalog::{Catalog, Message};
use html_i18n_helpers::language::parse_language;
use polib::metadata::CatalogMetadata;
use std::path::Path;

/// Generate a random Catalog for fuzzing.
pub fn create_catalog(language: Language, translations: Vec<(&str, &str, &str)>) -> Catalog {
    let messages = translations
        .iter()
        .map(|(msgid, msgctxt, msgstr)| Message {
            msgstr: String::from(*msgstr),
            ..Message::placeholder(msgid, msgctxt)
        })
        .collect();
    let source_language = parse_language("en").unwrap();
    let language = match language {
        Language::Source => source_language.clone(),
        Language::Target => parse_language("fr").unwrap(),
    };
    Catalog::new(
        language,
        source_language,
        Path::new("i18n"),
        CatalogMetadata::new(),
        messages,
    )
}

/// Whether the fuzzed catalog translates into the source language.
#[derive(Arbitrary, Debug, Clone, Copy)]
pub enum Language {
    Source,
    Target,
}
