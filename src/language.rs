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

//! Language negotiation based on an `Accept-Language` header.

use unic_langid::LanguageIdentifier;

use crate::error::{Error, Result};

/// Parse a language tag such as `fr` or `pt-BR`.
pub fn parse_language(tag: &str) -> Result<LanguageIdentifier> {
    tag.trim()
        .parse::<LanguageIdentifier>()
        .map_err(|source| Error::InvalidLanguage {
            tag: String::from(tag),
            source,
        })
}

/// One entry of an `Accept-Language` header.
#[derive(Debug, Clone, PartialEq)]
pub struct Preference {
    /// `None` for the `*` wildcard.
    pub language: Option<LanguageIdentifier>,
    pub quality: f32,
}

/// Parse an `Accept-Language` header into preferences, most preferred
/// first.
///
/// Entries look like `tag[;q=weight]`. A missing or malformed weight
/// counts as `1`. Entries with an unparsable tag or a weight of zero
/// are dropped. Entries with equal weights keep their header order.
pub fn parse_accept_language(header: &str) -> Vec<Preference> {
    let mut preferences = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let quality = parts
                .filter_map(|param| param.trim().strip_prefix("q="))
                .next()
                .and_then(|q| q.trim().parse::<f32>().ok())
                .filter(|q| q.is_finite())
                .unwrap_or(1.0)
                .clamp(0.0, 1.0);
            if quality <= 0.0 {
                return None;
            }
            let language = if tag == "*" {
                None
            } else {
                Some(tag.parse::<LanguageIdentifier>().ok()?)
            };
            Some(Preference { language, quality })
        })
        .collect::<Vec<_>>();
    // `sort_by` is stable, so equal weights keep their order.
    preferences.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    preferences
}

/// Select the best available language for the `Accept-Language`
/// header.
///
/// Each preference is tried in turn: first an exact match, then any
/// available language with the same primary language subtag (`fr-CA`
/// is served by `fr`, and `fr` by `fr-CA`). Without a match, the first
/// available language is returned. The result is `None` only when
/// `available` is empty.
pub fn negotiate<'a>(
    header: &str,
    available: &'a [LanguageIdentifier],
) -> Option<&'a LanguageIdentifier> {
    for preference in parse_accept_language(header) {
        let Some(requested) = &preference.language else {
            continue;
        };
        if let Some(exact) = available.iter().find(|tag| *tag == requested) {
            return Some(exact);
        }
        if let Some(same_language) = available
            .iter()
            .find(|tag| tag.language == requested.language)
        {
            return Some(same_language);
        }
    }
    available.first()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tags(tags: &[&str]) -> Vec<LanguageIdentifier> {
        tags.iter().map(|tag| parse_language(tag).unwrap()).collect()
    }

    fn negotiated(header: &str, available: &[&str]) -> Option<String> {
        negotiate(header, &tags(available)).map(|tag| tag.to_string())
    }

    #[test]
    fn test_parse_accept_language() {
        let preferences = parse_accept_language("fr;q=0.5, en-US, de;q=0.8, *;q=0.1");
        assert_eq!(
            preferences
                .iter()
                .map(|p| (p.language.as_ref().map(|l| l.to_string()), p.quality))
                .collect::<Vec<_>>(),
            vec![
                (Some(String::from("en-US")), 1.0),
                (Some(String::from("de")), 0.8),
                (Some(String::from("fr")), 0.5),
                (None, 0.1),
            ]
        );
    }

    #[test]
    fn test_parse_accept_language_skips_junk() {
        let preferences = parse_accept_language(",, fr;q=0, !!;q=0.3, da;q=abc");
        assert_eq!(preferences.len(), 1);
        assert_eq!(preferences[0].language, Some(parse_language("da").unwrap()));
        assert_eq!(preferences[0].quality, 1.0);
    }

    #[test]
    fn test_parse_language_canonicalizes() {
        assert_eq!(parse_language("pt-br").unwrap().to_string(), "pt-BR");
        assert_eq!(parse_language(" de_at ").unwrap().to_string(), "de-AT");
        assert!(parse_language("français").is_err());
    }

    #[test]
    fn test_negotiate_prefers_higher_weight() {
        assert_eq!(
            negotiated("fr;q=0.4, de;q=0.9", &["en", "fr", "de"]),
            Some(String::from("de"))
        );
    }

    #[test]
    fn test_negotiate_exact_before_language_fallback() {
        assert_eq!(
            negotiated("pt-BR", &["pt-PT", "pt-BR"]),
            Some(String::from("pt-BR"))
        );
    }

    #[test]
    fn test_negotiate_language_fallback() {
        assert_eq!(
            negotiated("fr-CA, en;q=0.5", &["en", "fr"]),
            Some(String::from("fr"))
        );
        assert_eq!(negotiated("de", &["en", "de-AT"]), Some(String::from("de-AT")));
    }

    #[test]
    fn test_negotiate_default() {
        assert_eq!(negotiated("ja, ko", &["fr", "en"]), Some(String::from("fr")));
        assert_eq!(negotiated("", &["fr", "en"]), Some(String::from("fr")));
        assert_eq!(negotiated("*", &["fr", "en"]), Some(String::from("fr")));
    }

    #[test]
    fn test_negotiate_nothing_available() {
        assert_eq!(negotiated("fr", &[]), None);
    }
}
