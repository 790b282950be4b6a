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

//! Translate HTML marked up with translation markers.
//!
//! With the default marker names, the following conventions are
//! recognized:
//!
//! * `<i18n>text</i18n>` and `<span i18n>text</span>`: the inner HTML
//!   is a message. `i18n-context="..."` gives the message a context.
//! * `<div i18n-keep-on="fr">...</div>`: the element is only kept when
//!   serving French. The value is compared as a language tag, so
//!   `pt-br` also keeps the element when serving `pt-BR`.
//! * `<img i18n-attrs i18n:alt="A cat">`: the `alt` attribute is a
//!   message. With `i18n:commas:class="a,b"`, every comma-separated
//!   item is a message of its own.
//!
//! All markers are removed from the output.

use html5ever::{LocalName, Namespace, QualName};
use kuchiki::iter::NodeIterator;
use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef};
use unic_langid::LanguageIdentifier;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::resolve::TranslationPass;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Names of the markers, derived from the configured tag and
/// attribute names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    tag: String,
    attribute: String,
    context: String,
    keep_on: String,
    attrs: String,
    attribute_prefix: String,
    commas_prefix: String,
}

impl Default for Markers {
    fn default() -> Self {
        Markers::new("i18n", "i18n")
    }
}

/// How a translatable attribute value is split into messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    /// The whole value is one message.
    Whole,
    /// Every comma-separated item is a message.
    Commas,
}

/// A marked attribute such as `i18n:title` or `i18n:commas:class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedAttribute {
    /// The attribute name in the input, e.g. `i18n:title`.
    pub name: String,
    /// The attribute name in the output, e.g. `title`.
    pub target: String,
    pub mode: AttributeMode,
}

/// A marker found on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerKind {
    /// The element is the marker tag itself.
    Wrapper,
    /// The element carries the marker attribute.
    Flag,
    /// The message context of a translatable element.
    Context(String),
    /// The language the element is reserved to.
    KeepOn(String),
    /// The element has translatable attributes.
    Attrs,
    /// One translatable attribute.
    Attribute(MarkedAttribute),
}

impl Markers {
    pub fn new(tag: &str, attribute: &str) -> Markers {
        // The HTML parser lowercases tag and attribute names.
        let tag = tag.to_ascii_lowercase();
        let attribute = attribute.to_ascii_lowercase();
        Markers {
            context: format!("{attribute}-context"),
            keep_on: format!("{attribute}-keep-on"),
            attrs: format!("{attribute}-attrs"),
            attribute_prefix: format!("{attribute}:"),
            commas_prefix: format!("{attribute}:commas:"),
            tag,
            attribute,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Find all markers on `element`.
    pub fn classify(&self, element: &ElementData) -> Vec<MarkerKind> {
        let mut kinds = Vec::new();
        if *element.name.local == *self.tag {
            kinds.push(MarkerKind::Wrapper);
        }
        for (name, attribute) in element.attributes.borrow().map.iter() {
            if let Some(kind) = self.classify_attribute(&name.local, &attribute.value) {
                kinds.push(kind);
            }
        }
        kinds
    }

    fn classify_attribute(&self, name: &str, value: &str) -> Option<MarkerKind> {
        if name == self.attribute {
            return Some(MarkerKind::Flag);
        }
        if name == self.context {
            return Some(MarkerKind::Context(String::from(value)));
        }
        if name == self.keep_on {
            return Some(MarkerKind::KeepOn(String::from(value)));
        }
        if name == self.attrs {
            return Some(MarkerKind::Attrs);
        }
        let (target, mode) = match name.strip_prefix(&self.commas_prefix) {
            Some(target) => (target, AttributeMode::Commas),
            None => (name.strip_prefix(&self.attribute_prefix)?, AttributeMode::Whole),
        };
        if target.is_empty() {
            return None;
        }
        Some(MarkerKind::Attribute(MarkedAttribute {
            name: String::from(name),
            target: String::from(target),
            mode,
        }))
    }
}

/// Options for [`translate_page`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    pub markers: Markers,
    /// Add a `<script>` exposing the selected and source languages as
    /// `window.i18nLanguage` and `window.i18nSourceLanguage`.
    pub expose_to_js: bool,
}

/// Translate an HTML page or fragment with the catalog of `pass`.
///
/// The markers are removed in all cases. When the catalog is for the
/// source language, no message is looked up. Messages without a
/// translation keep their original text and are recorded as missing
/// in `pass`.
///
/// The only error is a page which is not valid UTF-8.
pub fn translate_page(
    source: &[u8],
    pass: &mut TranslationPass<'_>,
    options: &RewriteOptions,
) -> Result<String> {
    let html = std::str::from_utf8(source)?;
    let html = html.strip_prefix('\u{feff}').unwrap_or(html);
    let page = Page::parse(html);
    let markers = &options.markers;

    if options.expose_to_js {
        expose_language(&page, pass.catalog());
    }
    translate_contents(page.root(), pass, markers);
    remove_other_languages(page.root(), pass.language(), markers);
    translate_attributes(page.root(), pass, markers);

    let output = page.serialize();
    Ok(output
        .replace(&format!("<{}>", markers.tag), "")
        .replace(&format!("</{}>", markers.tag), ""))
}

/// A parsed page. Complete documents keep their `<html>`, `<head>`,
/// and `<body>` elements, while fragments are serialized without
/// them.
enum Page {
    Document(NodeRef),
    Fragment(Fragment),
}

impl Page {
    fn parse(html: &str) -> Page {
        if is_document(html) {
            Page::Document(kuchiki::parse_html().one(html))
        } else {
            Page::Fragment(Fragment::parse(html, &html_name("body")))
        }
    }

    fn root(&self) -> &NodeRef {
        match self {
            Page::Document(document) => document,
            Page::Fragment(fragment) => &fragment.root,
        }
    }

    fn serialize(&self) -> String {
        match self {
            Page::Document(document) => document.to_string(),
            Page::Fragment(fragment) => inner_html(&fragment.root),
        }
    }
}

/// HTML parsed as the content of an element.
struct Fragment {
    /// Keeps the tree alive.
    _document: NodeRef,
    /// The `<html>` element the parser puts the content in.
    root: NodeRef,
}

impl Fragment {
    fn parse(html: &str, context: &QualName) -> Fragment {
        let document = kuchiki::parse_fragment(context.clone(), Vec::new()).one(html);
        let root = document.first_child().unwrap_or_else(|| document.clone());
        Fragment {
            _document: document,
            root,
        }
    }

    /// Detach the parsed nodes from the fragment.
    fn into_nodes(self) -> Vec<NodeRef> {
        let nodes = self.root.children().collect::<Vec<_>>();
        for node in &nodes {
            node.detach();
        }
        nodes
    }
}

fn html_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(local))
}

/// Whether `html` is a complete document. A leading byte order mark,
/// whitespace and comments are skipped before looking for a doctype or
/// one of the document-level elements.
fn is_document(html: &str) -> bool {
    let mut rest = html.trim_start_matches('\u{feff}').trim_start();
    while let Some(comment) = rest.strip_prefix("<!--") {
        let Some(end) = comment.find("-->") else {
            return false;
        };
        rest = comment[end + "-->".len()..].trim_start();
    }
    let start = rest
        .bytes()
        .take(10)
        .map(|b| b.to_ascii_lowercase())
        .collect::<Vec<_>>();
    ["<!doctype", "<html", "<head", "<body"].iter().any(|prefix| {
        // `<header>` is not `<head>`.
        start
            .strip_prefix(prefix.as_bytes())
            .is_some_and(|after| {
                after
                    .first()
                    .map_or(true, |b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
            })
    })
}

fn elements(root: &NodeRef) -> Vec<NodeDataRef<ElementData>> {
    root.descendants().elements().collect()
}

fn inner_html(node: &NodeRef) -> String {
    node.children().map(|child| child.to_string()).collect()
}

fn set_inner_html(element: &NodeDataRef<ElementData>, html: &str) {
    let node = element.as_node();
    for child in node.children().collect::<Vec<_>>() {
        child.detach();
    }
    for child in Fragment::parse(html, &element.name).into_nodes() {
        node.append(child);
    }
}

/// Undo the escaping done by the serializer on text and attribute
/// values.
fn unescape_html(html: &str) -> String {
    const ENTITIES: [(&str, &str); 7] = [
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&apos;", "'"),
        ("&nbsp;", "\u{a0}"),
    ];
    let mut unescaped = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(pos) = rest.find('&') {
        unescaped.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, text)) => {
                unescaped.push_str(text);
                rest = &rest[entity.len()..];
            }
            None => {
                unescaped.push('&');
                rest = &rest[1..];
            }
        }
    }
    unescaped.push_str(rest);
    unescaped
}

fn language_script(catalog: &Catalog) -> Option<String> {
    // Serialize with serde_json to get properly quoted JS strings.
    let language = serde_json::to_string(&catalog.language().to_string()).ok()?;
    let source_language = serde_json::to_string(&catalog.source_language().to_string()).ok()?;
    Some(format!(
        "<script>window.i18nLanguage = {language}; \
         window.i18nSourceLanguage = {source_language};</script>"
    ))
}

fn expose_language(page: &Page, catalog: &Catalog) {
    let Some(script) = language_script(catalog) else {
        return;
    };
    match page.root().select_first("head") {
        Ok(head) => {
            for node in Fragment::parse(&script, &head.name).into_nodes() {
                head.as_node().append(node);
            }
        }
        Err(()) => {
            let root = page.root();
            for node in Fragment::parse(&script, &html_name("body"))
                .into_nodes()
                .into_iter()
                .rev()
            {
                root.prepend(node);
            }
        }
    }
}

/// Translate the inner HTML of elements marked with the marker tag or
/// the marker attribute.
fn translate_contents(root: &NodeRef, pass: &mut TranslationPass<'_>, markers: &Markers) {
    for element in elements(root) {
        let mut translatable = false;
        let mut context = String::new();
        for kind in markers.classify(&element) {
            match kind {
                MarkerKind::Wrapper | MarkerKind::Flag => translatable = true,
                MarkerKind::Context(value) => context = value,
                _ => {}
            }
        }
        if !translatable {
            continue;
        }

        {
            let mut attributes = element.attributes.borrow_mut();
            attributes.remove(markers.attribute.as_str());
            attributes.remove(markers.context.as_str());
        }

        if pass.catalog().is_source_language() {
            continue;
        }

        let msgid = unescape_html(&inner_html(element.as_node()));
        let msgid = msgid.trim();
        if msgid.is_empty() {
            continue;
        }
        if let Some(translated) = pass.lookup(msgid, &context) {
            set_inner_html(&element, translated);
        }
    }
}

/// Remove elements reserved to another language.
fn remove_other_languages(root: &NodeRef, language: &LanguageIdentifier, markers: &Markers) {
    for element in elements(root) {
        let keep_on = markers
            .classify(&element)
            .into_iter()
            .find_map(|kind| match kind {
                MarkerKind::KeepOn(value) => Some(value),
                _ => None,
            });
        let Some(keep_on) = keep_on else {
            continue;
        };

        element
            .attributes
            .borrow_mut()
            .remove(markers.keep_on.as_str());
        let kept = keep_on
            .trim()
            .parse::<LanguageIdentifier>()
            .is_ok_and(|tag| tag == *language);
        if !kept {
            element.as_node().detach();
        }
    }
}

/// Translate the marked attributes of elements with the attrs marker.
fn translate_attributes(root: &NodeRef, pass: &mut TranslationPass<'_>, markers: &Markers) {
    let translate = !pass.catalog().is_source_language();
    for element in elements(root) {
        let kinds = markers.classify(&element);
        if !kinds.contains(&MarkerKind::Attrs) {
            continue;
        }

        let mut attributes = element.attributes.borrow_mut();
        attributes.remove(markers.attrs.as_str());
        for kind in kinds {
            let MarkerKind::Attribute(attribute) = kind else {
                continue;
            };
            let value = attributes
                .remove(attribute.name.as_str())
                .map(|attribute| attribute.value)
                .unwrap_or_default();
            let value = match (translate, attribute.mode) {
                (false, _) => value,
                (true, AttributeMode::Whole) => translate_value(pass, &value),
                (true, AttributeMode::Commas) => value
                    .split(',')
                    .map(|item| translate_value(pass, item))
                    .collect::<Vec<_>>()
                    .join(",")
                    .trim_matches(',')
                    .to_string(),
            };
            attributes.insert(attribute.target.as_str(), value);
        }
    }
}

fn translate_value(pass: &mut TranslationPass<'_>, value: &str) -> String {
    match pass.lookup(value, "") {
        Some(translated) => String::from(translated),
        None => String::from(value),
    }
}
