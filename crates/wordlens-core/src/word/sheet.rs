//! The word style sheet: named formatting definitions from `styles.xml`.
//!
//! Styles address the HTML side through CSS selectors: `Heading1..6` map to
//! `h1..h6`, the default paragraph style to `p`, everything else to
//! `element.StyleId`.

use crate::xml::dom::Document;
use crate::xml::tags::{
    WORD_BASEDON, WORD_NAME, WORD_STYLE, WORD_STYLES, WORD_TYPE, WORD_VAL,
};
use indextree::NodeId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StyleFamily {
    Paragraph,
    Character,
    Table,
    Special,
}

impl StyleFamily {
    pub fn from_type_attr(value: &str) -> Self {
        match value {
            "paragraph" => Self::Paragraph,
            "character" => Self::Character,
            "table" => Self::Table,
            _ => Self::Special,
        }
    }

    pub fn type_attr(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Character => "character",
            Self::Table => "table",
            Self::Special => "numbering",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WordStyle {
    pub family: StyleFamily,
    pub style_id: String,
    pub name: String,
    pub based_on: Option<String>,
    pub element: NodeId,
}

impl WordStyle {
    pub fn selector(&self) -> String {
        match self.family {
            StyleFamily::Paragraph => match self.style_id.as_str() {
                "Heading1" => "h1".to_string(),
                "Heading2" => "h2".to_string(),
                "Heading3" => "h3".to_string(),
                "Heading4" => "h4".to_string(),
                "Heading5" => "h5".to_string(),
                "Heading6" => "h6".to_string(),
                "Normal" => "p".to_string(),
                other => format!("p.{}", other),
            },
            StyleFamily::Character => match self.style_id.as_str() {
                "DefaultParagraphFont" => "span".to_string(),
                other => format!("span.{}", other),
            },
            StyleFamily::Table => match self.style_id.as_str() {
                "TableNormal" => "table".to_string(),
                other => format!("table.{}", other),
            },
            StyleFamily::Special => self.style_id.clone(),
        }
    }
}

pub fn family_for_selector(selector: &str) -> StyleFamily {
    let element = selector.split('.').next().unwrap_or(selector);
    match element {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "figure" => StyleFamily::Paragraph,
        "span" | "a" => StyleFamily::Character,
        "table" | "caption" => StyleFamily::Table,
        _ => StyleFamily::Special,
    }
}

pub fn style_id_for_selector(selector: &str) -> String {
    match selector {
        "h1" => "Heading1".to_string(),
        "h2" => "Heading2".to_string(),
        "h3" => "Heading3".to_string(),
        "h4" => "Heading4".to_string(),
        "h5" => "Heading5".to_string(),
        "h6" => "Heading6".to_string(),
        "p" => "Normal".to_string(),
        "span" => "DefaultParagraphFont".to_string(),
        "table" => "TableNormal".to_string(),
        other => match other.split_once('.') {
            Some((_, class)) => class.to_string(),
            None => other.to_string(),
        },
    }
}

pub struct WordSheet {
    doc: Document,
    styles: BTreeMap<(StyleFamily, String), WordStyle>,
}

impl WordSheet {
    pub fn new() -> Self {
        Self {
            doc: Document::new_with_root(WORD_STYLES),
            styles: BTreeMap::new(),
        }
    }

    pub fn from_document(doc: Document) -> Self {
        let mut styles = BTreeMap::new();
        if let Some(root) = doc.root() {
            for child in doc.children(root) {
                if doc.tag(child) != WORD_STYLE {
                    continue;
                }
                let family = doc
                    .get_attribute(child, WORD_TYPE)
                    .map(StyleFamily::from_type_attr)
                    .unwrap_or(StyleFamily::Paragraph);
                let Some(style_id) = doc.get_attribute(child, crate::xml::tags::WORD_STYLEID)
                else {
                    continue;
                };
                let style_id = style_id.to_string();
                let name = doc
                    .get_child_attribute(child, WORD_NAME, WORD_VAL)
                    .unwrap_or(style_id.as_str())
                    .to_string();
                let based_on = doc
                    .get_child_attribute(child, WORD_BASEDON, WORD_VAL)
                    .map(str::to_string);
                styles.insert(
                    (family, style_id.clone()),
                    WordStyle { family, style_id, name, based_on, element: child },
                );
            }
        }
        Self { doc, styles }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn styles(&self) -> impl Iterator<Item = &WordStyle> {
        self.styles.values()
    }

    pub fn get(&self, family: StyleFamily, style_id: &str) -> Option<&WordStyle> {
        self.styles.get(&(family, style_id.to_string()))
    }

    pub fn style_for_selector(&self, selector: &str) -> Option<&WordStyle> {
        let family = family_for_selector(selector);
        let style_id = style_id_for_selector(selector);
        self.get(family, &style_id)
    }

    /// Adds a style element and registers it; an existing style with the
    /// same identity is returned unchanged.
    pub fn add_style(&mut self, family: StyleFamily, style_id: &str, name: &str) -> NodeId {
        if let Some(existing) = self.get(family, style_id) {
            return existing.element;
        }
        let root = self.doc.root().expect("styles document has a root");
        let element = self.doc.create_child_element(root, WORD_STYLE);
        self.doc.set_attribute(element, WORD_TYPE, family.type_attr());
        self.doc
            .set_attribute(element, crate::xml::tags::WORD_STYLEID, style_id);
        let name_child = self.doc.create_child_element(element, WORD_NAME);
        self.doc.set_attribute(name_child, WORD_VAL, name);
        self.styles.insert(
            (family, style_id.to_string()),
            WordStyle {
                family,
                style_id: style_id.to_string(),
                name: name.to_string(),
                based_on: None,
                element,
            },
        );
        element
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

impl Default for WordSheet {
    fn default() -> Self {
        Self::new()
    }
}
