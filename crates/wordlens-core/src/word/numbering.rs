//! Numbering definitions and the CSS heading-counter reconciler.
//!
//! `numbering.xml` holds abstract definitions of up to nine levels and
//! concrete definitions referencing them. The reconciler keeps those
//! definitions in sync with the CSS heading `content:` rules the editor may
//! have changed, rebuilding all six heading levels when coverage is partial.

use crate::css::content::{parse_content, ContentPart};
use crate::css::sheet::{CssSheet, CssStyle};
use crate::word::sheet::{family_for_selector, StyleFamily, WordSheet};
use crate::xml::dom::Document;
use crate::xml::tags::{
    WORD_ABSTRACTNUM, WORD_ABSTRACTNUMID, WORD_ILVL, WORD_LVL, WORD_LVLTEXT, WORD_NUM,
    WORD_NUMBERING, WORD_NUMFMT, WORD_NUMID, WORD_NUMPR, WORD_PPR, WORD_START, WORD_VAL,
};
use indextree::NodeId;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct NumberingLevel {
    pub ilvl: u32,
    pub num_fmt: String,
    pub lvl_text: String,
    pub start: u32,
    pub element: NodeId,
}

#[derive(Debug, Clone)]
pub struct AbstractNum {
    pub id: String,
    pub levels: BTreeMap<u32, NumberingLevel>,
    pub element: NodeId,
}

#[derive(Debug, Clone)]
pub struct ConcreteNum {
    pub num_id: String,
    pub abstract_id: String,
    pub element: NodeId,
}

pub struct WordNumbering {
    doc: Document,
    abstracts: BTreeMap<String, AbstractNum>,
    concretes: BTreeMap<String, ConcreteNum>,
}

pub fn num_fmt_for_list_style_type(list_style_type: &str) -> &'static str {
    match list_style_type {
        "upper-roman" | "upperRoman" => "upperRoman",
        "lower-roman" | "lowerRoman" => "lowerRoman",
        "upper-alpha" | "upper-latin" | "upperLetter" => "upperLetter",
        "lower-alpha" | "lower-latin" | "lowerLetter" => "lowerLetter",
        "none" => "none",
        _ => "decimal",
    }
}

pub fn list_style_type_for_num_fmt(num_fmt: &str) -> Option<&'static str> {
    match num_fmt {
        "decimal" => Some("decimal"),
        "upperRoman" => Some("upper-roman"),
        "lowerRoman" => Some("lower-roman"),
        "upperLetter" => Some("upper-alpha"),
        "lowerLetter" => Some("lower-alpha"),
        _ => None,
    }
}

impl WordNumbering {
    pub fn new() -> Self {
        Self {
            doc: Document::new_with_root(WORD_NUMBERING),
            abstracts: BTreeMap::new(),
            concretes: BTreeMap::new(),
        }
    }

    pub fn from_document(doc: Document) -> Self {
        let mut abstracts = BTreeMap::new();
        let mut concretes = BTreeMap::new();
        if let Some(root) = doc.root() {
            for child in doc.children(root) {
                match doc.tag(child) {
                    WORD_ABSTRACTNUM => {
                        let Some(id) = doc.get_attribute(child, WORD_ABSTRACTNUMID) else {
                            continue;
                        };
                        let mut levels = BTreeMap::new();
                        for lvl in doc.children(child) {
                            if doc.tag(lvl) != WORD_LVL {
                                continue;
                            }
                            let ilvl: u32 = doc
                                .get_attribute(lvl, WORD_ILVL)
                                .and_then(|v| v.parse().ok())
                                .unwrap_or(0);
                            let num_fmt = doc
                                .get_child_attribute(lvl, WORD_NUMFMT, WORD_VAL)
                                .unwrap_or("decimal")
                                .to_string();
                            let lvl_text = doc
                                .get_child_attribute(lvl, WORD_LVLTEXT, WORD_VAL)
                                .unwrap_or_default()
                                .to_string();
                            let start = doc
                                .get_child_attribute(lvl, WORD_START, WORD_VAL)
                                .and_then(|v| v.parse().ok())
                                .unwrap_or(1);
                            levels.insert(
                                ilvl,
                                NumberingLevel { ilvl, num_fmt, lvl_text, start, element: lvl },
                            );
                        }
                        abstracts.insert(
                            id.to_string(),
                            AbstractNum { id: id.to_string(), levels, element: child },
                        );
                    }
                    WORD_NUM => {
                        let Some(num_id) = doc.get_attribute(child, WORD_NUMID) else { continue };
                        let Some(abstract_id) =
                            doc.get_child_attribute(child, WORD_ABSTRACTNUMID, WORD_VAL)
                        else {
                            continue;
                        };
                        concretes.insert(
                            num_id.to_string(),
                            ConcreteNum {
                                num_id: num_id.to_string(),
                                abstract_id: abstract_id.to_string(),
                                element: child,
                            },
                        );
                    }
                    _ => {}
                }
            }
        }
        Self { doc, abstracts, concretes }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn concrete_with_id(&self, num_id: &str) -> Option<&ConcreteNum> {
        self.concretes.get(num_id)
    }

    pub fn abstract_with_id(&self, abstract_id: &str) -> Option<&AbstractNum> {
        self.abstracts.get(abstract_id)
    }

    pub fn level_for_concrete(&self, num_id: &str, ilvl: u32) -> Option<&NumberingLevel> {
        let concrete = self.concretes.get(num_id)?;
        self.abstracts.get(&concrete.abstract_id)?.levels.get(&ilvl)
    }

    fn next_numeric_id<K>(map: &BTreeMap<String, K>) -> String {
        let next = map
            .keys()
            .filter_map(|k| k.parse::<u32>().ok())
            .max()
            .map(|max| max + 1)
            .unwrap_or(1);
        next.to_string()
    }

    /// Allocates a fresh abstract definition. Abstract definitions precede
    /// concrete ones in the part.
    pub fn create_abstract_num(&mut self) -> String {
        let id = Self::next_numeric_id(&self.abstracts);
        let root = self.doc.root().expect("numbering document has a root");
        let element = self.doc.create_element(WORD_ABSTRACTNUM);
        self.doc.set_attribute(element, WORD_ABSTRACTNUMID, &id);
        let first_num = self.doc.child_with_tag(root, WORD_NUM);
        self.doc.insert_before(root, element, first_num);
        self.abstracts.insert(
            id.clone(),
            AbstractNum { id: id.clone(), levels: BTreeMap::new(), element },
        );
        id
    }

    pub fn add_concrete_with_abstract(&mut self, abstract_id: &str) -> String {
        let num_id = Self::next_numeric_id(&self.concretes);
        let root = self.doc.root().expect("numbering document has a root");
        let element = self.doc.create_child_element(root, WORD_NUM);
        self.doc.set_attribute(element, WORD_NUMID, &num_id);
        let reference = self.doc.create_child_element(element, WORD_ABSTRACTNUMID);
        self.doc.set_attribute(reference, WORD_VAL, abstract_id);
        self.concretes.insert(
            num_id.clone(),
            ConcreteNum {
                num_id: num_id.clone(),
                abstract_id: abstract_id.to_string(),
                element,
            },
        );
        num_id
    }

    /// Creates one level under an abstract definition. The type is a CSS
    /// list-style-type; the format string uses `%N` placeholders.
    pub fn create_level(
        &mut self,
        abstract_id: &str,
        list_style_type: &str,
        lvl_text: &str,
        ilvl: u32,
    ) {
        let Some(abstract_num) = self.abstracts.get_mut(abstract_id) else { return };
        let element = self.doc.create_child_element(abstract_num.element, WORD_LVL);
        self.doc.set_attribute(element, WORD_ILVL, &ilvl.to_string());
        let start = self.doc.create_child_element(element, WORD_START);
        self.doc.set_attribute(start, WORD_VAL, "1");
        let num_fmt = num_fmt_for_list_style_type(list_style_type);
        let fmt = self.doc.create_child_element(element, WORD_NUMFMT);
        self.doc.set_attribute(fmt, WORD_VAL, num_fmt);
        let text = self.doc.create_child_element(element, WORD_LVLTEXT);
        self.doc.set_attribute(text, WORD_VAL, lvl_text);
        abstract_num.levels.insert(
            ilvl,
            NumberingLevel {
                ilvl,
                num_fmt: num_fmt.to_string(),
                lvl_text: lvl_text.to_string(),
                start: 1,
                element,
            },
        );
    }

    /// Translates a level format string into a CSS `content:` value:
    /// literals become quoted strings, `%N` placeholders become
    /// `counter(hN[, type])`. A trailing space literal is appended when the
    /// format does not end in whitespace.
    pub fn level_text_to_css_content(&self, num_id: &str, lvl_text: &str) -> String {
        let mut parts: Vec<ContentPart> = Vec::new();
        let chars: Vec<char> = lvl_text.chars().collect();
        let mut pos = 0;
        let mut start = 0;
        let mut ends_with_whitespace = false;

        let flush = |parts: &mut Vec<ContentPart>, text: &[char], ends: &mut bool| {
            if text.is_empty() {
                return;
            }
            let literal: String = text.iter().collect();
            *ends = literal.chars().last().map(char::is_whitespace).unwrap_or(false);
            parts.push(ContentPart::String(literal));
        };

        while pos < chars.len() {
            if chars[pos] == '%'
                && pos + 1 < chars.len()
                && ('1'..='6').contains(&chars[pos + 1])
            {
                flush(&mut parts, &chars[start..pos], &mut ends_with_whitespace);
                let ilvl = chars[pos + 1] as u32 - '1' as u32;
                let name = format!("h{}", ilvl + 1);
                let style = self
                    .level_for_concrete(num_id, ilvl)
                    .and_then(|level| list_style_type_for_num_fmt(&level.num_fmt))
                    .filter(|&t| t != "decimal")
                    .map(str::to_string);
                parts.push(ContentPart::Counter { name, style });
                ends_with_whitespace = false;
                pos += 2;
                start = pos;
            } else {
                pos += 1;
            }
        }
        flush(&mut parts, &chars[start..pos], &mut ends_with_whitespace);

        if !parts.is_empty() && !ends_with_whitespace {
            parts.push(ContentPart::String(" ".to_string()));
        }
        crate::css::content::format_content(&parts)
    }

    /// Fills a CSS style's counter rules from a paragraph's `w:numPr`.
    pub fn numpr_to_css(&self, doc: &Document, num_pr: NodeId, style: &mut CssStyle) {
        let Some(num_id) = doc.get_child_attribute(num_pr, WORD_NUMID, WORD_VAL) else { return };
        let ilvl: u32 = doc
            .get_child_attribute(num_pr, WORD_ILVL, WORD_VAL)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        if self.concrete_with_id(num_id).is_none() {
            return;
        }

        if let Some(level) = self.level_for_concrete(num_id, ilvl) {
            if !level.lvl_text.is_empty() {
                let content = self.level_text_to_css_content(num_id, &level.lvl_text);
                style.before.put("content", &content);
            }
        }

        style.rule.put("counter-increment", &format!("h{}", ilvl + 1));
        let reset: Vec<String> = ((ilvl + 1)..6).map(|i| format!("h{}", i + 1)).collect();
        if !reset.is_empty() {
            style.rule.put("counter-reset", &reset.join(" "));
        }
    }
}

impl Default for WordNumbering {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default, Clone)]
struct NumInfo {
    css_type: Option<String>,
    css_lvl_text: Option<String>,
    word_num_id: Option<String>,
    word_ilvl: Option<String>,
}

/// Reconciles the numbering part with the CSS heading content rules.
///
/// When CSS requests numbering on some heading level but the word side does
/// not cover all six levels, a fresh abstract/concrete pair is created and
/// six chained levels are synthesised. `-word-numId` / `-word-ilvl` are then
/// written back into the CSS rules so a later get reproduces the state.
pub fn update_numbering(
    numbering: &mut WordNumbering,
    css: &mut CssSheet,
    word_sheet: &WordSheet,
) {
    let mut info_by_selector: BTreeMap<String, NumInfo> = BTreeMap::new();
    let mut css_level_numbered = [false; 6];
    let mut word_level_numbered = [false; 6];

    for selector in css.selectors() {
        if family_for_selector(&selector) != StyleFamily::Paragraph {
            continue;
        }
        let mut info = NumInfo::default();

        let style = css.get(&selector).cloned();
        if let Some(style) = &style {
            if let Some(content) = style.before.get("content") {
                if let Some(level) = style.heading_level() {
                    css_level_numbered[(level - 1) as usize] = true;
                }
                let mut format = String::new();
                for part in parse_content(content) {
                    match part {
                        ContentPart::Counter { name, style: counter_style } => {
                            if name == style.element_name {
                                info.css_type =
                                    Some(counter_style.unwrap_or_else(|| "decimal".to_string()));
                            }
                            let mut chars = name.chars();
                            if name.len() == 2 && chars.next() == Some('h') {
                                if let Some(digit) = chars.next().filter(char::is_ascii_digit) {
                                    format.push('%');
                                    format.push(digit);
                                }
                            }
                        }
                        ContentPart::String(text) => {
                            format.push_str(&text.replace('%', ""));
                        }
                    }
                }
                if format.ends_with(char::is_whitespace) {
                    format.pop();
                }
                info.css_lvl_text = Some(format);
            }
        }

        if let Some(word_style) = word_sheet.style_for_selector(&selector) {
            let doc = word_sheet.document();
            let num_pr = doc
                .child_with_tag(word_style.element, WORD_PPR)
                .and_then(|ppr| doc.child_with_tag(ppr, WORD_NUMPR));
            if let Some(num_pr) = num_pr {
                if let Some(num_id) = doc.get_child_attribute(num_pr, WORD_NUMID, WORD_VAL) {
                    let ilvl = doc
                        .get_child_attribute(num_pr, WORD_ILVL, WORD_VAL)
                        .unwrap_or("0");
                    if numbering
                        .level_for_concrete(num_id, ilvl.parse().unwrap_or(0))
                        .is_some()
                    {
                        info.word_num_id = Some(num_id.to_string());
                        info.word_ilvl = Some(ilvl.to_string());
                        if let Ok(value) = ilvl.parse::<usize>() {
                            if value < 6 {
                                word_level_numbered[value] = true;
                            }
                        }
                    }
                }
            }
        }

        info_by_selector.insert(selector, info);
    }

    // A CSS style without level text contributes no numbering; drop any
    // stale word references so they disappear from the style sheet.
    for info in info_by_selector.values_mut() {
        if info.css_lvl_text.is_none() {
            info.word_num_id = None;
            info.word_ilvl = None;
        }
    }

    let total_css = css_level_numbered.iter().filter(|&&b| b).count();
    let total_word = word_level_numbered.iter().filter(|&&b| b).count();

    if total_css > 0 && total_word < 6 {
        // Partial coverage: recreate the whole six-level ladder.
        let abstract_id = numbering.create_abstract_num();
        let num_id = numbering.add_concrete_with_abstract(&abstract_id);

        let mut style_by_level: [Option<CssStyle>; 6] = Default::default();
        for style in css.styles() {
            let Some(level) = style.heading_level() else { continue };
            let slot = &mut style_by_level[(level - 1) as usize];
            if slot.is_some() {
                continue;
            }
            match style.before.get("content") {
                Some(content) if content != "none" && content != "\"\"" && !content.is_empty() => {
                    *slot = Some(style.clone());
                }
                _ => {}
            }
        }

        let mut prev_type: Option<String> = None;
        let mut prev_lvl_text: Option<String> = None;
        for (i, slot) in style_by_level.iter().enumerate() {
            let mut cur_type = None;
            let mut cur_lvl_text = None;
            let selector = slot.as_ref().map(|s| s.selector.clone());
            if let Some(selector) = &selector {
                let info = info_by_selector.entry(selector.clone()).or_default();
                cur_type = info.css_type.clone();
                cur_lvl_text = info.css_lvl_text.clone();
            }

            let cur_type = cur_type
                .or_else(|| prev_type.clone())
                .unwrap_or_else(|| "decimal".to_string());
            let cur_lvl_text = match cur_lvl_text.filter(|t| !t.is_empty()) {
                Some(text) => text,
                None => match prev_lvl_text.as_deref().filter(|t| !t.is_empty()) {
                    Some(prev) => format!("{}.%{}", prev, i + 1),
                    None => format!("%{}", i + 1),
                },
            };

            numbering.create_level(&abstract_id, &cur_type, &cur_lvl_text, i as u32);

            if let Some(selector) = &selector {
                let info = info_by_selector.entry(selector.clone()).or_default();
                info.word_num_id = Some(num_id.clone());
                info.word_ilvl = Some(i.to_string());
            }

            prev_type = Some(cur_type);
            prev_lvl_text = Some(cur_lvl_text);
        }
    }

    for (selector, info) in &info_by_selector {
        let Some(style) = css.lookup(selector, false, false) else { continue };
        style.rule.put_opt("-word-numId", info.word_num_id.as_deref());
        match info.word_ilvl.as_deref() {
            Some("0") | None => style.rule.remove("-word-ilvl"),
            Some(ilvl) => style.rule.put("-word-ilvl", ilvl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::parse;

    const NUMBERING_XML: &str = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
        <w:abstractNum w:abstractNumId="0">
            <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1"/></w:lvl>
            <w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="upperRoman"/><w:lvlText w:val="%1.%2"/></w:lvl>
        </w:abstractNum>
        <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
    </w:numbering>"#;

    #[test]
    fn parses_abstract_and_concrete_definitions() {
        let numbering = WordNumbering::from_document(parse(NUMBERING_XML).unwrap());
        let concrete = numbering.concrete_with_id("1").unwrap();
        assert_eq!(concrete.abstract_id, "0");
        let level = numbering.level_for_concrete("1", 1).unwrap();
        assert_eq!(level.num_fmt, "upperRoman");
        assert_eq!(level.lvl_text, "%1.%2");
        assert!(numbering.level_for_concrete("1", 5).is_none());
        assert!(numbering.level_for_concrete("9", 0).is_none());
    }

    #[test]
    fn level_text_translates_to_counters() {
        let numbering = WordNumbering::from_document(parse(NUMBERING_XML).unwrap());
        assert_eq!(
            numbering.level_text_to_css_content("1", "%1.%2"),
            "counter(h1) \".\" counter(h2,upper-roman) \" \""
        );
        assert_eq!(numbering.level_text_to_css_content("1", "%1 "), "counter(h1) \" \"");
    }

    #[test]
    fn fresh_ids_continue_the_sequence() {
        let mut numbering = WordNumbering::from_document(parse(NUMBERING_XML).unwrap());
        let abstract_id = numbering.create_abstract_num();
        assert_eq!(abstract_id, "1");
        let num_id = numbering.add_concrete_with_abstract(&abstract_id);
        assert_eq!(num_id, "2");
        numbering.create_level(&abstract_id, "upper-roman", "%1", 0);
        assert_eq!(numbering.level_for_concrete("2", 0).unwrap().num_fmt, "upperRoman");
    }

    #[test]
    fn partial_word_coverage_triggers_full_rebuild() {
        let mut numbering = WordNumbering::from_document(parse(NUMBERING_XML).unwrap());
        let word_sheet = WordSheet::new();
        let mut css = CssSheet::new();
        css.update_from_text(
            "h1::before { content: counter(h1) \" \" }\n\
             h2::before { content: counter(h1) \".\" counter(h2) \" \" }",
        );

        update_numbering(&mut numbering, &mut css, &word_sheet);

        let h1 = css.get("h1").unwrap();
        let num_id = h1.rule.get("-word-numId").unwrap().to_string();
        assert!(h1.rule.get("-word-ilvl").is_none());
        let h2 = css.get("h2").unwrap();
        assert_eq!(h2.rule.get("-word-numId"), Some(num_id.as_str()));
        assert_eq!(h2.rule.get("-word-ilvl"), Some("1"));

        for ilvl in 0..6 {
            assert!(numbering.level_for_concrete(&num_id, ilvl).is_some());
        }
        assert_eq!(numbering.level_for_concrete(&num_id, 0).unwrap().lvl_text, "%1");
        assert_eq!(numbering.level_for_concrete(&num_id, 1).unwrap().lvl_text, "%1.%2");
        // Levels the CSS did not cover chain off the previous one.
        assert_eq!(numbering.level_for_concrete(&num_id, 2).unwrap().lvl_text, "%1.%2.%3");
        assert_eq!(
            numbering.level_for_concrete(&num_id, 5).unwrap().lvl_text,
            "%1.%2.%3.%4.%5.%6"
        );
    }
}
