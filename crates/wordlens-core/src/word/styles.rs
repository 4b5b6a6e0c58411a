//! Translation between the word style sheet and the CSS sheet.
//!
//! The get direction fills a CSS sheet from `styles.xml`; the put direction
//! diffs the edited CSS against the CSS derived from the current styles and
//! writes only what changed.

use super::formatting::{
    css_hex_color, word_get_border, word_get_run_properties, word_get_shd, word_put_border,
    word_put_run_properties, word_put_shd, BorderPut,
};
use super::numbering::WordNumbering;
use super::sheet::{family_for_selector, style_id_for_selector, StyleFamily, WordSheet};
use crate::css::length::{css_pts_from_twips, twips_from_css};
use crate::css::sheet::{CssProperties, CssSheet};
use crate::xml::dom::Document;
use crate::xml::tags::{
    Tag, WORD_AFTER, WORD_BEFORE, WORD_BOTTOM, WORD_ILVL, WORD_JC, WORD_LEFT, WORD_NUMID,
    WORD_NUMPR, WORD_OUTLINELVL, WORD_PBDR, WORD_PPR, WORD_RIGHT, WORD_RPR, WORD_SHD,
    WORD_SPACING, WORD_TOP, WORD_VAL,
};
use indextree::NodeId;

const BORDER_SIDES: [(Tag, &str); 4] = [
    (WORD_TOP, "top"),
    (WORD_BOTTOM, "bottom"),
    (WORD_LEFT, "left"),
    (WORD_RIGHT, "right"),
];

/// Derives the CSS sheet for the whole word style sheet.
pub fn build_css_sheet(word_sheet: &WordSheet, numbering: &WordNumbering) -> CssSheet {
    let mut css = CssSheet::new();
    for style in word_sheet.styles() {
        if !matches!(style.family, StyleFamily::Paragraph | StyleFamily::Character) {
            continue;
        }
        let selector = style.selector();
        let css_style = css.lookup(&selector, true, false).expect("style was added");
        let doc = word_sheet.document();

        if let Some(ppr) = doc.child_with_tag(style.element, WORD_PPR) {
            paragraph_properties_to_css(doc, ppr, &mut css_style.rule);
            if let Some(num_pr) = doc.child_with_tag(ppr, WORD_NUMPR) {
                numbering.numpr_to_css(doc, num_pr, css_style);
            }
        }
        if let Some(rpr) = doc.child_with_tag(style.element, WORD_RPR) {
            word_get_run_properties(doc, rpr, &mut css_style.rule);
        }
    }
    css
}

fn paragraph_properties_to_css(doc: &Document, ppr: NodeId, properties: &mut CssProperties) {
    if let Some(pbdr) = doc.child_with_tag(ppr, WORD_PBDR) {
        for (tag, side) in BORDER_SIDES {
            if let Some(border) = doc.child_with_tag(pbdr, tag) {
                word_get_border(doc, border, side, properties);
            }
        }
    }
    if let Some(shd) = doc.child_with_tag(ppr, WORD_SHD) {
        word_get_shd(doc, shd, properties);
    }
    if let Some(spacing) = doc.child_with_tag(ppr, WORD_SPACING) {
        if let Some(before) = doc
            .get_attribute(spacing, WORD_BEFORE)
            .and_then(|v| v.parse::<i64>().ok())
        {
            properties.put("margin-top", &css_pts_from_twips(before));
        }
        if let Some(after) = doc
            .get_attribute(spacing, WORD_AFTER)
            .and_then(|v| v.parse::<i64>().ok())
        {
            properties.put("margin-bottom", &css_pts_from_twips(after));
        }
    }
    if let Some(jc) = doc.get_child_attribute(ppr, WORD_JC, WORD_VAL) {
        let align = match jc {
            "both" => "justify",
            other => other,
        };
        properties.put("text-align", align);
    }
}

/// Applies an edited CSS sheet back onto `styles.xml`, creating styles for
/// new selectors and updating only the properties that changed.
pub fn apply_css_sheet(css: &CssSheet, word_sheet: &mut WordSheet, numbering: &WordNumbering) {
    let old_css = build_css_sheet(word_sheet, numbering);

    for selector in css.selectors() {
        let family = family_for_selector(&selector);
        if !matches!(family, StyleFamily::Paragraph | StyleFamily::Character) {
            continue;
        }
        let Some(new_style) = css.get(&selector) else { continue };
        let old_props = old_css
            .get(&selector)
            .map(|s| s.rule.clone())
            .unwrap_or_default();

        let style_id = style_id_for_selector(&selector);
        let element = word_sheet.add_style(family, &style_id, &style_id);
        if let Some(level) = new_style.heading_level() {
            ensure_outline_level(word_sheet.document_mut(), element, level);
        }

        let doc = word_sheet.document_mut();
        if family == StyleFamily::Paragraph {
            put_paragraph_properties(doc, element, &old_props, &new_style.rule);
        }
        put_character_properties(doc, element, &old_props, &new_style.rule);
    }
}

fn ensure_outline_level(doc: &mut Document, style_element: NodeId, level: u8) {
    let ppr = ensure_child(doc, style_element, WORD_PPR);
    let outline = ensure_child(doc, ppr, WORD_OUTLINELVL);
    doc.set_attribute(outline, WORD_VAL, &(level - 1).to_string());
}

fn ensure_child(doc: &mut Document, parent: NodeId, tag: Tag) -> NodeId {
    match doc.child_with_tag(parent, tag) {
        Some(child) => child,
        None => doc.create_child_element(parent, tag),
    }
}

fn remove_child_if_empty(doc: &mut Document, parent: NodeId, tag: Tag) {
    if let Some(child) = doc.child_with_tag(parent, tag) {
        if doc.first_child(child).is_none() && doc.node(child).attributes().is_empty() {
            doc.remove_node(child);
        }
    }
}

fn put_paragraph_properties(
    doc: &mut Document,
    style_element: NodeId,
    old: &CssProperties,
    new: &CssProperties,
) {
    let ppr = ensure_child(doc, style_element, WORD_PPR);

    // Borders.
    for (tag, side) in BORDER_SIDES {
        match word_put_border(doc, old, new, tag, side) {
            BorderPut::Unchanged => {}
            BorderPut::Remove => {
                if let Some(pbdr) = doc.child_with_tag(ppr, WORD_PBDR) {
                    if let Some(border) = doc.child_with_tag(pbdr, tag) {
                        doc.remove_node(border);
                    }
                }
            }
            BorderPut::Element(border) => {
                let pbdr = ensure_child(doc, ppr, WORD_PBDR);
                if let Some(existing) = doc.child_with_tag(pbdr, tag) {
                    doc.remove_node(existing);
                }
                doc.append_child(pbdr, border);
            }
        }
    }
    remove_child_if_empty(doc, ppr, WORD_PBDR);

    // Shading.
    if old.get("background-color") != new.get("background-color") {
        if let Some(existing) = doc.child_with_tag(ppr, WORD_SHD) {
            doc.remove_node(existing);
        }
        let hex = new.get("background-color").and_then(css_hex_color);
        if let Some(shd) = word_put_shd(doc, hex.as_deref()) {
            doc.append_child(ppr, shd);
        }
    }

    // Spacing.
    let old_spacing = (old.get("margin-top"), old.get("margin-bottom"));
    let new_spacing = (new.get("margin-top"), new.get("margin-bottom"));
    if old_spacing != new_spacing {
        if let Some(existing) = doc.child_with_tag(ppr, WORD_SPACING) {
            doc.remove_node(existing);
        }
        let before = new.get("margin-top").and_then(|v| twips_from_css(v, 0));
        let after = new.get("margin-bottom").and_then(|v| twips_from_css(v, 0));
        if before.is_some() || after.is_some() {
            let spacing = doc.create_child_element(ppr, WORD_SPACING);
            if let Some(before) = before {
                doc.set_attribute(spacing, WORD_BEFORE, &before);
            }
            if let Some(after) = after {
                doc.set_attribute(spacing, WORD_AFTER, &after);
            }
        }
    }

    // Alignment.
    if old.get("text-align") != new.get("text-align") {
        if let Some(existing) = doc.child_with_tag(ppr, WORD_JC) {
            doc.remove_node(existing);
        }
        if let Some(align) = new.get("text-align") {
            let value = match align {
                "justify" => "both",
                other => other,
            };
            let jc = doc.create_child_element(ppr, WORD_JC);
            doc.set_attribute(jc, WORD_VAL, value);
        }
    }

    // Numbering reference, written earlier into the CSS by the reconciler.
    let old_num = (old.get("-word-numId"), old.get("-word-ilvl"));
    let new_num = (new.get("-word-numId"), new.get("-word-ilvl"));
    if old_num != new_num {
        if let Some(existing) = doc.child_with_tag(ppr, WORD_NUMPR) {
            doc.remove_node(existing);
        }
        if let Some(num_id) = new.get("-word-numId") {
            let num_pr = doc.create_child_element(ppr, WORD_NUMPR);
            if let Some(ilvl) = new.get("-word-ilvl") {
                let ilvl_elem = doc.create_child_element(num_pr, WORD_ILVL);
                doc.set_attribute(ilvl_elem, WORD_VAL, ilvl);
            }
            let num_id_elem = doc.create_child_element(num_pr, WORD_NUMID);
            doc.set_attribute(num_id_elem, WORD_VAL, num_id);
        }
    }

    remove_child_if_empty(doc, style_element, WORD_PPR);
}

const CHARACTER_PROPS: [&str; 5] =
    ["font-weight", "font-style", "text-decoration", "color", "font-size"];

fn put_character_properties(
    doc: &mut Document,
    style_element: NodeId,
    old: &CssProperties,
    new: &CssProperties,
) {
    let differs = CHARACTER_PROPS.iter().any(|p| old.get(p) != new.get(p));
    if !differs {
        return;
    }
    if let Some(existing) = doc.child_with_tag(style_element, WORD_RPR) {
        doc.remove_node(existing);
    }
    if let Some(rpr) = word_put_run_properties(doc, new) {
        doc.append_child(style_element, rpr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::parse;

    #[test]
    fn styles_translate_to_css_and_back() {
        let styles_xml = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:style w:type="paragraph" w:styleId="Quote">
                <w:name w:val="Quote"/>
                <w:pPr>
                    <w:pBdr><w:top w:val="single" w:sz="8" w:color="FF0000"/></w:pBdr>
                    <w:shd w:val="clear" w:fill="EEEEEE"/>
                    <w:spacing w:before="240" w:after="120"/>
                    <w:jc w:val="both"/>
                </w:pPr>
                <w:rPr><w:b/></w:rPr>
            </w:style>
        </w:styles>"#;
        let sheet = WordSheet::from_document(parse(styles_xml).unwrap());
        let numbering = WordNumbering::new();
        let css = build_css_sheet(&sheet, &numbering);

        let quote = css.get("p.Quote").unwrap();
        assert_eq!(quote.rule.get("border-top-width"), Some("1pt"));
        assert_eq!(quote.rule.get("border-top-color"), Some("#FF0000"));
        assert_eq!(quote.rule.get("background-color"), Some("#EEEEEE"));
        assert_eq!(quote.rule.get("margin-top"), Some("12pt"));
        assert_eq!(quote.rule.get("margin-bottom"), Some("6pt"));
        assert_eq!(quote.rule.get("text-align"), Some("justify"));
        assert_eq!(quote.rule.get("font-weight"), Some("bold"));
    }

    #[test]
    fn new_selector_creates_a_style() {
        let mut sheet = WordSheet::new();
        let numbering = WordNumbering::new();
        let mut css = CssSheet::new();
        css.update_from_text("p.Alert { background-color: #FFEEEE; font-weight: bold }");

        apply_css_sheet(&css, &mut sheet, &numbering);

        let style = sheet.style_for_selector("p.Alert").unwrap();
        let doc = sheet.document();
        let ppr = doc.child_with_tag(style.element, WORD_PPR).unwrap();
        let shd = doc.child_with_tag(ppr, WORD_SHD).unwrap();
        assert_eq!(doc.get_attribute(shd, crate::xml::tags::WORD_FILL), Some("FFEEEE"));
        let rpr = doc.child_with_tag(style.element, WORD_RPR).unwrap();
        assert!(doc.child_with_tag(rpr, crate::xml::tags::WORD_B).is_some());
    }

    #[test]
    fn unchanged_styles_are_not_touched() {
        let styles_xml = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:style w:type="paragraph" w:styleId="Quote">
                <w:name w:val="Quote"/>
                <w:pPr><w:shd w:val="clear" w:fill="EEEEEE"/></w:pPr>
            </w:style>
        </w:styles>"#;
        let mut sheet = WordSheet::from_document(parse(styles_xml).unwrap());
        let numbering = WordNumbering::new();
        let css = build_css_sheet(&sheet, &numbering);
        let shd_before = {
            let style = sheet.style_for_selector("p.Quote").unwrap();
            let doc = sheet.document();
            let ppr = doc.child_with_tag(style.element, WORD_PPR).unwrap();
            doc.child_with_tag(ppr, WORD_SHD).unwrap()
        };

        apply_css_sheet(&css, &mut sheet, &numbering);

        let style = sheet.style_for_selector("p.Quote").unwrap();
        let doc = sheet.document();
        let ppr = doc.child_with_tag(style.element, WORD_PPR).unwrap();
        assert_eq!(doc.child_with_tag(ppr, WORD_SHD), Some(shd_before));
    }

    #[test]
    fn numbering_reference_is_written_into_ppr() {
        let mut sheet = WordSheet::new();
        let numbering = WordNumbering::new();
        let mut css = CssSheet::new();
        css.update_from_text("h2 { -word-numId: 7; -word-ilvl: 1 }");

        apply_css_sheet(&css, &mut sheet, &numbering);

        let style = sheet.style_for_selector("h2").unwrap();
        let doc = sheet.document();
        let ppr = doc.child_with_tag(style.element, WORD_PPR).unwrap();
        let num_pr = doc.child_with_tag(ppr, WORD_NUMPR).unwrap();
        assert_eq!(doc.get_child_attribute(num_pr, WORD_NUMID, WORD_VAL), Some("7"));
        assert_eq!(doc.get_child_attribute(num_pr, WORD_ILVL, WORD_VAL), Some("1"));
        // Heading styles carry their outline level.
        let outline = doc.child_with_tag(ppr, WORD_OUTLINELVL).unwrap();
        assert_eq!(doc.get_attribute(outline, WORD_VAL), Some("1"));
    }
}
