//! Complex-field simplification.
//!
//! Fields written as run sequences — `w:fldChar begin`, `w:instrText`
//! instruction runs, optionally `w:fldChar separate` plus value runs, then
//! `w:fldChar end` — are collapsed on load into a single `w:fldSimple`
//! carrying the instruction in `w:instr`. The field lens then only has to
//! understand one shape. Value runs become the fldSimple's children.

use crate::xml::dom::Document;
use crate::xml::tags::{
    WORD_FLDCHAR, WORD_FLDCHARTYPE, WORD_FLDSIMPLE, WORD_INSTR, WORD_INSTRTEXT, WORD_R,
};
use indextree::NodeId;

pub fn simplify_fields(doc: &mut Document) {
    let Some(root) = doc.root() else { return };
    simplify_in(doc, root);
}

fn simplify_in(doc: &mut Document, parent: NodeId) {
    for child in doc.child_nodes(parent) {
        if doc.node(child).is_element() {
            simplify_in(doc, child);
        }
    }
    while simplify_first_sequence(doc, parent) {}
}

fn fld_char_type<'a>(doc: &'a Document, node: NodeId) -> Option<&'a str> {
    if doc.tag(node) != WORD_R {
        return None;
    }
    let fld_char = doc.child_with_tag(node, WORD_FLDCHAR)?;
    doc.get_attribute(fld_char, WORD_FLDCHARTYPE)
}

fn instr_text(doc: &Document, node: NodeId) -> Option<String> {
    if doc.tag(node) != WORD_R {
        return None;
    }
    let instr = doc.child_with_tag(node, WORD_INSTRTEXT)?;
    Some(doc.text_content(instr))
}

fn simplify_first_sequence(doc: &mut Document, parent: NodeId) -> bool {
    let children = doc.child_nodes(parent);
    let begin = children
        .iter()
        .position(|&c| fld_char_type(doc, c) == Some("begin"));
    let Some(begin) = begin else { return false };

    let mut instruction = String::new();
    let mut separate: Option<usize> = None;
    let mut end: Option<usize> = None;
    for (offset, &child) in children.iter().enumerate().skip(begin + 1) {
        match fld_char_type(doc, child) {
            Some("separate") => separate = Some(offset),
            Some("end") => {
                end = Some(offset);
                break;
            }
            _ => {
                if separate.is_none() {
                    if let Some(text) = instr_text(doc, child) {
                        instruction.push_str(&text);
                    }
                }
            }
        }
    }
    let Some(end) = end else { return false };

    let field = doc.create_element(WORD_FLDSIMPLE);
    doc.set_attribute(field, WORD_INSTR, instruction.trim());
    doc.insert_before(parent, field, Some(children[begin]));

    // Value runs between separate and end become the field's content.
    if let Some(separate) = separate {
        for &value in &children[separate + 1..end] {
            doc.remove_node(value);
            doc.append_child(field, value);
        }
    }
    for &marker in &children[begin..=end] {
        if doc.parent(marker) == Some(parent) {
            doc.remove_node(marker);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::parse;
    use crate::xml::tags::WORD_P;

    #[test]
    fn collapses_begin_instr_end_into_fld_simple() {
        let xml = r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:r><w:fldChar w:fldCharType="begin"/></w:r>
            <w:r><w:instrText> PAGE </w:instrText></w:r>
            <w:r><w:fldChar w:fldCharType="separate"/></w:r>
            <w:r><w:t>3</w:t></w:r>
            <w:r><w:fldChar w:fldCharType="end"/></w:r>
            <w:r><w:t>after</w:t></w:r>
        </w:p>"#;
        let mut doc = parse(xml).unwrap();
        doc.strip_whitespace(doc.root().unwrap());
        simplify_fields(&mut doc);

        let p = doc.root().unwrap();
        assert_eq!(doc.tag(p), WORD_P);
        let children = doc.child_nodes(p);
        assert_eq!(children.len(), 2);
        let field = children[0];
        assert_eq!(doc.tag(field), WORD_FLDSIMPLE);
        assert_eq!(doc.get_attribute(field, WORD_INSTR), Some("PAGE"));
        // The value run is kept as the field's content.
        assert_eq!(doc.text_content(field), "3");
        assert_eq!(doc.tag(children[1]), WORD_R);
    }

    #[test]
    fn unterminated_fields_are_left_alone() {
        let xml = r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:r><w:fldChar w:fldCharType="begin"/></w:r>
            <w:r><w:instrText>PAGE</w:instrText></w:r>
        </w:p>"#;
        let mut doc = parse(xml).unwrap();
        doc.strip_whitespace(doc.root().unwrap());
        simplify_fields(&mut doc);
        let p = doc.root().unwrap();
        assert_eq!(doc.child_nodes(p).len(), 2);
    }
}
