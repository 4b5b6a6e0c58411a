//! `w:fldSimple` ↔ a field span carrying the instruction as its text.
//!
//! The field's cached value runs stay as hidden children of the concrete
//! element and survive puts untouched.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{always_visible, remove_noop, WordLens};
use crate::xml::tags::{HTML_CLASS, HTML_SPAN, WORD_FLDSIMPLE, WORD_INSTR};
use indextree::NodeId;

pub const FIELD_CLASS: &str = "uxwrite-field";

fn field_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    let span = ctx.create_abstract(HTML_SPAN, Some(concrete));
    ctx.html.set_attribute(span, HTML_CLASS, FIELD_CLASS);
    if let Some(instr) = ctx.concrete.get_attribute(concrete, WORD_INSTR) {
        let instr = instr.to_string();
        let text = ctx.html.create_text(&instr);
        ctx.html.append_child(span, text);
    }
    Some(span)
}

fn field_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    let instr = ctx.html.text_content(abstract_node);
    if ctx.concrete.get_attribute(concrete, WORD_INSTR) != Some(instr.as_str()) {
        ctx.concrete.set_attribute(concrete, WORD_INSTR, &instr);
    }
}

fn field_create(ctx: &mut WordPutContext, abstract_node: NodeId) -> Option<NodeId> {
    let instr = ctx.html.text_content(abstract_node);
    let concrete = ctx.concrete.create_element(WORD_FLDSIMPLE);
    ctx.concrete.set_attribute(concrete, WORD_INSTR, &instr);
    Some(concrete)
}

pub static LENS: WordLens = WordLens {
    is_visible: always_visible,
    get: field_get,
    put: field_put,
    create: field_create,
    remove: remove_noop,
};
