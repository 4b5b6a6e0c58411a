//! `w:smartTag` ↔ a transparent container span.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{
    always_visible, create_none, paragraph_content, remove_children, word_container_get,
    word_container_put, WordLens,
};
use crate::xml::tags::{HTML_CLASS, HTML_SPAN, WORD_SMARTTAGPR};
use indextree::NodeId;

pub const CONTAINER_CLASS: &str = "uxwrite-container";

fn smart_tag_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    let span = ctx.create_abstract(HTML_SPAN, Some(concrete));
    ctx.html.set_attribute(span, HTML_CLASS, CONTAINER_CLASS);
    word_container_get(ctx, &paragraph_content::LENS, span, concrete);
    Some(span)
}

fn smart_tag_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    word_container_put(ctx, &paragraph_content::LENS, abstract_node, concrete);

    // An existing smartTagPr must stay the first child.
    if let Some(pr) = ctx.concrete.child_with_tag(concrete, WORD_SMARTTAGPR) {
        let first = ctx.concrete.first_child(concrete);
        if first != Some(pr) {
            ctx.concrete.insert_before(concrete, pr, first);
        }
    }
}

fn smart_tag_remove(ctx: &mut WordPutContext, concrete: NodeId) {
    remove_children(ctx, &paragraph_content::LENS, concrete);
}

pub static LENS: WordLens = WordLens {
    is_visible: always_visible,
    get: smart_tag_get,
    put: smart_tag_put,
    create: create_none,
    remove: smart_tag_remove,
};
