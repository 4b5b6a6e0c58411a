//! `w:bookmarkStart` ↔ a collapsed bookmark span.
//!
//! The start marker is the visible node; the matching `w:bookmarkEnd` is
//! structural and rides the hidden-sibling fixup, so a range keeps
//! bracketing the same content across edits. The registry tracks id ↔ name.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{always_visible, WordLens};
use crate::xml::tags::{
    HTML_CLASS, HTML_DATA_BOOKMARK_ID, HTML_DATA_BOOKMARK_NAME, HTML_SPAN, WORD_BOOKMARKSTART,
    WORD_ID, WORD_NAME,
};
use indextree::NodeId;

pub const BOOKMARK_CLASS: &str = "uxwrite-bookmark";

fn bookmark_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    let span = ctx.create_abstract(HTML_SPAN, Some(concrete));
    ctx.html.set_attribute(span, HTML_CLASS, BOOKMARK_CLASS);
    if let Some(id) = ctx.concrete.get_attribute(concrete, WORD_ID) {
        let id = id.to_string();
        ctx.html.set_attribute(span, HTML_DATA_BOOKMARK_ID, &id);
    }
    if let Some(name) = ctx.concrete.get_attribute(concrete, WORD_NAME) {
        let name = name.to_string();
        ctx.html.set_attribute(span, HTML_DATA_BOOKMARK_NAME, &name);
    }
    Some(span)
}

fn bookmark_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    if let Some(id) = ctx.html.get_attribute(abstract_node, HTML_DATA_BOOKMARK_ID) {
        let id = id.to_string();
        ctx.concrete.set_attribute(concrete, WORD_ID, &id);
    }
    if let Some(name) = ctx.html.get_attribute(abstract_node, HTML_DATA_BOOKMARK_NAME) {
        let name = name.to_string();
        ctx.concrete.set_attribute(concrete, WORD_NAME, &name);
        let id = ctx.concrete.get_attribute(concrete, WORD_ID).map(str::to_string);
        ctx.objects.register(&name, id.as_deref(), Some(concrete));
    }
}

fn bookmark_create(ctx: &mut WordPutContext, abstract_node: NodeId) -> Option<NodeId> {
    let name = ctx
        .html
        .get_attribute(abstract_node, HTML_DATA_BOOKMARK_NAME)?
        .to_string();
    let id = ctx
        .html
        .get_attribute(abstract_node, HTML_DATA_BOOKMARK_ID)
        .map(str::to_string);

    let concrete = ctx.concrete.create_element(WORD_BOOKMARKSTART);
    let id = ctx.objects.register(&name, id.as_deref(), Some(concrete));
    ctx.concrete.set_attribute(concrete, WORD_ID, &id);
    ctx.concrete.set_attribute(concrete, WORD_NAME, &name);
    Some(concrete)
}

fn bookmark_remove(ctx: &mut WordPutContext, concrete: NodeId) {
    ctx.objects.unregister_element(concrete);
}

pub static LENS: WordLens = WordLens {
    is_visible: always_visible,
    get: bookmark_get,
    put: bookmark_put,
    create: bookmark_create,
    remove: bookmark_remove,
};
