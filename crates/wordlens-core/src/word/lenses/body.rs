//! `w:body` ↔ `<body>`.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{
    block_level, create_none, never_visible, remove_children, word_container_get,
    word_container_put, WordLens,
};
use crate::xml::tags::HTML_BODY;
use indextree::NodeId;

fn body_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    let abstract_body = ctx.create_abstract(HTML_BODY, Some(concrete));
    word_container_get(ctx, &block_level::LENS, abstract_body, concrete);
    Some(abstract_body)
}

fn body_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    word_container_put(ctx, &block_level::LENS, abstract_node, concrete);
}

fn body_remove(ctx: &mut WordPutContext, concrete: NodeId) {
    remove_children(ctx, &block_level::LENS, concrete);
}

pub static LENS: WordLens = WordLens {
    is_visible: never_visible,
    get: body_get,
    put: body_put,
    create: create_none,
    remove: body_remove,
};
