//! Dispatch over block-level concrete children: paragraphs and tables.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{paragraph, table, WordLens};
use crate::xml::tags::{
    HTML_FIGURE, HTML_H1, HTML_H2, HTML_H3, HTML_H4, HTML_H5, HTML_H6, HTML_P, HTML_TABLE,
    WORD_P, WORD_TBL,
};
use indextree::NodeId;

fn block_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    match ctx.concrete.tag(concrete) {
        WORD_P => (paragraph::LENS.get)(ctx, concrete),
        WORD_TBL => (table::LENS.get)(ctx, concrete),
        _ => None,
    }
}

fn block_is_visible(ctx: &WordPutContext, concrete: NodeId) -> bool {
    match ctx.concrete.tag(concrete) {
        WORD_P => (paragraph::LENS.is_visible)(ctx, concrete),
        WORD_TBL => (table::LENS.is_visible)(ctx, concrete),
        _ => false,
    }
}

fn block_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    match ctx.concrete.tag(concrete) {
        WORD_P => (paragraph::LENS.put)(ctx, abstract_node, concrete),
        WORD_TBL => (table::LENS.put)(ctx, abstract_node, concrete),
        _ => {}
    }
}

fn block_remove(ctx: &mut WordPutContext, concrete: NodeId) {
    match ctx.concrete.tag(concrete) {
        WORD_P => (paragraph::LENS.remove)(ctx, concrete),
        WORD_TBL => (table::LENS.remove)(ctx, concrete),
        _ => {}
    }
}

fn block_create(ctx: &mut WordPutContext, abstract_node: NodeId) -> Option<NodeId> {
    if !ctx.html.node(abstract_node).is_element() {
        return None;
    }
    match ctx.html.tag(abstract_node) {
        HTML_H1 | HTML_H2 | HTML_H3 | HTML_H4 | HTML_H5 | HTML_H6 | HTML_P | HTML_FIGURE => {
            (paragraph::LENS.create)(ctx, abstract_node)
        }
        HTML_TABLE => (table::LENS.create)(ctx, abstract_node),
        _ => None,
    }
}

pub static LENS: WordLens = WordLens {
    is_visible: block_is_visible,
    get: block_get,
    put: block_put,
    create: block_create,
    remove: block_remove,
};
