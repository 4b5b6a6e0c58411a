//! `w:ins` / `w:del` ↔ `<ins>` / `<del>`: change-tracking pass-through.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{
    paragraph_content, remove_children, word_container_get, word_container_put, WordLens,
};
use crate::xml::tags::{HTML_DEL, HTML_INS, WORD_DEL, WORD_INS};
use indextree::NodeId;

fn change_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    let tag = match ctx.concrete.tag(concrete) {
        WORD_INS => HTML_INS,
        WORD_DEL => HTML_DEL,
        _ => return None,
    };
    let abstract_node = ctx.create_abstract(tag, Some(concrete));
    word_container_get(ctx, &paragraph_content::LENS, abstract_node, concrete);
    Some(abstract_node)
}

fn change_is_visible(ctx: &WordPutContext, concrete: NodeId) -> bool {
    matches!(ctx.concrete.tag(concrete), WORD_INS | WORD_DEL)
}

fn change_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    word_container_put(ctx, &paragraph_content::LENS, abstract_node, concrete);
}

fn change_create(ctx: &mut WordPutContext, abstract_node: NodeId) -> Option<NodeId> {
    let tag = match ctx.html.tag(abstract_node) {
        HTML_INS => WORD_INS,
        HTML_DEL => WORD_DEL,
        _ => return None,
    };
    let concrete = ctx.concrete.create_element(tag);
    change_put(ctx, abstract_node, concrete);
    Some(concrete)
}

fn change_remove(ctx: &mut WordPutContext, concrete: NodeId) {
    remove_children(ctx, &paragraph_content::LENS, concrete);
}

pub static LENS: WordLens = WordLens {
    is_visible: change_is_visible,
    get: change_get,
    put: change_put,
    create: change_create,
    remove: change_remove,
};
