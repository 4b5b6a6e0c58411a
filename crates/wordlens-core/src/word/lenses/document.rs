//! `w:document` ↔ the `<html>` shell.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{body, create_none, never_visible, remove_noop, WordLens};
use crate::xml::tags::{
    HTML_BODY, HTML_CHARSET, HTML_HEAD, HTML_HTML, HTML_META, WORD_BODY, WORD_DOCUMENT,
};
use indextree::NodeId;

fn document_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    if ctx.concrete.tag(concrete) != WORD_DOCUMENT {
        return None;
    }

    let html = ctx.create_abstract(HTML_HTML, Some(concrete));
    let head = ctx.create_abstract(HTML_HEAD, None);
    ctx.html.append_child(html, head);
    let meta = ctx.create_abstract(HTML_META, None);
    ctx.html.append_child(head, meta);
    ctx.html.set_attribute(meta, HTML_CHARSET, "utf-8");

    if let Some(word_body) = ctx.concrete.child_with_tag(concrete, WORD_BODY) {
        if let Some(html_body) = (body::LENS.get)(ctx, word_body) {
            ctx.html.append_child(html, html_body);
        }
    }
    Some(html)
}

fn document_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    if ctx.html.tag(abstract_node) != HTML_HTML || ctx.concrete.tag(concrete) != WORD_DOCUMENT {
        return;
    }
    let html_body = ctx.html.child_with_tag(abstract_node, HTML_BODY);
    let word_body = ctx.concrete.child_with_tag(concrete, WORD_BODY);
    if let (Some(html_body), Some(word_body)) = (html_body, word_body) {
        (body::LENS.put)(ctx, html_body, word_body);
    }
}

pub static LENS: WordLens = WordLens {
    is_visible: never_visible,
    get: document_get,
    put: document_put,
    create: create_none,
    remove: remove_noop,
};
