//! Dispatch over paragraph-level content: runs, change tracking, fields,
//! bookmarks, hyperlinks and smart tags.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{bookmark, change, field, hyperlink, run, smart_tag, WordLens};
use crate::xml::dom::NodeKind;
use crate::xml::tags::{
    HTML_A, HTML_BR, HTML_CLASS, HTML_DEL, HTML_IMG, HTML_INS, HTML_SPAN, WORD_BOOKMARKSTART,
    WORD_DEL, WORD_FLDSIMPLE, WORD_HYPERLINK, WORD_INS, WORD_R, WORD_SMARTTAG,
};
use indextree::NodeId;

fn lens_for_concrete(tag: crate::xml::Tag) -> Option<&'static WordLens> {
    match tag {
        WORD_R => Some(&run::LENS),
        WORD_INS | WORD_DEL => Some(&change::LENS),
        WORD_FLDSIMPLE => Some(&field::LENS),
        WORD_BOOKMARKSTART => Some(&bookmark::LENS),
        WORD_HYPERLINK => Some(&hyperlink::LENS),
        WORD_SMARTTAG => Some(&smart_tag::LENS),
        _ => None,
    }
}

fn content_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    let lens = lens_for_concrete(ctx.concrete.tag(concrete))?;
    (lens.get)(ctx, concrete)
}

fn content_is_visible(ctx: &WordPutContext, concrete: NodeId) -> bool {
    match lens_for_concrete(ctx.concrete.tag(concrete)) {
        Some(lens) => (lens.is_visible)(ctx, concrete),
        None => false,
    }
}

fn content_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    if let Some(lens) = lens_for_concrete(ctx.concrete.tag(concrete)) {
        (lens.put)(ctx, abstract_node, concrete);
    }
}

fn content_remove(ctx: &mut WordPutContext, concrete: NodeId) {
    if let Some(lens) = lens_for_concrete(ctx.concrete.tag(concrete)) {
        (lens.remove)(ctx, concrete);
    }
}

fn content_create(ctx: &mut WordPutContext, abstract_node: NodeId) -> Option<NodeId> {
    match &ctx.html.node(abstract_node).kind {
        NodeKind::Text(_) => (run::LENS.create)(ctx, abstract_node),
        NodeKind::Element { tag, .. } => match *tag {
            HTML_SPAN => {
                match ctx.html.get_attribute(abstract_node, HTML_CLASS) {
                    Some(field::FIELD_CLASS) => (field::LENS.create)(ctx, abstract_node),
                    Some(bookmark::BOOKMARK_CLASS) => (bookmark::LENS.create)(ctx, abstract_node),
                    _ => (run::LENS.create)(ctx, abstract_node),
                }
            }
            HTML_INS | HTML_DEL => (change::LENS.create)(ctx, abstract_node),
            HTML_A => (hyperlink::LENS.create)(ctx, abstract_node),
            HTML_IMG | HTML_BR => (run::LENS.create)(ctx, abstract_node),
            _ => None,
        },
        _ => None,
    }
}

pub static LENS: WordLens = WordLens {
    is_visible: content_is_visible,
    get: content_get,
    put: content_put,
    create: content_create,
    remove: content_remove,
};
