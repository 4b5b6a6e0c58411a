//! `w:hyperlink` ↔ `<a href=…>`.
//!
//! External targets resolve through the document part's relationships;
//! in-document anchors use the `w:anchor` attribute and a `#`-prefixed href.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{
    always_visible, paragraph_content, remove_children, word_container_get, word_container_put,
    WordLens,
};
use crate::package::relationships::{relationship_types, Relationship};
use crate::xml::tags::{HTML_A, HTML_HREF, OREL_ID, WORD_ANCHOR, WORD_HYPERLINK};
use indextree::NodeId;

fn hyperlink_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    let href = match ctx.concrete.get_attribute(concrete, OREL_ID) {
        Some(rel_id) => {
            if ctx.rel_is_external(rel_id) {
                ctx.package
                    .relationships(ctx.main_part)
                    .and_then(|set| set.get(rel_id))
                    .map(|rel| rel.target.clone())
            } else {
                ctx.rel_target(rel_id)
            }
        }
        None => ctx
            .concrete
            .get_attribute(concrete, WORD_ANCHOR)
            .map(|anchor| format!("#{}", anchor)),
    };

    let anchor = ctx.create_abstract(HTML_A, Some(concrete));
    if let Some(href) = href {
        ctx.html.set_attribute(anchor, HTML_HREF, &href);
    }
    word_container_get(ctx, &paragraph_content::LENS, anchor, concrete);
    Some(anchor)
}

fn current_href(ctx: &WordPutContext, concrete: NodeId) -> Option<String> {
    if let Some(rel_id) = ctx.concrete.get_attribute(concrete, OREL_ID) {
        return ctx.rels.get(rel_id).map(|rel| rel.target.clone());
    }
    ctx.concrete
        .get_attribute(concrete, WORD_ANCHOR)
        .map(|anchor| format!("#{}", anchor))
}

fn set_target(ctx: &mut WordPutContext, concrete: NodeId, href: &str) {
    if let Some(anchor) = href.strip_prefix('#') {
        ctx.concrete.remove_attribute(concrete, OREL_ID);
        ctx.concrete.set_attribute(concrete, WORD_ANCHOR, anchor);
        return;
    }
    ctx.concrete.remove_attribute(concrete, WORD_ANCHOR);
    let existing = ctx
        .rels
        .iter()
        .find(|rel| rel.rel_type == relationship_types::HYPERLINK && rel.target == href)
        .map(|rel| rel.id.clone());
    let rel_id = match existing {
        Some(id) => id,
        None => {
            let id = ctx.rels.add_with_fresh_id(relationship_types::HYPERLINK, href);
            // Hyperlink targets live outside the package.
            let rel = Relationship::external(&id, relationship_types::HYPERLINK, href);
            ctx.rels.add(rel);
            id
        }
    };
    ctx.concrete.set_attribute(concrete, OREL_ID, &rel_id);
}

fn hyperlink_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    if let Some(href) = ctx.html.get_attribute(abstract_node, HTML_HREF) {
        let href = href.to_string();
        if current_href(ctx, concrete).as_deref() != Some(href.as_str()) {
            set_target(ctx, concrete, &href);
        }
    }
    word_container_put(ctx, &paragraph_content::LENS, abstract_node, concrete);
}

fn hyperlink_create(ctx: &mut WordPutContext, abstract_node: NodeId) -> Option<NodeId> {
    let href = ctx.html.get_attribute(abstract_node, HTML_HREF)?.to_string();
    let concrete = ctx.concrete.create_element(WORD_HYPERLINK);
    set_target(ctx, concrete, &href);
    word_container_put(ctx, &paragraph_content::LENS, abstract_node, concrete);
    Some(concrete)
}

fn hyperlink_remove(ctx: &mut WordPutContext, concrete: NodeId) {
    remove_children(ctx, &paragraph_content::LENS, concrete);
}

pub static LENS: WordLens = WordLens {
    is_visible: always_visible,
    get: hyperlink_get,
    put: hyperlink_put,
    create: hyperlink_create,
    remove: hyperlink_remove,
};
