//! `w:p` ↔ `<h1..6>` / `<p>` / `<figure>`.
//!
//! Classification follows the paragraph style: `Heading1..6` map to heading
//! elements, a `w:outlineLvl` without a heading style does the same, a
//! paragraph whose only content is a drawing becomes a figure, and
//! everything else is a plain `<p>` carrying the style id as its class.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{
    always_visible, paragraph_content, remove_children, run, word_container_get,
    word_container_put, WordLens,
};
use crate::xml::tags::{
    Tag, HTML_CLASS, HTML_FIGURE, HTML_H1, HTML_H2, HTML_H3, HTML_H4, HTML_H5, HTML_H6, HTML_P,
    WORD_DRAWING, WORD_OUTLINELVL, WORD_P, WORD_PPR, WORD_PSTYLE, WORD_R, WORD_T, WORD_VAL,
};
use indextree::NodeId;

fn heading_tag(level: u32) -> Option<Tag> {
    match level {
        1 => Some(HTML_H1),
        2 => Some(HTML_H2),
        3 => Some(HTML_H3),
        4 => Some(HTML_H4),
        5 => Some(HTML_H5),
        6 => Some(HTML_H6),
        _ => None,
    }
}

fn heading_level(tag: Tag) -> Option<u32> {
    match tag {
        HTML_H1 => Some(1),
        HTML_H2 => Some(2),
        HTML_H3 => Some(3),
        HTML_H4 => Some(4),
        HTML_H5 => Some(5),
        HTML_H6 => Some(6),
        _ => None,
    }
}

fn style_heading_level(style_id: &str) -> Option<u32> {
    let level = style_id.strip_prefix("Heading")?;
    level.parse().ok().filter(|l| (1..=6).contains(l))
}

/// A paragraph whose visible content is nothing but drawings.
fn is_figure(ctx: &WordGetContext, concrete: NodeId) -> bool {
    let mut has_drawing = false;
    for child in ctx.concrete.children(concrete) {
        if ctx.concrete.tag(child) != WORD_R {
            continue;
        }
        for inner in ctx.concrete.children(child) {
            match ctx.concrete.tag(inner) {
                WORD_DRAWING => has_drawing = true,
                WORD_T => return false,
                _ => {}
            }
        }
    }
    has_drawing
}

fn paragraph_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    let style_id = ctx
        .concrete
        .child_with_tag(concrete, WORD_PPR)
        .and_then(|ppr| ctx.concrete.get_child_attribute(ppr, WORD_PSTYLE, WORD_VAL))
        .map(str::to_string);

    let outline_level = ctx
        .concrete
        .child_with_tag(concrete, WORD_PPR)
        .and_then(|ppr| ctx.concrete.get_child_attribute(ppr, WORD_OUTLINELVL, WORD_VAL))
        .and_then(|v| v.parse::<u32>().ok());

    let tag = style_id
        .as_deref()
        .and_then(style_heading_level)
        .or(outline_level.map(|l| l + 1))
        .and_then(heading_tag)
        .unwrap_or(if is_figure(ctx, concrete) { HTML_FIGURE } else { HTML_P });

    let abstract_p = ctx.create_abstract(tag, Some(concrete));
    if let Some(style_id) = style_id {
        if style_id != "Normal" && style_heading_level(&style_id).is_none() {
            ctx.html.set_attribute(abstract_p, HTML_CLASS, &style_id);
        }
    }

    word_container_get(ctx, &paragraph_content::LENS, abstract_p, concrete);
    run::coalesce_adjacent_spans(&mut ctx.html, abstract_p);
    Some(abstract_p)
}

fn desired_style_id(ctx: &WordPutContext, abstract_node: NodeId) -> Option<String> {
    if let Some(level) = heading_level(ctx.html.tag(abstract_node)) {
        return Some(format!("Heading{}", level));
    }
    ctx.html
        .get_attribute(abstract_node, HTML_CLASS)
        .map(str::to_string)
}

fn update_paragraph_style(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    let desired = desired_style_id(ctx, abstract_node);
    let ppr = ctx.concrete.child_with_tag(concrete, WORD_PPR);
    match desired {
        Some(style_id) => {
            let ppr = match ppr {
                Some(ppr) => ppr,
                None => {
                    let ppr = ctx.concrete.create_element(WORD_PPR);
                    let first = ctx.concrete.first_child(concrete);
                    ctx.concrete.insert_before(concrete, ppr, first);
                    ppr
                }
            };
            let pstyle = match ctx.concrete.child_with_tag(ppr, WORD_PSTYLE) {
                Some(pstyle) => pstyle,
                None => {
                    let pstyle = ctx.concrete.create_element(WORD_PSTYLE);
                    let first = ctx.concrete.first_child(ppr);
                    ctx.concrete.insert_before(ppr, pstyle, first);
                    pstyle
                }
            };
            ctx.concrete.set_attribute(pstyle, WORD_VAL, &style_id);
        }
        None => {
            // Only a pPr left empty by removing the style goes away; one
            // that was already empty is preserved content.
            if let Some(ppr) = ppr {
                if let Some(pstyle) = ctx.concrete.child_with_tag(ppr, WORD_PSTYLE) {
                    ctx.concrete.remove_node(pstyle);
                    if ctx.concrete.first_child(ppr).is_none()
                        && ctx.concrete.node(ppr).attributes().is_empty()
                    {
                        ctx.concrete.remove_node(ppr);
                    }
                }
            }
        }
    }
}

fn reconcile_content(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    word_container_put(ctx, &paragraph_content::LENS, abstract_node, concrete);

    // Paragraph properties always lead the paragraph.
    if let Some(ppr) = ctx.concrete.child_with_tag(concrete, WORD_PPR) {
        let first = ctx.concrete.first_child(concrete);
        if first != Some(ppr) {
            ctx.concrete.insert_before(concrete, ppr, first);
        }
    }
}

fn paragraph_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    // Reclassifying the style re-derives concrete properties from the
    // lossier abstract side, so only do it when the element itself changed.
    // The children always reconcile: a pure reorder leaves no change flags.
    if ctx.changes.is_changed(ctx.html, abstract_node) {
        update_paragraph_style(ctx, abstract_node, concrete);
    }
    reconcile_content(ctx, abstract_node, concrete);
}

fn paragraph_create(ctx: &mut WordPutContext, abstract_node: NodeId) -> Option<NodeId> {
    let concrete = ctx.concrete.create_element(WORD_P);
    update_paragraph_style(ctx, abstract_node, concrete);
    reconcile_content(ctx, abstract_node, concrete);
    Some(concrete)
}

fn paragraph_remove(ctx: &mut WordPutContext, concrete: NodeId) {
    remove_children(ctx, &paragraph_content::LENS, concrete);
}

pub static LENS: WordLens = WordLens {
    is_visible: always_visible,
    get: paragraph_get,
    put: paragraph_put,
    create: paragraph_create,
    remove: paragraph_remove,
};
