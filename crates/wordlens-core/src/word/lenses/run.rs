//! `w:r` ↔ `<span>` carrying formatting.
//!
//! Run content flattens into the span: `w:t` becomes text, `w:br` a `<br>`,
//! `w:tab` a tab character, `w:drawing` an `<img>` resolving through the
//! package relationships. Adjacent runs with identical formatting coalesce
//! into one span during get.

use super::super::converter::{WordGetContext, WordPutContext};
use super::WordLens;
use crate::css::sheet::CssProperties;
use crate::package::relationships::relationship_types;
use crate::word::formatting::{word_get_run_properties, word_put_run_properties};
use crate::xml::dom::{Document, NodeKind};
use crate::xml::tags::{
    DML_BLIP, DML_GRAPHIC, DML_GRAPHICDATA, HTML_BR, HTML_CLASS, HTML_ID, HTML_IMG, HTML_SPAN,
    HTML_SRC, HTML_STYLE_ATTR, OREL_EMBED, WORD_BR, WORD_DELTEXT, WORD_DRAWING, WORD_FLDCHAR,
    WORD_INSTRTEXT, WORD_R, WORD_RPR, WORD_RSTYLE, WORD_T, WORD_TAB, WORD_VAL, WP_INLINE,
    XML_SPACE,
};
use indextree::NodeId;

/// Field machinery runs are handled by the field simplification pass; one
/// that survives (an unterminated field) stays hidden.
fn is_field_machinery(doc: &Document, run: NodeId) -> bool {
    doc.child_with_tag(run, WORD_FLDCHAR).is_some()
        || doc.child_with_tag(run, WORD_INSTRTEXT).is_some()
}

fn style_attr_from_props(props: &CssProperties) -> Option<String> {
    if props.is_empty() {
        return None;
    }
    let text = props
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("; ");
    Some(text)
}

fn props_from_style_attr(style: Option<&str>) -> CssProperties {
    let mut props = CssProperties::default();
    let Some(style) = style else { return props };
    for declaration in style.split(';') {
        if let Some((name, value)) = declaration.split_once(':') {
            let (name, value) = (name.trim(), value.trim());
            if !name.is_empty() && !value.is_empty() {
                props.put(name, value);
            }
        }
    }
    props
}

fn find_blip_embed(doc: &Document, drawing: NodeId) -> Option<String> {
    for node in doc.descendants(drawing) {
        if doc.tag(node) == DML_BLIP {
            if let Some(embed) = doc.get_attribute(node, OREL_EMBED) {
                return Some(embed.to_string());
            }
        }
    }
    None
}

fn drawing_get(ctx: &mut WordGetContext, drawing: NodeId) -> Option<NodeId> {
    let embed = find_blip_embed(ctx.concrete, drawing)?;
    let target = ctx.rel_target(&embed)?;
    let img = ctx.create_abstract(HTML_IMG, Some(drawing));
    ctx.html.set_attribute(img, HTML_SRC, &target);
    Some(img)
}

fn run_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    if is_field_machinery(ctx.concrete, concrete) {
        return None;
    }

    let span = ctx.create_abstract(HTML_SPAN, Some(concrete));

    if let Some(rpr) = ctx.concrete.child_with_tag(concrete, WORD_RPR) {
        if let Some(class) = ctx.concrete.get_child_attribute(rpr, WORD_RSTYLE, WORD_VAL) {
            let class = class.to_string();
            ctx.html.set_attribute(span, HTML_CLASS, &class);
        }
        let mut props = CssProperties::default();
        word_get_run_properties(ctx.concrete, rpr, &mut props);
        if let Some(style) = style_attr_from_props(&props) {
            ctx.html.set_attribute(span, HTML_STYLE_ATTR, &style);
        }
    }

    for child in ctx.concrete.child_nodes(concrete) {
        match ctx.concrete.tag(child) {
            WORD_T | WORD_DELTEXT => {
                let text = ctx.concrete.text_content(child);
                if !text.is_empty() {
                    let node = ctx.html.create_text(&text);
                    ctx.html.append_child(span, node);
                }
            }
            WORD_BR => {
                let br = ctx.create_abstract(HTML_BR, None);
                ctx.html.append_child(span, br);
            }
            WORD_TAB => {
                let node = ctx.html.create_text("\t");
                ctx.html.append_child(span, node);
            }
            WORD_DRAWING => {
                if let Some(img) = drawing_get(ctx, child) {
                    ctx.html.append_child(span, img);
                }
            }
            _ => {}
        }
    }
    Some(span)
}

fn run_is_visible(ctx: &WordPutContext, concrete: NodeId) -> bool {
    !is_field_machinery(ctx.concrete, concrete)
}

fn append_text_content(ctx: &mut WordPutContext, run: NodeId, text: &str) {
    let mut rest = text;
    loop {
        match rest.find('\t') {
            Some(at) => {
                let segment = &rest[..at];
                if !segment.is_empty() {
                    append_text_element(ctx, run, segment);
                }
                ctx.concrete.create_child_element(run, WORD_TAB);
                rest = &rest[at + 1..];
            }
            None => {
                if !rest.is_empty() {
                    append_text_element(ctx, run, rest);
                }
                break;
            }
        }
    }
}

fn append_text_element(ctx: &mut WordPutContext, run: NodeId, text: &str) {
    let t = ctx.concrete.create_child_element(run, WORD_T);
    if text.trim() != text {
        ctx.concrete.set_attribute(t, XML_SPACE, "preserve");
    }
    ctx.concrete.create_child_text(t, text);
}

fn create_drawing(ctx: &mut WordPutContext, src: &str) -> NodeId {
    // Reuse an image relationship already pointing at the part.
    let existing = ctx
        .rels
        .iter()
        .find(|rel| rel.rel_type == relationship_types::IMAGE && src.ends_with(&rel.target))
        .map(|rel| rel.id.clone());
    let embed = match existing {
        Some(id) => id,
        None => {
            let relative = src.strip_prefix("word/").unwrap_or(src);
            ctx.rels.add_with_fresh_id(relationship_types::IMAGE, relative)
        }
    };

    let drawing = ctx.concrete.create_element(WORD_DRAWING);
    let inline = ctx.concrete.create_child_element(drawing, WP_INLINE);
    let graphic = ctx.concrete.create_child_element(inline, DML_GRAPHIC);
    let data = ctx.concrete.create_child_element(graphic, DML_GRAPHICDATA);
    let blip = ctx.concrete.create_child_element(data, DML_BLIP);
    ctx.concrete.set_attribute(blip, OREL_EMBED, &embed);
    drawing
}

fn run_put_impl(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    // Character formatting.
    let props = props_from_style_attr(ctx.html.get_attribute(abstract_node, HTML_STYLE_ATTR));
    let new_rpr = word_put_run_properties(ctx.concrete, &props);
    let class = ctx
        .html
        .get_attribute(abstract_node, HTML_CLASS)
        .map(str::to_string);
    let new_rpr = match (new_rpr, class) {
        (rpr, Some(class)) if !class.starts_with("uxwrite-") => {
            let rpr = rpr.unwrap_or_else(|| ctx.concrete.create_element(WORD_RPR));
            let rstyle = ctx.concrete.create_element(WORD_RSTYLE);
            ctx.concrete.set_attribute(rstyle, WORD_VAL, &class);
            let first = ctx.concrete.first_child(rpr);
            ctx.concrete.insert_before(rpr, rstyle, first);
            Some(rpr)
        }
        (rpr, _) => rpr,
    };

    match (ctx.concrete.child_with_tag(concrete, WORD_RPR), new_rpr) {
        (Some(old), Some(new)) => {
            if !ctx.concrete.subtrees_equal(old, new) {
                ctx.concrete.insert_before(concrete, new, Some(old));
                ctx.concrete.remove_node(old);
            }
        }
        (Some(old), None) => ctx.concrete.remove_node(old),
        (None, Some(new)) => {
            let first = ctx.concrete.first_child(concrete);
            ctx.concrete.insert_before(concrete, new, first);
        }
        (None, None) => {}
    }

    // Text content: drop the old flattenable children, keep anything else.
    for child in ctx.concrete.child_nodes(concrete) {
        if matches!(
            ctx.concrete.tag(child),
            WORD_T | WORD_DELTEXT | WORD_BR | WORD_TAB
        ) {
            ctx.concrete.remove_node(child);
        }
    }
    let has_drawing = ctx.concrete.child_with_tag(concrete, WORD_DRAWING).is_some();
    for child in ctx.html.child_nodes(abstract_node) {
        match &ctx.html.node(child).kind {
            NodeKind::Text(text) => {
                let text = text.clone();
                append_text_content(ctx, concrete, &text);
            }
            NodeKind::Element { tag, .. } => match *tag {
                HTML_BR => {
                    ctx.concrete.create_child_element(concrete, WORD_BR);
                }
                HTML_IMG => {
                    if !has_drawing {
                        if let Some(src) = ctx.html.get_attribute(child, HTML_SRC) {
                            let src = src.to_string();
                            let drawing = create_drawing(ctx, &src);
                            ctx.concrete.append_child(concrete, drawing);
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
}

fn run_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    if ctx.is_unchanged(abstract_node) {
        return;
    }
    run_put_impl(ctx, abstract_node, concrete);
}

fn run_create(ctx: &mut WordPutContext, abstract_node: NodeId) -> Option<NodeId> {
    let concrete = ctx.concrete.create_element(WORD_R);
    match &ctx.html.node(abstract_node).kind {
        NodeKind::Text(text) => {
            let text = text.clone();
            append_text_content(ctx, concrete, &text);
        }
        NodeKind::Element { tag, .. } => match *tag {
            HTML_BR => {
                ctx.concrete.create_child_element(concrete, WORD_BR);
            }
            HTML_IMG => {
                if let Some(src) = ctx.html.get_attribute(abstract_node, HTML_SRC) {
                    let src = src.to_string();
                    let drawing = create_drawing(ctx, &src);
                    ctx.concrete.append_child(concrete, drawing);
                }
            }
            _ => run_put_impl(ctx, abstract_node, concrete),
        },
        _ => return None,
    }
    Some(concrete)
}

pub static LENS: WordLens = WordLens {
    is_visible: run_is_visible,
    get: run_get,
    put: run_put,
    create: run_create,
    remove: super::remove_noop,
};

/// Merges adjacent plain spans with identical formatting into one, so runs
/// split only by revision bookkeeping read as a single span.
pub fn coalesce_adjacent_spans(html: &mut Document, parent: NodeId) {
    let mut children = html.child_nodes(parent);
    let mut i = 1;
    while i < children.len() {
        let (prev, cur) = (children[i - 1], children[i]);
        if mergeable_span(html, prev)
            && mergeable_span(html, cur)
            && html.get_attribute(prev, HTML_STYLE_ATTR) == html.get_attribute(cur, HTML_STYLE_ATTR)
            && html.get_attribute(prev, HTML_CLASS) == html.get_attribute(cur, HTML_CLASS)
        {
            for grandchild in html.child_nodes(cur) {
                html.remove_node(grandchild);
                html.append_child(prev, grandchild);
            }
            html.remove_node(cur);
            children.remove(i);
        } else {
            i += 1;
        }
    }
}

fn mergeable_span(html: &Document, node: NodeId) -> bool {
    if html.tag(node) != HTML_SPAN {
        return false;
    }
    match html.get_attribute(node, HTML_CLASS) {
        Some(class) if class.starts_with("uxwrite-") => false,
        _ => html.get_attribute(node, HTML_ID).is_some(),
    }
}
