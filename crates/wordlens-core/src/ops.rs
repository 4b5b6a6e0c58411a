//! Top-level conversion entry points.
//!
//! `get` derives the HTML document from a word package; `put` reconciles an
//! edited HTML tree back into the original package; `create` seeds an empty
//! package and runs the put path against it. The file facades manage the
//! package lifetime and infer the backing from the path.

use crate::css::CssSheet;
use crate::error::{Result, WordlensError};
use crate::package::Store;
use crate::word::converter::{WordGetContext, WordPutContext};
use crate::word::lenses::document;
use crate::word::objects::WordObjects;
use crate::word::styles::{apply_css_sheet, build_css_sheet};
use crate::word::{update_numbering, WordPackage};
use crate::xml::changes::compute_changes;
use crate::xml::dom::{Document, NodeKind};
use crate::xml::tags::{
    HTML_BODY, HTML_HEAD, HTML_HTML, HTML_ID, HTML_STYLE, HTML_TABLE, HTML_TBODY, HTML_TR,
    NAMESPACE_HTML,
};
use crate::xml::{parser, writer};
use std::path::Path;

/// Derives the abstract HTML document from the package.
pub fn get(package: &WordPackage) -> Result<Document> {
    let concrete = package.document();
    let root = concrete
        .root()
        .ok_or_else(|| WordlensError::Semantic("document part has no root".to_string()))?;

    let mut ctx = WordGetContext::new(concrete, package.opc(), package.main_part());
    let html_root = (document::LENS.get)(&mut ctx, root).ok_or_else(|| {
        WordlensError::ConversionFailed("document root is not w:document".to_string())
    })?;
    let mut html = ctx.html;
    let doc_node = html.doc_node();
    html.append_child(doc_node, html_root);

    let css = build_css_sheet(package.styles(), package.numbering());
    let css_text = css.copy_text();
    if !css_text.is_empty() {
        if let Some(head) = html.child_with_tag(html_root, HTML_HEAD) {
            let style = html.create_child_element(head, HTML_STYLE);
            html.create_child_text(style, &css_text);
        }
    }
    Ok(html)
}

/// Applies an edited HTML tree back onto the package it was derived from
/// and saves the result.
pub fn put(package: &mut WordPackage, edited: &mut Document) -> Result<()> {
    let edited_root = edited
        .root()
        .ok_or_else(|| WordlensError::Semantic("edited HTML has no root".to_string()))?;
    if edited.tag(edited_root) != HTML_HTML {
        return Err(WordlensError::Semantic("edited document is not HTML".to_string()));
    }
    normalize_whitespace(edited, edited_root);

    // Change detection against the HTML the current concrete produces.
    let baseline = get(package)?;
    let baseline_root = baseline.root().expect("get produced a root");
    let changes = compute_changes(edited, edited_root, &baseline, baseline_root, HTML_ID);

    // Style cascade and numbering reconciliation from the edited sheet.
    let mut css = extract_css(edited);
    {
        let (sheet, numbering) = package.style_parts_mut();
        update_numbering(numbering, &mut css, sheet);
        apply_css_sheet(&css, sheet, numbering);
    }

    let mut objects = WordObjects::collect(package.document());
    {
        let (concrete, opc, main_part) = package.document_and_opc_mut();
        let concrete_root = concrete
            .root()
            .ok_or_else(|| WordlensError::Semantic("document part has no root".to_string()))?;
        let rels = opc.relationships_mut(main_part);
        let mut ctx = WordPutContext {
            concrete,
            html: edited,
            changes: &changes,
            objects: &mut objects,
            rels,
        };
        (document::LENS.put)(&mut ctx, edited_root, concrete_root);
    }

    package.save()
}

/// Builds a fresh concrete document from an HTML tree.
pub fn create(package: &mut WordPackage, edited: &mut Document) -> Result<()> {
    put(package, edited)
}

/// The CSS sheet embedded in the document's `<style>` element, if any.
fn extract_css(html: &Document) -> CssSheet {
    let mut css = CssSheet::new();
    let Some(root) = html.root() else { return css };
    for node in html.descendants(root) {
        if html.node(node).is_element() && html.tag(node) == HTML_STYLE {
            css.update_from_text(&html.text_content(node));
            break;
        }
    }
    css
}

/// Drops whitespace-only text nodes from the structural containers where
/// they can only be formatting noise. Text inside phrasing content is left
/// alone.
fn normalize_whitespace(html: &mut Document, node: indextree::NodeId) {
    let structural = matches!(
        html.tag(node),
        HTML_HTML | HTML_HEAD | HTML_BODY | HTML_TABLE | HTML_TBODY | HTML_TR
    );
    for child in html.child_nodes(node) {
        match &html.node(child).kind {
            NodeKind::Text(text) => {
                if structural && text.trim().is_empty() {
                    html.remove_node(child);
                }
            }
            NodeKind::Element { .. } => normalize_whitespace(html, child),
            _ => {}
        }
    }
}

fn open_store(path: &Path) -> Result<Store> {
    if path.is_dir() {
        return Store::open_filesystem(path);
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("docx") => Store::open_zip(path),
        other => Err(WordlensError::InvalidPackage {
            message: format!(
                "unsupported package format: {}",
                other.unwrap_or("(no extension)")
            ),
        }),
    }
}

fn create_store(path: &Path) -> Result<Store> {
    if path.extension().and_then(|e| e.to_str()) == Some("docx") {
        return Ok(Store::create_zip(path));
    }
    Err(WordlensError::InvalidPackage {
        message: "new packages must use the .docx extension".to_string(),
    })
}

/// `get` with file paths: word document in, HTML out.
pub fn get_file(concrete_path: &Path, abstract_path: &Path) -> Result<()> {
    let package = WordPackage::open(open_store(concrete_path)?)?;
    let html = get(&package)?;
    let text = writer::serialize(&html, NAMESPACE_HTML, false)?;
    std::fs::write(abstract_path, text)?;
    Ok(())
}

/// `put` with file paths: applies edited HTML onto an existing document.
pub fn put_file(concrete_path: &Path, abstract_path: &Path) -> Result<()> {
    let mut package = WordPackage::open(open_store(concrete_path)?)?;
    let text = std::fs::read_to_string(abstract_path)?;
    let mut edited = parser::parse(&text)?;
    put(&mut package, &mut edited)
}

/// `create` with file paths: builds a fresh document from HTML.
pub fn create_file(concrete_path: &Path, abstract_path: &Path) -> Result<()> {
    let mut package = WordPackage::create(create_store(concrete_path)?);
    let text = std::fs::read_to_string(abstract_path)?;
    let mut edited = parser::parse(&text)?;
    create(&mut package, &mut edited)
}
