//! End-to-end get/put round trips over in-memory packages.

use pretty_assertions::assert_eq;
use wordlens_core::package::Store;
use wordlens_core::word::WordPackage;
use wordlens_core::xml::tags::{
    HTML_BODY, HTML_H1, HTML_ID, HTML_P, HTML_SPAN, HTML_TABLE, HTML_TBODY, HTML_TD, HTML_TR,
    NAMESPACE_NULL, WORD_BODY, WORD_P, WORD_R, WORD_T, WORD_TBL, WORD_TC, WORD_TR,
};
use wordlens_core::xml::writer::serialize;
use wordlens_core::xml::Document;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn package_with_body(body_inner: &str) -> WordPackage {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
        W_NS, body_inner
    );
    let mut store = Store::open_memory();
    store.write("word/document.xml", document.into_bytes());
    WordPackage::open(store).unwrap()
}

fn document_xml(package: &WordPackage) -> String {
    serialize(package.document(), NAMESPACE_NULL, false).unwrap()
}

fn body_of(html: &Document) -> indextree::NodeId {
    let root = html.root().unwrap();
    html.child_with_tag(root, HTML_BODY).unwrap()
}

#[test]
fn heading_roundtrip_preserves_paragraph() {
    let mut package = package_with_body(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Introduction</w:t></w:r></w:p>"#,
    );
    let before = document_xml(&package);

    let mut html = wordlens_core::get(&package).unwrap();
    let body = body_of(&html);
    let h1 = html.child_with_tag(body, HTML_H1).expect("heading paragraph maps to h1");
    assert_eq!(html.text_content(h1), "Introduction");
    let id = html.get_attribute(h1, HTML_ID).unwrap();
    assert!(id.starts_with("word"));
    assert!(id["word".len()..].parse::<u32>().is_ok());

    wordlens_core::put(&mut package, &mut html).unwrap();
    assert_eq!(document_xml(&package), before);
}

#[test]
fn unchanged_put_is_identity_for_unknown_content() {
    let mut package = package_with_body(
        r#"<w:p><w:r><w:t>Text</w:t></w:r></w:p><custom:thing xmlns:custom="urn:x" custom:a="1"><custom:inner/></custom:thing>"#,
    );
    let before = document_xml(&package);

    let mut html = wordlens_core::get(&package).unwrap();
    wordlens_core::put(&mut package, &mut html).unwrap();
    assert_eq!(document_xml(&package), before);
}

#[test]
fn create_builds_paragraphs_from_html() {
    let mut package = WordPackage::create(Store::open_memory());
    let html_text = r#"<html xmlns="http://www.w3.org/1999/xhtml"><head></head><body><p>Hello</p><p>World</p></body></html>"#;
    let mut edited = wordlens_core::xml::parser::parse(html_text).unwrap();

    wordlens_core::create(&mut package, &mut edited).unwrap();

    let doc = package.document();
    let root = doc.root().unwrap();
    let body = doc.child_with_tag(root, WORD_BODY).unwrap();
    let paragraphs: Vec<_> = doc.children(body).filter(|&c| doc.tag(c) == WORD_P).collect();
    assert_eq!(paragraphs.len(), 2);

    let mut texts = Vec::new();
    for &p in &paragraphs {
        let runs: Vec<_> = doc.children(p).filter(|&c| doc.tag(c) == WORD_R).collect();
        assert_eq!(runs.len(), 1);
        assert!(doc.child_with_tag(runs[0], WORD_T).is_some());
        texts.push(doc.text_content(p));
    }
    assert_eq!(texts, vec!["Hello".to_string(), "World".to_string()]);
}

#[test]
fn swapping_table_cells_reorders_concrete_cells() {
    let mut package = package_with_body(
        r#"<w:tbl>
            <w:tr><w:tc><w:p><w:r><w:t>1</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>2</w:t></w:r></w:p></w:tc></w:tr>
            <w:tr><w:tc><w:p><w:r><w:t>3</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>4</w:t></w:r></w:p></w:tc></w:tr>
        </w:tbl>"#,
    );

    let mut html = wordlens_core::get(&package).unwrap();
    let body = body_of(&html);
    let table = html.child_with_tag(body, HTML_TABLE).unwrap();
    let tbody = html.child_with_tag(table, HTML_TBODY).unwrap();
    let first_row = html.child_with_tag(tbody, HTML_TR).unwrap();
    let cells: Vec<_> = html.children(first_row).filter(|&c| html.tag(c) == HTML_TD).collect();
    assert_eq!(cells.len(), 2);
    assert_eq!(html.text_content(cells[0]), "1");

    // Swap the two cells of the first row.
    html.remove_node(cells[0]);
    html.append_child(first_row, cells[0]);

    wordlens_core::put(&mut package, &mut html).unwrap();

    let doc = package.document();
    let root = doc.root().unwrap();
    let word_body = doc.child_with_tag(root, WORD_BODY).unwrap();
    let tbl = doc.child_with_tag(word_body, WORD_TBL).unwrap();
    let tr = doc.child_with_tag(tbl, WORD_TR).unwrap();
    let tcs: Vec<_> = doc.children(tr).filter(|&c| doc.tag(c) == WORD_TC).collect();
    assert_eq!(tcs.len(), 2);
    assert_eq!(doc.text_content(tcs[0]), "2");
    assert_eq!(doc.text_content(tcs[1]), "1");
}

#[test]
fn deleting_a_run_keeps_bookmark_markers_attached() {
    let mut package = package_with_body(
        r#"<w:p><w:pPr/><w:r><w:t>A</w:t></w:r><w:bookmarkStart w:id="1" w:name="m"/><w:r><w:t>B</w:t></w:r><w:bookmarkEnd w:id="1"/></w:p>"#,
    );

    let mut html = wordlens_core::get(&package).unwrap();
    let body = body_of(&html);
    let p = html.child_with_tag(body, HTML_P).unwrap();
    let spans: Vec<_> = html.children(p).filter(|&c| html.tag(c) == HTML_SPAN).collect();
    assert_eq!(spans.len(), 3);
    assert_eq!(html.text_content(spans[0]), "A");

    // Delete the first run's span.
    html.remove_node(spans[0]);

    wordlens_core::put(&mut package, &mut html).unwrap();

    let xml = document_xml(&package);
    let body_start = xml.find("<w:body>").unwrap();
    let body_xml = &xml[body_start..];
    let ppr = body_xml.find("<w:pPr/>").expect("pPr preserved");
    let start = body_xml.find("<w:bookmarkStart").expect("bookmarkStart preserved");
    let run_b = body_xml.find("<w:r><w:t>B</w:t></w:r>").expect("run B preserved");
    let end = body_xml.find("<w:bookmarkEnd").expect("bookmarkEnd preserved");
    assert!(ppr < start, "pPr stays first: {}", body_xml);
    assert!(start < run_b, "bookmarkStart precedes run B: {}", body_xml);
    assert!(run_b < end, "bookmarkEnd follows run B: {}", body_xml);
    assert!(!body_xml.contains("<w:t>A</w:t>"), "deleted run is gone: {}", body_xml);
}

#[test]
fn colspan_and_rowspan_reconstruct_the_grid() {
    let mut package = package_with_body(
        r#"<w:tbl>
            <w:tr>
                <w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>wide</w:t></w:r></w:p></w:tc>
            </w:tr>
            <w:tr>
                <w:tc><w:tcPr><w:vMerge w:val="restart"/></w:tcPr><w:p><w:r><w:t>tall</w:t></w:r></w:p></w:tc>
                <w:tc><w:p><w:r><w:t>x</w:t></w:r></w:p></w:tc>
            </w:tr>
            <w:tr>
                <w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc>
                <w:tc><w:p><w:r><w:t>y</w:t></w:r></w:p></w:tc>
            </w:tr>
        </w:tbl>"#,
    );

    let html = wordlens_core::get(&package).unwrap();
    let body = body_of(&html);
    let table = html.child_with_tag(body, HTML_TABLE).unwrap();
    let tbody = html.child_with_tag(table, HTML_TBODY).unwrap();
    let rows: Vec<_> = html.children(tbody).collect();
    assert_eq!(rows.len(), 3);

    let first_cells: Vec<_> = html.children(rows[0]).collect();
    assert_eq!(first_cells.len(), 1);
    assert_eq!(
        html.get_attribute(first_cells[0], wordlens_core::xml::tags::HTML_COLSPAN),
        Some("2")
    );

    let second_cells: Vec<_> = html.children(rows[1]).collect();
    assert_eq!(second_cells.len(), 2);
    assert_eq!(
        html.get_attribute(second_cells[0], wordlens_core::xml::tags::HTML_ROWSPAN),
        Some("2")
    );

    // The merged-away slot emits no td.
    let third_cells: Vec<_> = html.children(rows[2]).collect();
    assert_eq!(third_cells.len(), 1);
    assert_eq!(html.text_content(third_cells[0]), "y");

    // An unchanged put keeps the merge markers.
    let mut edited = html;
    wordlens_core::put(&mut package, &mut edited).unwrap();
    let xml = document_xml(&package);
    assert!(xml.contains("<w:gridSpan w:val=\"2\"/>"));
    assert!(xml.contains("<w:vMerge w:val=\"restart\"/>"));
    assert!(xml.contains("<w:vMerge/>"));
}

#[test]
fn put_idempotence_after_reget() {
    let mut package = package_with_body(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p><w:p><w:r><w:t>Body</w:t></w:r></w:p>"#,
    );

    // First edit: retitle the heading.
    let mut html = wordlens_core::get(&package).unwrap();
    let body = body_of(&html);
    let h1 = html.child_with_tag(body, HTML_H1).unwrap();
    let span = html.child_with_tag(h1, HTML_SPAN).unwrap();
    let text = html.children(span).next().unwrap();
    html.node_mut(text).kind = wordlens_core::xml::NodeKind::Text("Renamed".to_string());

    wordlens_core::put(&mut package, &mut html).unwrap();
    let first_result = document_xml(&package);
    assert!(first_result.contains("Renamed"));

    // Applying the same edit to the result again changes nothing further.
    let mut html2 = wordlens_core::get(&package).unwrap();
    let body2 = body_of(&html2);
    let h1 = html2.child_with_tag(body2, HTML_H1).unwrap();
    assert_eq!(html2.text_content(h1), "Renamed");
    wordlens_core::put(&mut package, &mut html2).unwrap();
    assert_eq!(document_xml(&package), first_result);
}

#[test]
fn hyperlink_roundtrip_through_relationships() {
    let mut store = Store::open_memory();
    store.write(
        "word/document.xml",
        format!(
            r#"<w:document xmlns:w="{}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body><w:p><w:hyperlink r:id="rId4"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p></w:body></w:document>"#,
            W_NS
        )
        .into_bytes(),
    );
    store.write(
        "word/_rels/document.xml.rels",
        br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="http://example.com/" TargetMode="External"/></Relationships>"#
            .to_vec(),
    );
    let mut package = WordPackage::open(store).unwrap();

    let mut html = wordlens_core::get(&package).unwrap();
    let body = body_of(&html);
    let p = html.child_with_tag(body, HTML_P).unwrap();
    let a = html.child_with_tag(p, wordlens_core::xml::tags::HTML_A).unwrap();
    assert_eq!(
        html.get_attribute(a, wordlens_core::xml::tags::HTML_HREF),
        Some("http://example.com/")
    );

    wordlens_core::put(&mut package, &mut html).unwrap();
    let xml = document_xml(&package);
    assert!(xml.contains("r:id=\"rId4\""));
}
