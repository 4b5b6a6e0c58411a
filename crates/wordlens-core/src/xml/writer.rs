//! XML and HTML serialization.
//!
//! Attributes are written sorted by tag so a given tree always produces the
//! same bytes. Namespace declarations are computed from the used-namespace
//! set and emitted only on the root element. A document whose root is
//! `<html>` switches to HTML mode: doctype instead of an XML declaration,
//! void elements without end tags, and HTML names written without a prefix.

use super::dom::{Document, NodeKind};
use super::tags::{
    NamespaceId, Tag, HTML_BR, HTML_COL, HTML_HR, HTML_HTML, HTML_IMG, HTML_LINK, HTML_META,
    NAMESPACE_HTML, NAMESPACE_NULL, NAMESPACE_XML,
};
use crate::error::{Result, WordlensError};
use indextree::NodeId;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeSet;
use std::io::Cursor;

fn html_requires_close_tag(tag: Tag) -> bool {
    !matches!(tag, HTML_IMG | HTML_BR | HTML_META | HTML_LINK | HTML_HR | HTML_COL)
}

struct Serialization<'a> {
    doc: &'a Document,
    default_ns: NamespaceId,
    html: bool,
    indent: bool,
}

pub fn serialize(doc: &Document, default_ns: NamespaceId, indent: bool) -> Result<String> {
    let bytes = serialize_bytes(doc, default_ns, indent)?;
    String::from_utf8(bytes).map_err(|e| WordlensError::XmlWrite(e.to_string()))
}

pub fn serialize_bytes(doc: &Document, default_ns: NamespaceId, indent: bool) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let html = doc.root().map(|root| doc.tag(root) == HTML_HTML).unwrap_or(false);
    let serialization = Serialization { doc, default_ns, html, indent };

    if html {
        writer
            .write_event(Event::DocType(BytesText::new("html")))
            .map_err(write_err)?;
        write_raw(&mut writer, "\n")?;
    } else {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(write_err)?;
        write_raw(&mut writer, "\n")?;
    }

    for child in doc.child_nodes(doc.doc_node()) {
        serialization.write_node(&mut writer, child, 0)?;
    }
    if indent {
        write_raw(&mut writer, "\n")?;
    }

    Ok(writer.into_inner().into_inner())
}

fn write_err<E: std::fmt::Display>(e: E) -> WordlensError {
    WordlensError::XmlWrite(e.to_string())
}

fn write_raw<W: std::io::Write>(writer: &mut Writer<W>, raw: &str) -> Result<()> {
    writer
        .write_event(Event::Text(BytesText::from_escaped(raw)))
        .map_err(write_err)
}

impl<'a> Serialization<'a> {
    fn namespace_of(&self, tag: Tag) -> NamespaceId {
        self.doc
            .names()
            .name_for_tag(tag)
            .map(|(ns, _)| ns)
            .unwrap_or(NAMESPACE_NULL)
    }

    fn prefix_of(&self, ns: NamespaceId) -> String {
        match self.doc.names().namespace_for_id(ns) {
            Some((_, prefix)) if !prefix.is_empty() => prefix.to_string(),
            Some(_) if ns == NAMESPACE_NULL => String::new(),
            _ => format!("ns{}", ns),
        }
    }

    fn element_qname(&self, tag: Tag) -> String {
        let (ns, local) = self
            .doc
            .names()
            .name_for_tag(tag)
            .expect("element tag has a name");
        if ns == self.default_ns || (self.html && ns == NAMESPACE_HTML) {
            local.to_string()
        } else {
            format!("{}:{}", self.prefix_of(ns), local)
        }
    }

    fn attribute_qname(&self, tag: Tag) -> String {
        let (ns, local) = self
            .doc
            .names()
            .name_for_tag(tag)
            .expect("attribute tag has a name");
        if ns == NAMESPACE_NULL || (self.html && ns == NAMESPACE_HTML) {
            local.to_string()
        } else if ns == NAMESPACE_XML {
            format!("xml:{}", local)
        } else {
            format!("{}:{}", self.prefix_of(ns), local)
        }
    }

    /// Namespaces referenced anywhere in the subtree, excluding the null and
    /// reserved xml namespaces.
    fn used_namespaces(&self, node: NodeId, used: &mut BTreeSet<NamespaceId>) {
        if let NodeKind::Element { tag, attrs } = &self.doc.node(node).kind {
            used.insert(self.namespace_of(*tag));
            for attr in attrs {
                let ns = self.namespace_of(attr.tag);
                if ns != NAMESPACE_NULL && ns != NAMESPACE_XML {
                    used.insert(ns);
                }
            }
        }
        for child in self.doc.child_nodes(node) {
            self.used_namespaces(child, used);
        }
    }

    fn write_namespace_declarations(&self, element: NodeId, start: &mut BytesStart) {
        let mut used = BTreeSet::new();
        self.used_namespaces(element, &mut used);
        used.remove(&NAMESPACE_NULL);
        used.remove(&NAMESPACE_XML);
        for ns in used {
            let Some((uri, _)) = self.doc.names().namespace_for_id(ns) else { continue };
            if self.html && ns != NAMESPACE_HTML {
                continue;
            }
            if ns == self.default_ns || (self.html && ns == NAMESPACE_HTML) {
                start.push_attribute(("xmlns", uri));
            } else {
                start.push_attribute((format!("xmlns:{}", self.prefix_of(ns)).as_str(), uri));
            }
        }
    }

    fn write_node<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        node: NodeId,
        depth: usize,
    ) -> Result<()> {
        match &self.doc.node(node).kind {
            NodeKind::Document => Ok(()),
            NodeKind::Element { tag, attrs } => self.write_element(writer, node, *tag, attrs, depth),
            NodeKind::Text(value) => writer
                .write_event(Event::Text(BytesText::new(value)))
                .map_err(write_err),
            NodeKind::CData(value) => writer
                .write_event(Event::CData(BytesCData::new(value.as_str())))
                .map_err(write_err),
            NodeKind::Comment(value) => writer
                .write_event(Event::Comment(BytesText::new(value)))
                .map_err(write_err),
            NodeKind::ProcessingInstruction { target, value } => {
                let content = if value.is_empty() {
                    target.clone()
                } else {
                    format!("{} {}", target, value)
                };
                writer
                    .write_event(Event::PI(BytesPI::new(content.as_str())))
                    .map_err(write_err)
            }
        }
    }

    fn write_element<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        node: NodeId,
        tag: Tag,
        attrs: &[super::dom::Attribute],
        depth: usize,
    ) -> Result<()> {
        let is_root = self.doc.parent(node) == Some(self.doc.doc_node());
        if self.indent && !is_root {
            write_raw(writer, &format!("\n{}", "  ".repeat(depth)))?;
        }

        let qname = self.element_qname(tag);
        let mut start = BytesStart::new(qname.as_str());

        if is_root {
            self.write_namespace_declarations(node, &mut start);
        }

        let mut sorted: Vec<_> = attrs.to_vec();
        sorted.sort_by_key(|a| a.tag);
        for attr in &sorted {
            start.push_attribute((self.attribute_qname(attr.tag).as_str(), attr.value.as_str()));
        }

        let children = self.doc.child_nodes(node);
        if children.is_empty() {
            if self.html && html_requires_close_tag(tag) {
                writer.write_event(Event::Start(start)).map_err(write_err)?;
                writer
                    .write_event(Event::End(BytesEnd::new(qname.as_str())))
                    .map_err(write_err)?;
            } else {
                writer.write_event(Event::Empty(start)).map_err(write_err)?;
            }
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(write_err)?;

        // Indentation would inject whitespace into pure text content.
        let all_text = children
            .iter()
            .all(|&c| matches!(self.doc.node(c).kind, NodeKind::Text(_)));
        let inner = Serialization {
            doc: self.doc,
            default_ns: self.default_ns,
            html: self.html,
            indent: self.indent && !all_text,
        };
        for child in &children {
            inner.write_node(writer, *child, depth + 1)?;
        }
        if inner.indent {
            write_raw(writer, &format!("\n{}", "  ".repeat(depth)))?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(qname.as_str())))
            .map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::parse;
    use crate::xml::tags::{
        HTML_BODY, HTML_CHARSET, HTML_HEAD, HTML_META, NAMESPACE_WORD, WORD_BODY, WORD_DOCUMENT,
        WORD_P, WORD_PPR, WORD_VAL,
    };

    #[test]
    fn attributes_are_sorted_by_tag() {
        let mut doc = Document::new_with_root(WORD_DOCUMENT);
        let root = doc.root().unwrap();
        doc.set_attribute(root, WORD_VAL, "v");
        doc.set_attribute(root, crate::xml::tags::WORD_TYPE, "t");
        let first = serialize(&doc, NAMESPACE_NULL, false).unwrap();

        let mut doc2 = Document::new_with_root(WORD_DOCUMENT);
        let root2 = doc2.root().unwrap();
        doc2.set_attribute(root2, crate::xml::tags::WORD_TYPE, "t");
        doc2.set_attribute(root2, WORD_VAL, "v");
        let second = serialize(&doc2, NAMESPACE_NULL, false).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn namespace_declarations_only_at_root() {
        let mut doc = Document::new_with_root(WORD_DOCUMENT);
        let root = doc.root().unwrap();
        let body = doc.create_child_element(root, WORD_BODY);
        let p = doc.create_child_element(body, WORD_P);
        doc.create_child_element(p, WORD_PPR);

        let xml = serialize(&doc, NAMESPACE_NULL, false).unwrap();
        assert_eq!(xml.matches("xmlns:w=").count(), 1);
        assert!(xml.contains("<w:document"));
        assert!(xml.contains("<w:body><w:p><w:pPr/></w:p></w:body>"));
    }

    #[test]
    fn word_default_namespace_drops_prefix() {
        let doc = Document::new_with_root(WORD_DOCUMENT);
        let xml = serialize(&doc, NAMESPACE_WORD, false).unwrap();
        assert!(xml.contains("<document"));
        assert!(xml.contains("xmlns=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\""));
    }

    #[test]
    fn html_mode_emits_doctype_and_void_tags() {
        let mut doc = Document::new_with_root(HTML_HTML);
        let root = doc.root().unwrap();
        let head = doc.create_child_element(root, HTML_HEAD);
        let meta = doc.create_child_element(head, HTML_META);
        doc.set_attribute(meta, HTML_CHARSET, "utf-8");
        let body = doc.create_child_element(root, HTML_BODY);
        doc.create_child_element(body, crate::xml::tags::HTML_SPAN);

        let html = serialize(&doc, NAMESPACE_HTML, false).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<meta charset=\"utf-8\"/>"));
        assert!(html.contains("<span></span>"));
        assert!(!html.contains("</meta>"));
        assert!(!html.contains("xhtml:"));
    }

    #[test]
    fn serialized_output_reparses_to_equal_tree() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hi</w:t></w:r></w:p></w:body></w:document>"#;
        let doc = parse(xml).unwrap();
        let out = serialize(&doc, NAMESPACE_NULL, false).unwrap();
        let doc2 = parse(&out).unwrap();
        let out2 = serialize(&doc2, NAMESPACE_NULL, false).unwrap();
        assert_eq!(out, out2);
    }

    #[test]
    fn unknown_namespace_roundtrips_with_prefix() {
        let xml = r#"<custom:thing xmlns:custom="urn:x" custom:a="1"/>"#;
        let doc = parse(xml).unwrap();
        let out = serialize(&doc, NAMESPACE_NULL, false).unwrap();
        assert!(out.contains("xmlns:custom=\"urn:x\""));
        assert!(out.contains("<custom:thing"));
        assert!(out.contains("custom:a=\"1\""));
    }

    #[test]
    fn pretty_printing_skips_text_only_elements() {
        let xml = "<a><b>text</b><c><d/></c></a>";
        let doc = parse(xml).unwrap();
        let out = serialize(&doc, NAMESPACE_NULL, true).unwrap();
        assert!(out.contains("<b>text</b>"));
        assert!(out.contains("\n  <c>"));
        assert!(out.contains("\n    <d/>"));
    }
}
