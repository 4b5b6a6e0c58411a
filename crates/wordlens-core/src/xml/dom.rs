//! Interned-name document trees.
//!
//! Nodes live in an arena owned by the [`Document`]; detaching a node takes
//! it out of the tree but never frees it — storage is reclaimed when the
//! document is dropped. Every node carries a sequence number assigned at
//! creation, unique within its document and stable across re-parenting.

use super::names::NameMap;
use super::tags::{
    Tag, DOM_CDATA, DOM_COMMENT, DOM_DOCUMENT, DOM_PROCESSING_INSTRUCTION, DOM_TEXT, HTML_ID,
    MIN_ELEMENT_TAG, XML_SPACE,
};
use indextree::{Arena, NodeId};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub tag: Tag,
    pub value: String,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element { tag: Tag, attrs: Vec<Attribute> },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { target: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Node {
    seq: u32,
    pub kind: NodeKind,
}

impl Node {
    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// The element tag, or the node-kind marker for non-elements.
    pub fn tag(&self) -> Tag {
        match &self.kind {
            NodeKind::Document => DOM_DOCUMENT,
            NodeKind::Element { tag, .. } => *tag,
            NodeKind::Text(_) => DOM_TEXT,
            NodeKind::CData(_) => DOM_CDATA,
            NodeKind::Comment(_) => DOM_COMMENT,
            NodeKind::ProcessingInstruction { .. } => DOM_PROCESSING_INSTRUCTION,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    /// String value of text, CDATA and comment nodes.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(s) | NodeKind::CData(s) | NodeKind::Comment(s) => Some(s),
            NodeKind::ProcessingInstruction { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        match &self.kind {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }
}

pub struct Document {
    arena: Arena<Node>,
    doc_node: NodeId,
    names: NameMap,
    next_seq: u32,
    seq_index: HashMap<u32, NodeId>,
    id_index: HashMap<String, NodeId>,
}

impl Document {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let doc_node = arena.new_node(Node { seq: 0, kind: NodeKind::Document });
        let mut seq_index = HashMap::new();
        seq_index.insert(0, doc_node);
        Self {
            arena,
            doc_node,
            names: NameMap::new(),
            next_seq: 1,
            seq_index,
            id_index: HashMap::new(),
        }
    }

    pub fn new_with_root(tag: Tag) -> Self {
        let mut doc = Self::new();
        let root = doc.create_element(tag);
        doc.append_child(doc.doc_node, root);
        doc
    }

    pub fn doc_node(&self) -> NodeId {
        self.doc_node
    }

    /// The root element: the first element child of the document node.
    pub fn root(&self) -> Option<NodeId> {
        self.children(self.doc_node)
            .find(|&child| self.node(child).is_element())
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.arena[id].get()
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.arena[id].get_mut()
    }

    pub fn tag(&self, id: NodeId) -> Tag {
        self.node(id).tag()
    }

    pub fn seq(&self, id: NodeId) -> u32 {
        self.node(id).seq
    }

    pub fn names(&self) -> &NameMap {
        &self.names
    }

    pub fn names_mut(&mut self) -> &mut NameMap {
        &mut self.names
    }

    pub fn tag_for_name(&mut self, uri: &str, local_name: &str) -> Tag {
        self.names.tag_for_name(uri, local_name)
    }

    fn new_node(&mut self, kind: NodeKind) -> NodeId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.arena.new_node(Node { seq, kind });
        self.seq_index.insert(seq, id);
        id
    }

    pub fn create_element(&mut self, tag: Tag) -> NodeId {
        debug_assert!(tag >= MIN_ELEMENT_TAG);
        self.new_node(NodeKind::Element { tag, attrs: Vec::new() })
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.new_node(NodeKind::Text(data.to_string()))
    }

    pub fn create_cdata(&mut self, data: &str) -> NodeId {
        self.new_node(NodeKind::CData(data.to_string()))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.new_node(NodeKind::Comment(data.to_string()))
    }

    pub fn create_pi(&mut self, target: &str, value: &str) -> NodeId {
        self.new_node(NodeKind::ProcessingInstruction {
            target: target.to_string(),
            value: value.to_string(),
        })
    }

    pub fn create_child_element(&mut self, parent: NodeId, tag: Tag) -> NodeId {
        let child = self.create_element(tag);
        self.append_child(parent, child);
        child
    }

    pub fn create_child_text(&mut self, parent: NodeId, data: &str) -> NodeId {
        let child = self.create_text(data);
        self.append_child(parent, child);
        child
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        parent.checked_append(child, &mut self.arena).expect("append within one document");
    }

    /// Inserts `new` as a child of `parent` immediately before `reference`;
    /// appends when `reference` is `None`. Re-parents `new` if attached.
    pub fn insert_before(&mut self, parent: NodeId, new: NodeId, reference: Option<NodeId>) {
        match reference {
            Some(reference) => {
                if new == reference {
                    return;
                }
                debug_assert_eq!(self.parent(reference), Some(parent));
                reference
                    .checked_insert_before(new, &mut self.arena)
                    .expect("insert within one document");
            }
            None => self.append_child(parent, new),
        }
    }

    /// Detaches a node (and its subtree) from the tree. The node remains
    /// owned by the document and keeps its sequence number.
    pub fn remove_node(&mut self, id: NodeId) {
        id.detach(&mut self.arena);
    }

    pub fn remove_but_keep_children(&mut self, id: NodeId) {
        let parent = self.parent(id).expect("node has a parent");
        while let Some(child) = self.first_child(id) {
            child.detach(&mut self.arena);
            self.insert_before(parent, child, Some(id));
        }
        self.remove_node(id);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].first_child()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].last_child()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].next_sibling()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].previous_sibling()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).collect()
    }

    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    pub fn get_attribute(&self, id: NodeId, tag: Tag) -> Option<&str> {
        self.node(id)
            .attributes()
            .iter()
            .find(|a| a.tag == tag)
            .map(|a| a.value.as_str())
    }

    pub fn get_child_attribute(&self, parent: NodeId, child_tag: Tag, attr_tag: Tag) -> Option<&str> {
        let child = self.child_with_tag(parent, child_tag)?;
        self.get_attribute(child, attr_tag)
    }

    pub fn set_attribute(&mut self, id: NodeId, tag: Tag, value: &str) {
        if tag == HTML_ID {
            if let Some(old) = self.get_attribute(id, HTML_ID).map(str::to_string) {
                self.id_index.remove(&old);
            }
            self.id_index.insert(value.to_string(), id);
        }
        if let NodeKind::Element { attrs, .. } = &mut self.node_mut(id).kind {
            if let Some(attr) = attrs.iter_mut().find(|a| a.tag == tag) {
                attr.value = value.to_string();
            } else {
                attrs.push(Attribute { tag, value: value.to_string() });
            }
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, tag: Tag) {
        if tag == HTML_ID {
            if let Some(old) = self.get_attribute(id, HTML_ID).map(str::to_string) {
                self.id_index.remove(&old);
            }
        }
        if let NodeKind::Element { attrs, .. } = &mut self.node_mut(id).kind {
            attrs.retain(|a| a.tag != tag);
        }
    }

    pub fn clear_attributes(&mut self, id: NodeId) {
        if let Some(old) = self.get_attribute(id, HTML_ID).map(str::to_string) {
            self.id_index.remove(&old);
        }
        if let NodeKind::Element { attrs, .. } = &mut self.node_mut(id).kind {
            attrs.clear();
        }
    }

    pub fn child_with_tag(&self, parent: NodeId, tag: Tag) -> Option<NodeId> {
        self.children(parent).find(|&child| self.tag(child) == tag)
    }

    /// Concatenated text and CDATA content of the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            match &self.node(node).kind {
                NodeKind::Text(s) | NodeKind::CData(s) => out.push_str(s),
                _ => {}
            }
        }
        out
    }

    pub fn node_for_seq(&self, seq: u32) -> Option<NodeId> {
        self.seq_index.get(&seq).copied()
    }

    pub fn element_for_id(&self, id_value: &str) -> Option<NodeId> {
        self.id_index.get(id_value).copied()
    }

    /// Walks the tree in document order assigning fresh sequence numbers and
    /// rebuilds the sequence index. Detached subtrees lose their entries.
    pub fn reassign_sequence_numbers(&mut self) {
        self.seq_index.clear();
        self.next_seq = 0;
        let nodes: Vec<NodeId> = self.doc_node.descendants(&self.arena).collect();
        for id in nodes {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.arena[id].get_mut().seq = seq;
            self.seq_index.insert(seq, id);
        }
    }

    /// Trims text nodes, dropping the ones left empty, except beneath an
    /// element with `xml:space="preserve"`.
    pub fn strip_whitespace(&mut self, id: NodeId) {
        match &self.node(id).kind {
            NodeKind::Text(value) => {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() && self.parent(id).is_some() {
                    self.remove_node(id);
                } else {
                    self.node_mut(id).kind = NodeKind::Text(trimmed);
                }
            }
            _ => {
                if self.node(id).is_element()
                    && self.get_attribute(id, XML_SPACE) == Some("preserve")
                {
                    return;
                }
                for child in self.child_nodes(id) {
                    self.strip_whitespace(child);
                }
            }
        }
    }

    /// Structural equality of two subtrees in this document: same tags,
    /// same attribute sets (order-insensitive), same child sequences.
    pub fn subtrees_equal(&self, a: NodeId, b: NodeId) -> bool {
        let (na, nb) = (self.node(a), self.node(b));
        match (&na.kind, &nb.kind) {
            (
                NodeKind::Element { tag: ta, attrs: aa },
                NodeKind::Element { tag: tb, attrs: ab },
            ) => {
                if ta != tb || aa.len() != ab.len() {
                    return false;
                }
                let mut sa: Vec<_> = aa.iter().collect();
                let mut sb: Vec<_> = ab.iter().collect();
                sa.sort_by_key(|x| x.tag);
                sb.sort_by_key(|x| x.tag);
                if sa != sb {
                    return false;
                }
                let ca = self.child_nodes(a);
                let cb = self.child_nodes(b);
                ca.len() == cb.len()
                    && ca.iter().zip(&cb).all(|(&x, &y)| self.subtrees_equal(x, y))
            }
            (NodeKind::Text(x), NodeKind::Text(y)) => x == y,
            (NodeKind::CData(x), NodeKind::CData(y)) => x == y,
            (NodeKind::Comment(x), NodeKind::Comment(y)) => x == y,
            (
                NodeKind::ProcessingInstruction { target: tx, value: vx },
                NodeKind::ProcessingInstruction { target: ty, value: vy },
            ) => tx == ty && vx == vy,
            _ => false,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::tags::{HTML_BODY, HTML_P, HTML_SPAN, WORD_P};

    #[test]
    fn sequence_numbers_survive_reparenting() {
        let mut doc = Document::new_with_root(HTML_BODY);
        let body = doc.root().unwrap();
        let first = doc.create_child_element(body, HTML_P);
        let second = doc.create_child_element(body, HTML_P);
        let seq = doc.seq(first);

        doc.remove_node(first);
        doc.insert_before(body, first, None);
        assert_eq!(doc.seq(first), seq);
        assert_eq!(doc.node_for_seq(seq), Some(first));
        assert_eq!(doc.child_nodes(body), vec![second, first]);
    }

    #[test]
    fn insert_before_orders_children() {
        let mut doc = Document::new_with_root(HTML_BODY);
        let body = doc.root().unwrap();
        let a = doc.create_child_element(body, HTML_P);
        let b = doc.create_element(HTML_SPAN);
        doc.insert_before(body, b, Some(a));
        assert_eq!(doc.child_nodes(body), vec![b, a]);
        assert_eq!(doc.parent(b), Some(body));
        assert_eq!(doc.next_sibling(b), Some(a));
        assert_eq!(doc.prev_sibling(a), Some(b));
    }

    #[test]
    fn id_attribute_maintains_index() {
        let mut doc = Document::new_with_root(HTML_BODY);
        let body = doc.root().unwrap();
        let p = doc.create_child_element(body, HTML_P);
        doc.set_attribute(p, HTML_ID, "word12");
        assert_eq!(doc.element_for_id("word12"), Some(p));

        doc.set_attribute(p, HTML_ID, "word13");
        assert_eq!(doc.element_for_id("word12"), None);
        assert_eq!(doc.element_for_id("word13"), Some(p));

        doc.remove_attribute(p, HTML_ID);
        assert_eq!(doc.element_for_id("word13"), None);
    }

    #[test]
    fn get_attribute_on_non_element_is_none() {
        let mut doc = Document::new_with_root(HTML_P);
        let p = doc.root().unwrap();
        let text = doc.create_child_text(p, "hello");
        assert_eq!(doc.get_attribute(text, HTML_ID), None);
    }

    #[test]
    fn remove_but_keep_children_splices() {
        let mut doc = Document::new_with_root(HTML_BODY);
        let body = doc.root().unwrap();
        let span = doc.create_child_element(body, HTML_SPAN);
        let a = doc.create_child_element(span, HTML_P);
        let b = doc.create_child_element(span, HTML_P);
        doc.remove_but_keep_children(span);
        assert_eq!(doc.child_nodes(body), vec![a, b]);
        assert_eq!(doc.parent(span), None);
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let mut doc = Document::new_with_root(WORD_P);
        let p = doc.root().unwrap();
        let r = doc.create_child_element(p, HTML_SPAN);
        doc.create_child_text(r, "Hello ");
        let r2 = doc.create_child_element(p, HTML_SPAN);
        doc.create_child_text(r2, "World");
        assert_eq!(doc.text_content(p), "Hello World");
    }

    #[test]
    fn reassign_sequence_numbers_rebuilds_index() {
        let mut doc = Document::new_with_root(HTML_BODY);
        let body = doc.root().unwrap();
        let p = doc.create_child_element(body, HTML_P);
        doc.reassign_sequence_numbers();
        assert_eq!(doc.seq(doc.doc_node()), 0);
        assert_eq!(doc.seq(body), 1);
        assert_eq!(doc.seq(p), 2);
        assert_eq!(doc.node_for_seq(2), Some(p));
    }

    #[test]
    fn strip_whitespace_preserves_marked_subtrees() {
        let mut doc = Document::new_with_root(HTML_BODY);
        let body = doc.root().unwrap();
        let p = doc.create_child_element(body, HTML_P);
        doc.create_child_text(p, "  keep  ");
        let pre = doc.create_child_element(body, HTML_SPAN);
        doc.set_attribute(pre, XML_SPACE, "preserve");
        doc.create_child_text(pre, "  spaced  ");

        doc.strip_whitespace(body);
        assert_eq!(doc.text_content(p), "keep");
        assert_eq!(doc.text_content(pre), "  spaced  ");
    }
}
