//! Conversion contexts shared by the word lenses.
//!
//! Every abstract element produced from a concrete node carries
//! `id="<prefix><seqno>"`; the put direction parses those ids back into the
//! concrete document's sequence-number index. A miss is not an error — the
//! container reconciliation falls back to creating a fresh concrete node.

use super::objects::WordObjects;
use crate::package::relationships::RelationshipSet;
use crate::package::OpcPackage;
use crate::xml::changes::ChangeSet;
use crate::xml::dom::Document;
use crate::xml::tags::{Tag, HTML_ID};
use indextree::NodeId;

/// Document-scoped id prefix for the word filter.
pub const ID_PREFIX: &str = "word";

pub struct WordGetContext<'a> {
    pub concrete: &'a Document,
    pub html: Document,
    pub package: &'a OpcPackage,
    /// Path of the main document part, the source of its relationships.
    pub main_part: &'a str,
}

impl<'a> WordGetContext<'a> {
    pub fn new(concrete: &'a Document, package: &'a OpcPackage, main_part: &'a str) -> Self {
        Self { concrete, html: Document::new(), package, main_part }
    }

    /// Creates an abstract element, stamping it with the concrete node's
    /// identity when there is one.
    pub fn create_abstract(&mut self, tag: Tag, concrete: Option<NodeId>) -> NodeId {
        let node = self.html.create_element(tag);
        if let Some(concrete) = concrete {
            let id = format!("{}{}", ID_PREFIX, self.concrete.seq(concrete));
            self.html.set_attribute(node, HTML_ID, &id);
        }
        node
    }

    /// Resolves a relationship id on the main part to its target.
    pub fn rel_target(&self, rel_id: &str) -> Option<String> {
        self.package.target_for_rel(self.main_part, rel_id)
    }

    pub fn rel_is_external(&self, rel_id: &str) -> bool {
        self.package
            .relationships(self.main_part)
            .and_then(|set| set.get(rel_id))
            .map(|rel| rel.target_mode == crate::package::TargetMode::External)
            .unwrap_or(false)
    }
}

pub struct WordPutContext<'a> {
    pub concrete: &'a mut Document,
    pub html: &'a Document,
    pub changes: &'a ChangeSet,
    pub objects: &'a mut WordObjects,
    pub rels: &'a mut RelationshipSet,
}

impl<'a> WordPutContext<'a> {
    /// The concrete node an abstract node's id points at.
    pub fn lookup_concrete(&self, abstract_node: NodeId) -> Option<NodeId> {
        if !self.html.node(abstract_node).is_element() {
            return None;
        }
        let id = self.html.get_attribute(abstract_node, HTML_ID)?;
        let seq: u32 = id.strip_prefix(ID_PREFIX)?.parse().ok()?;
        self.concrete.node_for_seq(seq)
    }

    /// True when neither the node nor anything below it changed.
    pub fn is_unchanged(&self, abstract_node: NodeId) -> bool {
        !self.changes.is_changed(self.html, abstract_node)
            && !self.changes.has_changed_children(self.html, abstract_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Store;
    use crate::xml::tags::{HTML_P, WORD_P};

    #[test]
    fn abstract_ids_resolve_back_to_concrete_nodes() {
        let concrete = {
            let mut doc = Document::new_with_root(WORD_P);
            let p = doc.root().unwrap();
            doc.create_child_element(p, WORD_P);
            doc
        };
        let package = OpcPackage::create(Store::open_memory());
        let mut get = WordGetContext::new(&concrete, &package, "word/document.xml");
        let p = concrete.root().unwrap();
        let abstract_p = get.create_abstract(HTML_P, Some(p));

        let html = get.html;
        let changes = ChangeSet::default();
        let mut objects = WordObjects::new();
        let mut rels = RelationshipSet::default();
        let mut concrete = concrete;
        let put = WordPutContext {
            concrete: &mut concrete,
            html: &html,
            changes: &changes,
            objects: &mut objects,
            rels: &mut rels,
        };
        assert_eq!(put.lookup_concrete(abstract_p), Some(p));
    }

    #[test]
    fn foreign_ids_miss_gracefully() {
        let mut concrete = Document::new_with_root(WORD_P);
        let mut html = Document::new_with_root(HTML_P);
        let root = html.root().unwrap();
        html.set_attribute(root, HTML_ID, "word99999");
        let changes = ChangeSet::default();
        let mut objects = WordObjects::new();
        let mut rels = RelationshipSet::default();
        let put = WordPutContext {
            concrete: &mut concrete,
            html: &html,
            changes: &changes,
            objects: &mut objects,
            rels: &mut rels,
        };
        assert_eq!(put.lookup_concrete(root), None);
    }
}
