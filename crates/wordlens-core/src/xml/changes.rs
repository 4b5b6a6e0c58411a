//! Two-tree structural diff.
//!
//! Correlates elements of an old and a new tree through an identity
//! attribute and records which old nodes changed. Flags live in a side table
//! keyed by sequence number so the trees themselves stay untouched; only the
//! old tree's table is populated, the new tree is read-only.

use super::dom::{Document, NodeKind};
use super::tags::{Tag, DOM_CDATA, DOM_COMMENT, DOM_PROCESSING_INSTRUCTION, DOM_TEXT};
use indextree::NodeId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct ChangeSet {
    changed: HashSet<u32>,
    children_changed: HashSet<u32>,
}

impl ChangeSet {
    pub fn is_changed(&self, doc: &Document, node: NodeId) -> bool {
        self.changed.contains(&doc.seq(node))
    }

    pub fn has_changed_children(&self, doc: &Document, node: NodeId) -> bool {
        self.children_changed.contains(&doc.seq(node))
    }

    fn mark_changed(&mut self, doc: &Document, node: NodeId) {
        self.changed.insert(doc.seq(node));
    }
}

/// Computes change flags for `old_root` against `new_root`, correlating
/// elements by the value of `id_attr`. The exclusion in the attribute
/// comparison is the same caller-supplied tag.
pub fn compute_changes(
    old: &Document,
    old_root: NodeId,
    new: &Document,
    new_root: NodeId,
    id_attr: Tag,
) -> ChangeSet {
    let mut map = HashMap::new();
    elements_by_attr(new, new_root, id_attr, &mut map);

    let mut set = ChangeSet::default();
    record_changes(old, old_root, new, &map, id_attr, &mut set);
    propagate_changes(old, old_root, &mut set);
    set
}

fn elements_by_attr<'a>(
    doc: &'a Document,
    node: NodeId,
    attr: Tag,
    map: &mut HashMap<&'a str, NodeId>,
) {
    if doc.node(node).is_element() {
        if let Some(value) = doc.get_attribute(node, attr) {
            map.entry(value).or_insert(node);
        }
    }
    for child in doc.children(node) {
        if doc.node(child).is_element() {
            elements_by_attr(doc, child, attr, map);
        }
    }
}

fn identical_attributes_except(
    old: &Document,
    a: NodeId,
    new: &Document,
    b: NodeId,
    except: Tag,
) -> bool {
    for attr in old.node(a).attributes() {
        if attr.tag == except {
            continue;
        }
        if new.get_attribute(b, attr.tag) != Some(attr.value.as_str()) {
            return false;
        }
    }
    for attr in new.node(b).attributes() {
        if attr.tag == except {
            continue;
        }
        if old.get_attribute(a, attr.tag) != Some(attr.value.as_str()) {
            return false;
        }
    }
    true
}

fn record_changes(
    old: &Document,
    parent1: NodeId,
    new: &Document,
    map: &HashMap<&str, NodeId>,
    id_attr: Tag,
    set: &mut ChangeSet,
) {
    // Children first.
    for child in old.children(parent1) {
        if old.node(child).is_element() {
            record_changes(old, child, new, map, id_attr, set);
        }
    }

    let parent2 = old
        .get_attribute(parent1, id_attr)
        .and_then(|id| map.get(id).copied());
    let Some(parent2) = parent2 else {
        set.mark_changed(old, parent1);
        return;
    };

    if old.tag(parent1) != new.tag(parent2) {
        set.mark_changed(old, parent1);
    }
    if !identical_attributes_except(old, parent1, new, parent2, id_attr) {
        set.mark_changed(old, parent1);
    }

    // Non-element children can't be correlated by id; compare aligned pairs
    // by content.
    let children1 = old.child_nodes(parent1);
    let children2 = new.child_nodes(parent2);
    for (&child1, &child2) in children1.iter().zip(children2.iter()) {
        if old.tag(child1) != new.tag(child2) {
            set.mark_changed(old, parent1);
            continue;
        }
        match old.tag(child1) {
            DOM_TEXT | DOM_COMMENT | DOM_CDATA => {
                if old.node(child1).value() != new.node(child2).value() {
                    set.mark_changed(old, child1);
                }
            }
            DOM_PROCESSING_INSTRUCTION => {
                let target_differs = match (&old.node(child1).kind, &new.node(child2).kind) {
                    (
                        NodeKind::ProcessingInstruction { target: t1, value: v1 },
                        NodeKind::ProcessingInstruction { target: t2, value: v2 },
                    ) => t1 != t2 || v1 != v2,
                    _ => false,
                };
                if target_differs {
                    set.mark_changed(old, child1);
                }
            }
            _ => {}
        }
    }
    if children1.len() != children2.len() {
        set.mark_changed(old, parent1);
    }
}

fn propagate_changes(old: &Document, node: NodeId, set: &mut ChangeSet) {
    for child in old.child_nodes(node) {
        propagate_changes(old, child, set);
        if set.is_changed(old, child) || set.has_changed_children(old, child) {
            set.children_changed.insert(old.seq(node));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::parse;
    use crate::xml::tags::HTML_ID;

    fn parse_pair(old: &str, new: &str) -> (Document, Document) {
        (parse(old).unwrap(), parse(new).unwrap())
    }

    #[test]
    fn attribute_mutation_flags_element_and_ancestors() {
        let (old, new) = parse_pair(
            r#"<body id="b"><div id="d"><p id="p" class="x">t</p></div></body>"#,
            r#"<body id="b"><div id="d"><p id="p" class="y">t</p></div></body>"#,
        );
        let old_root = old.root().unwrap();
        let set = compute_changes(&old, old_root, &new, new.root().unwrap(), HTML_ID);

        let div = old.children(old_root).next().unwrap();
        let p = old.children(div).next().unwrap();

        assert!(set.is_changed(&old, p));
        assert!(set.has_changed_children(&old, div));
        assert!(set.has_changed_children(&old, old_root));
        assert!(!set.is_changed(&old, div));
        assert!(!set.is_changed(&old, old_root));
        assert!(!set.has_changed_children(&old, p));
    }

    #[test]
    fn identical_trees_produce_no_flags() {
        let (old, new) = parse_pair(
            r#"<body id="b"><p id="p">text</p></body>"#,
            r#"<body id="b"><p id="p">text</p></body>"#,
        );
        let old_root = old.root().unwrap();
        let set = compute_changes(&old, old_root, &new, new.root().unwrap(), HTML_ID);
        for node in old.descendants(old_root) {
            assert!(!set.is_changed(&old, node));
            assert!(!set.has_changed_children(&old, node));
        }
    }

    #[test]
    fn missing_counterpart_marks_old_element() {
        let (old, new) = parse_pair(
            r#"<body id="b"><p id="gone">x</p></body>"#,
            r#"<body id="b"></body>"#,
        );
        let old_root = old.root().unwrap();
        let set = compute_changes(&old, old_root, &new, new.root().unwrap(), HTML_ID);
        let p = old.children(old_root).next().unwrap();
        assert!(set.is_changed(&old, p));
        // The body's child count changed as well.
        assert!(set.is_changed(&old, old_root));
    }

    #[test]
    fn text_edit_marks_text_node_changed() {
        let (old, new) = parse_pair(
            r#"<p id="p">before</p>"#,
            r#"<p id="p">after</p>"#,
        );
        let old_root = old.root().unwrap();
        let set = compute_changes(&old, old_root, &new, new.root().unwrap(), HTML_ID);
        let text = old.children(old_root).next().unwrap();
        assert!(set.is_changed(&old, text));
        assert!(set.has_changed_children(&old, old_root));
        assert!(!set.is_changed(&old, old_root));
    }

    #[test]
    fn exclusion_tag_is_honoured() {
        // Correlated by class, only the class attribute is exempt from the
        // comparison, so the differing ids count as a change.
        let (old, new) = parse_pair(
            r#"<p class="k" id="one">t</p>"#,
            r#"<p class="k" id="two">t</p>"#,
        );
        let old_root = old.root().unwrap();
        let set = compute_changes(
            &old,
            old_root,
            &new,
            new.root().unwrap(),
            crate::xml::tags::HTML_CLASS,
        );
        assert!(set.is_changed(&old, old_root));

        // Correlated by id the ids differ, so "one" has no counterpart at
        // all and the element is changed for that reason instead.
        let set = compute_changes(&old, old_root, &new, new.root().unwrap(), HTML_ID);
        assert!(set.is_changed(&old, old_root));
    }
}
