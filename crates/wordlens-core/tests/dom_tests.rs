//! Structural invariants of the DOM and the name table, including a
//! property test over random edit sequences.

use proptest::prelude::*;
use wordlens_core::xml::tags::{HTML_DIV, HTML_SPAN};
use wordlens_core::xml::Document;

#[test]
fn name_table_roundtrips_every_interned_name() {
    let mut doc = Document::new();
    let names = [
        ("http://www.w3.org/1999/xhtml", "p"),
        ("http://schemas.openxmlformats.org/wordprocessingml/2006/main", "numPr"),
        ("urn:vendor:extension", "widget"),
        ("urn:vendor:extension", "gadget"),
        ("", "id"),
    ];
    for (uri, local) in names {
        let tag = doc.tag_for_name(uri, local);
        let (ns, got_local) = doc.names().name_for_tag(tag).unwrap();
        let (got_uri, _) = doc.names().namespace_for_id(ns).unwrap();
        assert_eq!((got_uri, got_local), (uri, local));
        // Interning is stable.
        assert_eq!(doc.tag_for_name(uri, local), tag);
    }
}

/// Checks the sibling/parent bookkeeping for the whole tree.
fn assert_tree_consistent(doc: &Document) {
    let mut stack = vec![doc.doc_node()];
    while let Some(node) = stack.pop() {
        let children: Vec<_> = doc.children(node).collect();
        match children.first() {
            Some(&first) => {
                assert_eq!(doc.first_child(node), Some(first));
                assert_eq!(doc.last_child(node), Some(*children.last().unwrap()));
            }
            None => {
                assert_eq!(doc.first_child(node), None);
                assert_eq!(doc.last_child(node), None);
            }
        }
        for (i, &child) in children.iter().enumerate() {
            assert_eq!(doc.parent(child), Some(node));
            let expected_prev = if i > 0 { Some(children[i - 1]) } else { None };
            let expected_next = children.get(i + 1).copied();
            assert_eq!(doc.prev_sibling(child), expected_prev);
            assert_eq!(doc.next_sibling(child), expected_next);
            stack.push(child);
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Append { parent: usize },
    InsertBefore { reference: usize },
    Remove { node: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..64).prop_map(|parent| Op::Append { parent }),
        (0usize..64).prop_map(|reference| Op::InsertBefore { reference }),
        (0usize..64).prop_map(|node| Op::Remove { node }),
    ]
}

proptest! {
    #[test]
    fn random_edit_sequences_keep_the_tree_consistent(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut doc = Document::new_with_root(HTML_DIV);
        let root = doc.root().unwrap();
        // Attached nodes, in creation order. The root is never removed.
        let mut attached = vec![root];

        for op in ops {
            match op {
                Op::Append { parent } => {
                    let parent = attached[parent % attached.len()];
                    let child = doc.create_element(HTML_SPAN);
                    doc.append_child(parent, child);
                    attached.push(child);
                }
                Op::InsertBefore { reference } => {
                    let reference = attached[reference % attached.len()];
                    if reference == root {
                        continue;
                    }
                    let parent = doc.parent(reference).unwrap();
                    let child = doc.create_element(HTML_SPAN);
                    doc.insert_before(parent, child, Some(reference));
                    attached.push(child);
                }
                Op::Remove { node } => {
                    let node = attached[node % attached.len()];
                    if node == root {
                        continue;
                    }
                    doc.remove_node(node);
                    // The subtree is detached; forget it and its descendants.
                    let detached: Vec<_> = doc.descendants(node).collect();
                    attached.retain(|n| !detached.contains(n));
                }
            }
            assert_tree_consistent(&doc);

            // Sequence numbers stay resolvable for every attached node.
            for &node in &attached {
                prop_assert_eq!(doc.node_for_seq(doc.seq(node)), Some(node));
            }
        }
    }
}
