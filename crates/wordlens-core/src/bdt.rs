//! Bidirectional container reconciliation.
//!
//! A lens maps between one concrete node kind and its abstract counterpart.
//! [`container_get`] derives the visible children of a concrete parent;
//! [`container_put`] reconciles an edited abstract child list back into the
//! concrete parent while keeping every non-visible concrete child attached
//! to the same visible neighbour it sat next to before the edit.

use crate::xml::dom::Document;
use indextree::NodeId;
use std::collections::{HashMap, HashSet};

/// Child-lens callbacks for the get direction.
pub trait GetLens {
    fn concrete(&self) -> &Document;
    fn abstract_mut(&mut self) -> &mut Document;
    /// Produces the abstract counterpart of a concrete child, or `None` for
    /// non-visible children.
    fn get(&mut self, concrete: NodeId) -> Option<NodeId>;
}

/// Child-lens callbacks for the put direction.
pub trait PutLens {
    fn concrete(&self) -> &Document;
    fn concrete_mut(&mut self) -> &mut Document;
    fn abstract_doc(&self) -> &Document;
    /// Whether a concrete child has an abstract counterpart. Non-visible
    /// children are preserved untouched.
    fn is_visible(&self, concrete: NodeId) -> bool;
    /// Locates the original concrete child for an abstract child, typically
    /// through the sequence number encoded in its id attribute.
    fn lookup(&mut self, abstract_node: NodeId) -> Option<NodeId>;
    fn put(&mut self, abstract_node: NodeId, concrete: NodeId);
    fn create(&mut self, abstract_node: NodeId) -> Option<NodeId>;
    /// Tears down secondary structures tied to a concrete child before it is
    /// detached.
    fn remove(&mut self, concrete: NodeId);
}

pub fn container_get<L: GetLens>(lens: &mut L, abstract_parent: NodeId, concrete_parent: NodeId) {
    for child in lens.concrete().child_nodes(concrete_parent) {
        if let Some(abstract_child) = lens.get(child) {
            lens.abstract_mut().append_child(abstract_parent, abstract_child);
        }
    }
}

pub fn container_put<L: PutLens>(lens: &mut L, abstract_parent: NodeId, concrete_parent: NodeId) {
    // Materialise a concrete child for each abstract child, in order.
    let abstract_children = lens.abstract_doc().child_nodes(abstract_parent);
    let mut desired: Vec<NodeId> = Vec::new();
    for abstract_child in abstract_children {
        let concrete = match lens.lookup(abstract_child) {
            Some(existing) => {
                lens.put(abstract_child, existing);
                Some(existing)
            }
            None => lens.create(abstract_child),
        };
        if let Some(concrete) = concrete {
            desired.push(concrete);
        }
    }

    // Record each desired child's nearest preceding non-visible sibling
    // before anything moves. `Some(None)` means the child is present but has
    // no hidden predecessor; an absent entry means the child is not desired.
    let mut old_prev_hidden: HashMap<u32, Option<NodeId>> = HashMap::new();
    for &concrete in desired.iter().rev() {
        let mut prev = lens.concrete().prev_sibling(concrete);
        while let Some(node) = prev {
            if lens.is_visible(node) {
                prev = lens.concrete().prev_sibling(node);
            } else {
                break;
            }
        }
        old_prev_hidden.insert(lens.concrete().seq(concrete), prev);
    }

    // Delete visible children whose abstract counterparts vanished.
    let remaining: HashSet<u32> = desired.iter().map(|&c| lens.concrete().seq(c)).collect();
    for child in lens.concrete().child_nodes(concrete_parent) {
        if lens.is_visible(child) && !remaining.contains(&lens.concrete().seq(child)) {
            lens.remove(child);
            lens.concrete_mut().remove_node(child);
        }
    }

    // The insertion anchor for the last desired child: the tail of the
    // parent after backing over trailing non-visible nodes.
    let mut last = lens.concrete().last_child(concrete_parent);
    while let Some(node) = last {
        match lens.concrete().prev_sibling(node) {
            Some(prev) if !lens.is_visible(prev) => last = Some(prev),
            _ => break,
        }
    }

    // Reinsert the desired children in their new order.
    for i in (0..desired.len()).rev() {
        let concrete = desired[i];
        let new_next = if i + 1 < desired.len() { Some(desired[i + 1]) } else { last };
        lens.concrete_mut().insert_before(concrete_parent, concrete, new_next);
    }

    // Fixup: move each visible child back to directly follow its recorded
    // hidden predecessor, unless a visible sibling blocks the way.
    for concrete in lens.concrete().child_nodes(concrete_parent) {
        if !lens.is_visible(concrete) {
            continue;
        }
        let Some(&recorded) = old_prev_hidden.get(&lens.concrete().seq(concrete)) else {
            continue;
        };
        let Some(prev_hidden) = recorded else { continue };

        let mut insertion_point = lens.concrete().next_sibling(concrete);
        let mut actual = lens.concrete().prev_sibling(concrete);
        let mut blocked_by_prev = false;
        let mut found = false;
        loop {
            if !blocked_by_prev {
                insertion_point = match actual {
                    None => lens.concrete().first_child(concrete_parent),
                    Some(node) => lens.concrete().next_sibling(node),
                };
            }
            if let Some(node) = actual {
                if lens.is_visible(node) {
                    blocked_by_prev = true;
                }
            }
            if actual == Some(prev_hidden) {
                found = true;
                break;
            }
            let Some(node) = actual else { break };
            actual = lens.concrete().prev_sibling(node);
        }
        if found {
            lens.concrete_mut().insert_before(concrete_parent, concrete, insertion_point);
        }
    }
}
