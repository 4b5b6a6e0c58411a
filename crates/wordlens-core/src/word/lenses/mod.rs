//! Lens instances for the word-processing vocabulary.
//!
//! Each lens is a table of five functions sharing the conversion contexts;
//! dispatch over concrete tags is closed, so the table form keeps the whole
//! mapping in one place per construct.

pub mod block_level;
pub mod body;
pub mod bookmark;
pub mod change;
pub mod document;
pub mod field;
pub mod hyperlink;
pub mod paragraph;
pub mod paragraph_content;
pub mod run;
pub mod smart_tag;
pub mod table;

use super::converter::{WordGetContext, WordPutContext};
use crate::bdt::{container_get, container_put, GetLens, PutLens};
use crate::xml::dom::Document;
use indextree::NodeId;

pub struct WordLens {
    pub is_visible: fn(&WordPutContext, NodeId) -> bool,
    pub get: fn(&mut WordGetContext, NodeId) -> Option<NodeId>,
    pub put: fn(&mut WordPutContext, NodeId, NodeId),
    pub create: fn(&mut WordPutContext, NodeId) -> Option<NodeId>,
    pub remove: fn(&mut WordPutContext, NodeId),
}

pub fn never_visible(_ctx: &WordPutContext, _concrete: NodeId) -> bool {
    false
}

pub fn always_visible(_ctx: &WordPutContext, _concrete: NodeId) -> bool {
    true
}

pub fn get_none(_ctx: &mut WordGetContext, _concrete: NodeId) -> Option<NodeId> {
    None
}

pub fn put_noop(_ctx: &mut WordPutContext, _abstract: NodeId, _concrete: NodeId) {}

pub fn create_none(_ctx: &mut WordPutContext, _abstract: NodeId) -> Option<NodeId> {
    None
}

pub fn remove_noop(_ctx: &mut WordPutContext, _concrete: NodeId) {}

/// Calls a lens's remove on every child of a concrete node.
pub fn remove_children(ctx: &mut WordPutContext, lens: &'static WordLens, concrete: NodeId) {
    for child in ctx.concrete.child_nodes(concrete) {
        (lens.remove)(ctx, child);
    }
}

struct GetAdapter<'a, 'b> {
    ctx: &'a mut WordGetContext<'b>,
    lens: &'static WordLens,
}

impl GetLens for GetAdapter<'_, '_> {
    fn concrete(&self) -> &Document {
        self.ctx.concrete
    }
    fn abstract_mut(&mut self) -> &mut Document {
        &mut self.ctx.html
    }
    fn get(&mut self, concrete: NodeId) -> Option<NodeId> {
        (self.lens.get)(self.ctx, concrete)
    }
}

struct PutAdapter<'a, 'b> {
    ctx: &'a mut WordPutContext<'b>,
    lens: &'static WordLens,
}

impl PutLens for PutAdapter<'_, '_> {
    fn concrete(&self) -> &Document {
        self.ctx.concrete
    }
    fn concrete_mut(&mut self) -> &mut Document {
        self.ctx.concrete
    }
    fn abstract_doc(&self) -> &Document {
        self.ctx.html
    }
    fn is_visible(&self, concrete: NodeId) -> bool {
        (self.lens.is_visible)(self.ctx, concrete)
    }
    fn lookup(&mut self, abstract_node: NodeId) -> Option<NodeId> {
        self.ctx.lookup_concrete(abstract_node)
    }
    fn put(&mut self, abstract_node: NodeId, concrete: NodeId) {
        (self.lens.put)(self.ctx, abstract_node, concrete)
    }
    fn create(&mut self, abstract_node: NodeId) -> Option<NodeId> {
        (self.lens.create)(self.ctx, abstract_node)
    }
    fn remove(&mut self, concrete: NodeId) {
        (self.lens.remove)(self.ctx, concrete)
    }
}

/// Derives the visible children of a concrete parent through a child lens.
pub fn word_container_get(
    ctx: &mut WordGetContext,
    lens: &'static WordLens,
    abstract_parent: NodeId,
    concrete_parent: NodeId,
) {
    let mut adapter = GetAdapter { ctx, lens };
    container_get(&mut adapter, abstract_parent, concrete_parent);
}

/// Reconciles an abstract child list into a concrete parent through a child
/// lens.
pub fn word_container_put(
    ctx: &mut WordPutContext,
    lens: &'static WordLens,
    abstract_parent: NodeId,
    concrete_parent: NodeId,
) {
    let mut adapter = PutAdapter { ctx, lens };
    container_put(&mut adapter, abstract_parent, concrete_parent);
}
