pub mod changes;
pub mod dom;
pub mod mce;
pub mod names;
pub mod parser;
pub mod tags;
pub mod writer;

pub use changes::{compute_changes, ChangeSet};
pub use dom::{Attribute, Document, Node, NodeKind};
pub use names::NameMap;
pub use tags::{NamespaceId, Tag};
