//! Markup Compatibility and Extensibility (MCE) handling.
//!
//! The parser pushes one record per open element; `mc:Ignorable`,
//! `mc:ProcessContent` and `mc:MustUnderstand` attributes add declarations to
//! the record on top. Lookups walk the stack from the innermost record out.

use super::names::NameMap;
use super::tags::{NamespaceId, Tag};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McAction {
    Default,
    Ignore,
    ProcessContent,
    MustUnderstand,
}

struct McDecl {
    namespace: NamespaceId,
    tag: Option<Tag>,
    action: McAction,
}

#[derive(Default)]
struct McRecord {
    decls: Vec<McDecl>,
    // prefix -> namespace id, from the xmlns declarations on this element
    namespaces: HashMap<String, NamespaceId>,
}

#[derive(Default)]
pub struct MarkupCompatibility {
    records: Vec<McRecord>,
}

impl MarkupCompatibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a record for an element, registering the namespace prefixes it
    /// declares so later `mc:*` attribute values can be resolved.
    pub fn push(&mut self, declared: &[(String, String)], map: &mut NameMap) {
        let mut record = McRecord::default();
        for (prefix, uri) in declared {
            let ns = map.intern_namespace(uri, prefix);
            record.namespaces.insert(prefix.clone(), ns);
        }
        self.records.push(record);
    }

    pub fn pop(&mut self) {
        self.records.pop();
    }

    /// The action applying to a name in the given namespace. `tag` narrows
    /// process-content declarations of the form `prefix:localName`.
    pub fn lookup(&self, namespace: NamespaceId, tag: Tag, is_element: bool) -> McAction {
        for record in self.records.iter().rev() {
            for decl in &record.decls {
                if decl.namespace != namespace {
                    continue;
                }
                match decl.action {
                    McAction::Ignore => return McAction::Ignore,
                    McAction::ProcessContent => {
                        if decl.tag.is_none() || (decl.tag == Some(tag) && is_element) {
                            return McAction::ProcessContent;
                        }
                    }
                    McAction::MustUnderstand => return McAction::MustUnderstand,
                    McAction::Default => {}
                }
            }
        }
        McAction::Default
    }

    /// Processes the value of an `mc:Ignorable` / `mc:ProcessContent` /
    /// `mc:MustUnderstand` attribute: a whitespace-separated list of
    /// `prefix` or `prefix:localName` tokens resolved against the prefixes
    /// in scope.
    pub fn process_attr(&mut self, action: McAction, value: &str, map: &mut NameMap) {
        for token in value.split_whitespace() {
            let (prefix, local_name) = match token.split_once(':') {
                Some((p, l)) => (p, Some(l)),
                None => (token, None),
            };

            let mut namespace = None;
            for record in self.records.iter().rev() {
                if let Some(&ns) = record.namespaces.get(prefix) {
                    namespace = Some(ns);
                    break;
                }
            }
            let Some(namespace) = namespace else { continue };

            let tag = local_name.map(|local| {
                let uri = map
                    .namespace_for_id(namespace)
                    .map(|(uri, _)| uri.to_string())
                    .unwrap_or_default();
                map.tag_for_name(&uri, local)
            });

            if let Some(record) = self.records.last_mut() {
                record.decls.push(McDecl { namespace, tag, action });
            }
        }
    }
}
