//! Name interning.
//!
//! A process-wide builtin table covers every predefined `(uri, local name)`
//! pair; each document carries its own [`NameMap`] for names first seen in
//! that document. Within one document a tag denotes the same name forever —
//! the mapping never mutates and never shrinks.

use super::tags::{
    predefined_namespace_decl, predefined_tag_decl, NamespaceId, Tag, MIN_ELEMENT_TAG,
    PREDEFINED_NAMESPACES, PREDEFINED_NAMESPACE_COUNT, PREDEFINED_TAGS, PREDEFINED_TAG_COUNT,
};
use once_cell::sync::Lazy;
use std::collections::HashMap;

struct BuiltinNames {
    // uri -> local name -> tag
    tags: HashMap<&'static str, HashMap<&'static str, Tag>>,
    namespaces_by_uri: HashMap<&'static str, NamespaceId>,
}

static BUILTIN: Lazy<BuiltinNames> = Lazy::new(|| {
    let mut tags: HashMap<&'static str, HashMap<&'static str, Tag>> = HashMap::new();
    for (index, decl) in PREDEFINED_TAGS.iter().enumerate() {
        let uri = PREDEFINED_NAMESPACES[decl.namespace as usize].uri;
        tags.entry(uri)
            .or_default()
            .insert(decl.local_name, MIN_ELEMENT_TAG + index as Tag);
    }
    let mut namespaces_by_uri = HashMap::new();
    for (id, decl) in PREDEFINED_NAMESPACES.iter().enumerate() {
        namespaces_by_uri.insert(decl.uri, id as NamespaceId);
    }
    BuiltinNames { tags, namespaces_by_uri }
});

struct DynamicTag {
    namespace: NamespaceId,
    local_name: String,
}

struct DynamicNamespace {
    uri: String,
    prefix: String,
}

/// Per-document name table. Consults the builtin table first and interns
/// everything else, allocating identifiers past the predefined ranges.
pub struct NameMap {
    dynamic_tags: Vec<DynamicTag>,
    dynamic_namespaces: Vec<DynamicNamespace>,
    tags_by_name: HashMap<String, HashMap<String, Tag>>,
    namespaces_by_uri: HashMap<String, NamespaceId>,
}

impl NameMap {
    pub fn new() -> Self {
        Self {
            dynamic_tags: Vec::new(),
            dynamic_namespaces: Vec::new(),
            tags_by_name: HashMap::new(),
            namespaces_by_uri: HashMap::new(),
        }
    }

    /// Interns a namespace, returning its id. An already-known URI keeps its
    /// original prefix; the prefix argument is advisory only.
    pub fn intern_namespace(&mut self, uri: &str, prefix: &str) -> NamespaceId {
        if let Some(&id) = BUILTIN.namespaces_by_uri.get(uri) {
            return id;
        }
        if let Some(&id) = self.namespaces_by_uri.get(uri) {
            return id;
        }
        let id = PREDEFINED_NAMESPACE_COUNT + self.dynamic_namespaces.len() as NamespaceId;
        self.dynamic_namespaces.push(DynamicNamespace {
            uri: uri.to_string(),
            prefix: prefix.to_string(),
        });
        self.namespaces_by_uri.insert(uri.to_string(), id);
        id
    }

    /// Resolves a `(uri, local name)` pair to a tag, interning it on first
    /// encounter.
    pub fn tag_for_name(&mut self, uri: &str, local_name: &str) -> Tag {
        if let Some(&tag) = BUILTIN.tags.get(uri).and_then(|m| m.get(local_name)) {
            return tag;
        }
        if let Some(&tag) = self.tags_by_name.get(uri).and_then(|m| m.get(local_name)) {
            return tag;
        }
        let namespace = self.intern_namespace(uri, "");
        let tag = PREDEFINED_TAG_COUNT + self.dynamic_tags.len() as Tag;
        self.dynamic_tags.push(DynamicTag {
            namespace,
            local_name: local_name.to_string(),
        });
        self.tags_by_name
            .entry(uri.to_string())
            .or_default()
            .insert(local_name.to_string(), tag);
        tag
    }

    /// The `(namespace id, local name)` for a tag. Fails for node-kind tags
    /// and tags never interned in this document.
    pub fn name_for_tag(&self, tag: Tag) -> Option<(NamespaceId, &str)> {
        if let Some(decl) = predefined_tag_decl(tag) {
            return Some((decl.namespace, decl.local_name));
        }
        let dynamic = self.dynamic_tags.get((tag.checked_sub(PREDEFINED_TAG_COUNT)?) as usize)?;
        Some((dynamic.namespace, &dynamic.local_name))
    }

    /// The `(uri, prefix)` pair for a namespace id.
    pub fn namespace_for_id(&self, ns: NamespaceId) -> Option<(&str, &str)> {
        if let Some(decl) = predefined_namespace_decl(ns) {
            return Some((decl.uri, decl.prefix));
        }
        let dynamic = self
            .dynamic_namespaces
            .get((ns.checked_sub(PREDEFINED_NAMESPACE_COUNT)?) as usize)?;
        Some((&dynamic.uri, &dynamic.prefix))
    }

    /// Total namespace ids in use, predefined ids included.
    pub fn namespace_count(&self) -> NamespaceId {
        PREDEFINED_NAMESPACE_COUNT + self.dynamic_namespaces.len() as NamespaceId
    }
}

impl Default for NameMap {
    fn default() -> Self {
        Self::new()
    }
}
