//! Open Packaging Conventions container.
//!
//! Layers the content-type registry and typed relationship sets over a raw
//! byte store. XML parts are parsed on demand and written back through the
//! serializer; parts the engine does not recognise round-trip untouched.

use super::content_types::ContentTypes;
use super::relationships::{
    rels_path_for, resolve_target, source_for_rels_path, Relationship, RelationshipSet,
};
use super::store::Store;
use crate::error::{Result, WordlensError};
use crate::xml::dom::Document;
use crate::xml::tags::{NamespaceId, NAMESPACE_CT, NAMESPACE_REL};
use crate::xml::{parser, writer};
use std::collections::HashMap;

pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

pub struct OpcPackage {
    store: Store,
    content_types: ContentTypes,
    // source part path ("" for the package root) -> relationships
    relationships: HashMap<String, RelationshipSet>,
}

impl OpcPackage {
    /// Opens an existing package, parsing the content-type registry and
    /// every `_rels` part.
    pub fn open(store: Store) -> Result<Self> {
        let content_types = if store.exists(CONTENT_TYPES_PATH) {
            let doc = parser::parse_bytes(store.read(CONTENT_TYPES_PATH)?)?;
            ContentTypes::from_document(&doc)
        } else {
            ContentTypes::new()
        };

        let mut relationships = HashMap::new();
        for path in store.list() {
            let Some(source) = source_for_rels_path(&path) else { continue };
            let doc = parser::parse_bytes(store.read(&path)?)?;
            relationships.insert(source, RelationshipSet::from_document(&doc));
        }

        Ok(Self { store, content_types, relationships })
    }

    /// Creates an empty package over the given store.
    pub fn create(store: Store) -> Self {
        Self {
            store,
            content_types: ContentTypes::new(),
            relationships: HashMap::new(),
        }
    }

    pub fn read(&self, path: &str) -> Result<&[u8]> {
        self.store.read(path)
    }

    pub fn write(&mut self, path: &str, content: Vec<u8>) {
        self.store.write(path, content);
    }

    pub fn exists(&self, path: &str) -> bool {
        self.store.exists(path)
    }

    pub fn list(&self) -> Vec<String> {
        self.store.list()
    }

    pub fn read_xml(&self, path: &str) -> Result<Document> {
        parser::parse_bytes(self.store.read(path)?)
    }

    pub fn write_xml(&mut self, path: &str, doc: &Document, default_ns: NamespaceId) -> Result<()> {
        let bytes = writer::serialize_bytes(doc, default_ns, false)?;
        self.store.write(path, bytes);
        Ok(())
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    pub fn content_types_mut(&mut self) -> &mut ContentTypes {
        &mut self.content_types
    }

    pub fn relationships(&self, source: &str) -> Option<&RelationshipSet> {
        self.relationships.get(source.trim_start_matches('/'))
    }

    pub fn relationships_mut(&mut self, source: &str) -> &mut RelationshipSet {
        self.relationships
            .entry(source.trim_start_matches('/').to_string())
            .or_default()
    }

    /// Resolves a relationship id on a source part to the target part path.
    pub fn target_for_rel(&self, source: &str, rel_id: &str) -> Option<String> {
        let rel = self.relationships(source)?.get(rel_id)?;
        Some(resolve_target(source, &rel.target))
    }

    /// Creates a part, records a relationship from `source` to it, and
    /// registers its content type. Returns the relationship id.
    pub fn add_related_part(
        &mut self,
        source: &str,
        target: &str,
        content_type: &str,
        rel_type: &str,
    ) -> String {
        let target = target.trim_start_matches('/').to_string();
        if !self.store.exists(&target) {
            self.store.write(&target, Vec::new());
        }
        self.content_types.set_override(&target, content_type);
        let relative = relative_target(source, &target);
        self.relationships_mut(source).add_with_fresh_id(rel_type, &relative)
    }

    pub fn add_relationship(&mut self, source: &str, rel: Relationship) {
        self.relationships_mut(source).add(rel);
    }

    /// Deletes a part together with its relationships part, its content-type
    /// override, and every inbound relationship pointing at it.
    pub fn delete_part(&mut self, path: &str) {
        let path = path.trim_start_matches('/').to_string();
        self.store.delete(&path);
        self.store.delete(&rels_path_for(&path));
        self.relationships.remove(&path);
        self.content_types.remove_override(&path);
        for (source, set) in self.relationships.iter_mut() {
            set.remove_targeting(source, &path);
        }
    }

    /// Serializes the descriptors and flushes the store.
    pub fn save(&mut self) -> Result<()> {
        let ct_doc = self.content_types.to_document();
        let bytes = writer::serialize_bytes(&ct_doc, NAMESPACE_CT, false)?;
        self.store.write(CONTENT_TYPES_PATH, bytes);

        for (source, set) in &self.relationships {
            let path = rels_path_for(source);
            if set.is_empty() {
                self.store.delete(&path);
                continue;
            }
            let bytes = writer::serialize_bytes(&set.to_document(), NAMESPACE_REL, false)?;
            self.store.write(&path, bytes);
        }

        self.store.save()
    }

    /// The part the package-level `officeDocument` relationship points at.
    pub fn main_part(&self, rel_type: &str) -> Result<String> {
        self.relationships("")
            .and_then(|set| set.by_type(rel_type))
            .map(|rel| resolve_target("", &rel.target))
            .ok_or_else(|| WordlensError::InvalidPackage {
                message: format!("no relationship of type {}", rel_type),
            })
    }
}

/// A target path relative to the source part's directory, as written into
/// the rels part.
fn relative_target(source: &str, target: &str) -> String {
    let source = source.trim_start_matches('/');
    let dir = match source.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => "",
    };
    if dir.is_empty() {
        target.to_string()
    } else if let Some(stripped) = target.strip_prefix(&format!("{}/", dir)) {
        stripped.to_string()
    } else {
        format!("/{}", target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::relationships::relationship_types;

    #[test]
    fn related_part_resolves_back_through_rels() {
        let mut pkg = OpcPackage::create(Store::open_memory());
        pkg.write("word/document.xml", b"<x/>".to_vec());
        let id = pkg.add_related_part(
            "word/document.xml",
            "word/styles.xml",
            super::super::content_types::content_type_values::WORD_STYLES,
            relationship_types::STYLES,
        );
        assert!(pkg.exists("word/styles.xml"));
        assert_eq!(
            pkg.target_for_rel("word/document.xml", &id).as_deref(),
            Some("word/styles.xml")
        );
        assert_eq!(
            pkg.content_types().get("word/styles.xml"),
            Some(super::super::content_types::content_type_values::WORD_STYLES)
        );
    }

    #[test]
    fn save_and_reopen_preserves_descriptors() {
        let mut pkg = OpcPackage::create(Store::open_memory());
        pkg.write("word/document.xml", b"<doc/>".to_vec());
        pkg.add_relationship(
            "",
            Relationship::new("rId1", relationship_types::OFFICE_DOCUMENT, "word/document.xml"),
        );
        pkg.save().unwrap();

        assert!(pkg.exists(CONTENT_TYPES_PATH));
        assert!(pkg.exists("_rels/.rels"));
        assert_eq!(
            pkg.main_part(relationship_types::OFFICE_DOCUMENT).unwrap(),
            "word/document.xml"
        );
    }

    #[test]
    fn delete_part_removes_inbound_relationships() {
        let mut pkg = OpcPackage::create(Store::open_memory());
        pkg.write("word/document.xml", b"<doc/>".to_vec());
        pkg.add_related_part(
            "word/document.xml",
            "word/styles.xml",
            super::super::content_types::content_type_values::WORD_STYLES,
            relationship_types::STYLES,
        );
        pkg.delete_part("word/styles.xml");
        assert!(!pkg.exists("word/styles.xml"));
        assert!(pkg
            .relationships("word/document.xml")
            .unwrap()
            .by_type(relationship_types::STYLES)
            .is_none());
    }
}
