//! Typed relationships between package parts.

use crate::xml::dom::Document;
use crate::xml::tags::{
    ATTR_ID, ATTR_TARGET, ATTR_TARGETMODE, ATTR_TYPE, REL_RELATIONSHIP, REL_RELATIONSHIPS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetMode {
    #[default]
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    #[serde(default)]
    pub target_mode: TargetMode,
}

impl Relationship {
    pub fn new(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::Internal,
        }
    }

    pub fn external(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::External,
        }
    }
}

/// The relationships of one source part, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct RelationshipSet {
    by_id: BTreeMap<String, Relationship>,
}

impl RelationshipSet {
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    pub fn by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.by_id.values().find(|r| r.rel_type == rel_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.by_id.values()
    }

    pub fn add(&mut self, rel: Relationship) {
        self.by_id.insert(rel.id.clone(), rel);
    }

    /// Adds a relationship under a freshly allocated `rId<n>` id.
    pub fn add_with_fresh_id(&mut self, rel_type: &str, target: &str) -> String {
        let mut n = self.by_id.len() + 1;
        let mut id = format!("rId{}", n);
        while self.by_id.contains_key(&id) {
            n += 1;
            id = format!("rId{}", n);
        }
        self.add(Relationship::new(&id, rel_type, target));
        id
    }

    pub fn remove(&mut self, id: &str) {
        self.by_id.remove(id);
    }

    /// Drops every relationship pointing at the given resolved target.
    pub fn remove_targeting(&mut self, source: &str, part_path: &str) {
        let doomed: Vec<String> = self
            .by_id
            .values()
            .filter(|r| {
                r.target_mode == TargetMode::Internal
                    && resolve_target(source, &r.target) == normalize_part(part_path)
            })
            .map(|r| r.id.clone())
            .collect();
        for id in doomed {
            self.by_id.remove(&id);
        }
    }

    pub fn from_document(doc: &Document) -> Self {
        let mut set = Self::default();
        let Some(root) = doc.root() else { return set };
        if doc.tag(root) != REL_RELATIONSHIPS {
            return set;
        }
        for child in doc.children(root) {
            if doc.tag(child) != REL_RELATIONSHIP {
                continue;
            }
            let (Some(id), Some(rel_type), Some(target)) = (
                doc.get_attribute(child, ATTR_ID),
                doc.get_attribute(child, ATTR_TYPE),
                doc.get_attribute(child, ATTR_TARGET),
            ) else {
                continue;
            };
            let target_mode = match doc.get_attribute(child, ATTR_TARGETMODE) {
                Some("External") => TargetMode::External,
                _ => TargetMode::Internal,
            };
            set.add(Relationship {
                id: id.to_string(),
                rel_type: rel_type.to_string(),
                target: target.to_string(),
                target_mode,
            });
        }
        set
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new_with_root(REL_RELATIONSHIPS);
        let root = doc.root().expect("document has a root");
        for rel in self.by_id.values() {
            let child = doc.create_child_element(root, REL_RELATIONSHIP);
            doc.set_attribute(child, ATTR_ID, &rel.id);
            doc.set_attribute(child, ATTR_TYPE, &rel.rel_type);
            doc.set_attribute(child, ATTR_TARGET, &rel.target);
            if rel.target_mode == TargetMode::External {
                doc.set_attribute(child, ATTR_TARGETMODE, "External");
            }
        }
        doc
    }
}

fn normalize_part(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

/// The `_rels` part holding relationships for a source part. The package
/// root's relationships live in `_rels/.rels`.
pub fn rels_path_for(source: &str) -> String {
    let source = normalize_part(source);
    if source.is_empty() {
        return "_rels/.rels".to_string();
    }
    match source.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", source),
    }
}

/// The source part a `_rels` part describes, or `None` for non-rels paths.
pub fn source_for_rels_path(rels_path: &str) -> Option<String> {
    let rels_path = normalize_part(rels_path);
    if rels_path == "_rels/.rels" {
        return Some(String::new());
    }
    let (dir, file) = match rels_path.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => return None,
    };
    let dir = dir.strip_suffix("_rels").map(|d| d.trim_end_matches('/'))?;
    let file = file.strip_suffix(".rels")?;
    if dir.is_empty() {
        Some(file.to_string())
    } else {
        Some(format!("{}/{}", dir, file))
    }
}

/// Resolves a relationship target against its source part's directory.
pub fn resolve_target(source: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let source = normalize_part(source);
    let dir = match source.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => "",
    };
    let mut segments: Vec<&str> = if dir.is_empty() { Vec::new() } else { dir.split('/').collect() };
    for segment in target.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

pub mod relationship_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const NUMBERING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const SETTINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const FOOTNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes";
    pub const ENDNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/endnotes";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::tags::NAMESPACE_REL;
    use crate::xml::{parser, writer};

    #[test]
    fn rels_paths_map_both_ways() {
        assert_eq!(rels_path_for("/word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_path_for(""), "_rels/.rels");
        assert_eq!(
            source_for_rels_path("word/_rels/document.xml.rels").as_deref(),
            Some("word/document.xml")
        );
        assert_eq!(source_for_rels_path("_rels/.rels").as_deref(), Some(""));
        assert_eq!(source_for_rels_path("word/document.xml"), None);
    }

    #[test]
    fn targets_resolve_relative_to_source() {
        assert_eq!(resolve_target("word/document.xml", "styles.xml"), "word/styles.xml");
        assert_eq!(
            resolve_target("word/document.xml", "media/image1.png"),
            "word/media/image1.png"
        );
        assert_eq!(resolve_target("word/document.xml", "../other.xml"), "other.xml");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
        assert_eq!(resolve_target("word/document.xml", "/abs.xml"), "abs.xml");
    }

    #[test]
    fn document_roundtrip_preserves_relationships() {
        let mut set = RelationshipSet::default();
        set.add(Relationship::new("rId1", relationship_types::STYLES, "styles.xml"));
        set.add(Relationship::external(
            "rId2",
            relationship_types::HYPERLINK,
            "http://example.com/",
        ));

        let doc = set.to_document();
        let xml = writer::serialize(&doc, NAMESPACE_REL, false).unwrap();
        let restored = RelationshipSet::from_document(&parser::parse(&xml).unwrap());

        assert_eq!(restored.get("rId1").unwrap().target, "styles.xml");
        let link = restored.get("rId2").unwrap();
        assert_eq!(link.target_mode, TargetMode::External);
        assert_eq!(restored.by_type(relationship_types::STYLES).unwrap().id, "rId1");
    }

    #[test]
    fn fresh_ids_avoid_collisions() {
        let mut set = RelationshipSet::default();
        set.add(Relationship::new("rId1", relationship_types::STYLES, "styles.xml"));
        let id = set.add_with_fresh_id(relationship_types::NUMBERING, "numbering.xml");
        assert_eq!(id, "rId2");
        set.remove("rId1");
        let id = set.add_with_fresh_id(relationship_types::STYLES, "styles.xml");
        assert_ne!(id, "rId2");
    }
}
