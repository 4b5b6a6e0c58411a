//! The `[Content_Types].xml` registry: a default MIME type per extension
//! plus per-part overrides.

use crate::xml::dom::Document;
use crate::xml::tags::{
    ATTR_CONTENTTYPE, ATTR_EXTENSION, ATTR_PARTNAME, CT_DEFAULT, CT_OVERRIDE, CT_TYPES,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert(
            "rels".to_string(),
            "application/vnd.openxmlformats-package.relationships+xml".to_string(),
        );
        defaults.insert("xml".to_string(), "application/xml".to_string());
        Self { defaults, overrides: BTreeMap::new() }
    }

    pub fn get(&self, part_path: &str) -> Option<&str> {
        let absolute = if part_path.starts_with('/') {
            part_path.to_string()
        } else {
            format!("/{}", part_path)
        };
        if let Some(ct) = self.overrides.get(&absolute) {
            return Some(ct);
        }
        let extension = part_path.rsplit('.').next()?;
        self.defaults.get(extension).map(String::as_str)
    }

    pub fn set_override(&mut self, part_path: &str, content_type: &str) {
        let absolute = if part_path.starts_with('/') {
            part_path.to_string()
        } else {
            format!("/{}", part_path)
        };
        self.overrides.insert(absolute, content_type.to_string());
    }

    pub fn remove_override(&mut self, part_path: &str) {
        let absolute = if part_path.starts_with('/') {
            part_path.to_string()
        } else {
            format!("/{}", part_path)
        };
        self.overrides.remove(&absolute);
    }

    pub fn set_default(&mut self, extension: &str, content_type: &str) {
        self.defaults.insert(extension.to_string(), content_type.to_string());
    }

    pub fn from_document(doc: &Document) -> Self {
        let mut types = Self::default();
        let Some(root) = doc.root() else { return types };
        if doc.tag(root) != CT_TYPES {
            return types;
        }
        for child in doc.children(root) {
            match doc.tag(child) {
                CT_DEFAULT => {
                    if let (Some(ext), Some(ct)) = (
                        doc.get_attribute(child, ATTR_EXTENSION),
                        doc.get_attribute(child, ATTR_CONTENTTYPE),
                    ) {
                        types.defaults.insert(ext.to_string(), ct.to_string());
                    }
                }
                CT_OVERRIDE => {
                    if let (Some(part), Some(ct)) = (
                        doc.get_attribute(child, ATTR_PARTNAME),
                        doc.get_attribute(child, ATTR_CONTENTTYPE),
                    ) {
                        types.overrides.insert(part.to_string(), ct.to_string());
                    }
                }
                _ => {}
            }
        }
        types
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new_with_root(CT_TYPES);
        let root = doc.root().expect("document has a root");
        for (extension, content_type) in &self.defaults {
            let child = doc.create_child_element(root, CT_DEFAULT);
            doc.set_attribute(child, ATTR_EXTENSION, extension);
            doc.set_attribute(child, ATTR_CONTENTTYPE, content_type);
        }
        for (part, content_type) in &self.overrides {
            let child = doc.create_child_element(root, CT_OVERRIDE);
            doc.set_attribute(child, ATTR_PARTNAME, part);
            doc.set_attribute(child, ATTR_CONTENTTYPE, content_type);
        }
        doc
    }
}

pub mod content_type_values {
    pub const WORD_DOCUMENT: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const WORD_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
    pub const WORD_NUMBERING: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
    pub const WORD_SETTINGS: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::tags::NAMESPACE_CT;
    use crate::xml::{parser, writer};

    #[test]
    fn override_beats_extension_default() {
        let mut types = ContentTypes::new();
        types.set_override("/word/document.xml", content_type_values::WORD_DOCUMENT);
        assert_eq!(
            types.get("/word/document.xml"),
            Some(content_type_values::WORD_DOCUMENT)
        );
        assert_eq!(types.get("/word/other.xml"), Some("application/xml"));
        assert_eq!(types.get("/media/image1.png"), None);
    }

    #[test]
    fn document_roundtrip_preserves_registry() {
        let mut types = ContentTypes::new();
        types.set_override("/word/document.xml", content_type_values::WORD_DOCUMENT);

        let doc = types.to_document();
        let xml = writer::serialize(&doc, NAMESPACE_CT, false).unwrap();
        let reparsed = parser::parse(&xml).unwrap();
        let restored = ContentTypes::from_document(&reparsed);

        assert_eq!(
            restored.get("word/document.xml"),
            Some(content_type_values::WORD_DOCUMENT)
        );
        assert_eq!(
            restored.get("/_rels/.rels"),
            Some(content_type_values::RELATIONSHIPS)
        );
    }
}
