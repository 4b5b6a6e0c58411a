//! The word-processing package: the OPC container plus its parsed parts.
//!
//! Parts are located through the main document part's relationships. RSID
//! attributes are stripped on load and never re-emitted; complex fields are
//! simplified to `w:fldSimple` before any lens sees them.

use super::fields::simplify_fields;
use super::numbering::WordNumbering;
use super::sheet::WordSheet;
use crate::error::{Result, WordlensError};
use crate::package::content_types::content_type_values;
use crate::package::relationships::{relationship_types, resolve_target, Relationship};
use crate::package::{OpcPackage, Store};
use crate::xml::dom::Document;
use crate::xml::tags::{
    NAMESPACE_NULL, WORD_BODY, WORD_DOCUMENT, WORD_RSID, WORD_RSIDDEL, WORD_RSIDP, WORD_RSIDR,
    WORD_RSIDRDEFAULT, WORD_RSIDROOT, WORD_RSIDRPR, WORD_RSIDS, WORD_RSIDSECT, WORD_RSIDTR,
};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_TARGET: &str = "styles.xml";
const NUMBERING_TARGET: &str = "numbering.xml";

pub struct WordPackage {
    opc: OpcPackage,
    main_part: String,
    document: Document,
    styles: WordSheet,
    numbering: WordNumbering,
    settings: Option<Document>,
    settings_part: Option<String>,
}

fn strip_rsids(doc: &mut Document) {
    let Some(root) = doc.root() else { return };
    let nodes: Vec<_> = doc.descendants(root).collect();
    for node in nodes {
        for tag in [
            WORD_RSID,
            WORD_RSIDDEL,
            WORD_RSIDP,
            WORD_RSIDR,
            WORD_RSIDRDEFAULT,
            WORD_RSIDROOT,
            WORD_RSIDRPR,
            WORD_RSIDS,
            WORD_RSIDSECT,
            WORD_RSIDTR,
        ] {
            doc.remove_attribute(node, tag);
        }
    }
}

impl WordPackage {
    pub fn open(store: Store) -> Result<Self> {
        let opc = OpcPackage::open(store)?;
        let main_part = opc
            .main_part(relationship_types::OFFICE_DOCUMENT)
            .unwrap_or_else(|_| DOCUMENT_PART.to_string());

        let mut document = opc.read_xml(&main_part)?;
        let root = document
            .root()
            .ok_or_else(|| WordlensError::Semantic("document part has no root".to_string()))?;
        if document.tag(root) != WORD_DOCUMENT {
            return Err(WordlensError::Semantic(
                "document part root is not w:document".to_string(),
            ));
        }
        if document.child_with_tag(root, WORD_BODY).is_none() {
            return Err(WordlensError::Semantic("document has no w:body".to_string()));
        }
        strip_rsids(&mut document);
        simplify_fields(&mut document);

        let part_for = |rel_type: &str| -> Option<String> {
            opc.relationships(&main_part)
                .and_then(|set| set.by_type(rel_type))
                .map(|rel| resolve_target(&main_part, &rel.target))
                .filter(|path| opc.exists(path))
        };

        let styles = match part_for(relationship_types::STYLES) {
            Some(path) => {
                let mut doc = opc.read_xml(&path)?;
                strip_rsids(&mut doc);
                WordSheet::from_document(doc)
            }
            None => WordSheet::new(),
        };
        let numbering = match part_for(relationship_types::NUMBERING) {
            Some(path) => {
                let mut doc = opc.read_xml(&path)?;
                strip_rsids(&mut doc);
                WordNumbering::from_document(doc)
            }
            None => WordNumbering::new(),
        };
        let settings_part = part_for(relationship_types::SETTINGS);
        let settings = match &settings_part {
            Some(path) => {
                let mut doc = opc.read_xml(path)?;
                strip_rsids(&mut doc);
                if let Some(root) = doc.root() {
                    if let Some(rsids) = doc.child_with_tag(root, WORD_RSIDS) {
                        doc.remove_node(rsids);
                    }
                }
                Some(doc)
            }
            None => None,
        };

        Ok(Self { opc, main_part, document, styles, numbering, settings, settings_part })
    }

    /// A fresh package seeded with an empty body and the minimal descriptor
    /// set.
    pub fn create(store: Store) -> Self {
        let mut opc = OpcPackage::create(store);
        let mut document = Document::new_with_root(WORD_DOCUMENT);
        let root = document.root().expect("document has a root");
        document.create_child_element(root, WORD_BODY);

        opc.add_relationship(
            "",
            Relationship::new("rId1", relationship_types::OFFICE_DOCUMENT, DOCUMENT_PART),
        );
        opc.content_types_mut()
            .set_override(DOCUMENT_PART, content_type_values::WORD_DOCUMENT);

        Self {
            opc,
            main_part: DOCUMENT_PART.to_string(),
            document,
            styles: WordSheet::new(),
            numbering: WordNumbering::new(),
            settings: None,
            settings_part: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    pub fn opc(&self) -> &OpcPackage {
        &self.opc
    }

    pub fn styles(&self) -> &WordSheet {
        &self.styles
    }

    pub fn numbering(&self) -> &WordNumbering {
        &self.numbering
    }

    /// Split borrows for the put pipeline: the concrete tree and the
    /// container (for relationship updates).
    pub fn document_and_opc_mut(&mut self) -> (&mut Document, &mut OpcPackage, &str) {
        (&mut self.document, &mut self.opc, self.main_part.as_str())
    }

    pub fn style_parts_mut(&mut self) -> (&mut WordSheet, &mut WordNumbering) {
        (&mut self.styles, &mut self.numbering)
    }

    fn ensure_related_part(&mut self, target: &str, content_type: &str, rel_type: &str) -> String {
        let resolved = self
            .opc
            .relationships(&self.main_part)
            .and_then(|set| set.by_type(rel_type))
            .map(|rel| resolve_target(&self.main_part, &rel.target));
        match resolved {
            Some(path) => path,
            None => {
                let dir = match self.main_part.rsplit_once('/') {
                    Some((dir, _)) => format!("{}/{}", dir, target),
                    None => target.to_string(),
                };
                self.opc.add_related_part(
                    &self.main_part.clone(),
                    &dir,
                    content_type,
                    rel_type,
                );
                dir
            }
        }
    }

    /// Serializes every parsed part back into the container and flushes it.
    pub fn save(&mut self) -> Result<()> {
        let main_part = self.main_part.clone();
        self.opc.write_xml(&main_part, &self.document, NAMESPACE_NULL)?;

        let styles_part = self.ensure_related_part(
            STYLES_TARGET,
            content_type_values::WORD_STYLES,
            relationship_types::STYLES,
        );
        self.opc
            .write_xml(&styles_part, self.styles.document(), NAMESPACE_NULL)?;

        if self.numbering.document().root().is_some()
            && self
                .numbering
                .document()
                .first_child(self.numbering.document().root().unwrap())
                .is_some()
        {
            let numbering_part = self.ensure_related_part(
                NUMBERING_TARGET,
                content_type_values::WORD_NUMBERING,
                relationship_types::NUMBERING,
            );
            self.opc
                .write_xml(&numbering_part, self.numbering.document(), NAMESPACE_NULL)?;
        }

        if let (Some(settings), Some(path)) = (&self.settings, &self.settings_part) {
            let path = path.clone();
            self.opc.write_xml(&path, settings, NAMESPACE_NULL)?;
        }

        self.opc.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::opc::CONTENT_TYPES_PATH;
    use crate::xml::tags::WORD_P;

    #[test]
    fn create_seeds_document_and_descriptors() {
        let mut package = WordPackage::create(Store::open_memory());
        let root = package.document().root().unwrap();
        assert_eq!(package.document().tag(root), WORD_DOCUMENT);
        assert!(package.document().child_with_tag(root, WORD_BODY).is_some());

        package.save().unwrap();
        assert!(package.opc().exists(CONTENT_TYPES_PATH));
        assert!(package.opc().exists("_rels/.rels"));
        assert!(package.opc().exists(DOCUMENT_PART));
        assert!(package.opc().exists("word/styles.xml"));
    }

    #[test]
    fn open_strips_rsids_and_requires_body() {
        let mut seed = WordPackage::create(Store::open_memory());
        seed.save().unwrap();
        // Overwrite the document part with RSID-bearing markup.
        let xml = br#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body><w:p w:rsidR="00AB12CD" w:rsidRDefault="00AB12CD"/></w:body>
</w:document>"#;
        let mut opc_store = Store::open_memory();
        for path in seed.opc().list() {
            opc_store.write(&path, seed.opc().read(&path).unwrap().to_vec());
        }
        opc_store.write(DOCUMENT_PART, xml.to_vec());

        let package = WordPackage::open(opc_store).unwrap();
        let root = package.document().root().unwrap();
        let body = package.document().child_with_tag(root, WORD_BODY).unwrap();
        let p = package.document().child_with_tag(body, WORD_P).unwrap();
        assert!(package.document().node(p).attributes().is_empty());
    }

    #[test]
    fn open_rejects_missing_body() {
        let mut store = Store::open_memory();
        store.write(
            DOCUMENT_PART,
            br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#
                .to_vec(),
        );
        assert!(WordPackage::open(store).is_err());
    }
}
