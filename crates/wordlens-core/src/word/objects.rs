//! Registries for word constructs with identity beyond the tree.

use crate::xml::dom::Document;
use crate::xml::tags::{WORD_BOOKMARKSTART, WORD_ID, WORD_NAME};
use indextree::NodeId;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct WordBookmark {
    pub id: String,
    pub name: String,
    pub element: Option<NodeId>,
}

/// Tracks bookmark id ↔ name pairs across a conversion so puts can bind
/// edited bookmark spans back to their markers and creates can allocate
/// unused ids.
#[derive(Debug, Default)]
pub struct WordObjects {
    bookmarks_by_name: BTreeMap<String, WordBookmark>,
}

impl WordObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every `w:bookmarkStart` in the document.
    pub fn collect(doc: &Document) -> Self {
        let mut objects = Self::new();
        let Some(root) = doc.root() else { return objects };
        for node in doc.descendants(root) {
            if doc.tag(node) != WORD_BOOKMARKSTART {
                continue;
            }
            let (Some(id), Some(name)) = (
                doc.get_attribute(node, WORD_ID),
                doc.get_attribute(node, WORD_NAME),
            ) else {
                continue;
            };
            objects.bookmarks_by_name.insert(
                name.to_string(),
                WordBookmark { id: id.to_string(), name: name.to_string(), element: Some(node) },
            );
        }
        objects
    }

    pub fn bookmark_with_name(&self, name: &str) -> Option<&WordBookmark> {
        self.bookmarks_by_name.get(name)
    }

    /// Registers a bookmark, allocating a fresh numeric id when none is
    /// supplied.
    pub fn register(&mut self, name: &str, id: Option<&str>, element: Option<NodeId>) -> String {
        let id = match id {
            Some(id) => id.to_string(),
            None => self.fresh_id(),
        };
        self.bookmarks_by_name.insert(
            name.to_string(),
            WordBookmark { id: id.clone(), name: name.to_string(), element },
        );
        id
    }

    pub fn unregister_element(&mut self, element: NodeId) {
        self.bookmarks_by_name.retain(|_, b| b.element != Some(element));
    }

    fn fresh_id(&self) -> String {
        let max = self
            .bookmarks_by_name
            .values()
            .filter_map(|b| b.id.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::parse;

    #[test]
    fn collects_bookmarks_and_allocates_fresh_ids() {
        let xml = r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:bookmarkStart w:id="3" w:name="intro"/>
            <w:bookmarkEnd w:id="3"/>
        </w:p>"#;
        let doc = parse(xml).unwrap();
        let mut objects = WordObjects::collect(&doc);
        assert_eq!(objects.bookmark_with_name("intro").unwrap().id, "3");

        let id = objects.register("other", None, None);
        assert_eq!(id, "4");
        assert_eq!(objects.bookmark_with_name("other").unwrap().id, "4");
    }
}
