//! Predefined namespaces and tags.
//!
//! Tags below [`MIN_ELEMENT_TAG`] identify node kinds rather than element
//! names. The range `[MIN_ELEMENT_TAG, PREDEFINED_TAG_COUNT)` is baked in
//! from the schemas the engine understands; anything encountered beyond that
//! set is interned per document at parse time.

pub type Tag = u32;
pub type NamespaceId = u32;

pub const DOM_DOCUMENT: Tag = 1;
pub const DOM_TEXT: Tag = 2;
pub const DOM_CDATA: Tag = 3;
pub const DOM_COMMENT: Tag = 4;
pub const DOM_PROCESSING_INSTRUCTION: Tag = 5;

pub const MIN_ELEMENT_TAG: Tag = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub uri: &'static str,
    pub prefix: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDecl {
    pub namespace: NamespaceId,
    pub local_name: &'static str,
}

pub const NAMESPACE_NULL: NamespaceId = 0;
pub const NAMESPACE_XML: NamespaceId = 1;
pub const NAMESPACE_HTML: NamespaceId = 2;
pub const NAMESPACE_WORD: NamespaceId = 3;
pub const NAMESPACE_MC: NamespaceId = 4;
pub const NAMESPACE_OREL: NamespaceId = 5;
pub const NAMESPACE_REL: NamespaceId = 6;
pub const NAMESPACE_CT: NamespaceId = 7;
pub const NAMESPACE_DML: NamespaceId = 8;
pub const NAMESPACE_WP: NamespaceId = 9;
pub const NAMESPACE_VML: NamespaceId = 10;
pub const NAMESPACE_MATH: NamespaceId = 11;
pub const NAMESPACE_SVG: NamespaceId = 12;
pub const NAMESPACE_XLINK: NamespaceId = 13;
pub const NAMESPACE_ODF_OFFICE: NamespaceId = 14;
pub const NAMESPACE_ODF_TEXT: NamespaceId = 15;
pub const NAMESPACE_ODF_STYLE: NamespaceId = 16;
pub const PREDEFINED_NAMESPACE_COUNT: NamespaceId = 17;

pub const PREDEFINED_NAMESPACES: &[NamespaceDecl] = &[
    NamespaceDecl { uri: "", prefix: "" },
    NamespaceDecl { uri: "http://www.w3.org/XML/1998/namespace", prefix: "xml" },
    NamespaceDecl { uri: "http://www.w3.org/1999/xhtml", prefix: "xhtml" },
    NamespaceDecl { uri: "http://schemas.openxmlformats.org/wordprocessingml/2006/main", prefix: "w" },
    NamespaceDecl { uri: "http://schemas.openxmlformats.org/markup-compatibility/2006", prefix: "mc" },
    NamespaceDecl { uri: "http://schemas.openxmlformats.org/officeDocument/2006/relationships", prefix: "r" },
    NamespaceDecl { uri: "http://schemas.openxmlformats.org/package/2006/relationships", prefix: "rel" },
    NamespaceDecl { uri: "http://schemas.openxmlformats.org/package/2006/content-types", prefix: "ct" },
    NamespaceDecl { uri: "http://schemas.openxmlformats.org/drawingml/2006/main", prefix: "a" },
    NamespaceDecl { uri: "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing", prefix: "wp" },
    NamespaceDecl { uri: "urn:schemas-microsoft-com:vml", prefix: "v" },
    NamespaceDecl { uri: "http://schemas.openxmlformats.org/officeDocument/2006/math", prefix: "m" },
    NamespaceDecl { uri: "http://www.w3.org/2000/svg", prefix: "svg" },
    NamespaceDecl { uri: "http://www.w3.org/1999/xlink", prefix: "xlink" },
    NamespaceDecl { uri: "urn:oasis:names:tc:opendocument:xmlns:office:1.0", prefix: "office" },
    NamespaceDecl { uri: "urn:oasis:names:tc:opendocument:xmlns:text:1.0", prefix: "text" },
    NamespaceDecl { uri: "urn:oasis:names:tc:opendocument:xmlns:style:1.0", prefix: "style" },
];

macro_rules! predefined_tags {
    ($(($konst:ident, $ns:ident, $local:literal)),* $(,)?) => {
        predefined_tags!(@consts (MIN_ELEMENT_TAG); $(($konst, $ns, $local),)*);
        pub const PREDEFINED_TAGS: &[TagDecl] = &[
            $(TagDecl { namespace: $ns, local_name: $local },)*
        ];
    };
    (@consts $base:expr; ($konst:ident, $ns:ident, $local:literal), $($rest:tt)*) => {
        pub const $konst: Tag = $base;
        predefined_tags!(@consts ($base + 1); $($rest)*);
    };
    (@consts $base:expr;) => {};
}

predefined_tags! {
    // HTML elements
    (HTML_HTML, NAMESPACE_HTML, "html"),
    (HTML_HEAD, NAMESPACE_HTML, "head"),
    (HTML_TITLE, NAMESPACE_HTML, "title"),
    (HTML_META, NAMESPACE_HTML, "meta"),
    (HTML_STYLE, NAMESPACE_HTML, "style"),
    (HTML_LINK, NAMESPACE_HTML, "link"),
    (HTML_BODY, NAMESPACE_HTML, "body"),
    (HTML_DIV, NAMESPACE_HTML, "div"),
    (HTML_P, NAMESPACE_HTML, "p"),
    (HTML_H1, NAMESPACE_HTML, "h1"),
    (HTML_H2, NAMESPACE_HTML, "h2"),
    (HTML_H3, NAMESPACE_HTML, "h3"),
    (HTML_H4, NAMESPACE_HTML, "h4"),
    (HTML_H5, NAMESPACE_HTML, "h5"),
    (HTML_H6, NAMESPACE_HTML, "h6"),
    (HTML_FIGURE, NAMESPACE_HTML, "figure"),
    (HTML_FIGCAPTION, NAMESPACE_HTML, "figcaption"),
    (HTML_TABLE, NAMESPACE_HTML, "table"),
    (HTML_CAPTION, NAMESPACE_HTML, "caption"),
    (HTML_TBODY, NAMESPACE_HTML, "tbody"),
    (HTML_TR, NAMESPACE_HTML, "tr"),
    (HTML_TD, NAMESPACE_HTML, "td"),
    (HTML_TH, NAMESPACE_HTML, "th"),
    (HTML_COL, NAMESPACE_HTML, "col"),
    (HTML_SPAN, NAMESPACE_HTML, "span"),
    (HTML_A, NAMESPACE_HTML, "a"),
    (HTML_INS, NAMESPACE_HTML, "ins"),
    (HTML_DEL, NAMESPACE_HTML, "del"),
    (HTML_IMG, NAMESPACE_HTML, "img"),
    (HTML_BR, NAMESPACE_HTML, "br"),
    (HTML_HR, NAMESPACE_HTML, "hr"),

    // HTML attributes (attributes carry no namespace prefix)
    (HTML_ID, NAMESPACE_NULL, "id"),
    (HTML_CLASS, NAMESPACE_NULL, "class"),
    (HTML_HREF, NAMESPACE_NULL, "href"),
    (HTML_SRC, NAMESPACE_NULL, "src"),
    (HTML_CHARSET, NAMESPACE_NULL, "charset"),
    (HTML_COLSPAN, NAMESPACE_NULL, "colspan"),
    (HTML_ROWSPAN, NAMESPACE_NULL, "rowspan"),
    (HTML_STYLE_ATTR, NAMESPACE_NULL, "style"),
    (HTML_WIDTH, NAMESPACE_NULL, "width"),
    (HTML_HEIGHT, NAMESPACE_NULL, "height"),
    (HTML_DATA_BOOKMARK_ID, NAMESPACE_NULL, "data-bookmark-id"),
    (HTML_DATA_BOOKMARK_NAME, NAMESPACE_NULL, "data-bookmark-name"),

    // WordprocessingML structure
    (WORD_DOCUMENT, NAMESPACE_WORD, "document"),
    (WORD_BODY, NAMESPACE_WORD, "body"),
    (WORD_P, NAMESPACE_WORD, "p"),
    (WORD_PPR, NAMESPACE_WORD, "pPr"),
    (WORD_PSTYLE, NAMESPACE_WORD, "pStyle"),
    (WORD_R, NAMESPACE_WORD, "r"),
    (WORD_RPR, NAMESPACE_WORD, "rPr"),
    (WORD_RSTYLE, NAMESPACE_WORD, "rStyle"),
    (WORD_T, NAMESPACE_WORD, "t"),
    (WORD_DELTEXT, NAMESPACE_WORD, "delText"),
    (WORD_BR, NAMESPACE_WORD, "br"),
    (WORD_TAB, NAMESPACE_WORD, "tab"),
    (WORD_SECTPR, NAMESPACE_WORD, "sectPr"),
    (WORD_PROOFERR, NAMESPACE_WORD, "proofErr"),
    (WORD_LASTRENDEREDPAGEBREAK, NAMESPACE_WORD, "lastRenderedPageBreak"),

    // Tables
    (WORD_TBL, NAMESPACE_WORD, "tbl"),
    (WORD_TBLPR, NAMESPACE_WORD, "tblPr"),
    (WORD_TBLGRID, NAMESPACE_WORD, "tblGrid"),
    (WORD_GRIDCOL, NAMESPACE_WORD, "gridCol"),
    (WORD_TR, NAMESPACE_WORD, "tr"),
    (WORD_TRPR, NAMESPACE_WORD, "trPr"),
    (WORD_TC, NAMESPACE_WORD, "tc"),
    (WORD_TCPR, NAMESPACE_WORD, "tcPr"),
    (WORD_GRIDSPAN, NAMESPACE_WORD, "gridSpan"),
    (WORD_VMERGE, NAMESPACE_WORD, "vMerge"),
    (WORD_TBLW, NAMESPACE_WORD, "tblW"),
    (WORD_TBLBORDERS, NAMESPACE_WORD, "tblBorders"),

    // Change tracking, links, fields, bookmarks
    (WORD_INS, NAMESPACE_WORD, "ins"),
    (WORD_DEL, NAMESPACE_WORD, "del"),
    (WORD_HYPERLINK, NAMESPACE_WORD, "hyperlink"),
    (WORD_BOOKMARKSTART, NAMESPACE_WORD, "bookmarkStart"),
    (WORD_BOOKMARKEND, NAMESPACE_WORD, "bookmarkEnd"),
    (WORD_FLDSIMPLE, NAMESPACE_WORD, "fldSimple"),
    (WORD_FLDCHAR, NAMESPACE_WORD, "fldChar"),
    (WORD_INSTRTEXT, NAMESPACE_WORD, "instrText"),
    (WORD_SMARTTAG, NAMESPACE_WORD, "smartTag"),
    (WORD_SMARTTAGPR, NAMESPACE_WORD, "smartTagPr"),
    (WORD_DRAWING, NAMESPACE_WORD, "drawing"),
    (WORD_PICT, NAMESPACE_WORD, "pict"),

    // Numbering
    (WORD_NUMBERING, NAMESPACE_WORD, "numbering"),
    (WORD_ABSTRACTNUM, NAMESPACE_WORD, "abstractNum"),
    (WORD_ABSTRACTNUMID, NAMESPACE_WORD, "abstractNumId"),
    (WORD_NUM, NAMESPACE_WORD, "num"),
    (WORD_NUMID, NAMESPACE_WORD, "numId"),
    (WORD_NUMPR, NAMESPACE_WORD, "numPr"),
    (WORD_ILVL, NAMESPACE_WORD, "ilvl"),
    (WORD_LVL, NAMESPACE_WORD, "lvl"),
    (WORD_NUMFMT, NAMESPACE_WORD, "numFmt"),
    (WORD_LVLTEXT, NAMESPACE_WORD, "lvlText"),
    (WORD_START, NAMESPACE_WORD, "start"),

    // Styles
    (WORD_STYLES, NAMESPACE_WORD, "styles"),
    (WORD_STYLE, NAMESPACE_WORD, "style"),
    (WORD_STYLEID, NAMESPACE_WORD, "styleId"),
    (WORD_NAME, NAMESPACE_WORD, "name"),
    (WORD_BASEDON, NAMESPACE_WORD, "basedOn"),
    (WORD_OUTLINELVL, NAMESPACE_WORD, "outlineLvl"),
    (WORD_LATENTSTYLES, NAMESPACE_WORD, "latentStyles"),

    // Run and paragraph formatting
    (WORD_B, NAMESPACE_WORD, "b"),
    (WORD_I, NAMESPACE_WORD, "i"),
    (WORD_U, NAMESPACE_WORD, "u"),
    (WORD_STRIKE, NAMESPACE_WORD, "strike"),
    (WORD_COLOR, NAMESPACE_WORD, "color"),
    (WORD_SZ, NAMESPACE_WORD, "sz"),
    (WORD_SHD, NAMESPACE_WORD, "shd"),
    (WORD_PBDR, NAMESPACE_WORD, "pBdr"),
    (WORD_TOP, NAMESPACE_WORD, "top"),
    (WORD_BOTTOM, NAMESPACE_WORD, "bottom"),
    (WORD_LEFT, NAMESPACE_WORD, "left"),
    (WORD_RIGHT, NAMESPACE_WORD, "right"),
    (WORD_INSIDEH, NAMESPACE_WORD, "insideH"),
    (WORD_INSIDEV, NAMESPACE_WORD, "insideV"),
    (WORD_JC, NAMESPACE_WORD, "jc"),
    (WORD_SPACING, NAMESPACE_WORD, "spacing"),
    (WORD_IND, NAMESPACE_WORD, "ind"),
    (WORD_BEFORE, NAMESPACE_WORD, "before"),
    (WORD_AFTER, NAMESPACE_WORD, "after"),

    // Settings
    (WORD_SETTINGS, NAMESPACE_WORD, "settings"),
    (WORD_RSIDS, NAMESPACE_WORD, "rsids"),

    // WordprocessingML attributes
    (WORD_VAL, NAMESPACE_WORD, "val"),
    (WORD_ID, NAMESPACE_WORD, "id"),
    (WORD_FILL, NAMESPACE_WORD, "fill"),
    (WORD_SPACE, NAMESPACE_WORD, "space"),
    (WORD_TYPE, NAMESPACE_WORD, "type"),
    (WORD_W, NAMESPACE_WORD, "w"),
    (WORD_INSTR, NAMESPACE_WORD, "instr"),
    (WORD_FLDCHARTYPE, NAMESPACE_WORD, "fldCharType"),
    (WORD_AUTHOR, NAMESPACE_WORD, "author"),
    (WORD_DATE, NAMESPACE_WORD, "date"),
    (WORD_ANCHOR, NAMESPACE_WORD, "anchor"),

    // Revision session ids (stripped on load)
    (WORD_RSID, NAMESPACE_WORD, "rsid"),
    (WORD_RSIDDEL, NAMESPACE_WORD, "rsidDel"),
    (WORD_RSIDP, NAMESPACE_WORD, "rsidP"),
    (WORD_RSIDR, NAMESPACE_WORD, "rsidR"),
    (WORD_RSIDRDEFAULT, NAMESPACE_WORD, "rsidRDefault"),
    (WORD_RSIDROOT, NAMESPACE_WORD, "rsidRoot"),
    (WORD_RSIDRPR, NAMESPACE_WORD, "rsidRPr"),
    (WORD_RSIDSECT, NAMESPACE_WORD, "rsidSect"),
    (WORD_RSIDTR, NAMESPACE_WORD, "rsidTr"),

    // Markup compatibility
    (MC_ALTERNATECONTENT, NAMESPACE_MC, "AlternateContent"),
    (MC_CHOICE, NAMESPACE_MC, "Choice"),
    (MC_FALLBACK, NAMESPACE_MC, "Fallback"),
    (MC_IGNORABLE, NAMESPACE_MC, "Ignorable"),
    (MC_PROCESSCONTENT, NAMESPACE_MC, "ProcessContent"),
    (MC_MUSTUNDERSTAND, NAMESPACE_MC, "MustUnderstand"),

    // Relationship-namespace attributes (r:)
    (OREL_ID, NAMESPACE_OREL, "id"),
    (OREL_EMBED, NAMESPACE_OREL, "embed"),

    // Package relationships part
    (REL_RELATIONSHIPS, NAMESPACE_REL, "Relationships"),
    (REL_RELATIONSHIP, NAMESPACE_REL, "Relationship"),

    // Content types part
    (CT_TYPES, NAMESPACE_CT, "Types"),
    (CT_DEFAULT, NAMESPACE_CT, "Default"),
    (CT_OVERRIDE, NAMESPACE_CT, "Override"),

    // Unprefixed OPC attributes
    (ATTR_ID, NAMESPACE_NULL, "Id"),
    (ATTR_TYPE, NAMESPACE_NULL, "Type"),
    (ATTR_TARGET, NAMESPACE_NULL, "Target"),
    (ATTR_TARGETMODE, NAMESPACE_NULL, "TargetMode"),
    (ATTR_EXTENSION, NAMESPACE_NULL, "Extension"),
    (ATTR_CONTENTTYPE, NAMESPACE_NULL, "ContentType"),
    (ATTR_PARTNAME, NAMESPACE_NULL, "PartName"),
    (ATTR_CX, NAMESPACE_NULL, "cx"),
    (ATTR_CY, NAMESPACE_NULL, "cy"),

    // DrawingML
    (DML_GRAPHIC, NAMESPACE_DML, "graphic"),
    (DML_GRAPHICDATA, NAMESPACE_DML, "graphicData"),
    (DML_BLIP, NAMESPACE_DML, "blip"),
    (WP_INLINE, NAMESPACE_WP, "inline"),
    (WP_EXTENT, NAMESPACE_WP, "extent"),
    (WP_DOCPR, NAMESPACE_WP, "docPr"),

    // xml: attributes
    (XML_SPACE, NAMESPACE_XML, "space"),
}

pub const PREDEFINED_TAG_COUNT: Tag = MIN_ELEMENT_TAG + PREDEFINED_TAGS.len() as Tag;

/// Declaration for a predefined tag; `None` when the tag is dynamic or a
/// node-kind marker.
pub fn predefined_tag_decl(tag: Tag) -> Option<&'static TagDecl> {
    if (MIN_ELEMENT_TAG..PREDEFINED_TAG_COUNT).contains(&tag) {
        PREDEFINED_TAGS.get((tag - MIN_ELEMENT_TAG) as usize)
    } else {
        None
    }
}

pub fn predefined_namespace_decl(ns: NamespaceId) -> Option<&'static NamespaceDecl> {
    PREDEFINED_NAMESPACES.get(ns as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_tags_are_contiguous() {
        assert_eq!(HTML_HTML, MIN_ELEMENT_TAG);
        assert_eq!(predefined_tag_decl(WORD_P).unwrap().local_name, "p");
        assert_eq!(predefined_tag_decl(WORD_P).unwrap().namespace, NAMESPACE_WORD);
        assert_eq!(predefined_tag_decl(PREDEFINED_TAG_COUNT), None);
    }

    #[test]
    fn namespace_ids_index_declarations() {
        let word = predefined_namespace_decl(NAMESPACE_WORD).unwrap();
        assert_eq!(word.prefix, "w");
        assert!(word.uri.contains("wordprocessingml"));
        assert_eq!(PREDEFINED_NAMESPACES.len(), PREDEFINED_NAMESPACE_COUNT as usize);
    }

    #[test]
    fn html_and_word_ids_are_distinct_tags() {
        assert_ne!(HTML_ID, WORD_ID);
        assert_eq!(predefined_tag_decl(HTML_ID).unwrap().namespace, NAMESPACE_NULL);
    }
}
