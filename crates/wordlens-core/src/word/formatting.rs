//! CSS ↔ WordprocessingML property translation.
//!
//! Conversions used by both the run/paragraph lenses and the style cascade.
//! Lengths go to twips, border widths to eighths of a point, colors to
//! six-hex-digit values without the leading `#`.

use crate::css::length::{format_pts, CssLength};
use crate::css::sheet::CssProperties;
use crate::xml::dom::Document;
use crate::xml::tags::{
    Tag, WORD_B, WORD_COLOR, WORD_FILL, WORD_I, WORD_RPR, WORD_SHD, WORD_STRIKE, WORD_SZ, WORD_U,
    WORD_VAL,
};
use indextree::NodeId;

/// Word on/off attributes: absent means on.
pub fn parse_on_off(value: Option<&str>) -> bool {
    matches!(value, None | Some("true") | Some("on") | Some("1"))
}

pub fn is_rrggbb(value: &str) -> bool {
    value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_hash_rrggbb(value: &str) -> bool {
    value.strip_prefix('#').map(is_rrggbb).unwrap_or(false)
}

/// Normalises a CSS color to `#RRGGBB`. `transparent` and unknown values
/// yield `None`.
pub fn css_hex_color(value: &str) -> Option<String> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if is_rrggbb(hex) {
            return Some(format!("#{}", hex.to_uppercase()));
        }
        if hex.len() == 3 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            return Some(format!("#{}", expanded.to_uppercase()));
        }
        return None;
    }
    match value.to_ascii_lowercase().as_str() {
        "black" => Some("#000000".to_string()),
        "white" => Some("#FFFFFF".to_string()),
        "red" => Some("#FF0000".to_string()),
        "green" => Some("#008000".to_string()),
        "blue" => Some("#0000FF".to_string()),
        "yellow" => Some("#FFFF00".to_string()),
        "gray" | "grey" => Some("#808080".to_string()),
        "silver" => Some("#C0C0C0".to_string()),
        "transparent" => None,
        _ => None,
    }
}

/// Reads a `w:shd` element into `background-color`.
pub fn word_get_shd(doc: &Document, shd: NodeId, properties: &mut CssProperties) {
    if let Some(fill) = doc.get_attribute(shd, WORD_FILL) {
        if is_rrggbb(fill) {
            properties.put("background-color", &format!("#{}", fill));
        }
    }
}

/// Builds a `w:shd` element for a background color, or nothing for a
/// suppressed color.
pub fn word_put_shd(doc: &mut Document, hex_color: Option<&str>) -> Option<NodeId> {
    let hex = hex_color?;
    let fill = hex.strip_prefix('#')?;
    let shd = doc.create_element(WORD_SHD);
    doc.set_attribute(shd, WORD_FILL, fill);
    doc.set_attribute(shd, WORD_VAL, "clear");
    Some(shd)
}

/// Reads one border child (`w:top` and friends) into the CSS
/// `border-<side>-{width,style,color}` triple.
pub fn word_get_border(doc: &Document, border: NodeId, side: &str, properties: &mut CssProperties) {
    if doc.get_attribute(border, WORD_VAL).is_none() {
        return;
    }
    let sz_pts = doc
        .get_attribute(border, crate::xml::tags::WORD_SZ)
        .and_then(|s| s.parse::<f64>().ok())
        .map(|sz| sz / 8.0)
        .unwrap_or(0.0);

    let width_name = format!("border-{}-width", side);
    if sz_pts < 1.0 {
        properties.put(&width_name, "thin");
    } else {
        properties.put(&width_name, &format_pts(sz_pts));
    }
    properties.put(&format!("border-{}-style", side), "solid");

    let color = match doc.get_attribute(border, WORD_COLOR) {
        Some(color) if is_rrggbb(color) => format!("#{}", color),
        _ => "black".to_string(),
    };
    properties.put(&format!("border-{}-color", side), &color);
}

pub enum BorderPut {
    Unchanged,
    Remove,
    Element(NodeId),
}

/// Diffs the CSS border triple for one side and, when it changed, builds the
/// replacement border element (or asks for removal).
pub fn word_put_border(
    doc: &mut Document,
    old: &CssProperties,
    new: &CssProperties,
    tag: Tag,
    side: &str,
) -> BorderPut {
    let width_name = format!("border-{}-width", side);
    let style_name = format!("border-{}-style", side);
    let color_name = format!("border-{}-color", side);

    let old_triple = (old.get(&width_name), old.get(&style_name), old.get(&color_name));
    let new_triple = (new.get(&width_name), new.get(&style_name), new.get(&color_name));
    if old_triple == new_triple {
        return BorderPut::Unchanged;
    }

    let (new_width, new_style, new_color) = new_triple;
    if new_width.is_none() && new_color.is_none() && matches!(new_style, None | Some("hidden")) {
        return BorderPut::Remove;
    }

    let element = doc.create_element(tag);
    if let Some(color) = new_color {
        match css_hex_color(color) {
            Some(hex) if is_hash_rrggbb(&hex) => {
                doc.set_attribute(element, WORD_COLOR, &hex[1..]);
            }
            _ => doc.set_attribute(element, WORD_COLOR, "auto"),
        }
    }
    doc.set_attribute(element, WORD_VAL, "single");

    let width = match new_width {
        None | Some("thin") => "0.5pt",
        Some("medium") => "2.5pt",
        Some("thick") => "4pt",
        Some(other) => other,
    };
    let mut pts = CssLength::parse(width)
        .filter(|l| l.is_absolute())
        .map(|l| l.to_pts(0.0))
        .unwrap_or(0.0);
    if pts < 0.5 {
        pts = 0.5;
    }
    doc.set_attribute(element, crate::xml::tags::WORD_SZ, &((pts * 8.0).round() as i64).to_string());
    BorderPut::Element(element)
}

/// Reads a `w:rPr` element into CSS character properties.
pub fn word_get_run_properties(doc: &Document, rpr: NodeId, properties: &mut CssProperties) {
    for child in doc.children(rpr) {
        let val = doc.get_attribute(child, WORD_VAL);
        match doc.tag(child) {
            WORD_B => {
                if parse_on_off(val) {
                    properties.put("font-weight", "bold");
                }
            }
            WORD_I => {
                if parse_on_off(val) {
                    properties.put("font-style", "italic");
                }
            }
            WORD_U => {
                if val != Some("none") {
                    properties.put("text-decoration", "underline");
                }
            }
            WORD_STRIKE => {
                if parse_on_off(val) {
                    properties.put("text-decoration", "line-through");
                }
            }
            WORD_COLOR => {
                if let Some(color) = val {
                    if is_rrggbb(color) {
                        properties.put("color", &format!("#{}", color));
                    }
                }
            }
            WORD_SZ => {
                if let Some(half_points) = val.and_then(|v| v.parse::<f64>().ok()) {
                    properties.put("font-size", &format_pts(half_points / 2.0));
                }
            }
            _ => {}
        }
    }
}

/// Builds a fresh `w:rPr` for CSS character properties; `None` when nothing
/// maps.
pub fn word_put_run_properties(doc: &mut Document, properties: &CssProperties) -> Option<NodeId> {
    let rpr = doc.create_element(WORD_RPR);
    if properties.get("font-weight") == Some("bold") {
        doc.create_child_element(rpr, WORD_B);
    }
    if properties.get("font-style") == Some("italic") {
        doc.create_child_element(rpr, WORD_I);
    }
    match properties.get("text-decoration") {
        Some("underline") => {
            let u = doc.create_child_element(rpr, WORD_U);
            doc.set_attribute(u, WORD_VAL, "single");
        }
        Some("line-through") => {
            doc.create_child_element(rpr, WORD_STRIKE);
        }
        _ => {}
    }
    if let Some(hex) = properties.get("color").and_then(css_hex_color) {
        let color = doc.create_child_element(rpr, WORD_COLOR);
        doc.set_attribute(color, WORD_VAL, &hex[1..]);
    }
    if let Some(length) = properties.get("font-size").and_then(CssLength::parse) {
        let sz = doc.create_child_element(rpr, WORD_SZ);
        let half_points = (length.to_pts(0.0) * 2.0).round() as i64;
        doc.set_attribute(sz, WORD_VAL, &half_points.to_string());
    }
    if doc.first_child(rpr).is_some() {
        Some(rpr)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::tags::WORD_TOP;

    #[test]
    fn on_off_defaults_to_on() {
        assert!(parse_on_off(None));
        assert!(parse_on_off(Some("true")));
        assert!(!parse_on_off(Some("false")));
        assert!(!parse_on_off(Some("0")));
    }

    #[test]
    fn hex_colors_normalise() {
        assert_eq!(css_hex_color("#ff0000").as_deref(), Some("#FF0000"));
        assert_eq!(css_hex_color("#abc").as_deref(), Some("#AABBCC"));
        assert_eq!(css_hex_color("black").as_deref(), Some("#000000"));
        assert_eq!(css_hex_color("transparent"), None);
        assert_eq!(css_hex_color("#12345"), None);
    }

    #[test]
    fn border_roundtrip_through_css() {
        let mut doc = Document::new_with_root(crate::xml::tags::WORD_PBDR);
        let old = CssProperties::default();
        let mut new = CssProperties::default();
        new.put("border-top-width", "1pt");
        new.put("border-top-style", "solid");
        new.put("border-top-color", "#FF0000");

        let BorderPut::Element(border) = word_put_border(&mut doc, &old, &new, WORD_TOP, "top")
        else {
            panic!("expected a border element");
        };
        assert_eq!(doc.get_attribute(border, WORD_VAL), Some("single"));
        assert_eq!(doc.get_attribute(border, crate::xml::tags::WORD_SZ), Some("8"));
        assert_eq!(doc.get_attribute(border, WORD_COLOR), Some("FF0000"));

        let mut back = CssProperties::default();
        word_get_border(&doc, border, "top", &mut back);
        assert_eq!(back.get("border-top-width"), Some("1pt"));
        assert_eq!(back.get("border-top-style"), Some("solid"));
        assert_eq!(back.get("border-top-color"), Some("#FF0000"));
    }

    #[test]
    fn named_widths_normalise_before_conversion() {
        let mut doc = Document::new_with_root(crate::xml::tags::WORD_PBDR);
        let old = CssProperties::default();
        let mut new = CssProperties::default();
        new.put("border-top-width", "thick");
        new.put("border-top-style", "solid");

        let BorderPut::Element(border) = word_put_border(&mut doc, &old, &new, WORD_TOP, "top")
        else {
            panic!("expected a border element");
        };
        // 4pt in eighths of a point.
        assert_eq!(doc.get_attribute(border, crate::xml::tags::WORD_SZ), Some("32"));
    }

    #[test]
    fn unchanged_borders_are_left_alone() {
        let mut doc = Document::new_with_root(crate::xml::tags::WORD_PBDR);
        let mut old = CssProperties::default();
        old.put("border-top-width", "1pt");
        let mut new = CssProperties::default();
        new.put("border-top-width", "1pt");
        assert!(matches!(
            word_put_border(&mut doc, &old, &new, WORD_TOP, "top"),
            BorderPut::Unchanged
        ));
        assert!(matches!(
            word_put_border(&mut doc, &old, &CssProperties::default(), WORD_TOP, "top"),
            BorderPut::Remove
        ));
    }

    #[test]
    fn shading_maps_to_background_color() {
        let mut doc = Document::new_with_root(crate::xml::tags::WORD_PPR);
        let shd = word_put_shd(&mut doc, Some("#00FF00")).unwrap();
        assert_eq!(doc.get_attribute(shd, WORD_FILL), Some("00FF00"));
        assert_eq!(doc.get_attribute(shd, WORD_VAL), Some("clear"));

        let mut props = CssProperties::default();
        word_get_shd(&doc, shd, &mut props);
        assert_eq!(props.get("background-color"), Some("#00FF00"));

        assert!(word_put_shd(&mut doc, None).is_none());
    }

    #[test]
    fn run_properties_roundtrip() {
        let mut doc = Document::new_with_root(crate::xml::tags::WORD_R);
        let mut props = CssProperties::default();
        props.put("font-weight", "bold");
        props.put("color", "#112233");
        props.put("font-size", "12pt");

        let rpr = word_put_run_properties(&mut doc, &props).unwrap();
        let mut back = CssProperties::default();
        word_get_run_properties(&doc, rpr, &mut back);
        assert_eq!(back.get("font-weight"), Some("bold"));
        assert_eq!(back.get("color"), Some("#112233"));
        assert_eq!(back.get("font-size"), Some("12pt"));

        assert!(word_put_run_properties(&mut doc, &CssProperties::default()).is_none());
    }
}
