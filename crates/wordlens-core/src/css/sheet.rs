//! The CSS sheet model.
//!
//! Selectors are a strict subset of CSS: an element name optionally followed
//! by one `.`-prefixed class name. Each style holds two property bags — the
//! main rule and its `::before` rule. Serialization is canonical: selectors
//! in sorted order, properties in sorted order.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssProperties {
    map: BTreeMap<String, String>,
}

impl CssProperties {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn put(&mut self, name: &str, value: &str) {
        self.map.insert(name.to_string(), value.to_string());
    }

    /// `None` removes the property.
    pub fn put_opt(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(value) => self.put(name, value),
            None => self.remove(name),
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.map.remove(name);
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CssStyle {
    pub selector: String,
    pub element_name: String,
    pub class_name: Option<String>,
    pub rule: CssProperties,
    pub before: CssProperties,
}

impl CssStyle {
    pub fn new(selector: &str) -> Self {
        let (element_name, class_name) = match selector.split_once('.') {
            Some((element, class)) => (element.to_string(), Some(class.to_string())),
            None => (selector.to_string(), None),
        };
        Self {
            selector: selector.to_string(),
            element_name,
            class_name,
            rule: CssProperties::default(),
            before: CssProperties::default(),
        }
    }

    /// 1..=6 when the element is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self.element_name.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CssSheet {
    styles: BTreeMap<String, CssStyle>,
    heading_numbering: bool,
}

impl CssSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selectors(&self) -> Vec<String> {
        self.styles.keys().cloned().collect()
    }

    pub fn get(&self, selector: &str) -> Option<&CssStyle> {
        self.styles.get(selector)
    }

    /// Looks up a style. With `follow_inheritance`, a class selector that is
    /// absent falls back to its bare element selector.
    pub fn lookup(
        &mut self,
        selector: &str,
        add_if_missing: bool,
        follow_inheritance: bool,
    ) -> Option<&mut CssStyle> {
        if add_if_missing && !self.styles.contains_key(selector) {
            self.styles.insert(selector.to_string(), CssStyle::new(selector));
        }
        if !self.styles.contains_key(selector) && follow_inheritance {
            if let Some((element, _)) = selector.split_once('.') {
                let element = element.to_string();
                return self.styles.get_mut(&element);
            }
        }
        self.styles.get_mut(selector)
    }

    pub fn remove(&mut self, selector: &str) {
        self.styles.remove(selector);
    }

    pub fn styles(&self) -> impl Iterator<Item = &CssStyle> {
        self.styles.values()
    }

    pub fn heading_numbering(&self) -> bool {
        self.heading_numbering
    }

    /// Turns automatic heading enumeration on or off by rewriting the
    /// heading styles' counter rules.
    pub fn set_heading_numbering(&mut self, on: bool) {
        self.heading_numbering = on;
        for level in 1..=6u8 {
            let selector = format!("h{}", level);
            if on {
                let style = self.lookup(&selector, true, false).expect("style was added");
                let mut content = String::new();
                for i in 1..=level {
                    if !content.is_empty() {
                        content.push_str(" \".\" ");
                    }
                    content.push_str(&format!("counter(h{})", i));
                }
                content.push_str(" \" \"");
                style.before.put("content", &content);
                style.rule.put("counter-increment", &format!("h{}", level));
                let reset: Vec<String> = ((level + 1)..=6).map(|i| format!("h{}", i)).collect();
                if reset.is_empty() {
                    style.rule.remove("counter-reset");
                } else {
                    style.rule.put("counter-reset", &reset.join(" "));
                }
            } else if let Some(style) = self.styles.get_mut(&selector) {
                style.before.remove("content");
                style.rule.remove("counter-increment");
                style.rule.remove("counter-reset");
            }
        }
    }

    /// Replaces the sheet contents from CSS text.
    pub fn update_from_text(&mut self, text: &str) {
        self.styles.clear();
        for (selector_text, body) in split_blocks(text) {
            for raw_selector in selector_text.split(',') {
                let raw_selector = raw_selector.trim();
                if raw_selector.is_empty() {
                    continue;
                }
                let (base, is_before) = match raw_selector.strip_suffix("::before") {
                    Some(base) => (base.trim(), true),
                    None => (raw_selector, false),
                };
                let Some(style) = self.lookup(base, true, false) else { continue };
                for (name, value) in split_declarations(&body) {
                    if is_before {
                        style.before.put(&name, &value);
                    } else {
                        style.rule.put(&name, &value);
                    }
                }
            }
        }
    }

    /// Canonical CSS text for the sheet.
    pub fn copy_text(&self) -> String {
        let mut out = String::new();
        for style in self.styles.values() {
            if !style.rule.is_empty() {
                out.push_str(&style.selector);
                out.push_str(" {\n");
                for (name, value) in style.rule.iter() {
                    out.push_str(&format!("  {}: {};\n", name, value));
                }
                out.push_str("}\n");
            }
            if !style.before.is_empty() {
                out.push_str(&style.selector);
                out.push_str("::before {\n");
                for (name, value) in style.before.iter() {
                    out.push_str(&format!("  {}: {};\n", name, value));
                }
                out.push_str("}\n");
            }
        }
        out
    }
}

/// Splits CSS text into `(selector, body)` pairs. Nested braces do not occur
/// in the supported subset.
fn split_blocks(text: &str) -> Vec<(String, String)> {
    let mut blocks = Vec::new();
    let mut rest = text;
    loop {
        let Some(open) = find_unquoted(rest, '{') else { break };
        let selector = rest[..open].trim().to_string();
        rest = &rest[open + 1..];
        let Some(close) = find_unquoted(rest, '}') else { break };
        let body = rest[..close].to_string();
        rest = &rest[close + 1..];
        if !selector.is_empty() {
            blocks.push((selector, body));
        }
    }
    blocks
}

fn find_unquoted(text: &str, needle: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                } else if c == needle {
                    return Some(i);
                }
            }
        }
    }
    None
}

fn split_declarations(body: &str) -> Vec<(String, String)> {
    let mut declarations = Vec::new();
    let mut rest = body;
    while !rest.is_empty() {
        let (declaration, remainder) = match find_unquoted(rest, ';') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        rest = remainder;
        let Some((name, value)) = declaration.split_once(':') else { continue };
        let name = name.trim();
        let value = value.trim();
        if !name.is_empty() && !value.is_empty() {
            declarations.push((name.to_string(), value.to_string()));
        }
    }
    declarations
}
