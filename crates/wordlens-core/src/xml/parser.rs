//! Streaming, namespace-aware XML parsing.
//!
//! Events from quick-xml drive DOM construction through a stack of open
//! elements. Markup-compatibility declarations are honoured while parsing:
//! ignorable subtrees are skipped, process-content wrappers are dropped with
//! their children kept, and attributes in ignorable namespaces are filtered.

use super::dom::Document;
use super::mce::{MarkupCompatibility, McAction};
use super::tags::{MC_IGNORABLE, MC_MUSTUNDERSTAND, MC_PROCESSCONTENT};
use crate::error::{Result, WordlensError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

enum Frame {
    Element(indextree::NodeId),
    // A process-content wrapper: no node was created, children attach to
    // the enclosing element.
    Transparent,
}

struct XmlParser {
    document: Document,
    frames: Vec<Frame>,
    scopes: Vec<Vec<(String, String)>>,
    compatibility: MarkupCompatibility,
    ignore_depth: u32,
    warnings: Vec<String>,
    fatal_errors: Vec<String>,
}

pub fn parse(text: &str) -> Result<Document> {
    parse_bytes(text.as_bytes())
}

pub fn parse_bytes(bytes: &[u8]) -> Result<Document> {
    let text = std::str::from_utf8(bytes).map_err(|e| WordlensError::XmlParse {
        message: e.to_string(),
        location: "input".to_string(),
    })?;

    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.expand_empty_elements = true;
    config.check_end_names = true;

    let mut parser = XmlParser {
        document: Document::new(),
        frames: Vec::new(),
        scopes: Vec::new(),
        compatibility: MarkupCompatibility::new(),
        ignore_depth: 0,
        warnings: Vec::new(),
        fatal_errors: Vec::new(),
    };

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Err(e) => {
                parser
                    .fatal_errors
                    .push(format!("offset {}: {}", position, e));
                break;
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(start)) => parser.start_element(&start),
            Ok(Event::Empty(start)) => {
                parser.start_element(&start);
                parser.end_element();
            }
            Ok(Event::End(_)) => parser.end_element(),
            Ok(Event::Text(text)) => match text.unescape() {
                Ok(value) => parser.text(&value),
                Err(e) => parser.fatal_errors.push(format!("offset {}: {}", position, e)),
            },
            Ok(Event::CData(cdata)) => {
                let value = String::from_utf8_lossy(&cdata).into_owned();
                parser.cdata(&value);
            }
            Ok(Event::Comment(comment)) => {
                let value = String::from_utf8_lossy(&comment).into_owned();
                parser.comment(&value);
            }
            Ok(Event::PI(pi)) => {
                let target = String::from_utf8_lossy(pi.target()).into_owned();
                let content = String::from_utf8_lossy(pi.content()).into_owned();
                parser.pi(&target, &content);
            }
            Ok(Event::Decl(_)) | Ok(Event::DocType(_)) => {}
        }
    }

    if let Some(first) = parser.fatal_errors.first() {
        let mut message = first.clone();
        if !parser.warnings.is_empty() {
            message.push_str(&format!("; warnings: {}", parser.warnings.join(", ")));
        }
        return Err(WordlensError::XmlParse {
            message,
            location: "document".to_string(),
        });
    }
    if parser.document.root().is_none() {
        return Err(WordlensError::XmlParse {
            message: "no root element".to_string(),
            location: "document".to_string(),
        });
    }
    Ok(parser.document)
}

impl XmlParser {
    fn current_parent(&self) -> indextree::NodeId {
        for frame in self.frames.iter().rev() {
            if let Frame::Element(id) = frame {
                return *id;
            }
        }
        self.document.doc_node()
    }

    fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        for scope in self.scopes.iter().rev() {
            for (declared, uri) in scope.iter().rev() {
                if declared == prefix {
                    return Some(uri);
                }
            }
        }
        match prefix {
            "xml" => Some("http://www.w3.org/XML/1998/namespace"),
            _ => None,
        }
    }

    fn start_element(&mut self, start: &BytesStart) {
        if self.ignore_depth > 0 {
            self.ignore_depth += 1;
            return;
        }

        // Separate namespace declarations from regular attributes.
        let mut declared: Vec<(String, String)> = Vec::new();
        let mut plain: Vec<(Option<String>, String, String)> = Vec::new();
        for attr in start.attributes().flatten() {
            let key = attr.key;
            let value = match attr.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(e) => {
                    self.fatal_errors.push(e.to_string());
                    return;
                }
            };
            let local = String::from_utf8_lossy(key.local_name().as_ref()).into_owned();
            match key.prefix() {
                None if local == "xmlns" => declared.push((String::new(), value)),
                None => plain.push((None, local, value)),
                Some(prefix) if prefix.as_ref() == b"xmlns" => declared.push((local, value)),
                Some(prefix) => {
                    let prefix = String::from_utf8_lossy(prefix.as_ref()).into_owned();
                    plain.push((Some(prefix), local, value));
                }
            }
        }
        self.scopes.push(declared.clone());
        for (prefix, uri) in &declared {
            self.document.names_mut().intern_namespace(uri, prefix);
        }

        let name = start.name();
        let local = String::from_utf8_lossy(name.local_name().as_ref()).into_owned();
        let uri = match name.prefix() {
            Some(prefix) => {
                let prefix = String::from_utf8_lossy(prefix.as_ref()).into_owned();
                match self.resolve_prefix(&prefix) {
                    Some(uri) => uri.to_string(),
                    None => {
                        self.warnings.push(format!("undeclared prefix '{}'", prefix));
                        String::new()
                    }
                }
            }
            None => self.resolve_prefix("").unwrap_or("").to_string(),
        };
        let tag = self.document.tag_for_name(&uri, &local);
        let namespace = self
            .document
            .names()
            .name_for_tag(tag)
            .map(|(ns, _)| ns)
            .unwrap_or_default();

        match self.compatibility.lookup(namespace, tag, true) {
            McAction::Ignore => {
                self.scopes.pop();
                self.ignore_depth = 1;
                return;
            }
            action => {
                self.compatibility.push(&declared, self.document.names_mut());

                // mc:* attributes extend the record just pushed.
                let mut attrs: Vec<(crate::xml::tags::Tag, String)> = Vec::new();
                for (prefix, local, value) in plain {
                    let uri = match &prefix {
                        Some(prefix) => match self.resolve_prefix(prefix) {
                            Some(uri) => uri.to_string(),
                            None => {
                                self.warnings.push(format!("undeclared prefix '{}'", prefix));
                                continue;
                            }
                        },
                        None => String::new(),
                    };
                    let attr_tag = self.document.tag_for_name(&uri, &local);
                    match attr_tag {
                        MC_IGNORABLE => self.compatibility.process_attr(
                            McAction::Ignore,
                            &value,
                            self.document.names_mut(),
                        ),
                        MC_PROCESSCONTENT => self.compatibility.process_attr(
                            McAction::ProcessContent,
                            &value,
                            self.document.names_mut(),
                        ),
                        MC_MUSTUNDERSTAND => self.compatibility.process_attr(
                            McAction::MustUnderstand,
                            &value,
                            self.document.names_mut(),
                        ),
                        _ => {
                            let attr_ns = self
                                .document
                                .names()
                                .name_for_tag(attr_tag)
                                .map(|(ns, _)| ns)
                                .unwrap_or_default();
                            if self.compatibility.lookup(attr_ns, 0, false) != McAction::Ignore {
                                attrs.push((attr_tag, value));
                            }
                        }
                    }
                }

                if action == McAction::ProcessContent {
                    self.frames.push(Frame::Transparent);
                    return;
                }

                let parent = self.current_parent();
                let element = self.document.create_element(tag);
                for (tag, value) in attrs {
                    self.document.set_attribute(element, tag, &value);
                }
                self.document.append_child(parent, element);
                self.frames.push(Frame::Element(element));
            }
        }
    }

    fn end_element(&mut self) {
        if self.ignore_depth > 0 {
            self.ignore_depth -= 1;
            return;
        }
        self.compatibility.pop();
        self.scopes.pop();
        self.frames.pop();
    }

    fn text(&mut self, value: &str) {
        if self.ignore_depth > 0 {
            return;
        }
        let parent = self.current_parent();
        let node = self.document.create_text(value);
        self.document.append_child(parent, node);
    }

    fn cdata(&mut self, value: &str) {
        if self.ignore_depth > 0 {
            return;
        }
        let parent = self.current_parent();
        let node = self.document.create_cdata(value);
        self.document.append_child(parent, node);
    }

    fn comment(&mut self, value: &str) {
        if self.ignore_depth > 0 {
            return;
        }
        let parent = self.current_parent();
        let node = self.document.create_comment(value);
        self.document.append_child(parent, node);
    }

    fn pi(&mut self, target: &str, content: &str) {
        if self.ignore_depth > 0 {
            return;
        }
        let parent = self.current_parent();
        let node = self.document.create_pi(target, content);
        self.document.append_child(parent, node);
    }
}
