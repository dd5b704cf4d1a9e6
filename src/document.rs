//! Read-only element tree for vector documents.
//!
//! The tree is built once from XML text and never mutated afterwards. Tags are
//! stored by local name, so `<svg:path>` and `<path>` look the same to the
//! compiler. Text content is dropped; only elements and attributes matter.

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One element of the document tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentNode {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder used by tests and by collaborators that synthesize documents
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[DocumentNode] {
        &self.children
    }

    pub fn children_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a DocumentNode> {
        self.children.iter().filter(move |c| c.tag == tag)
    }
}

/// A parsed vector document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: DocumentNode,
}

impl Document {
    pub fn from_root(root: DocumentNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &DocumentNode {
        &self.root
    }

    /// Parse XML text into a document tree.
    ///
    /// Any structural problem (bad syntax, mismatched or missing end tags, no
    /// root element) is reported as `Error::MalformedDocument` with the line
    /// and column where the reader stopped.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<DocumentNode> = Vec::new();
        let mut root: Option<DocumentNode> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if root.is_some() {
                        return Err(malformed(
                            xml,
                            reader.buffer_position() as usize,
                            "content after the root element",
                        ));
                    }
                    stack.push(element_from_start(e));
                }
                Ok(Event::Empty(ref e)) => {
                    let node = element_from_start(e);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None if root.is_none() => root = Some(node),
                        None => {
                            return Err(malformed(
                                xml,
                                reader.buffer_position() as usize,
                                "content after the root element",
                            ));
                        }
                    }
                }
                Ok(Event::End(_)) => {
                    // quick-xml already verified the end name matches
                    let Some(node) = stack.pop() else {
                        return Err(malformed(
                            xml,
                            reader.buffer_position() as usize,
                            "unexpected end tag",
                        ));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root = Some(node),
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(malformed(
                        xml,
                        reader.error_position() as usize,
                        &e.to_string(),
                    ));
                }
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(malformed(
                xml,
                xml.len(),
                &format!("unexpected end of document inside <{}>", open.tag),
            ));
        }

        match root {
            Some(root) => Ok(Self { root }),
            None => Err(malformed(xml, xml.len(), "document has no root element")),
        }
    }
}

fn element_from_start(e: &BytesStart) -> DocumentNode {
    let name = e.local_name();
    let tag = String::from_utf8_lossy(name.as_ref()).into_owned();

    let attributes = e
        .attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = match quick_xml::escape::unescape(&raw) {
                Ok(v) => v.into_owned(),
                Err(_) => raw.to_string(),
            };
            (key, value)
        })
        .collect();

    DocumentNode {
        tag,
        attributes,
        children: Vec::new(),
    }
}

/// Build a MalformedDocument error, translating a byte offset to line/column
fn malformed(xml: &str, offset: usize, message: &str) -> Error {
    let offset = offset.min(xml.len());
    let before = &xml.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = match before.iter().rposition(|&b| b == b'\n') {
        Some(nl) => offset - nl,
        None => offset + 1,
    };

    Error::MalformedDocument {
        line,
        column,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_tree() {
        let doc = Document::parse(
            r##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10">
  <g transform="scale(2)">
    <rect x="1" y="2" width="3" height="4" stroke="#ff0000"/>
  </g>
  <line x1="0" y1="0" x2="5" y2="5"/>
</svg>"##,
        )
        .unwrap();

        let root = doc.root();
        assert_eq!(root.tag(), "svg");
        assert_eq!(root.attribute("viewBox"), Some("0 0 10 10"));
        assert_eq!(root.children().len(), 2);

        let g = root.children_by_tag("g").next().unwrap();
        assert_eq!(g.attribute("transform"), Some("scale(2)"));
        assert_eq!(g.children()[0].tag(), "rect");
        assert_eq!(g.children()[0].attribute("stroke"), Some("#ff0000"));
        assert_eq!(g.children()[0].attribute("missing"), None);
    }

    #[test]
    fn test_prefixed_tags_use_local_name() {
        let doc = Document::parse(
            r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg"><svg:circle r="3"/></svg:svg>"#,
        )
        .unwrap();
        assert_eq!(doc.root().tag(), "svg");
        assert_eq!(doc.root().children()[0].tag(), "circle");
    }

    #[test]
    fn test_attribute_entities_are_unescaped() {
        let doc = Document::parse(r#"<svg><path d="M0 0 L1&#x20;1"/></svg>"#).unwrap();
        assert_eq!(doc.root().children()[0].attribute("d"), Some("M0 0 L1 1"));
    }

    #[test]
    fn test_mismatched_end_tag_is_malformed() {
        let err = Document::parse("<svg>\n  <g>\n</svg>").unwrap_err();
        match err {
            Error::MalformedDocument { line, .. } => assert!(line >= 2),
            other => panic!("Expected MalformedDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_root_is_malformed() {
        let err = Document::parse("<svg><g></g>").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let err = Document::parse("   ").unwrap_err();
        assert!(err.to_string().contains("no root element"));
    }
}
