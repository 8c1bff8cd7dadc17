//! Generic XML element tree built on `quick-xml`'s pull parser.
//!
//! Feed documents arrive in three schemas (RSS 2.0, Atom, RDF) whose shapes
//! are only known after parsing, so the body is first converted into a plain
//! element tree that the normalizer can inspect structurally. The tree keeps
//! qualified names as written (`rdf:RDF`, `dc:date`), keeps attributes
//! separate from character data, and merges CDATA sections into character
//! data. Comments, processing instructions, and the XML declaration are
//! dropped; surrounding whitespace in text is trimmed at parse time.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Errors converting a feed body into an element tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body is not well-formed XML.
    #[error("invalid xml: {0}")]
    Syntax(#[from] quick_xml::Error),
    /// The body contained no root element at all.
    #[error("document has no root element")]
    NoRoot,
}

/// One element in the parsed tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Qualified element name as written in the document.
    pub name: String,
    /// Attributes in document order, entity references resolved.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
    /// Concatenated direct character data (text and CDATA), trimmed.
    pub text: String,
}

impl XmlElement {
    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child element with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All child elements with the given qualified name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Whether the element carries any attributes.
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Whether the element contains nested elements.
    pub fn has_element_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Parse a feed body into its root element.
///
/// Content after the root element closes is ignored; feeds occasionally
/// append stray whitespace or comments there.
pub fn parse_document(body: &str) -> Result<XmlElement, ParseError> {
    let mut reader = Reader::from_str(body);

    let mut stack: Vec<XmlElement> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start));
            }
            Event::Empty(start) => {
                let element = element_from_start(&start);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::End(_) => {
                let element = match stack.pop() {
                    Some(element) => finish(element),
                    None => return Err(ParseError::NoRoot),
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.decode().unwrap_or_default());
                }
            }
            Event::CData(cdata) => {
                if let Some(top) = stack.last_mut() {
                    top.text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(top) = stack.last_mut() {
                    if let Ok(Some(resolved)) = reference.resolve_char_ref() {
                        top.text.push(resolved);
                    } else if let Ok(name) = reference.decode() {
                        if let Some(value) = resolve_predefined_entity(&name) {
                            top.text.push_str(value);
                        }
                    }
                }
            }
            Event::Eof => return Err(ParseError::NoRoot),
            // Declaration, comments, processing instructions, doctype.
            _ => {}
        }
    }
}

// Character data is accumulated verbatim (it may arrive in several segments
// around CDATA sections and entity references); the trim happens once, when
// the element closes.
fn finish(mut element: XmlElement) -> XmlElement {
    element.text = element.text.trim().to_string();
    element
}

fn element_from_start(start: &BytesStart<'_>) -> XmlElement {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map(|value| value.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        attributes.push((key, value));
    }
    XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let root = parse_document(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <rss version="2.0">
              <channel>
                <title>Example</title>
                <item><title>First</title></item>
                <item><title>Second</title></item>
              </channel>
            </rss>"#,
        )
        .unwrap();

        assert_eq!(root.name, "rss");
        assert_eq!(root.attr("version"), Some("2.0"));
        let channel = root.child("channel").unwrap();
        assert_eq!(channel.children_named("item").count(), 2);
        assert_eq!(channel.child("title").unwrap().text, "Example");
    }

    #[test]
    fn keeps_qualified_names() {
        let root = parse_document(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
              <item><dc:date>2026-01-06</dc:date></item>
            </rdf:RDF>"#,
        )
        .unwrap();

        assert_eq!(root.name, "rdf:RDF");
        let item = root.child("item").unwrap();
        assert_eq!(item.child("dc:date").unwrap().text, "2026-01-06");
    }

    #[test]
    fn merges_cdata_into_text() {
        let root = parse_document("<item><description><![CDATA[<p>Hello</p>]]></description></item>")
            .unwrap();
        assert_eq!(root.child("description").unwrap().text, "<p>Hello</p>");
    }

    #[test]
    fn resolves_entity_references() {
        let root = parse_document("<item><title>Tom &amp; Jerry</title></item>").unwrap();
        assert_eq!(root.child("title").unwrap().text, "Tom & Jerry");
    }

    #[test]
    fn self_closing_elements_become_children() {
        let root = parse_document(r#"<entry><link rel="alternate" href="https://example.com"/></entry>"#)
            .unwrap();
        let link = root.child("link").unwrap();
        assert!(link.has_attributes());
        assert_eq!(link.attr("href"), Some("https://example.com"));
        assert!(link.text.is_empty());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let root = parse_document("<item><title>\n    padded   \n</title></item>").unwrap();
        assert_eq!(root.child("title").unwrap().text, "padded");
    }

    #[test]
    fn rejects_non_xml_bodies() {
        assert!(parse_document("<html><body>oops").is_err());
        assert!(matches!(parse_document("   "), Err(ParseError::NoRoot)));
    }

    #[test]
    fn ignores_trailing_content_after_root() {
        let root = parse_document("<rss><channel/></rss>\n").unwrap();
        assert_eq!(root.name, "rss");
    }
}
