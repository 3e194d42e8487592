//! Generic XML decoding
//!
//! Turns a document into a tree of `XmlNode` elements. Element names are
//! reduced to their local name so namespace prefixes (`<sm:url>`) don't leak
//! into sitemap handling. Attributes, comments and processing instructions are
//! ignored; text and CDATA content is concatenated and trimmed.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors raised while decoding an XML document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("document is empty")]
    Empty,

    #[error("syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("multiple root elements (found <{0}> after the root)")]
    MultipleRoots(String),
}

/// A decoded XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the first child with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns all children with the given local name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Returns the trimmed text of the first matching child, if non-empty
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|child| child.text.trim())
            .filter(|text| !text.is_empty())
    }
}

/// Decodes raw bytes into an element tree
///
/// # Arguments
///
/// * `bytes` - The XML document
///
/// # Returns
///
/// * `Ok(XmlNode)` - The root element
/// * `Err(XmlError)` - The document is empty or not well-formed
pub fn decode(bytes: &[u8]) -> Result<XmlNode, XmlError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| XmlError::Syntax {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => stack.push(XmlNode::new(local_name(&start))),
            Event::Empty(start) => {
                let node = XmlNode::new(local_name(&start));
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(end) => {
                let node = stack.pop().ok_or_else(|| {
                    XmlError::UnexpectedEnd(String::from_utf8_lossy(end.local_name().as_ref()).into_owned())
                })?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let unescaped = text.unescape().map_err(|e| XmlError::Syntax {
                        position: reader.buffer_position() as u64,
                        message: e.to_string(),
                    })?;
                    current.text.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(String::from_utf8_lossy(&data.into_inner()).trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    if let Some(unclosed) = stack.pop() {
        return Err(XmlError::Unclosed(unclosed.name));
    }

    root.ok_or(XmlError::Empty)
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Attaches a finished element to its parent, or makes it the root
fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }

    if root.is_some() {
        return Err(XmlError::MultipleRoots(node.name));
    }

    *root = Some(node);
    Ok(())
}
