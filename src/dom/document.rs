//! Arena-backed XML document
//!
//! `XmlDocument::parse` drives the slice reader and builds a tree of element
//! nodes. Names are resolved against in-scope namespace declarations and
//! stored in Clark notation, `{uri}local`, with bare `local` for names that
//! have no namespace. Text, comments and processing instructions are checked
//! for well-formedness but not stored.

use super::namespace::NamespaceResolver;
use super::node::{NodeId, XmlAttribute, XmlNode, DOCUMENT_NODE};
use super::strings::StringPool;
use super::TreeNode;
use crate::core::attributes::{split_name, Attribute};
use crate::core::encoding::decode_input;
use crate::core::tokenizer::{validate_name, ParseError};
use crate::reader::events::{StartElement, XmlEvent};
use crate::reader::slice::SliceReader;
use std::fmt;

/// Parsed, read-only XML document
#[derive(Debug)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
    attributes: Vec<XmlAttribute>,
    strings: StringPool,
    root_element: NodeId,
}

impl XmlDocument {
    /// Parse a complete document.
    ///
    /// Returns Err if the input is not well-formed XML 1.0 with namespaces.
    pub fn parse(input: &[u8]) -> Result<Self, ParseError> {
        let text = decode_input(input).map_err(|msg| ParseError::new(msg, 0))?;
        let mut builder = Builder::new();
        builder.run(text.as_bytes())?;
        builder.finish()
    }

    /// The document element
    pub fn root(&self) -> Element<'_> {
        Element {
            doc: self,
            id: self.root_element,
        }
    }

    /// Number of elements in the document
    pub fn element_count(&self) -> usize {
        self.nodes.len() - 1
    }

    #[inline]
    fn node(&self, id: NodeId) -> &XmlNode {
        &self.nodes[id as usize]
    }
}

/// Borrowed handle to an element of an `XmlDocument`
#[derive(Clone, Copy)]
pub struct Element<'d> {
    doc: &'d XmlDocument,
    id: NodeId,
}

impl<'d> Element<'d> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Tag in Clark notation, e.g. `{http://www.w3.org/2000/svg}glyph`
    pub fn tag(&self) -> &'d str {
        self.doc.strings.get(self.doc.node(self.id).tag_id)
    }

    /// Attribute value by (Clark notation) name, `None` when absent
    pub fn attribute(&self, name: &str) -> Option<&'d str> {
        let name_id = self.doc.strings.find(name)?;
        self.attribute_slots()
            .iter()
            .find(|attr| attr.name_id == name_id)
            .map(|attr| self.doc.strings.get(attr.value_id))
    }

    pub fn children(&self) -> Children<'d> {
        Children {
            doc: self.doc,
            next: self.doc.node(self.id).first_child,
        }
    }

    fn attribute_slots(&self) -> &'d [XmlAttribute] {
        let node = self.doc.node(self.id);
        let start = node.attr_start as usize;
        &self.doc.attributes[start..start + node.attr_count as usize]
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Element<'_> {}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("tag", &self.tag())
            .finish()
    }
}

impl<'d> TreeNode for Element<'d> {
    type Children = Children<'d>;

    fn tag(&self) -> &str {
        Element::tag(self)
    }

    fn children(&self) -> Children<'d> {
        Element::children(self)
    }
}

/// Iterator over the child elements of an element, in document order
pub struct Children<'d> {
    doc: &'d XmlDocument,
    next: Option<NodeId>,
}

impl<'d> Iterator for Children<'d> {
    type Item = Element<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.doc.node(id).next_sibling;
        Some(Element { doc: self.doc, id })
    }
}

/// Open element on the builder stack
struct OpenElement<'a> {
    id: NodeId,
    qname: &'a [u8],
}

/// Event-driven tree construction
struct Builder<'a> {
    nodes: Vec<XmlNode>,
    attributes: Vec<XmlAttribute>,
    strings: StringPool,
    resolver: NamespaceResolver,
    stack: Vec<OpenElement<'a>>,
    root_element: Option<NodeId>,
    seen_doctype: bool,
}

impl<'a> Builder<'a> {
    fn new() -> Self {
        let mut strings = StringPool::new();
        let resolver = NamespaceResolver::new(&mut strings);
        Builder {
            nodes: vec![XmlNode::document()],
            attributes: Vec::with_capacity(128),
            strings,
            resolver,
            stack: Vec::with_capacity(16),
            root_element: None,
            seen_doctype: false,
        }
    }

    fn run(&mut self, input: &'a [u8]) -> Result<(), ParseError> {
        let mut reader = SliceReader::new(input);
        let mut first = true;

        while let Some(event) = reader.next_event()? {
            let position = reader.position();
            match event {
                XmlEvent::XmlDeclaration if !first => {
                    return Err(ParseError::new(
                        "XML declaration must be at the very start of the document",
                        position,
                    ));
                }
                XmlEvent::XmlDeclaration => {}
                XmlEvent::DocType(_) => {
                    if self.seen_doctype || self.root_element.is_some() {
                        return Err(ParseError::new("DOCTYPE must appear once, before the root element", position));
                    }
                    self.seen_doctype = true;
                }
                XmlEvent::StartElement(elem) => {
                    let id = self.open_element(&elem, position)?;
                    self.stack.push(OpenElement { id, qname: elem.name });
                }
                XmlEvent::EmptyElement(elem) => {
                    self.open_element(&elem, position)?;
                    self.resolver.pop_scope();
                }
                XmlEvent::EndElement(end) => {
                    let open = self
                        .stack
                        .pop()
                        .ok_or_else(|| ParseError::new("Unexpected end tag", position))?;
                    if open.qname != end.name {
                        return Err(ParseError::new(
                            format!(
                                "Mismatched end tag: expected </{}>, found </{}>",
                                String::from_utf8_lossy(open.qname),
                                String::from_utf8_lossy(end.name)
                            ),
                            position,
                        ));
                    }
                    self.resolver.pop_scope();
                }
                XmlEvent::Text(text) => {
                    if self.stack.is_empty() && !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(ParseError::new("Text is not allowed outside the root element", position));
                    }
                }
                XmlEvent::CData(_) => {
                    if self.stack.is_empty() {
                        return Err(ParseError::new("CDATA is not allowed outside the root element", position));
                    }
                }
                XmlEvent::Comment(_) | XmlEvent::ProcessingInstruction { .. } => {}
            }
            first = false;
        }

        if let Some(open) = self.stack.last() {
            return Err(ParseError::new(
                format!("Unclosed element <{}>", String::from_utf8_lossy(open.qname)),
                input.len(),
            ));
        }
        Ok(())
    }

    fn finish(self) -> Result<XmlDocument, ParseError> {
        let root_element = self
            .root_element
            .ok_or_else(|| ParseError::new("No root element", 0))?;
        Ok(XmlDocument {
            nodes: self.nodes,
            attributes: self.attributes,
            strings: self.strings,
            root_element,
        })
    }

    /// Create the node for a start or empty tag and enter its namespace scope
    fn open_element(&mut self, elem: &StartElement<'a>, position: usize) -> Result<NodeId, ParseError> {
        let err = |msg: String| ParseError::new(msg, position);

        let parent_id = match self.stack.last() {
            Some(open) => open.id,
            None if self.root_element.is_some() => {
                return Err(err("Only one root element is allowed".into()));
            }
            None => DOCUMENT_NODE,
        };

        self.resolver.push_scope();

        // Namespace declarations apply to the element that carries them
        let mut plain: Vec<&Attribute<'a>> = Vec::with_capacity(elem.attributes.len());
        for attr in &elem.attributes {
            match split_name(attr.name) {
                (None, b"xmlns") => {
                    let uri_id = self.strings.intern(utf8(&attr.value, position)?);
                    self.resolver.declare_default(uri_id).map_err(|m| err(m.into()))?;
                }
                (Some(b"xmlns"), prefix) => {
                    let prefix_id = self.strings.intern(checked_local(prefix, position)?);
                    let uri_id = self.strings.intern(utf8(&attr.value, position)?);
                    self.resolver.declare(prefix_id, uri_id).map_err(|m| err(m.into()))?;
                }
                _ => plain.push(attr),
            }
        }

        let tag = self.expand(elem.name, true, position)?;
        let tag_id = self.strings.intern(&tag);

        let attr_start = self.attributes.len();
        for attr in plain {
            let name = self.expand(attr.name, false, position)?;
            let name_id = self.strings.intern(&name);
            if self.attributes[attr_start..].iter().any(|a| a.name_id == name_id) {
                return Err(err(format!("Duplicate attribute '{name}'")));
            }
            let value_id = self.strings.intern(utf8(&attr.value, position)?);
            self.attributes.push(XmlAttribute { name_id, value_id });
        }

        let mut node = XmlNode::element(tag_id);
        node.attr_start = attr_start as u32;
        node.attr_count = (self.attributes.len() - attr_start) as u32;

        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        self.link_child(parent_id, id);

        if parent_id == DOCUMENT_NODE {
            self.root_element = Some(id);
        }
        Ok(id)
    }

    /// Expand a qualified name to Clark notation.
    ///
    /// Unprefixed element names take the default namespace; unprefixed
    /// attribute names never do.
    fn expand(&self, qname: &[u8], is_element: bool, position: usize) -> Result<String, ParseError> {
        let (prefix, local) = split_name(qname);
        let local = checked_local(local, position)?;

        let uri_id = match prefix {
            Some(prefix) => {
                let prefix = checked_local(prefix, position)?;
                let prefix_id = self.strings.find(prefix);
                let resolved = prefix_id.and_then(|id| self.resolver.resolve(id));
                Some(resolved.ok_or_else(|| {
                    ParseError::new(format!("Unbound namespace prefix '{prefix}'"), position)
                })?)
            }
            None if is_element => self.resolver.resolve_default(),
            None => None,
        };

        Ok(match uri_id {
            Some(uri_id) => format!("{{{}}}{}", self.strings.get(uri_id), local),
            None => local.to_owned(),
        })
    }

    /// Link a child node as the last child of its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        match self.nodes[parent_id as usize].last_child {
            Some(last) => self.nodes[last as usize].next_sibling = Some(child_id),
            None => self.nodes[parent_id as usize].first_child = Some(child_id),
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
    }
}

fn utf8(bytes: &[u8], position: usize) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|_| ParseError::new("Invalid UTF-8 in name or value", position))
}

/// A name part without a colon (NCName)
fn checked_local(part: &[u8], position: usize) -> Result<&str, ParseError> {
    if part.contains(&b':') {
        return Err(ParseError::new("Qualified name has more than one colon", position));
    }
    validate_name(part).map_err(|msg| ParseError::new(msg, position))?;
    utf8(part, position)
}
