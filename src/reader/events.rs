//! XML Event Types
//!
//! Event types for pull-parser style XML processing.

use crate::core::attributes::Attribute;
use std::borrow::Cow;

/// XML parsing event
#[derive(Debug, Clone)]
pub enum XmlEvent<'a> {
    /// Start of an element: <name attrs...>
    StartElement(StartElement<'a>),
    /// End of an element: </name>
    EndElement(EndElement<'a>),
    /// Empty element: <name attrs.../>
    EmptyElement(StartElement<'a>),
    /// Text content between tags
    Text(Cow<'a, [u8]>),
    /// CDATA section content
    CData(&'a [u8]),
    /// Comment content
    Comment(&'a [u8]),
    /// Processing instruction: <?target data?>
    ProcessingInstruction { target: &'a [u8], data: &'a [u8] },
    /// XML declaration: <?xml version="1.0"?>
    XmlDeclaration,
    /// DOCTYPE declaration (raw markup)
    DocType(&'a [u8]),
}

/// Start element event data
#[derive(Debug, Clone)]
pub struct StartElement<'a> {
    /// Qualified name as written (may include prefix)
    pub name: &'a [u8],
    /// Element attributes, namespace declarations included
    pub attributes: Vec<Attribute<'a>>,
}

impl<'a> StartElement<'a> {
    pub fn new(name: &'a [u8], attributes: Vec<Attribute<'a>>) -> Self {
        StartElement { name, attributes }
    }
}

/// End element event data
#[derive(Debug, Clone)]
pub struct EndElement<'a> {
    /// Qualified name as written
    pub name: &'a [u8],
}

impl<'a> EndElement<'a> {
    pub fn new(name: &'a [u8]) -> Self {
        EndElement { name }
    }
}
