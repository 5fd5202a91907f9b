//! Namespace Resolution
//!
//! Stack-based namespace resolver. Prefixes and URIs are string pool IDs;
//! the default namespace is bound to the empty prefix.

use super::strings::{StringPool, EMPTY};

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// Namespace binding (prefix -> URI) declared at some element depth
#[derive(Debug, Clone)]
struct NsBinding {
    prefix_id: u32,
    uri_id: u32,
    depth: u16,
}

/// Stack-based namespace resolver
#[derive(Debug)]
pub struct NamespaceResolver {
    bindings: Vec<NsBinding>,
    depth: u16,
    xml_prefix_id: u32,
    xml_uri_id: u32,
    xmlns_prefix_id: u32,
    xmlns_uri_id: u32,
}

impl NamespaceResolver {
    /// Create a resolver with the `xml` prefix pre-bound
    pub fn new(strings: &mut StringPool) -> Self {
        let xml_prefix_id = strings.intern("xml");
        let xml_uri_id = strings.intern(ns::XML);
        let xmlns_prefix_id = strings.intern("xmlns");
        let xmlns_uri_id = strings.intern(ns::XMLNS);

        NamespaceResolver {
            bindings: vec![NsBinding {
                prefix_id: xml_prefix_id,
                uri_id: xml_uri_id,
                depth: 0,
            }],
            depth: 0,
            xml_prefix_id,
            xml_uri_id,
            xmlns_prefix_id,
            xmlns_uri_id,
        }
    }

    /// Enter a new element scope
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, removing any bindings declared in it
    pub fn pop_scope(&mut self) {
        while self.bindings.last().is_some_and(|b| b.depth >= self.depth) {
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Declare `xmlns:prefix="uri"` in the current scope
    pub fn declare(&mut self, prefix_id: u32, uri_id: u32) -> Result<(), &'static str> {
        if prefix_id == self.xmlns_prefix_id {
            return Err("The 'xmlns' prefix cannot be declared");
        }
        if uri_id == self.xmlns_uri_id {
            return Err("The xmlns namespace cannot be bound to a prefix");
        }
        if (prefix_id == self.xml_prefix_id) != (uri_id == self.xml_uri_id) {
            return Err("The 'xml' prefix is bound to the XML namespace only");
        }
        if uri_id == EMPTY {
            return Err("A namespace prefix cannot be bound to an empty URI");
        }
        self.bindings.push(NsBinding {
            prefix_id,
            uri_id,
            depth: self.depth,
        });
        Ok(())
    }

    /// Declare `xmlns="uri"` in the current scope; an empty URI clears the default
    pub fn declare_default(&mut self, uri_id: u32) -> Result<(), &'static str> {
        if uri_id == self.xml_uri_id || uri_id == self.xmlns_uri_id {
            return Err("Reserved namespace cannot be the default namespace");
        }
        self.bindings.push(NsBinding {
            prefix_id: EMPTY,
            uri_id,
            depth: self.depth,
        });
        Ok(())
    }

    /// Resolve a prefix to a namespace URI ID
    pub fn resolve(&self, prefix_id: u32) -> Option<u32> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix_id == prefix_id)
            .map(|b| b.uri_id)
    }

    /// URI of the default namespace, `None` when there is none in scope
    pub fn resolve_default(&self) -> Option<u32> {
        self.resolve(EMPTY).filter(|&uri| uri != EMPTY)
    }
}
