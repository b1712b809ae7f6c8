use std::sync::Arc;

use ashlar_name::QName;

/// One node of an E4X tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// An element with attributes and children.
    Element(Arc<Element>),
    /// Character data.
    Text(Arc<str>),
    /// A CDATA section, kept distinct from ordinary text.
    CData(Arc<str>),
    /// A comment.
    Comment(Arc<str>),
    /// A processing instruction.
    ProcessingInstruction {
        /// The PI target.
        target: Arc<str>,
        /// Everything after the target.
        data: Arc<str>,
    },
}

impl XmlNode {
    /// The element payload, when this is an element.
    pub fn as_element(&self) -> Option<&Arc<Element>> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// An element: resolved name, resolved attributes, children in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: QName,
    attributes: Vec<Attribute>,
    children: Vec<XmlNode>,
}

impl Element {
    pub(crate) fn new(name: QName, attributes: Vec<Attribute>, children: Vec<XmlNode>) -> Self {
        Element {
            name,
            attributes,
            children,
        }
    }

    /// The element's resolved name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The attributes, in document order, names resolved.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The first attribute with the given name.
    pub fn attribute(&self, name: &QName) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Child nodes, in document order.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// The concatenated text and CDATA content of direct children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                _ => {}
            }
        }
        out
    }
}

/// A resolved attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: QName,
    value: Arc<str>,
}

impl Attribute {
    pub(crate) fn new(name: QName, value: Arc<str>) -> Self {
        Attribute { name, value }
    }

    /// The resolved attribute name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The decoded attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The decoded value, sharing storage.
    pub fn value_shared(&self) -> Arc<str> {
        self.value.clone()
    }
}
