use std::cell::RefCell;
use std::sync::Arc;

use ashlar_name::{Namespace, QName, XML_NAMESPACE};
use thiserror::Error as ThisError;

use crate::xml::{Attribute, Element, XmlNode};

/// An XML parse error, carrying the offending line.
#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("XML parse error on line {line}: {code}")]
pub struct Error {
    /// What went wrong.
    pub code: ErrorCode,
    /// The 1-based line the parser was on.
    pub line: u32,
}

/// The enumerated XML error conditions.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum ErrorCode {
    /// Input ended inside markup.
    #[error("unexpected end of input")]
    UnexpectedEnd,
    /// Markup the grammar does not allow.
    #[error("malformed markup")]
    Malformed,
    /// A prefix with no in-scope declaration.
    #[error("unbound namespace prefix: {0}")]
    UnboundPrefix(String),
    /// Two attributes resolving to the same expanded name.
    #[error("duplicate attribute: {0}")]
    DuplicateAttribute(String),
    /// An end tag naming a different element than the open start tag.
    #[error("mismatched end tag: {0}")]
    MismatchedEndTag(String),
    /// A numeric character reference that denotes no character.
    #[error("invalid character reference")]
    InvalidCharacterReference,
    /// The input did not hold exactly one element.
    #[error("expected a single element")]
    NotSingleElement,
}

/// Result type for XML parsing.
pub type Result<T> = std::result::Result<T, Error>;

thread_local! {
    // reusable source buffer; the input is indexed by char while parsing
    static SOURCE_SCRATCH: RefCell<Vec<char>> = const { RefCell::new(Vec::new()) };
}

/// Parse markup into a list of nodes, the empty prefix bound to no
/// namespace.
pub fn parse_list(input: &str) -> Result<Vec<XmlNode>> {
    parse_list_with_default(input, "")
}

/// Parse markup into a list of nodes with the given default namespace
/// bound to the empty prefix.
pub fn parse_list_with_default(input: &str, default_namespace: &str) -> Result<Vec<XmlNode>> {
    SOURCE_SCRATCH.with(|scratch| {
        let mut src = scratch.borrow_mut();
        src.clear();
        src.extend(input.chars());
        Parser::new(&src, default_namespace).parse_nodes()
    })
}

/// Parse markup that must hold exactly one element (comments and
/// processing instructions around it are permitted).
pub fn parse_single_element(input: &str) -> Result<XmlNode> {
    let nodes = parse_list(input)?;
    let mut elements = nodes.iter().filter_map(XmlNode::as_element);
    let first = elements.next();
    let extra = elements.next().is_some();
    let text = nodes
        .iter()
        .any(|n| matches!(n, XmlNode::Text(_) | XmlNode::CData(_)));
    match first {
        Some(element) if !extra && !text => Ok(XmlNode::Element(element.clone())),
        _ => Err(Error {
            code: ErrorCode::NotSingleElement,
            line: 1,
        }),
    }
}

struct OpenElement {
    name: QName,
    attributes: Vec<Attribute>,
    children: Vec<XmlNode>,
}

struct Parser<'a> {
    src: &'a [char],
    pos: usize,
    line: u32,
    // namespace declarations, one scope per open element, innermost last
    scopes: Vec<Vec<(String, String)>>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a [char], default_namespace: &str) -> Self {
        Parser {
            src,
            pos: 0,
            line: 1,
            scopes: vec![vec![
                ("".to_string(), default_namespace.to_string()),
                ("xml".to_string(), XML_NAMESPACE.to_string()),
            ]],
        }
    }

    fn error(&self, code: ErrorCode) -> Error {
        Error {
            code,
            line: self.line,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.src.get(self.pos + i) == Some(&c))
    }

    // only for markers known to contain no newline
    fn consume(&mut self, s: &str) {
        self.pos += s.chars().count();
    }

    fn expect(&mut self, c: char) -> Result<()> {
        match self.advance() {
            Some(got) if got == c => Ok(()),
            Some(_) => Err(self.error(ErrorCode::Malformed)),
            None => Err(self.error(ErrorCode::UnexpectedEnd)),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn parse_nodes(mut self) -> Result<Vec<XmlNode>> {
        let mut open: Vec<OpenElement> = Vec::new();
        let mut top: Vec<XmlNode> = Vec::new();
        loop {
            if self.pos >= self.src.len() {
                if !open.is_empty() {
                    return Err(self.error(ErrorCode::UnexpectedEnd));
                }
                break;
            }
            if self.peek() == Some('<') {
                if self.starts_with("<!--") {
                    let node = self.comment()?;
                    attach(&mut open, &mut top, node);
                } else if self.starts_with("<![CDATA[") {
                    let node = self.cdata()?;
                    attach(&mut open, &mut top, node);
                } else if self.starts_with("</") {
                    self.consume("</");
                    let node = self.end_tag(&mut open)?;
                    attach(&mut open, &mut top, node);
                } else if self.starts_with("<?") {
                    if let Some(node) = self.processing_instruction()? {
                        attach(&mut open, &mut top, node);
                    }
                } else if self.starts_with("<!") {
                    return Err(self.error(ErrorCode::Malformed));
                } else {
                    self.consume("<");
                    if let Some(node) = self.start_tag(&mut open)? {
                        attach(&mut open, &mut top, node);
                    }
                }
            } else {
                if let Some(node) = self.text()? {
                    attach(&mut open, &mut top, node);
                }
            }
        }
        Ok(top)
    }

    // names

    fn name(&mut self) -> Result<(Option<String>, String)> {
        let first = self.raw_name()?;
        if self.peek() == Some(':') {
            self.advance();
            let second = self.raw_name()?;
            Ok((Some(first), second))
        } else {
            Ok((None, first))
        }
    }

    fn raw_name(&mut self) -> Result<String> {
        let mut name = String::new();
        match self.peek() {
            Some(c) if is_name_start(c) => {
                self.advance();
                name.push(c);
            }
            Some(_) => return Err(self.error(ErrorCode::Malformed)),
            None => return Err(self.error(ErrorCode::UnexpectedEnd)),
        }
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            name.push(self.advance().unwrap());
        }
        Ok(name)
    }

    fn resolve_prefix(&self, prefix: &str) -> Result<Namespace> {
        for scope in self.scopes.iter().rev() {
            if let Some((_, uri)) = scope.iter().rev().find(|(p, _)| p == prefix) {
                return Ok(Namespace::prefixed(prefix, uri));
            }
        }
        Err(self.error(ErrorCode::UnboundPrefix(prefix.to_string())))
    }

    fn default_namespace(&self) -> Namespace {
        for scope in self.scopes.iter().rev() {
            if let Some((_, uri)) = scope.iter().rev().find(|(p, _)| p.is_empty()) {
                return if uri.is_empty() {
                    Namespace::public()
                } else {
                    Namespace::uri(uri)
                };
            }
        }
        Namespace::public()
    }

    fn resolve_element_name(&self, prefix: Option<&str>, local: &str) -> Result<QName> {
        let namespace = match prefix {
            Some(p) => self.resolve_prefix(p)?,
            None => self.default_namespace(),
        };
        Ok(QName::new(namespace, local))
    }

    // tags

    fn start_tag(&mut self, open: &mut Vec<OpenElement>) -> Result<Option<XmlNode>> {
        let (prefix, local) = self.name()?;
        let mut raw_attributes: Vec<(Option<String>, String, String)> = Vec::new();
        let mut declarations: Vec<(String, String)> = Vec::new();
        let self_closing;
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(ErrorCode::UnexpectedEnd)),
                Some('>') => {
                    self.advance();
                    self_closing = false;
                    break;
                }
                Some('/') => {
                    self.advance();
                    self.expect('>')?;
                    self_closing = true;
                    break;
                }
                Some(_) => {
                    let (attr_prefix, attr_local) = self.name()?;
                    self.skip_whitespace();
                    self.expect('=')?;
                    self.skip_whitespace();
                    let value = self.quoted_value()?;
                    if attr_prefix.is_none() && attr_local == "xmlns" {
                        declarations.push(("".to_string(), value));
                    } else if attr_prefix.as_deref() == Some("xmlns") {
                        declarations.push((attr_local, value));
                    } else {
                        raw_attributes.push((attr_prefix, attr_local, value));
                    }
                }
            }
        }
        // the tag's own declarations are in scope before any of its names
        // resolve, so a prefix declared after its use still binds
        self.scopes.push(declarations);
        let name = self.resolve_element_name(prefix.as_deref(), &local)?;
        let mut attributes: Vec<Attribute> = Vec::with_capacity(raw_attributes.len());
        for (attr_prefix, attr_local, value) in raw_attributes {
            let namespace = match &attr_prefix {
                Some(p) => self.resolve_prefix(p)?,
                // unprefixed attributes are in no namespace
                None => Namespace::public(),
            };
            let attr_name = QName::new(namespace, &attr_local);
            if attributes.iter().any(|a| a.name() == &attr_name) {
                return Err(self.error(ErrorCode::DuplicateAttribute(attr_name.to_full_name())));
            }
            attributes.push(Attribute::new(attr_name, value.into()));
        }
        if self_closing {
            self.scopes.pop();
            Ok(Some(XmlNode::Element(Arc::new(Element::new(
                name,
                attributes,
                Vec::new(),
            )))))
        } else {
            open.push(OpenElement {
                name,
                attributes,
                children: Vec::new(),
            });
            Ok(None)
        }
    }

    fn end_tag(&mut self, open: &mut Vec<OpenElement>) -> Result<XmlNode> {
        let (prefix, local) = self.name()?;
        self.skip_whitespace();
        self.expect('>')?;
        let Some(element) = open.pop() else {
            return Err(self.error(ErrorCode::Malformed));
        };
        // resolve with the element's scope still active, then leave it
        let name = self.resolve_element_name(prefix.as_deref(), &local)?;
        self.scopes.pop();
        if name != element.name {
            return Err(self.error(ErrorCode::MismatchedEndTag(name.to_full_name())));
        }
        Ok(XmlNode::Element(Arc::new(Element::new(
            element.name,
            element.attributes,
            element.children,
        ))))
    }

    // character data

    fn text(&mut self) -> Result<Option<XmlNode>> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '<' {
                break;
            }
            if c == '&' {
                self.entity(&mut out)?;
            } else {
                self.advance();
                out.push(c);
            }
        }
        // whitespace-only runs between elements carry no content
        if out.chars().all(char::is_whitespace) {
            Ok(None)
        } else {
            Ok(Some(XmlNode::Text(out.into())))
        }
    }

    fn quoted_value(&mut self) -> Result<String> {
        let quote = match self.advance() {
            Some(c @ ('"' | '\'')) => c,
            Some(_) => return Err(self.error(ErrorCode::Malformed)),
            None => return Err(self.error(ErrorCode::UnexpectedEnd)),
        };
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error(ErrorCode::UnexpectedEnd)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(out);
                }
                Some('&') => self.entity(&mut out)?,
                Some(c) => {
                    self.advance();
                    out.push(c);
                }
            }
        }
    }

    // positioned at '&'; appends the decoded text
    fn entity(&mut self, out: &mut String) -> Result<()> {
        self.advance();
        if self.peek() == Some('#') {
            self.advance();
            let hex = if matches!(self.peek(), Some('x') | Some('X')) {
                self.advance();
                true
            } else {
                false
            };
            let mut digits = String::new();
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                digits.push(self.advance().unwrap());
            }
            if digits.is_empty() || self.peek() != Some(';') {
                return Err(self.error(ErrorCode::InvalidCharacterReference));
            }
            self.advance();
            let radix = if hex { 16 } else { 10 };
            let value = u32::from_str_radix(&digits, radix)
                .map_err(|_| self.error(ErrorCode::InvalidCharacterReference))?;
            let c = char::from_u32(value)
                .ok_or_else(|| self.error(ErrorCode::InvalidCharacterReference))?;
            out.push(c);
            return Ok(());
        }
        // named entity; unknown names degrade to a literal ampersand
        let start = self.pos;
        let mut name = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            name.push(self.advance().unwrap());
        }
        let decoded = if self.peek() == Some(';') {
            match name.as_str() {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "apos" => Some('\''),
                "quot" => Some('"'),
                _ => None,
            }
        } else {
            None
        };
        match decoded {
            Some(c) => {
                self.advance(); // the ;
                out.push(c);
            }
            None => {
                self.pos = start;
                out.push('&');
            }
        }
        Ok(())
    }

    // markup other than tags

    fn comment(&mut self) -> Result<XmlNode> {
        self.consume("<!--");
        let mut out = String::new();
        loop {
            if self.starts_with("-->") {
                self.consume("-->");
                return Ok(XmlNode::Comment(out.into()));
            }
            match self.advance() {
                Some(c) => out.push(c),
                None => return Err(self.error(ErrorCode::UnexpectedEnd)),
            }
        }
    }

    fn cdata(&mut self) -> Result<XmlNode> {
        self.consume("<![CDATA[");
        let mut out = String::new();
        loop {
            if self.starts_with("]]>") {
                self.consume("]]>");
                return Ok(XmlNode::CData(out.into()));
            }
            match self.advance() {
                Some(c) => out.push(c),
                None => return Err(self.error(ErrorCode::UnexpectedEnd)),
            }
        }
    }

    fn processing_instruction(&mut self) -> Result<Option<XmlNode>> {
        self.consume("<?");
        let target = self.raw_name()?;
        let mut data = String::new();
        loop {
            if self.starts_with("?>") {
                self.consume("?>");
                break;
            }
            match self.advance() {
                Some(c) => data.push(c),
                None => return Err(self.error(ErrorCode::UnexpectedEnd)),
            }
        }
        // the document declaration is skipped, not represented
        if target.eq_ignore_ascii_case("xml") {
            return Ok(None);
        }
        Ok(Some(XmlNode::ProcessingInstruction {
            target: target.into(),
            data: data.trim_start().into(),
        }))
    }
}

fn attach(open: &mut [OpenElement], top: &mut Vec<XmlNode>, node: XmlNode) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top.push(node),
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '.' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(input: &str) -> Arc<Element> {
        parse_single_element(input)
            .unwrap()
            .as_element()
            .unwrap()
            .clone()
    }

    fn code(input: &str) -> ErrorCode {
        parse_list(input).unwrap_err().code
    }

    #[test]
    fn test_simple_element() {
        let el = single("<a>text</a>");
        assert_eq!(el.name(), &QName::public("a"));
        assert_eq!(el.text(), "text");
    }

    #[test]
    fn test_nested_elements_and_whitespace_suppression() {
        let el = single("<a>\n  <b/>\n  <c>x</c>\n</a>");
        assert_eq!(el.children().len(), 2);
        let c = el.children()[1].as_element().unwrap();
        assert_eq!(c.text(), "x");
    }

    #[test]
    fn test_late_prefix_declaration_on_same_tag() {
        let el = single(r#"<r a:x="1" xmlns:a="u"/>"#);
        let attr = el.attribute(&QName::uri_qualified("u", "x")).unwrap();
        assert_eq!(attr.value(), "1");
    }

    #[test]
    fn test_duplicate_resolved_attribute() {
        let err = code(r#"<r xmlns:a="u" xmlns:b="u" a:x="1" b:x="2"/>"#);
        assert_eq!(err, ErrorCode::DuplicateAttribute("u::x".to_string()));
    }

    #[test]
    fn test_unbound_prefix() {
        assert!(matches!(code("<a:b/>"), ErrorCode::UnboundPrefix(p) if p == "a"));
        assert!(matches!(code(r#"<r c:x="1"/>"#), ErrorCode::UnboundPrefix(p) if p == "c"));
    }

    #[test]
    fn test_xml_prefix_is_implicit() {
        let el = single(r#"<r xml:lang="en"/>"#);
        let attr = el
            .attribute(&QName::uri_qualified(XML_NAMESPACE, "lang"))
            .unwrap();
        assert_eq!(attr.value(), "en");
    }

    #[test]
    fn test_default_namespace_declaration() {
        let el = single(r#"<a xmlns="u"><b/></a>"#);
        assert_eq!(el.name(), &QName::uri_qualified("u", "a"));
        let b = el.children()[0].as_element().unwrap();
        assert_eq!(b.name(), &QName::uri_qualified("u", "b"));
    }

    #[test]
    fn test_per_call_default_namespace() {
        let nodes = parse_list_with_default("<a/>", "d").unwrap();
        let el = nodes[0].as_element().unwrap();
        assert_eq!(el.name(), &QName::uri_qualified("d", "a"));
    }

    #[test]
    fn test_unprefixed_attribute_has_no_namespace() {
        let el = single(r#"<a xmlns="u" x="1"/>"#);
        assert!(el.attribute(&QName::public("x")).is_some());
        assert!(el.attribute(&QName::uri_qualified("u", "x")).is_none());
    }

    #[test]
    fn test_entities() {
        let el = single("<a>&lt;&gt;&amp;&apos;&quot;</a>");
        assert_eq!(el.text(), "<>&'\"");
        let el = single("<a>&#65;&#x42;</a>");
        assert_eq!(el.text(), "AB");
    }

    #[test]
    fn test_unknown_entity_degrades_to_ampersand() {
        let el = single("<a>x &unknown; y</a>");
        assert_eq!(el.text(), "x &unknown; y");
        let el = single("<a>a & b</a>");
        assert_eq!(el.text(), "a & b");
    }

    #[test]
    fn test_invalid_character_reference() {
        assert_eq!(code("<a>&#xZZ;</a>"), ErrorCode::InvalidCharacterReference);
        assert_eq!(code("<a>&#xD800;</a>"), ErrorCode::InvalidCharacterReference);
    }

    #[test]
    fn test_cdata_comment_pi() {
        let el = single("<a><![CDATA[<raw>]]><!-- note --><?app data?></a>");
        assert_eq!(el.children().len(), 3);
        assert_eq!(el.text(), "<raw>");
        assert!(matches!(&el.children()[1], XmlNode::Comment(c) if &**c == " note "));
        assert!(matches!(
            &el.children()[2],
            XmlNode::ProcessingInstruction { target, data }
                if &**target == "app" && &**data == "data"
        ));
    }

    #[test]
    fn test_declaration_skipped() {
        let nodes = parse_list("<?xml version=\"1.0\"?><a/>").unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_mismatched_end_tag() {
        assert!(matches!(code("<a></b>"), ErrorCode::MismatchedEndTag(_)));
    }

    #[test]
    fn test_error_carries_line() {
        let err = parse_list("<a>\n\n<b:c/></a>").unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_unexpected_end() {
        assert_eq!(code("<a>"), ErrorCode::UnexpectedEnd);
        assert_eq!(code("<a b='1'"), ErrorCode::UnexpectedEnd);
    }

    #[test]
    fn test_single_element_rejects_lists() {
        assert!(parse_single_element("<a/><b/>").is_err());
        assert!(parse_single_element("text").is_err());
        assert!(parse_single_element("<!-- c --><a/>").is_ok());
    }

    #[test]
    fn test_attribute_entities_decoded() {
        let el = single(r#"<a x="&lt;1&gt;"/>"#);
        assert_eq!(el.attribute(&QName::public("x")).unwrap().value(), "<1>");
    }

    #[test]
    fn test_prefix_scoping() {
        let el = single(r#"<a xmlns:p="u1"><p:b xmlns:p="u2"/><p:c/></a>"#);
        let b = el.children()[0].as_element().unwrap();
        let c = el.children()[1].as_element().unwrap();
        assert_eq!(b.name(), &QName::uri_qualified("u2", "b"));
        assert_eq!(c.name(), &QName::uri_qualified("u1", "c"));
    }
}
