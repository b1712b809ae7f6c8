//! E4X-style XML: the node tree and its parser.
//!
//! The parser resolves namespace prefixes against a declaration stack,
//! defers attribute resolution until the whole start tag is read (so a
//! prefix declared later on the same tag still binds), decodes the five
//! named entities and numeric character references, and carries a line
//! counter into every error.

mod node;
mod parser;

pub use node::{Attribute, Element, XmlNode};
pub use parser::{
    parse_list, parse_list_with_default, parse_single_element, Error, ErrorCode, Result,
};
