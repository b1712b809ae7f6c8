#![warn(missing_docs)]

//! Namespaces and qualified names for the Ashlar runtime.

mod namespace;
mod namespace_set;
mod qname;

pub use namespace::{Namespace, NamespaceKind, AS3_NAMESPACE, XML_NAMESPACE};
pub use namespace_set::NamespaceSet;
pub use qname::QName;
