use std::fmt;
use std::sync::Arc;

use crate::namespace::Namespace;

/// A qualified name: a namespace plus a local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    namespace: Namespace,
    local_name: Arc<str>,
}

impl QName {
    /// A name qualified by the given namespace.
    pub fn new(namespace: Namespace, local_name: &str) -> Self {
        QName {
            namespace,
            local_name: local_name.into(),
        }
    }

    /// A name in the public namespace.
    pub fn public(local_name: &str) -> Self {
        QName::new(Namespace::public(), local_name)
    }

    /// A name qualified by an ordinary namespace with the given URI.
    pub fn uri_qualified(uri: &str, local_name: &str) -> Self {
        QName::new(Namespace::uri(uri), local_name)
    }

    #[inline]
    /// The namespace of this name.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    #[inline]
    /// The local name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// This name moved into another namespace.
    pub fn with_namespace(&self, namespace: Namespace) -> Self {
        QName {
            namespace,
            local_name: self.local_name.clone(),
        }
    }

    /// The `ns::local` display form; the bare local name when public.
    pub fn to_full_name(&self) -> String {
        if self.namespace.is_public() {
            self.local_name.to_string()
        } else {
            format!("{}::{}", self.namespace.uri_str(), self.local_name)
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_full_name())
    }
}
