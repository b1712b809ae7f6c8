use std::fmt;
use std::sync::Arc;

/// The `http://adobe.com/AS3/2006/builtin` namespace.
pub const AS3_NAMESPACE: &str = "http://adobe.com/AS3/2006/builtin";
/// The W3C XML namespace, implicitly bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The flavor of a namespace.
///
/// Membership of a name in a namespace compares by kind and URI; two
/// namespaces of different kinds never match even when their URIs agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
    /// An ordinary (user or public) namespace.
    Namespace,
    /// The public namespace of a package.
    Package,
    /// The internal namespace of a package.
    PackageInternal,
    /// The protected namespace of a class.
    Protected,
    /// The static protected namespace of a class.
    StaticProtected,
    /// An explicitly declared namespace.
    Explicit,
    /// A private namespace; never visible outside its declaring class.
    Private,
}

/// A namespace: a (kind, uri, prefix) triple.
#[derive(Debug, Clone, Eq)]
pub struct Namespace {
    kind: NamespaceKind,
    uri: Arc<str>,
    prefix: Option<Arc<str>>,
}

// a custom hasher that ignores the prefix
impl std::hash::Hash for Namespace {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.uri.hash(state);
    }
}

// and partial eq that ignores the prefix
impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.uri == other.uri
    }
}

impl Namespace {
    /// A namespace of the given kind and URI, without a prefix.
    pub fn new(kind: NamespaceKind, uri: &str) -> Self {
        Namespace {
            kind,
            uri: uri.into(),
            prefix: None,
        }
    }

    /// The public namespace: an ordinary namespace with the empty URI.
    pub fn public() -> Self {
        Namespace::new(NamespaceKind::Namespace, "")
    }

    /// An ordinary namespace with the given URI.
    pub fn uri(uri: &str) -> Self {
        Namespace::new(NamespaceKind::Namespace, uri)
    }

    /// An ordinary namespace with a URI and a display prefix.
    pub fn prefixed(prefix: &str, uri: &str) -> Self {
        Namespace {
            kind: NamespaceKind::Namespace,
            uri: uri.into(),
            prefix: Some(prefix.into()),
        }
    }

    /// The public namespace of the package with the given name.
    pub fn package(name: &str) -> Self {
        Namespace::new(NamespaceKind::Package, name)
    }

    /// The namespace the `xml` prefix is implicitly bound to.
    pub fn xml() -> Self {
        Namespace::prefixed("xml", XML_NAMESPACE)
    }

    #[inline]
    /// The kind of this namespace.
    pub fn kind(&self) -> NamespaceKind {
        self.kind
    }

    #[inline]
    /// The URI of this namespace.
    pub fn uri_str(&self) -> &str {
        &self.uri
    }

    #[inline]
    /// The display prefix, if one was declared.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Whether this is the public namespace.
    pub fn is_public(&self) -> bool {
        self.kind == NamespaceKind::Namespace && self.uri.is_empty()
    }

    /// This namespace with the prefix replaced.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Namespace {
            kind: self.kind,
            uri: self.uri.clone(),
            prefix: Some(prefix.into()),
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Namespace::public()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_ignored_in_equality() {
        let a = Namespace::prefixed("a", "u");
        let b = Namespace::prefixed("b", "u");
        assert_eq!(a, b);
    }

    #[test]
    fn test_kind_distinguishes() {
        let a = Namespace::new(NamespaceKind::Package, "p");
        let b = Namespace::new(NamespaceKind::PackageInternal, "p");
        assert_ne!(a, b);
    }

    #[test]
    fn test_public() {
        assert!(Namespace::public().is_public());
        assert!(!Namespace::uri("u").is_public());
    }
}
