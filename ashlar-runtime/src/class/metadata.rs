use std::fmt;

/// Whether a metadata value must be quoted when rendered: anything other
/// than letters, digits and underscores needs the escaped form.
pub fn value_needs_escape(value: &str) -> bool {
    value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A metadata tag: a name and ordered key-value entries.
///
/// Keys may repeat; a key of `None` denotes a positional value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTag {
    name: String,
    entries: Vec<(Option<String>, String)>,
}

impl MetadataTag {
    /// A tag with no entries.
    pub fn new(name: &str) -> Self {
        MetadataTag {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    /// Append a keyed entry.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.entries
            .push((Some(key.to_string()), value.to_string()));
        self
    }

    /// Append a positional entry.
    pub fn with_positional(mut self, value: &str) -> Self {
        self.entries.push((None, value.to_string()));
        self
    }

    /// The tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All entries, in declaration order.
    pub fn entries(&self) -> &[(Option<String>, String)] {
        &self.entries
    }

    /// The first value stored under the given key.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_deref() == Some(key))
            .map(|(_, v)| v.as_str())
    }

    /// The positional values, in order.
    pub fn positional(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(k, _)| k.is_none())
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for MetadataTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.name)?;
        if !self.entries.is_empty() {
            write!(f, "(")?;
            for (i, (key, value)) in self.entries.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                if let Some(key) = key {
                    write!(f, "{}=", key)?;
                }
                if value_needs_escape(value) {
                    write!(f, "\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
                } else {
                    write!(f, "{}", value)?;
                }
            }
            write!(f, ")")?;
        }
        write!(f, "]")
    }
}

/// An ordered collection of metadata tags; lookup returns the first match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTagCollection {
    tags: Vec<MetadataTag>,
}

impl MetadataTagCollection {
    /// An empty collection.
    pub fn new() -> Self {
        MetadataTagCollection::default()
    }

    /// Append a tag.
    pub fn push(&mut self, tag: MetadataTag) {
        self.tags.push(tag);
    }

    /// The first tag with the given name.
    pub fn get(&self, name: &str) -> Option<&MetadataTag> {
        self.tags.iter().find(|tag| tag.name() == name)
    }

    /// All tags, in order.
    pub fn iter(&self) -> std::slice::Iter<'_, MetadataTag> {
        self.tags.iter()
    }

    /// Whether the collection holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<MetadataTag> for MetadataTagCollection {
    fn from_iter<I: IntoIterator<Item = MetadataTag>>(iter: I) -> Self {
        MetadataTagCollection {
            tags: iter.into_iter().collect(),
        }
    }
}
