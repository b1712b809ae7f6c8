use strum_macros::Display;

use crate::value::Any;

/// The outcome of a property operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BindStatus {
    /// The operation completed; out-values are populated.
    Success,
    /// Found-as-undefined on a dynamic object: strict bytecode treats
    /// this as not-found, lenient bytecode does not.
    SoftSuccess,
    /// No trait or dynamic slot matched.
    NotFound,
    /// The name resolved to more than one trait across the namespace set.
    Ambiguous,
    /// A set on a read-only member.
    FailedReadOnly,
    /// A get on a write-only accessor.
    FailedWriteOnly,
    /// A call on a non-callable member.
    FailedNotFunction,
    /// A construct on a non-constructible member.
    FailedNotConstructor,
    /// A set whose value the declared type rejects.
    FailedAssignType,
}

impl BindStatus {
    /// Whether the operation produced a value.
    pub fn is_found(self) -> bool {
        matches!(self, BindStatus::Success | BindStatus::SoftSuccess)
    }

    /// Whether this is one of the kind-specific failures.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            BindStatus::FailedReadOnly
                | BindStatus::FailedWriteOnly
                | BindStatus::FailedNotFunction
                | BindStatus::FailedNotConstructor
                | BindStatus::FailedAssignType
        )
    }
}

/// A status paired with the out-value of a get/call/construct.
#[derive(Debug, Clone, PartialEq)]
pub struct BindResult {
    /// The outcome.
    pub status: BindStatus,
    /// The resolved value, when the status carries one.
    pub value: Option<Any>,
}

impl BindResult {
    pub(crate) fn found(value: Any) -> Self {
        BindResult {
            status: BindStatus::Success,
            value: Some(value),
        }
    }

    pub(crate) fn soft(value: Any) -> Self {
        BindResult {
            status: BindStatus::SoftSuccess,
            value: Some(value),
        }
    }

    pub(crate) fn status(status: BindStatus) -> Self {
        BindResult {
            status,
            value: None,
        }
    }

    /// The value, discarding the status.
    pub fn into_value(self) -> Option<Any> {
        self.value
    }
}

/// Which categories a lookup searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOptions {
    /// Search the class trait tables.
    pub traits: bool,
    /// Search the dynamic property bag.
    pub dynamic: bool,
    /// Search XML attributes instead of regular properties.
    pub attributes: bool,
}

impl BindOptions {
    /// Trait and dynamic-slot search; the default for scope frames.
    pub const SEARCH_TRAITS: BindOptions = BindOptions {
        traits: true,
        dynamic: true,
        attributes: false,
    };

    /// Attribute search on XML objects.
    pub const ATTRIBUTES: BindOptions = BindOptions {
        traits: false,
        dynamic: false,
        attributes: true,
    };
}

impl Default for BindOptions {
    fn default() -> Self {
        BindOptions::SEARCH_TRAITS
    }
}
