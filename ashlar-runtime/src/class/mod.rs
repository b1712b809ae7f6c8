//! Classes, traits and the global type registry.
//!
//! A class owns an ordered trait table keyed by qualified name; traits
//! point back at their declaring class by id, and the registry owns every
//! class for the life of the process.

mod builder;
mod class_core;
mod metadata;
mod registry;
mod traits;

pub use builder::ClassBuilder;
pub use class_core::{Class, ClassId, TraitTable};
pub use metadata::{value_needs_escape, MetadataTag, MetadataTagCollection};
pub use registry::ClassRegistry;
pub use traits::{FieldInfo, MethodInfo, ParamInfo, Trait, TraitKind};
