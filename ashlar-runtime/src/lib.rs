//! The dynamic property-resolution core of an ActionScript 3 / AVM2 style
//! runtime.
//!
//! The centerpiece is the binding engine: given a receiver and a qualified
//! (or multi-namespace) name, resolve a get, set, call or construct against
//! the receiver's class trait table and dynamic slots, reporting the
//! outcome through the non-throwing [`bind::BindStatus`] algebra. Around it
//! sit the pieces that make binding efficient and correct: the runtime
//! scope stack for names bytecode could not resolve statically, lazily
//! built dispatch stubs that absorb argument coercion and boxing, and the
//! per-type-pair converter and per-mode comparer singletons.
//!
//! The parsers the core depends on live here too: the E4X XML parser, the
//! permissive English date parser and the ECMAScript number formatting and
//! parsing routines.

pub mod bind;
pub mod class;
pub mod compare;
pub mod convert;
pub mod datetime;
pub mod error;
mod library;
pub mod number;
mod runtime;
pub mod scope;
pub mod stub;
pub mod value;
pub mod xml;

pub use runtime::Runtime;

pub use ashlar_name::{Namespace, NamespaceKind, NamespaceSet, QName};
