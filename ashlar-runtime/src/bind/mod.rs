//! The binding engine: property get/set/call/construct resolution.
//!
//! All four operations report through [`BindStatus`]; the strictness
//! policy (whether a `NotFound` or `SoftSuccess` raises) belongs to the
//! host bytecode, not to this engine. The resolution walk lives in
//! `resolve.rs` as `impl Runtime` blocks.

mod resolve;
mod status;

pub use status::{BindOptions, BindResult, BindStatus};
