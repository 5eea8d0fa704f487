//! Field resolution.
//!
//! A field is looked up either by its payload key, trying each strategy of a
//! [`LookupOrder`](formfill_core_types::LookupOrder) in turn, or through a
//! static [`FieldDescriptor`](formfill_core_types::FieldDescriptor) whose
//! locator and kind are already known. In both cases the first visible match
//! wins and absence is a value, not an error.

pub mod errors;
pub mod resolver;
pub mod strategies;
pub mod types;

pub use errors::*;
pub use resolver::*;
pub use strategies::*;
pub use types::*;
