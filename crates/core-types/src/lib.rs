//! Shared model for the formfill workspace.
//!
//! Everything here is plain data: how a field is located, what kind of control
//! it is, how payload values map onto radio options, and the counters a fill
//! pass reports at the end.

mod field;
mod locator;
mod stats;
mod value;

pub use field::*;
pub use locator::*;
pub use stats::*;
pub use value::*;
