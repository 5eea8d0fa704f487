//! Field population and wait primitives
//!
//! This crate turns resolved fields into browser interactions:
//! - populate text, textarea, checkbox, radio and select controls idempotently
//! - wait for elements to become present, visible or clickable
//! - wait for server-side auto-fill and for jQuery AJAX to settle

pub mod errors;
mod primitives;
pub mod types;
mod waiting;

pub use errors::*;
pub use primitives::*;
pub use types::*;
pub use waiting::*;
