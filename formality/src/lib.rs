//! A front end for the surface syntax of Formality.
//!
//! Source text is parsed into [core terms][core::Term], with variables
//! resolved to de Bruijn indices. Files of top-level definitions are read with
//! [`parse_defs`], which also records the exact text that was read in a
//! companion file.

pub mod core;
pub mod env;
pub mod reporting;
pub mod source;
pub mod surface;

mod driver;

// Public exports
pub use driver::{Driver, Status};
pub use surface::parse_defs;
