//! Result reporting
//!
//! - [`text`]: console report
//! - [`json`]: JSON document, printed or written to a file
//! - [`csv`]: one row per box

pub mod csv;
pub mod json;
pub mod text;
