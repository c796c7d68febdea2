//! Input/output helpers.
//!
//! - rendered HTML exports (`export`)

pub mod export;
