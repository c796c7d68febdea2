//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - normalized records (`Course`, `Teacher`, `TeacherIndex`)
//! - render inputs (`ResolvedCourse`, `RenderGroup`, `RenderMode`)
//! - field-key and category configuration (`FieldMap`, `TeacherFieldMap`, `CategorySpec`)

pub mod types;

pub use types::*;
