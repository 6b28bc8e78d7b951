//! Target extraction from makefiles.
//!
//! This is not a make interpreter: lines are recognized one at a time, a
//! target is whatever sits at the start of a line before a colon and an
//! include is a line starting with the `include` keyword. Variables,
//! conditionals and recipes are never evaluated.

pub mod line;
mod resolver;
mod target_list;

pub use resolver::{resolve, resolve_include_path, ResolveError, ResolveOptions, Resolver};
pub use target_list::TargetList;
