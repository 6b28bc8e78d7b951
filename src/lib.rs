//! List the targets declared in makefiles, following `include` directives.

pub mod cli;
pub mod listing;
pub mod makefile;
