//! Command implementations.
//!
//! - [`build`] - compile every input into every format
//! - [`list`] - show inputs and output paths without building
//!
//! Each command exposes an `execute` function taking its parsed arguments.

pub mod build;
pub mod list;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use list::execute as list_execute;
