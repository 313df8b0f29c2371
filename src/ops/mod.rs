//! High-level operations.

pub mod dist_build;
pub mod prepare;
pub mod prune;

pub use dist_build::{dist_build, plan, DistOptions, DistResult, DistTools};
pub use go_test::go_test;
