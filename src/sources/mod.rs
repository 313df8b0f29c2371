//! Source archive retrieval.

pub mod tarball;

pub use tarball::{Fetch, HttpFetcher};
