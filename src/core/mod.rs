//! Core data types: platforms, output layout, the pinned source.

pub mod errors;
pub mod layout;
pub mod platform;
pub mod source;

pub use errors::DistError;
pub use layout::DestinationLayout;
pub use platform::{Arch, Os, Platform, PlatformDescriptor};
pub use source::PinnedSource;
