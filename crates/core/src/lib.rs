//! Domain layer shared by the storage and application crates.
//!
//! Everything here is pure: entities arrive already loaded and the functions
//! only filter, sort and count them.

pub mod catalog;
pub mod errors;
pub mod popularity;
pub mod types;

pub use errors::ErrorCode;
