//! CLI command implementations.

pub mod common;
pub mod inspect;
pub mod resolve;
pub mod sort;
pub mod version;
