//! CLI command implementations.

pub mod convert;
pub mod geo;
pub mod migrate;
pub mod seo;
