//! Configuration module for HTML to Markdown conversion
//!
//! This module provides the `ConversionOptions` struct and its builder
//! for configuring the Markdown dialect emitted by the converter.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::ConversionOptionsBuilder;
pub use types::{BrStyle, BulletListMarker, ConversionOptions, DEFAULT_LIST_INDENT_WIDTH};
