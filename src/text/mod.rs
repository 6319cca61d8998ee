//! Text module: Everything between a text subtree and painted glyphs.
//!
//! This module contains:
//! - [`ansi`]: Escape sequence tokenizing, stripping and SGR interpretation
//! - [`measure`] and [`wrap_or_truncate`]: Pure measuring and shaping
//! - [`MeasurementCache`], [`SquashCache`] and [`TextCache`]: Memoization
//! - [`squash`]: Flattening a text subtree into one string

pub mod ansi;
mod cache;
mod measure;
mod squash;

pub use ansi::{line_width, strip_ansi};
pub use cache::{CacheStats, MeasurementCache, SquashCache, TextCache};
pub use measure::{measure, wrap_or_truncate, Size, ELLIPSIS};
pub use squash::squash;
