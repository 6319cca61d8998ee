//! Terminal module: Escape sequence emission and the output writer.
//!
//! This module contains:
//! - [`sgr`]: Select Graphic Rendition sequences and paint tracking
//! - [`TerminalWriter`]: Buffered, relative-motion writer for diff operations

pub mod sgr;
mod output;

pub use output::TerminalWriter;
