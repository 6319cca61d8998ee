//! Buffer module: Core data structures for compositing and diffing.
//!
//! This module contains:
//! - [`Cell`]: The atomic unit of the grid, optimized for cache efficiency
//! - [`Canvas`]: A grid of cells one pass paints into
//! - [`Frame`], [`Line`], [`StyledSegment`]: The composited result
//! - [`Modifiers`]: Text style bitflags
//! - [`diff`]: Diffing engine producing terminal update operations

mod canvas;
mod cell;
pub mod diff;
mod frame;

pub use canvas::Canvas;
pub use cell::{Cell, CellFlags, Modifiers};
pub use diff::{diff, full_rewrite, redraw, DiffOp, DiffStrategy};
pub use frame::{Frame, Line, StyledSegment};
