//! # Flexframe
//!
//! An inline terminal compositor and incremental diff engine for
//! flex-laid-out box trees.
//!
//! Flexframe sits between a reconciliation layer that builds a node tree and
//! an external flexbox solver that places it. Each pass paints the tree into
//! a virtual frame of styled lines, diffs it against the previous frame and
//! writes the difference to the terminal in a single flush.
//!
//! ## Core Concepts
//!
//! - **Layout oracle**: Geometry comes from the solver through [`LayoutOracle`]
//! - **Text squashing**: Nested text spans flatten into one styled string
//! - **Static prefix**: Rows painted once and never revisited, like log output
//! - **Line and run diffing**: Whole-row rewrites or minimal cell runs
//!
//! ## Example
//!
//! ```rust
//! use flexframe::{Geometry, GeometryMap, Node, NodeId, Renderer, RendererConfig};
//!
//! let tree = Node::root(NodeId(0)).child(Node::text_with(NodeId(1), "Hello"));
//! let layout = GeometryMap::new()
//!     .with(NodeId(0), Geometry::new(0, 0, 20, 1))
//!     .with(NodeId(1), Geometry::new(0, 0, 5, 1));
//!
//! let mut renderer = Renderer::new(Vec::new(), RendererConfig::default().with_incremental(true));
//! renderer.render(&tree, &layout).unwrap();
//! assert_eq!(renderer.frame().plain_lines(), vec!["Hello"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod buffer;
pub mod compositor;
pub mod config;
pub mod error;
pub mod layout;
pub mod node;
pub mod renderer;
pub mod style;
pub mod terminal;
pub mod text;

// Re-exports for convenience
pub use buffer::{diff, full_rewrite, Canvas, Cell, DiffOp, DiffStrategy, Frame, Line, Modifiers, StyledSegment};
pub use compositor::{Composition, Compositor};
pub use config::{IncrementalConfig, RendererConfig};
pub use error::{RenderError, Result};
pub use layout::{Edges, Geometry, GeometryMap, LayoutOracle, Rect};
pub use node::{BoxError, Node, NodeId, NodeKind, Transform};
pub use renderer::{Pass, RenderStats, Renderer};
pub use style::{colorize, resolve, BorderStyle, Color, ColorTarget, Display, Overflow, PaintSpec, Style, TextWrap};
pub use text::{measure, squash, strip_ansi, wrap_or_truncate, MeasurementCache, Size, SquashCache, TextCache};
