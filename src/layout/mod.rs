//! Layout module: The boundary with the external flexbox solver.
//!
//! This crate never computes flex geometry. After the solver's pass, it reads
//! resolved geometry per node through the [`LayoutOracle`] trait, keyed by
//! [`NodeId`](crate::NodeId) so the node tree holds no back-references.

mod geometry;
mod rect;

pub use geometry::{Edges, Geometry, GeometryMap, LayoutOracle};
pub use rect::Rect;
