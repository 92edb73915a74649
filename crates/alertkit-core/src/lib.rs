#![forbid(unsafe_code)]

//! Core primitives for alertkit: geometry, colors, and the retained view tree
//! that overlays are built from.

pub mod color;
pub mod geometry;
pub mod view;

pub use color::Rgba;
pub use geometry::{Point, Rect, Size, non_negative};
pub use view::{AutoresizingMask, Layer, Shadow, View, ViewId, WeakView};
