//! Geometry Catalog: surface data for the selectable primitives.
//!
//! # Invariants
//! - Catalog ids are unique; the table order is the display order.
//! - Every factory call produces fresh, independent geometry.
//! - Generated geometry is an indexed triangle list with one normal per vertex.

pub mod catalog;
pub mod primitives;
pub mod surface;

pub use catalog::{CATALOG, CatalogError, ShapeDescriptor, create, lookup};
pub use surface::{Bounds, SurfaceGeometry};
