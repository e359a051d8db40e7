//! Viewer core: the state machine between user actions and the render backend.
//!
//! # Invariants
//! - At most one shape instance exists; the previous one is released before
//!   its replacement is created, and every instance is released exactly once.
//! - A failed release never blocks the replacement.
//! - Rotation advances by a fixed step per displayed frame, not per unit time.
//! - Teardown runs once per session on every exit path.
//!
//! Everything here is single-threaded and driven by the host's event loop.

pub mod panel;
pub mod render_loop;
pub mod session;
pub mod slot;
pub mod state;
pub mod viewer;

pub use render_loop::{ROTATION_STEP_X, ROTATION_STEP_Y, RenderLoop};
pub use session::ViewportSession;
pub use slot::{ActiveShapeSlot, ShapeInstance};
pub use state::{DEFAULT_SHAPE, StateChange, ViewerState};
pub use viewer::Viewer;

use geoview_geometry::CatalogError;
use geoview_render::BackendError;

/// Errors surfaced by viewer operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
