//! Rendering Adapter: renderer-agnostic backend contract.
//!
//! # Invariants
//! - Backends own every GPU-side resource; callers only hold handles.
//! - A handle is disposed at most once; disposing an unknown handle is an error.
//! - `render_frame` tolerates an empty scene (background and decorations only).
//!
//! The [`HeadlessBackend`] keeps no GPU state and records resource churn,
//! which makes it the probe for leak checks in tests and the CLI.

mod backend;
mod camera;
mod headless;
mod scene;

pub use backend::{BackendError, GeometryHandle, MaterialDesc, MaterialHandle, NodeId, RenderBackend};
pub use camera::Camera;
pub use headless::HeadlessBackend;
pub use scene::{AxesSpec, DirectionalLight, GridSpec, Light, LightRig, SceneEnvironment};
