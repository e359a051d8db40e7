use crate::camera::Camera;
use crate::scene::SceneEnvironment;
use geoview_common::{Rgb, Rotation, ViewportSize};
use geoview_geometry::SurfaceGeometry;

/// Handle to geometry uploaded to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHandle(pub u64);

/// Handle to a material owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub u64);

/// A mesh placed in the backend's scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Lit surface material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialDesc {
    pub color: Rgb,
    /// Draw triangle edges instead of filled triangles.
    pub wireframe: bool,
}

/// Errors reported by a render backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("unknown geometry handle {0:?}")]
    UnknownGeometry(GeometryHandle),
    #[error("unknown material handle {0:?}")]
    UnknownMaterial(MaterialHandle),
    #[error("unknown scene node {0:?}")]
    UnknownNode(NodeId),
    #[error("geometry rejected: {0}")]
    InvalidGeometry(String),
    #[error("failed to allocate {0}")]
    Allocation(String),
    #[error("backend refused to release resource: {0}")]
    DisposeRejected(String),
    #[error("backend has been released")]
    Released,
    #[error("surface error: {0}")]
    Surface(String),
}

/// Capabilities the viewer needs from a rendering backend.
///
/// Resources are created and released explicitly. The viewer guarantees it
/// removes a node before disposing the geometry and material it references.
pub trait RenderBackend {
    /// What a frame is drawn into.
    type Target: ?Sized;

    /// Install background, lights and ground decorations. May be called again
    /// to replace them.
    fn configure_scene(&mut self, env: &SceneEnvironment) -> Result<(), BackendError>;

    fn create_geometry(&mut self, geometry: &SurfaceGeometry) -> Result<GeometryHandle, BackendError>;

    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle, BackendError>;

    /// Change a material in place; geometry that uses it is not touched.
    fn update_material(&mut self, handle: MaterialHandle, desc: &MaterialDesc) -> Result<(), BackendError>;

    fn add_to_scene(&mut self, geometry: GeometryHandle, material: MaterialHandle) -> Result<NodeId, BackendError>;

    fn set_node_rotation(&mut self, node: NodeId, rotation: Rotation) -> Result<(), BackendError>;

    fn remove_from_scene(&mut self, node: NodeId) -> Result<(), BackendError>;

    fn dispose_geometry(&mut self, handle: GeometryHandle) -> Result<(), BackendError>;

    fn dispose_material(&mut self, handle: MaterialHandle) -> Result<(), BackendError>;

    /// Resize backing attachments. `size` is already sanitized.
    fn resize(&mut self, size: ViewportSize);

    fn render_frame(&mut self, target: &Self::Target, camera: &Camera) -> Result<(), BackendError>;

    /// Release every owned resource. Further calls are no-ops.
    fn release(&mut self);
}
