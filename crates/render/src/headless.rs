use crate::backend::{
    BackendError, GeometryHandle, MaterialDesc, MaterialHandle, NodeId, RenderBackend,
};
use crate::camera::Camera;
use crate::scene::SceneEnvironment;
use geoview_common::{Rotation, ViewportSize};
use geoview_geometry::SurfaceGeometry;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct GeometryRecord {
    vertices: usize,
    triangles: usize,
}

#[derive(Debug, Clone, Copy)]
struct NodeRecord {
    geometry: GeometryHandle,
    material: MaterialHandle,
    rotation: Rotation,
}

/// Backend that keeps bookkeeping only.
///
/// Tracks live resources and creation counts so callers can prove that
/// nothing leaks and nothing is released twice. Disposal can be made to
/// fail on demand to exercise best-effort cleanup paths.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    geometries: BTreeMap<GeometryHandle, GeometryRecord>,
    materials: BTreeMap<MaterialHandle, MaterialDesc>,
    nodes: BTreeMap<NodeId, NodeRecord>,
    next_id: u64,
    environment: Option<SceneEnvironment>,
    size: Option<ViewportSize>,
    geometries_created: u64,
    materials_created: u64,
    frames_rendered: u64,
    last_frame_nodes: usize,
    release_count: u32,
    reject_disposal: bool,
    reject_allocation: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `dispose_*` call fail and leave the resource live.
    pub fn reject_disposal(&mut self, reject: bool) {
        self.reject_disposal = reject;
    }

    /// Make every subsequent `create_geometry` call fail.
    pub fn reject_allocation(&mut self, reject: bool) {
        self.reject_allocation = reject;
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn scene_len(&self) -> usize {
        self.nodes.len()
    }

    /// Geometries plus materials plus scene nodes still held.
    pub fn live_resources(&self) -> usize {
        self.geometries.len() + self.materials.len() + self.nodes.len()
    }

    pub fn geometries_created(&self) -> u64 {
        self.geometries_created
    }

    pub fn materials_created(&self) -> u64 {
        self.materials_created
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Number of scene nodes drawn by the most recent frame.
    pub fn last_frame_nodes(&self) -> usize {
        self.last_frame_nodes
    }

    pub fn release_count(&self) -> u32 {
        self.release_count
    }

    pub fn is_released(&self) -> bool {
        self.release_count > 0
    }

    pub fn size(&self) -> Option<ViewportSize> {
        self.size
    }

    pub fn environment(&self) -> Option<&SceneEnvironment> {
        self.environment.as_ref()
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&MaterialDesc> {
        self.materials.get(&handle)
    }

    pub fn node_rotation(&self, node: NodeId) -> Option<Rotation> {
        self.nodes.get(&node).map(|n| n.rotation)
    }

    /// Vertex and triangle counts of an uploaded geometry.
    pub fn geometry_counts(&self, handle: GeometryHandle) -> Option<(usize, usize)> {
        self.geometries
            .get(&handle)
            .map(|g| (g.vertices, g.triangles))
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_live(&self) -> Result<(), BackendError> {
        if self.is_released() {
            return Err(BackendError::Released);
        }
        Ok(())
    }

    fn check_dispose(&self, what: &str) -> Result<(), BackendError> {
        if self.reject_disposal {
            tracing::warn!("headless backend rejecting {what} disposal");
            return Err(BackendError::DisposeRejected(what.to_string()));
        }
        Ok(())
    }
}

impl RenderBackend for HeadlessBackend {
    type Target = ();

    fn configure_scene(&mut self, env: &SceneEnvironment) -> Result<(), BackendError> {
        self.ensure_live()?;
        self.environment = Some(*env);
        Ok(())
    }

    fn create_geometry(&mut self, geometry: &SurfaceGeometry) -> Result<GeometryHandle, BackendError> {
        self.ensure_live()?;
        if !geometry.is_valid() {
            return Err(BackendError::InvalidGeometry("inconsistent vertex data".into()));
        }
        if self.reject_allocation {
            return Err(BackendError::Allocation("geometry".into()));
        }
        let handle = GeometryHandle(self.next());
        self.geometries.insert(
            handle,
            GeometryRecord {
                vertices: geometry.vertex_count(),
                triangles: geometry.triangle_count(),
            },
        );
        self.geometries_created += 1;
        tracing::debug!(?handle, vertices = geometry.vertex_count(), "headless geometry created");
        Ok(handle)
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle, BackendError> {
        self.ensure_live()?;
        let handle = MaterialHandle(self.next());
        self.materials.insert(handle, *desc);
        self.materials_created += 1;
        Ok(handle)
    }

    fn update_material(&mut self, handle: MaterialHandle, desc: &MaterialDesc) -> Result<(), BackendError> {
        let slot = self
            .materials
            .get_mut(&handle)
            .ok_or(BackendError::UnknownMaterial(handle))?;
        *slot = *desc;
        Ok(())
    }

    fn add_to_scene(&mut self, geometry: GeometryHandle, material: MaterialHandle) -> Result<NodeId, BackendError> {
        self.ensure_live()?;
        if !self.geometries.contains_key(&geometry) {
            return Err(BackendError::UnknownGeometry(geometry));
        }
        if !self.materials.contains_key(&material) {
            return Err(BackendError::UnknownMaterial(material));
        }
        let node = NodeId(self.next());
        self.nodes.insert(
            node,
            NodeRecord {
                geometry,
                material,
                rotation: Rotation::ZERO,
            },
        );
        Ok(node)
    }

    fn set_node_rotation(&mut self, node: NodeId, rotation: Rotation) -> Result<(), BackendError> {
        let record = self
            .nodes
            .get_mut(&node)
            .ok_or(BackendError::UnknownNode(node))?;
        record.rotation = rotation;
        Ok(())
    }

    fn remove_from_scene(&mut self, node: NodeId) -> Result<(), BackendError> {
        self.nodes
            .remove(&node)
            .map(|_| ())
            .ok_or(BackendError::UnknownNode(node))
    }

    fn dispose_geometry(&mut self, handle: GeometryHandle) -> Result<(), BackendError> {
        if !self.geometries.contains_key(&handle) {
            return Err(BackendError::UnknownGeometry(handle));
        }
        self.check_dispose("geometry")?;
        self.geometries.remove(&handle);
        Ok(())
    }

    fn dispose_material(&mut self, handle: MaterialHandle) -> Result<(), BackendError> {
        if !self.materials.contains_key(&handle) {
            return Err(BackendError::UnknownMaterial(handle));
        }
        self.check_dispose("material")?;
        self.materials.remove(&handle);
        Ok(())
    }

    fn resize(&mut self, size: ViewportSize) {
        self.size = Some(size);
    }

    fn render_frame(&mut self, _target: &(), _camera: &Camera) -> Result<(), BackendError> {
        self.ensure_live()?;
        // Only nodes whose resources are still live get drawn.
        self.last_frame_nodes = self
            .nodes
            .values()
            .filter(|n| {
                self.geometries.contains_key(&n.geometry) && self.materials.contains_key(&n.material)
            })
            .count();
        self.frames_rendered += 1;
        Ok(())
    }

    fn release(&mut self) {
        if self.is_released() {
            return;
        }
        self.nodes.clear();
        self.geometries.clear();
        self.materials.clear();
        self.environment = None;
        self.release_count += 1;
        tracing::debug!(frames = self.frames_rendered, "headless backend released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoview_common::Rgb;

    fn material() -> MaterialDesc {
        MaterialDesc {
            color: Rgb::from_hex(0xFF6B6B),
            wireframe: false,
        }
    }

    #[test]
    fn tracks_resource_lifecycle() {
        let mut backend = HeadlessBackend::new();
        let g = backend
            .create_geometry(&geoview_geometry::create("sphere").unwrap())
            .unwrap();
        let m = backend.create_material(&material()).unwrap();
        let n = backend.add_to_scene(g, m).unwrap();
        assert_eq!(backend.live_resources(), 3);
        assert_eq!(backend.geometry_counts(g), Some((561, 960)));

        backend.remove_from_scene(n).unwrap();
        backend.dispose_geometry(g).unwrap();
        backend.dispose_material(m).unwrap();
        assert_eq!(backend.live_resources(), 0);
    }

    #[test]
    fn double_dispose_is_an_error() {
        let mut backend = HeadlessBackend::new();
        let m = backend.create_material(&material()).unwrap();
        backend.dispose_material(m).unwrap();
        assert_eq!(
            backend.dispose_material(m),
            Err(BackendError::UnknownMaterial(m))
        );
    }

    #[test]
    fn rejected_disposal_keeps_resource() {
        let mut backend = HeadlessBackend::new();
        let m = backend.create_material(&material()).unwrap();
        backend.reject_disposal(true);
        assert!(matches!(
            backend.dispose_material(m),
            Err(BackendError::DisposeRejected(_))
        ));
        assert_eq!(backend.live_materials(), 1);
    }

    #[test]
    fn empty_scene_renders() {
        let mut backend = HeadlessBackend::new();
        backend.configure_scene(&SceneEnvironment::default()).unwrap();
        backend.render_frame(&(), &Camera::default()).unwrap();
        assert_eq!(backend.frames_rendered(), 1);
        assert_eq!(backend.last_frame_nodes(), 0);
    }

    #[test]
    fn release_is_idempotent_and_final() {
        let mut backend = HeadlessBackend::new();
        backend.create_material(&material()).unwrap();
        backend.release();
        backend.release();
        assert_eq!(backend.release_count(), 1);
        assert_eq!(backend.live_resources(), 0);
        assert_eq!(
            backend.render_frame(&(), &Camera::default()),
            Err(BackendError::Released)
        );
    }

    #[test]
    fn rejected_allocation_creates_nothing() {
        let mut backend = HeadlessBackend::new();
        backend.reject_allocation(true);
        let sphere = geoview_geometry::create("sphere").unwrap();
        assert_eq!(
            backend.create_geometry(&sphere),
            Err(BackendError::Allocation("geometry".into()))
        );
        assert_eq!(backend.live_geometries(), 0);

        backend.reject_allocation(false);
        assert!(backend.create_geometry(&sphere).is_ok());
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let mut backend = HeadlessBackend::new();
        let mut g = SurfaceGeometry::new();
        g.indices = vec![0, 1, 2];
        assert!(backend.create_geometry(&g).is_err());
        assert_eq!(backend.geometries_created(), 0);
    }
}
