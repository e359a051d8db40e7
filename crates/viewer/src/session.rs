use crate::ViewerError;
use crate::slot::ActiveShapeSlot;
use geoview_common::ViewportSize;
use geoview_render::{BackendError, Camera, RenderBackend, SceneEnvironment};

/// Owns the backend, camera, scene environment and the active shape for the
/// lifetime of one mounted viewer.
///
/// Teardown runs exactly once: explicitly via [`ViewportSession::teardown`]
/// or, failing that, on drop.
pub struct ViewportSession<B: RenderBackend> {
    backend: B,
    camera: Camera,
    environment: SceneEnvironment,
    slot: ActiveShapeSlot,
    size: ViewportSize,
    torn_down: bool,
}

impl<B: RenderBackend> ViewportSession<B> {
    /// Set up camera, lights and decorations on `backend`.
    pub fn initialize(backend: B, initial_size: ViewportSize) -> Result<Self, ViewerError> {
        Self::with_environment(backend, initial_size, SceneEnvironment::default())
    }

    pub fn with_environment(
        mut backend: B,
        initial_size: ViewportSize,
        environment: SceneEnvironment,
    ) -> Result<Self, ViewerError> {
        let size = initial_size.sanitized();
        if size != initial_size {
            tracing::debug!(?initial_size, ?size, "mount point has no size, using fallback");
        }
        backend.resize(size);
        if let Err(e) = backend.configure_scene(&environment) {
            backend.release();
            return Err(e.into());
        }
        tracing::debug!(width = size.width, height = size.height, "viewport session initialized");
        Ok(Self {
            backend,
            camera: Camera::new(size),
            environment,
            slot: ActiveShapeSlot::new(),
            size,
            torn_down: false,
        })
    }

    /// Track a new surface size. Unchanged sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        let size = ViewportSize::new(width, height).sanitized();
        if size == self.size || self.torn_down {
            return;
        }
        self.size = size;
        self.camera.set_viewport(size);
        self.backend.resize(size);
        tracing::debug!(width = size.width, height = size.height, "viewport resized");
    }

    /// Draw the scene from the camera. An empty slot draws decorations only.
    pub fn render_frame(&mut self, target: &B::Target) -> Result<(), ViewerError> {
        self.ensure_live()?;
        if let Some(instance) = self.slot.instance() {
            self.backend
                .set_node_rotation(instance.node(), instance.rotation)?;
        }
        self.backend.render_frame(target, &self.camera)?;
        Ok(())
    }

    /// Show catalog entry `id`, replacing the current shape.
    pub fn set_active(&mut self, id: &str, wireframe: bool) -> Result<(), ViewerError> {
        self.ensure_live()?;
        self.slot.set_active(&mut self.backend, id, wireframe)
    }

    pub fn set_wireframe(&mut self, enabled: bool) -> Result<(), ViewerError> {
        self.ensure_live()?;
        self.slot.set_wireframe(&mut self.backend, enabled)
    }

    pub fn advance_rotation(&mut self, dx: f32, dy: f32) -> bool {
        self.slot.advance_rotation(dx, dy)
    }

    /// Release the active shape and every backend resource. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.slot.clear(&mut self.backend);
        self.backend.release();
        self.torn_down = true;
        tracing::debug!("viewport session torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn environment(&self) -> &SceneEnvironment {
        &self.environment
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn slot(&self) -> &ActiveShapeSlot {
        &self.slot
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn ensure_live(&self) -> Result<(), ViewerError> {
        if self.torn_down {
            return Err(BackendError::Released.into());
        }
        Ok(())
    }
}

impl<B: RenderBackend> Drop for ViewportSession<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoview_common::Rotation;
    use geoview_render::{GeometryHandle, HeadlessBackend, MaterialDesc, MaterialHandle, NodeId};
    use std::cell::Cell;
    use std::rc::Rc;

    fn session() -> ViewportSession<HeadlessBackend> {
        ViewportSession::initialize(HeadlessBackend::new(), ViewportSize::new(1280, 720)).unwrap()
    }

    #[test]
    fn initialize_configures_backend() {
        let s = session();
        assert_eq!(s.backend().size(), Some(ViewportSize::new(1280, 720)));
        assert!(s.backend().environment().is_some());
        assert!((s.camera().aspect() - 1280.0 / 720.0).abs() < 1e-6);
        assert_eq!(s.camera().fov_degrees, 75.0);
        assert!(s.slot().is_empty());
    }

    #[test]
    fn zero_mount_size_uses_fallback() {
        let s = ViewportSession::initialize(HeadlessBackend::new(), ViewportSize::new(0, 0)).unwrap();
        assert_eq!(s.size(), ViewportSize::FALLBACK);
        assert!((s.camera().aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn resize_to_zero_keeps_aspect_finite() {
        let mut s = session();
        s.resize(0, 400);
        assert!(s.camera().aspect().is_finite() && s.camera().aspect() > 0.0);
        s.resize(640, 0);
        assert!(s.camera().aspect().is_finite() && s.camera().aspect() > 0.0);
        assert_eq!(s.backend().size(), Some(ViewportSize::new(640, 600)));
    }

    #[test]
    fn resize_is_idempotent() {
        let mut s = session();
        s.resize(1024, 768);
        let aspect = s.camera().aspect();
        s.resize(1024, 768);
        assert_eq!(s.camera().aspect(), aspect);
        assert_eq!(s.size(), ViewportSize::new(1024, 768));
    }

    #[test]
    fn renders_empty_scene() {
        let mut s = session();
        s.render_frame(&()).unwrap();
        assert_eq!(s.backend().frames_rendered(), 1);
        assert_eq!(s.backend().last_frame_nodes(), 0);
    }

    #[test]
    fn render_pushes_rotation_to_backend() {
        let mut s = session();
        s.set_active("sphere", false).unwrap();
        s.advance_rotation(0.2, 0.3);
        s.render_frame(&()).unwrap();
        let node = s.slot().instance().unwrap().node();
        assert_eq!(
            s.backend().node_rotation(node),
            Some(Rotation { x: 0.2, y: 0.3 })
        );
        assert_eq!(s.backend().last_frame_nodes(), 1);
    }

    #[test]
    fn teardown_releases_everything_once() {
        let mut s = session();
        s.set_active("torus", false).unwrap();
        s.teardown();
        s.teardown();
        assert!(s.is_torn_down());
        assert_eq!(s.backend().release_count(), 1);
        assert_eq!(s.backend().live_resources(), 0);
        assert!(s.slot().is_empty());
    }

    /// Headless backend that reports releases and disposals through shared
    /// counters, so they can be observed after the session is gone.
    struct CountingBackend {
        inner: HeadlessBackend,
        releases: Rc<Cell<u32>>,
        disposals: Rc<Cell<u32>>,
    }

    impl RenderBackend for CountingBackend {
        type Target = ();

        fn configure_scene(&mut self, env: &SceneEnvironment) -> Result<(), BackendError> {
            self.inner.configure_scene(env)
        }

        fn create_geometry(
            &mut self,
            geometry: &geoview_geometry::SurfaceGeometry,
        ) -> Result<GeometryHandle, BackendError> {
            self.inner.create_geometry(geometry)
        }

        fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle, BackendError> {
            self.inner.create_material(desc)
        }

        fn update_material(
            &mut self,
            handle: MaterialHandle,
            desc: &MaterialDesc,
        ) -> Result<(), BackendError> {
            self.inner.update_material(handle, desc)
        }

        fn add_to_scene(
            &mut self,
            geometry: GeometryHandle,
            material: MaterialHandle,
        ) -> Result<NodeId, BackendError> {
            self.inner.add_to_scene(geometry, material)
        }

        fn set_node_rotation(&mut self, node: NodeId, rotation: Rotation) -> Result<(), BackendError> {
            self.inner.set_node_rotation(node, rotation)
        }

        fn remove_from_scene(&mut self, node: NodeId) -> Result<(), BackendError> {
            self.inner.remove_from_scene(node)
        }

        fn dispose_geometry(&mut self, handle: GeometryHandle) -> Result<(), BackendError> {
            self.disposals.set(self.disposals.get() + 1);
            self.inner.dispose_geometry(handle)
        }

        fn dispose_material(&mut self, handle: MaterialHandle) -> Result<(), BackendError> {
            self.inner.dispose_material(handle)
        }

        fn resize(&mut self, size: ViewportSize) {
            self.inner.resize(size);
        }

        fn render_frame(&mut self, target: &(), camera: &Camera) -> Result<(), BackendError> {
            self.inner.render_frame(target, camera)
        }

        fn release(&mut self) {
            if !self.inner.is_released() {
                self.releases.set(self.releases.get() + 1);
            }
            self.inner.release();
        }
    }

    #[test]
    fn drop_tears_down_live_session_once() {
        let releases = Rc::new(Cell::new(0));
        let disposals = Rc::new(Cell::new(0));
        {
            let backend = CountingBackend {
                inner: HeadlessBackend::new(),
                releases: releases.clone(),
                disposals: disposals.clone(),
            };
            let mut s = ViewportSession::initialize(backend, ViewportSize::new(800, 600)).unwrap();
            s.set_active("sphere", false).unwrap();
            s.render_frame(&()).unwrap();
            assert_eq!(releases.get(), 0);
        }
        assert_eq!(releases.get(), 1);
        assert_eq!(disposals.get(), 1);
    }

    #[test]
    fn drop_after_teardown_releases_nothing_more() {
        let releases = Rc::new(Cell::new(0));
        let disposals = Rc::new(Cell::new(0));
        {
            let backend = CountingBackend {
                inner: HeadlessBackend::new(),
                releases: releases.clone(),
                disposals: disposals.clone(),
            };
            let mut s = ViewportSession::initialize(backend, ViewportSize::new(800, 600)).unwrap();
            s.set_active("ring", true).unwrap();
            s.teardown();
        }
        assert_eq!(releases.get(), 1);
        assert_eq!(disposals.get(), 1);
    }

    #[test]
    fn operations_after_teardown_fail_cleanly() {
        let mut s = session();
        s.teardown();
        assert_eq!(
            s.set_active("sphere", false),
            Err(ViewerError::Backend(BackendError::Released))
        );
        assert!(s.render_frame(&()).is_err());
        s.resize(10, 10);
        assert_eq!(s.size(), ViewportSize::new(1280, 720));
    }
}
