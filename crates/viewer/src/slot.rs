use crate::ViewerError;
use geoview_common::Rotation;
use geoview_render::{GeometryHandle, MaterialDesc, MaterialHandle, NodeId, RenderBackend};

/// The shape currently on screen and the backend resources it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInstance {
    shape_id: &'static str,
    geometry: GeometryHandle,
    material: MaterialHandle,
    node: NodeId,
    material_state: MaterialDesc,
    pub rotation: Rotation,
}

impl ShapeInstance {
    pub fn shape_id(&self) -> &'static str {
        self.shape_id
    }

    pub fn geometry(&self) -> GeometryHandle {
        self.geometry
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn material_state(&self) -> MaterialDesc {
        self.material_state
    }
}

/// Holds zero or one [`ShapeInstance`].
///
/// Taking the instance out of the slot before releasing it guarantees each
/// instance is released exactly once.
#[derive(Debug, Default)]
pub struct ActiveShapeSlot {
    instance: Option<ShapeInstance>,
}

impl ActiveShapeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instance(&self) -> Option<&ShapeInstance> {
        self.instance.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.instance.is_none()
    }

    /// Replace the current shape with catalog entry `id`.
    ///
    /// Unknown ids fail before anything is touched. The old instance is
    /// removed and released first; release failures are logged and the new
    /// instance is inserted regardless.
    pub fn set_active<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        id: &str,
        wireframe: bool,
    ) -> Result<(), ViewerError> {
        let descriptor = geoview_geometry::lookup(id)?;
        self.clear(backend);

        let surface = descriptor.create();
        let material_state = MaterialDesc {
            color: descriptor.color,
            wireframe,
        };

        let geometry = backend.create_geometry(&surface)?;
        let material = match backend.create_material(&material_state) {
            Ok(m) => m,
            Err(e) => {
                discard(backend.dispose_geometry(geometry), "geometry");
                return Err(e.into());
            }
        };
        let node = match backend.add_to_scene(geometry, material) {
            Ok(n) => n,
            Err(e) => {
                discard(backend.dispose_geometry(geometry), "geometry");
                discard(backend.dispose_material(material), "material");
                return Err(e.into());
            }
        };

        tracing::debug!(
            shape = descriptor.id,
            ?geometry,
            ?material,
            ?node,
            "shape instance created"
        );
        self.instance = Some(ShapeInstance {
            shape_id: descriptor.id,
            geometry,
            material,
            node,
            material_state,
            rotation: Rotation::ZERO,
        });
        Ok(())
    }

    /// Flip the material's wireframe flag in place. No-op when empty.
    pub fn set_wireframe<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        enabled: bool,
    ) -> Result<(), ViewerError> {
        let Some(instance) = self.instance.as_mut() else {
            return Ok(());
        };
        if instance.material_state.wireframe == enabled {
            return Ok(());
        }
        let desc = MaterialDesc {
            wireframe: enabled,
            ..instance.material_state
        };
        backend.update_material(instance.material, &desc)?;
        instance.material_state = desc;
        Ok(())
    }

    /// Add to the current instance's rotation. Returns `false` when empty.
    pub fn advance_rotation(&mut self, dx: f32, dy: f32) -> bool {
        match self.instance.as_mut() {
            Some(instance) => {
                instance.rotation.advance(dx, dy);
                true
            }
            None => false,
        }
    }

    /// Remove and release the current instance, if any.
    pub fn clear<B: RenderBackend>(&mut self, backend: &mut B) -> bool {
        let Some(instance) = self.instance.take() else {
            return false;
        };
        discard(backend.remove_from_scene(instance.node), "scene node");
        discard(backend.dispose_geometry(instance.geometry), "geometry");
        discard(backend.dispose_material(instance.material), "material");
        tracing::debug!(shape = instance.shape_id, "shape instance released");
        true
    }
}

fn discard(result: Result<(), geoview_render::BackendError>, what: &str) {
    if let Err(e) = result {
        tracing::warn!("failed to release {what}: {e}");
    }
}
