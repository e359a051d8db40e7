use crate::primitives;
use crate::surface::SurfaceGeometry;
use geoview_common::Rgb;

/// A selectable shape: display metadata plus a geometry constructor.
#[derive(Debug, Clone, Copy)]
pub struct ShapeDescriptor {
    /// Unique catalog key.
    pub id: &'static str,
    pub display_name: &'static str,
    /// Localized description, shown as hover text.
    pub description: &'static str,
    pub color: Rgb,
    pub factory: fn() -> SurfaceGeometry,
}

impl ShapeDescriptor {
    /// Build a fresh geometry for this shape.
    pub fn create(&self) -> SurfaceGeometry {
        (self.factory)()
    }
}

/// Errors from catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("shape not found: {0}")]
    NotFound(String),
}

/// Every selectable shape, in display order.
pub static CATALOG: [ShapeDescriptor; 8] = [
    ShapeDescriptor {
        id: "sphere",
        display_name: "Sphere",
        description: "Esfera",
        color: Rgb::from_hex(0xFF6B6B),
        factory: || primitives::sphere(1.0, 32, 16),
    },
    ShapeDescriptor {
        id: "plane",
        display_name: "Plane",
        description: "Plano",
        color: Rgb::from_hex(0x6BCB77),
        factory: || primitives::plane(2.0, 2.0),
    },
    ShapeDescriptor {
        id: "cone",
        display_name: "Cone",
        description: "Cono",
        color: Rgb::from_hex(0x4D96FF),
        factory: || primitives::cone(1.0, 2.0, 16),
    },
    ShapeDescriptor {
        id: "cylinder",
        display_name: "Cylinder",
        description: "Cilindro",
        color: Rgb::from_hex(0xFFD93D),
        factory: || primitives::cylinder(1.0, 1.0, 2.0, 16),
    },
    ShapeDescriptor {
        id: "torus",
        display_name: "Torus",
        description: "Toro",
        color: Rgb::from_hex(0xFF6EC7),
        factory: || primitives::torus(1.0, 0.3, 16, 64),
    },
    ShapeDescriptor {
        id: "torusKnot",
        display_name: "Torus Knot",
        description: "Nudo Toroidal",
        color: Rgb::from_hex(0x00C2CB),
        factory: || primitives::torus_knot(1.0, 0.3, 100, 16, 2, 3),
    },
    ShapeDescriptor {
        id: "circle",
        display_name: "Circle",
        description: "Círculo",
        color: Rgb::from_hex(0xFF914D),
        factory: || primitives::circle(1.0, 32),
    },
    ShapeDescriptor {
        id: "ring",
        display_name: "Ring",
        description: "Anillo",
        color: Rgb::from_hex(0xC04CFD),
        factory: || primitives::ring(0.5, 1.0, 32),
    },
];

/// Find a shape by id.
pub fn lookup(id: &str) -> Result<&'static ShapeDescriptor, CatalogError> {
    CATALOG
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))
}

/// Build fresh geometry for the shape with the given id.
pub fn create(id: &str) -> Result<SurfaceGeometry, CatalogError> {
    let descriptor = lookup(id)?;
    let geometry = descriptor.create();
    tracing::debug!(
        shape = id,
        vertices = geometry.vertex_count(),
        triangles = geometry.triangle_count(),
        "built geometry"
    );
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn ids_are_unique() {
        let ids: BTreeSet<_> = CATALOG.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn every_entry_builds_valid_geometry_with_its_color() {
        for d in &CATALOG {
            let found = lookup(d.id).unwrap();
            assert_eq!(found.color, d.color);
            let g = create(d.id).unwrap();
            assert!(!g.is_empty(), "{} produced no triangles", d.id);
            assert!(g.is_valid(), "{} produced invalid geometry", d.id);
        }
    }

    #[test]
    fn display_order_matches_table() {
        let order: Vec<_> = CATALOG.iter().map(|d| d.id).collect();
        assert_eq!(
            order,
            [
                "sphere",
                "plane",
                "cone",
                "cylinder",
                "torus",
                "torusKnot",
                "circle",
                "ring"
            ]
        );
    }

    #[test]
    fn unknown_id_is_not_found() {
        assert_eq!(
            lookup("dodecahedron").unwrap_err(),
            CatalogError::NotFound("dodecahedron".into())
        );
        assert!(create("").is_err());
    }

    #[test]
    fn factory_calls_are_independent() {
        let mut a = create("torus").unwrap();
        let b = create("torus").unwrap();
        a.positions.clear();
        assert_eq!(b.vertex_count(), 17 * 65);
    }

    #[test]
    fn sphere_color_matches_table() {
        assert_eq!(lookup("sphere").unwrap().color.to_string(), "#FF6B6B");
        assert_eq!(lookup("torusKnot").unwrap().display_name, "Torus Knot");
    }
}
