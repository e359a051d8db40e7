//! Parametric primitive generators.
//!
//! Each generator lays vertices out on a `(rows + 1) × (columns + 1)` grid so
//! seams carry duplicated vertices, then stitches quads into two triangles.
//! Winding is counter-clockwise when viewed from the outside.

use crate::surface::SurfaceGeometry;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// UV sphere centred at the origin with poles on the Y axis.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> SurfaceGeometry {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut g = SurfaceGeometry::new();
    let mut grid = Vec::with_capacity(hs as usize + 1);

    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        let mut row = Vec::with_capacity(ws as usize + 1);
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let p = Vec3::new(
                -radius * (u * TAU).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * TAU).sin() * (v * PI).sin(),
            );
            row.push(g.push_vertex(p, p.normalize_or_zero()));
        }
        grid.push(row);
    }

    for iy in 0..hs as usize {
        for ix in 0..ws as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            // Pole rows collapse to a single triangle per quad.
            if iy != 0 {
                g.push_triangle(a, b, d);
            }
            if iy != hs as usize - 1 {
                g.push_triangle(b, c, d);
            }
        }
    }
    g
}

/// Flat rectangle in the XY plane facing +Z.
pub fn plane(width: f32, height: f32) -> SurfaceGeometry {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let mut g = SurfaceGeometry::new();
    let n = Vec3::Z;
    // Row-major from the top edge down.
    let tl = g.push_vertex(Vec3::new(-hw, hh, 0.0), n);
    let tr = g.push_vertex(Vec3::new(hw, hh, 0.0), n);
    let bl = g.push_vertex(Vec3::new(-hw, -hh, 0.0), n);
    let br = g.push_vertex(Vec3::new(hw, -hh, 0.0), n);
    g.push_triangle(tl, bl, tr);
    g.push_triangle(bl, br, tr);
    g
}

/// Cone with its apex on +Y and a closed base.
pub fn cone(radius: f32, height: f32, radial_segments: u32) -> SurfaceGeometry {
    cylinder(0.0, radius, height, radial_segments)
}

/// Capped frustum along Y, centred at the origin.
///
/// A zero radius on either end collapses that ring to a point and skips
/// its cap.
pub fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> SurfaceGeometry {
    let rs = radial_segments.max(3);
    let half = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;
    let mut g = SurfaceGeometry::new();

    // Side wall: two rings, top (v = 0) and bottom (v = 1).
    let mut rings: [Vec<u32>; 2] = [Vec::new(), Vec::new()];
    for (row, ring) in rings.iter_mut().enumerate() {
        let radius = if row == 0 { radius_top } else { radius_bottom };
        let y = if row == 0 { half } else { -half };
        for x in 0..=rs {
            let theta = x as f32 / rs as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let normal = Vec3::new(sin, slope, cos).normalize();
            ring.push(g.push_vertex(Vec3::new(radius * sin, y, radius * cos), normal));
        }
    }
    for x in 0..rs as usize {
        let a = rings[0][x];
        let b = rings[1][x];
        let c = rings[1][x + 1];
        let d = rings[0][x + 1];
        if radius_top > 0.0 {
            g.push_triangle(a, b, d);
        }
        if radius_bottom > 0.0 {
            g.push_triangle(b, c, d);
        }
    }

    if radius_top > 0.0 {
        cap(&mut g, radius_top, half, rs, true);
    }
    if radius_bottom > 0.0 {
        cap(&mut g, radius_bottom, -half, rs, false);
    }
    g
}

fn cap(g: &mut SurfaceGeometry, radius: f32, y: f32, segments: u32, top: bool) {
    let normal = if top { Vec3::Y } else { Vec3::NEG_Y };
    let centers: Vec<u32> = (0..segments)
        .map(|_| g.push_vertex(Vec3::new(0.0, y, 0.0), normal))
        .collect();
    let rim: Vec<u32> = (0..=segments)
        .map(|x| {
            let theta = x as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            g.push_vertex(Vec3::new(radius * sin, y, radius * cos), normal)
        })
        .collect();
    for x in 0..segments as usize {
        if top {
            g.push_triangle(rim[x], rim[x + 1], centers[x]);
        } else {
            g.push_triangle(rim[x + 1], rim[x], centers[x]);
        }
    }
}

/// Torus in the XY plane around the Z axis.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> SurfaceGeometry {
    let rs = radial_segments.max(3);
    let ts = tubular_segments.max(3);
    let mut g = SurfaceGeometry::new();

    for j in 0..=rs {
        let v = j as f32 / rs as f32 * TAU;
        for i in 0..=ts {
            let u = i as f32 / ts as f32 * TAU;
            let p = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            g.push_vertex(p, (p - center).normalize_or_zero());
        }
    }

    let stride = ts + 1;
    for j in 1..=rs {
        for i in 1..=ts {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            g.push_triangle(a, b, d);
            g.push_triangle(b, c, d);
        }
    }
    g
}

/// Tube swept along a `(p, q)` torus knot.
pub fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> SurfaceGeometry {
    let ts = tubular_segments.max(3);
    let rs = radial_segments.max(3);
    let (p, q) = (p.max(1) as f32, q.max(1) as f32);
    let mut g = SurfaceGeometry::new();

    let knot = |u: f32| -> Vec3 {
        let qu_over_p = q / p * u;
        let cs = qu_over_p.cos();
        Vec3::new(
            radius * (2.0 + cs) * 0.5 * u.cos(),
            radius * (2.0 + cs) * 0.5 * u.sin(),
            radius * qu_over_p.sin() * 0.5,
        )
    };

    for i in 0..=ts {
        let u = i as f32 / ts as f32 * p * TAU;
        let p1 = knot(u);
        let p2 = knot(u + 0.01);
        // Frame from the finite-difference tangent.
        let t = p2 - p1;
        let mut n = p2 + p1;
        let b = t.cross(n).normalize();
        n = b.cross(t).normalize();

        for j in 0..=rs {
            let v = j as f32 / rs as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let vertex = p1 + n * cx + b * cy;
            g.push_vertex(vertex, (vertex - p1).normalize_or_zero());
        }
    }

    let stride = rs + 1;
    for j in 1..=ts {
        for i in 1..=rs {
            let a = stride * (j - 1) + (i - 1);
            let b = stride * j + (i - 1);
            let c = stride * j + i;
            let d = stride * (j - 1) + i;
            g.push_triangle(a, b, d);
            g.push_triangle(b, c, d);
        }
    }
    g
}

/// Filled disc in the XY plane facing +Z.
pub fn circle(radius: f32, segments: u32) -> SurfaceGeometry {
    let segments = segments.max(3);
    let mut g = SurfaceGeometry::new();
    let center = g.push_vertex(Vec3::ZERO, Vec3::Z);
    for s in 0..=segments {
        let theta = s as f32 / segments as f32 * TAU;
        g.push_vertex(Vec3::new(radius * theta.cos(), radius * theta.sin(), 0.0), Vec3::Z);
    }
    for i in 1..=segments {
        g.push_triangle(i, i + 1, center);
    }
    g
}

/// Flat annulus in the XY plane facing +Z.
pub fn ring(inner_radius: f32, outer_radius: f32, theta_segments: u32) -> SurfaceGeometry {
    let ts = theta_segments.max(3);
    let mut g = SurfaceGeometry::new();
    for radius in [inner_radius, outer_radius] {
        for i in 0..=ts {
            let theta = i as f32 / ts as f32 * TAU;
            g.push_vertex(
                Vec3::new(radius * theta.cos(), radius * theta.sin(), 0.0),
                Vec3::Z,
            );
        }
    }
    for i in 0..ts {
        let a = i;
        let b = i + ts + 1;
        let c = i + ts + 2;
        let d = i + 1;
        g.push_triangle(a, b, d);
        g.push_triangle(b, c, d);
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward(g: &SurfaceGeometry) {
        // Every triangle's geometric normal should agree with its vertex normals.
        for tri in g.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(g.positions[i as usize]));
            let face = (b - a).cross(c - a);
            if face.length_squared() < 1e-12 {
                continue;
            }
            let avg: Vec3 = [tri[0], tri[1], tri[2]]
                .iter()
                .map(|&i| Vec3::from_array(g.normals[i as usize]))
                .sum();
            assert!(face.dot(avg) > 0.0, "inward-facing triangle {tri:?}");
        }
    }

    #[test]
    fn sphere_counts_and_radius() {
        let g = sphere(1.0, 32, 16);
        assert_eq!(g.vertex_count(), 33 * 17);
        // Pole rows contribute one triangle per segment.
        assert_eq!(g.triangle_count(), 32 * 2 * 16 - 2 * 32);
        assert!(g.is_valid());
        for p in &g.positions {
            assert!((Vec3::from_array(*p).length() - 1.0).abs() < 1e-5);
        }
        assert_outward(&g);
    }

    #[test]
    fn plane_is_two_triangles() {
        let g = plane(2.0, 2.0);
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.triangle_count(), 2);
        let b = g.bounds().unwrap();
        assert_eq!(b.size(), Vec3::new(2.0, 2.0, 0.0));
        assert_outward(&g);
    }

    #[test]
    fn cylinder_has_wall_and_two_caps() {
        let g = cylinder(1.0, 1.0, 2.0, 16);
        assert_eq!(g.vertex_count(), 2 * 17 + 2 * (16 + 17));
        assert_eq!(g.triangle_count(), 2 * 16 + 2 * 16);
        let b = g.bounds().unwrap();
        assert!((b.max.y - 1.0).abs() < 1e-6);
        assert!((b.min.y + 1.0).abs() < 1e-6);
        assert_outward(&g);
    }

    #[test]
    fn cone_skips_apex_cap() {
        let g = cone(1.0, 2.0, 16);
        assert_eq!(g.vertex_count(), 2 * 17 + 16 + 17);
        assert_eq!(g.triangle_count(), 16 + 16);
        assert!(g.is_valid());
        assert_outward(&g);
    }

    #[test]
    fn torus_counts() {
        let g = torus(1.0, 0.3, 16, 64);
        assert_eq!(g.vertex_count(), 17 * 65);
        assert_eq!(g.triangle_count(), 16 * 64 * 2);
        let b = g.bounds().unwrap();
        assert!((b.max.x - 1.3).abs() < 1e-4);
        assert!((b.max.z - 0.3).abs() < 1e-4);
        assert_outward(&g);
    }

    #[test]
    fn torus_knot_counts() {
        let g = torus_knot(1.0, 0.3, 100, 16, 2, 3);
        assert_eq!(g.vertex_count(), 101 * 17);
        assert_eq!(g.triangle_count(), 100 * 16 * 2);
        assert!(g.is_valid());
    }

    #[test]
    fn circle_fans_from_center() {
        let g = circle(1.0, 32);
        assert_eq!(g.vertex_count(), 34);
        assert_eq!(g.triangle_count(), 32);
        assert!(g.indices.chunks_exact(3).all(|t| t[2] == 0));
        assert_outward(&g);
    }

    #[test]
    fn ring_leaves_a_hole() {
        let g = ring(0.5, 1.0, 32);
        assert_eq!(g.vertex_count(), 66);
        assert_eq!(g.triangle_count(), 64);
        for p in &g.positions {
            let r = Vec3::from_array(*p).length();
            assert!(r > 0.49 && r < 1.01);
        }
        assert_outward(&g);
    }

    #[test]
    fn degenerate_segment_counts_are_clamped() {
        assert!(sphere(1.0, 0, 0).is_valid());
        assert!(circle(1.0, 1).triangle_count() >= 3);
        assert!(ring(0.5, 1.0, 0).is_valid());
    }
}
