use geoview_common::Rgb;
use glam::Vec3;

/// Uniform light with no direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Rgb,
    pub intensity: f32,
}

/// Light shining from `position` towards the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface towards the light.
    pub fn direction(&self) -> Vec3 {
        self.position.try_normalize().unwrap_or(Vec3::Y)
    }
}

/// One ambient plus one directional light, shared by every shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient: Light,
    pub directional: DirectionalLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: Light {
                color: Rgb::WHITE,
                intensity: 0.35,
            },
            directional: DirectionalLight {
                color: Rgb::WHITE,
                intensity: 0.9,
                position: Vec3::new(5.0, 5.0, 5.0),
            },
        }
    }
}

/// Square ground grid in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub size: f32,
    pub divisions: u32,
    pub center_color: Rgb,
    pub line_color: Rgb,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            size: 10.0,
            divisions: 10,
            center_color: Rgb::from_hex(0x444444),
            line_color: Rgb::from_hex(0x222222),
        }
    }
}

impl GridSpec {
    /// Line-list vertices: pairs of endpoints with their colour.
    pub fn line_vertices(&self) -> Vec<(Vec3, Rgb)> {
        let divisions = self.divisions.max(1);
        let step = self.size / divisions as f32;
        let half = self.size / 2.0;
        let center = divisions / 2;
        let mut verts = Vec::with_capacity((divisions as usize + 1) * 4);
        for i in 0..=divisions {
            let k = -half + i as f32 * step;
            let color = if i == center {
                self.center_color
            } else {
                self.line_color
            };
            // Lines along X
            verts.push((Vec3::new(-half, 0.0, k), color));
            verts.push((Vec3::new(half, 0.0, k), color));
            // Lines along Z
            verts.push((Vec3::new(k, 0.0, -half), color));
            verts.push((Vec3::new(k, 0.0, half), color));
        }
        verts
    }
}

/// Axis indicator: red X, green Y, blue Z from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesSpec {
    pub length: f32,
}

impl Default for AxesSpec {
    fn default() -> Self {
        Self { length: 2.0 }
    }
}

impl AxesSpec {
    pub fn line_vertices(&self) -> Vec<(Vec3, Rgb)> {
        let l = self.length;
        let red = Rgb::from_hex(0xFF0000);
        let green = Rgb::from_hex(0x00FF00);
        let blue = Rgb::from_hex(0x0000FF);
        vec![
            (Vec3::ZERO, red),
            (Vec3::new(l, 0.0, 0.0), red),
            (Vec3::ZERO, green),
            (Vec3::new(0.0, l, 0.0), green),
            (Vec3::ZERO, blue),
            (Vec3::new(0.0, 0.0, l), blue),
        ]
    }
}

/// Everything drawn besides the active shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneEnvironment {
    pub background: Rgb,
    pub lights: LightRig,
    pub grid: Option<GridSpec>,
    pub axes: Option<AxesSpec>,
}

impl Default for SceneEnvironment {
    fn default() -> Self {
        Self {
            background: Rgb::from_hex(0x0A0A0A),
            lights: LightRig::default(),
            grid: Some(GridSpec::default()),
            axes: Some(AxesSpec::default()),
        }
    }
}

impl SceneEnvironment {
    /// Grid and axis line vertices combined.
    pub fn decoration_lines(&self) -> Vec<(Vec3, Rgb)> {
        let mut lines = Vec::new();
        if let Some(grid) = &self.grid {
            lines.extend(grid.line_vertices());
        }
        if let Some(axes) = &self.axes {
            lines.extend(axes.line_vertices());
        }
        lines
    }
}
