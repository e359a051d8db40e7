//! wgpu render backend for the geoview viewer.
//!
//! Draws scene nodes with a lit pipeline (or a line pipeline over the
//! triangle edges when the material is wireframe), plus the ground grid and
//! axis indicator as a coloured line list.
//!
//! # Invariants
//! - Every buffer the backend creates is destroyed on dispose or release.
//! - The depth attachment always matches the last size passed to `resize`.

mod gpu;
mod shaders;

pub use gpu::WgpuBackend;
