//! Shared types and utilities for the geoview viewer.

pub mod types;

pub use types::{Rgb, Rotation, ViewportSize};
