//! What the control panel shows, derived from [`ViewerState`].
//!
//! The panel holds no state of its own; hosts draw these models and feed
//! the attached action back into the viewer when clicked.

use crate::state::ViewerState;
use geoview_common::Rgb;
use geoview_input::Action;

/// One button per catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeButton {
    pub label: &'static str,
    pub tooltip: &'static str,
    pub color: Rgb,
    /// Highlighted because this is the shape on screen.
    pub active: bool,
    pub action: Action,
}

/// A two-state toggle button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleButton {
    pub label: &'static str,
    pub action: Action,
}

/// Shape selector buttons in catalog order.
pub fn shape_buttons(state: &ViewerState) -> Vec<ShapeButton> {
    geoview_geometry::CATALOG
        .iter()
        .map(|d| ShapeButton {
            label: d.display_name,
            tooltip: d.description,
            color: d.color,
            active: d.id == state.active_shape_id(),
            action: Action::SelectShape(d.id),
        })
        .collect()
}

pub fn rotate_toggle(state: &ViewerState) -> ToggleButton {
    ToggleButton {
        label: if state.auto_rotate_enabled() {
            "Pause Rotation"
        } else {
            "Resume Rotation"
        },
        action: Action::ToggleAutoRotate,
    }
}

/// Labelled with the mode a click switches to.
pub fn wireframe_toggle(state: &ViewerState) -> ToggleButton {
    ToggleButton {
        label: if state.wireframe_enabled() {
            "Solid"
        } else {
            "Wireframe"
        },
        action: Action::ToggleWireframe,
    }
}
