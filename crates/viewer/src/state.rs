use geoview_geometry::CatalogError;
use geoview_input::Action;
use geoview_persist::Preferences;

/// Shape shown when nothing else is requested.
pub const DEFAULT_SHAPE: &str = "sphere";

/// What an applied action changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    None,
    Shape,
    Wireframe,
    AutoRotate,
}

/// User-facing viewer state.
///
/// `active_shape_id` always names a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerState {
    active_shape_id: &'static str,
    wireframe_enabled: bool,
    auto_rotate_enabled: bool,
}

impl ViewerState {
    /// Build from persisted flags and a requested initial shape. An unknown
    /// shape falls back to [`DEFAULT_SHAPE`].
    pub fn new(prefs: Preferences, initial_shape: &str) -> Self {
        let active_shape_id = match geoview_geometry::lookup(initial_shape) {
            Ok(d) => d.id,
            Err(e) => {
                tracing::warn!("{e}, falling back to {DEFAULT_SHAPE}");
                DEFAULT_SHAPE
            }
        };
        Self {
            active_shape_id,
            wireframe_enabled: prefs.wireframe,
            auto_rotate_enabled: prefs.auto_rotate,
        }
    }

    pub fn active_shape_id(&self) -> &'static str {
        self.active_shape_id
    }

    pub fn wireframe_enabled(&self) -> bool {
        self.wireframe_enabled
    }

    pub fn auto_rotate_enabled(&self) -> bool {
        self.auto_rotate_enabled
    }

    /// The persisted subset of this state.
    pub fn preferences(&self) -> Preferences {
        Preferences {
            wireframe: self.wireframe_enabled,
            auto_rotate: self.auto_rotate_enabled,
        }
    }

    /// Apply an action. Selecting an unknown shape fails and leaves the state
    /// untouched; re-selecting the active shape changes nothing.
    pub fn apply(&mut self, action: &Action) -> Result<StateChange, CatalogError> {
        let change = match action {
            Action::SelectShape(id) => {
                let descriptor = geoview_geometry::lookup(id)?;
                if descriptor.id == self.active_shape_id {
                    StateChange::None
                } else {
                    self.active_shape_id = descriptor.id;
                    StateChange::Shape
                }
            }
            Action::ToggleWireframe => {
                self.wireframe_enabled = !self.wireframe_enabled;
                StateChange::Wireframe
            }
            Action::ToggleAutoRotate => {
                self.auto_rotate_enabled = !self.auto_rotate_enabled;
                StateChange::AutoRotate
            }
            Action::Noop => StateChange::None,
        };
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ViewerState {
        ViewerState::new(Preferences::default(), DEFAULT_SHAPE)
    }

    #[test]
    fn starts_from_preferences() {
        let s = ViewerState::new(
            Preferences {
                wireframe: true,
                auto_rotate: false,
            },
            "torus",
        );
        assert_eq!(s.active_shape_id(), "torus");
        assert!(s.wireframe_enabled());
        assert!(!s.auto_rotate_enabled());
    }

    #[test]
    fn unknown_initial_shape_falls_back() {
        let s = ViewerState::new(Preferences::default(), "teapot");
        assert_eq!(s.active_shape_id(), DEFAULT_SHAPE);
    }

    #[test]
    fn select_changes_shape_once() {
        let mut s = state();
        assert_eq!(s.apply(&Action::SelectShape("cone")), Ok(StateChange::Shape));
        assert_eq!(s.apply(&Action::SelectShape("cone")), Ok(StateChange::None));
        assert_eq!(s.active_shape_id(), "cone");
    }

    #[test]
    fn unknown_selection_leaves_state() {
        let mut s = state();
        let before = s.clone();
        assert!(s.apply(&Action::SelectShape("teapot")).is_err());
        assert_eq!(s, before);
    }

    #[test]
    fn toggles_flip_only_their_flag() {
        let mut s = state();
        assert_eq!(s.apply(&Action::ToggleWireframe), Ok(StateChange::Wireframe));
        assert!(s.wireframe_enabled());
        assert!(s.auto_rotate_enabled());
        assert_eq!(s.active_shape_id(), DEFAULT_SHAPE);

        assert_eq!(s.apply(&Action::ToggleAutoRotate), Ok(StateChange::AutoRotate));
        assert!(!s.auto_rotate_enabled());
        assert_eq!(
            s.preferences(),
            Preferences {
                wireframe: true,
                auto_rotate: false
            }
        );
    }

    #[test]
    fn noop_changes_nothing() {
        let mut s = state();
        assert_eq!(s.apply(&Action::Noop), Ok(StateChange::None));
    }
}
