/// A user intent that the viewer reacts to.
///
/// The viewer consumes actions, never raw input events, so the control
/// panel and keyboard shortcuts share one code path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the catalog shape with this id.
    SelectShape(&'static str),
    /// Flip auto-rotation on or off.
    ToggleAutoRotate,
    /// Flip between solid and wireframe rendering.
    ToggleWireframe,
    /// Input that isn't bound to anything.
    Noop,
}

impl Action {
    /// Select the catalog entry at `index` in display order.
    pub fn select_index(index: usize) -> Self {
        geoview_geometry::CATALOG
            .get(index)
            .map(|d| Action::SelectShape(d.id))
            .unwrap_or(Action::Noop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_index_follows_catalog_order() {
        assert_eq!(Action::select_index(0), Action::SelectShape("sphere"));
        assert_eq!(Action::select_index(5), Action::SelectShape("torusKnot"));
        assert_eq!(Action::select_index(7), Action::SelectShape("ring"));
    }

    #[test]
    fn out_of_range_index_is_noop() {
        assert_eq!(Action::select_index(8), Action::Noop);
    }

    #[test]
    fn toggles_are_distinct() {
        assert_ne!(Action::ToggleAutoRotate, Action::ToggleWireframe);
    }
}
