use crate::action::Action;

/// Map a typed character to its shortcut action.
///
/// `1`..`8` select catalog entries in display order, `r` toggles rotation and
/// `w` toggles wireframe. Case-insensitive; anything else is `Noop`.
pub fn action_for_key(key: char) -> Action {
    let action = match key.to_ascii_lowercase() {
        'r' => Action::ToggleAutoRotate,
        'w' => Action::ToggleWireframe,
        c @ '1'..='9' => Action::select_index(c as usize - '1' as usize),
        _ => Action::Noop,
    };
    if action != Action::Noop {
        tracing::debug!(%key, ?action, "shortcut");
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_select_shapes() {
        assert_eq!(action_for_key('1'), Action::SelectShape("sphere"));
        assert_eq!(action_for_key('8'), Action::SelectShape("ring"));
        assert_eq!(action_for_key('9'), Action::Noop);
    }

    #[test]
    fn letters_toggle() {
        assert_eq!(action_for_key('r'), Action::ToggleAutoRotate);
        assert_eq!(action_for_key('R'), Action::ToggleAutoRotate);
        assert_eq!(action_for_key('w'), Action::ToggleWireframe);
        assert_eq!(action_for_key('W'), Action::ToggleWireframe);
    }

    #[test]
    fn unbound_keys_are_noop() {
        for c in ['0', 'a', ' ', 'é'] {
            assert_eq!(action_for_key(c), Action::Noop);
        }
    }
}
