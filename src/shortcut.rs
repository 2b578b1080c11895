//! Global shortcut chord for toggling simulated activity.
//!
//! The chord is Control+Option+J. Matching is kept platform-neutral here;
//! the platform event monitor converts raw key events into (modifiers,
//! keycode) pairs before asking.

/// ANSI keycode for the letter J.
pub const KEYCODE_J: u16 = 38;

/// A two-modifier + letter key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub control: bool,
    pub option: bool,
    pub keycode: u16,
}

/// The chord that toggles manual intent.
pub const TOGGLE_CHORD: KeyChord = KeyChord {
    control: true,
    option: true,
    keycode: KEYCODE_J,
};

impl KeyChord {
    /// True when the pressed modifiers contain the required ones and the key
    /// matches. Extra modifiers (e.g. Shift) do not prevent a match.
    pub fn matches(&self, control: bool, option: bool, keycode: u16) -> bool {
        (!self.control || control) && (!self.option || option) && keycode == self.keycode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_matches_required_modifiers() {
        assert!(TOGGLE_CHORD.matches(true, true, KEYCODE_J));
    }

    #[test]
    fn test_chord_rejects_missing_modifier() {
        assert!(!TOGGLE_CHORD.matches(true, false, KEYCODE_J));
        assert!(!TOGGLE_CHORD.matches(false, true, KEYCODE_J));
        assert!(!TOGGLE_CHORD.matches(false, false, KEYCODE_J));
    }

    #[test]
    fn test_chord_rejects_other_keys() {
        assert!(!TOGGLE_CHORD.matches(true, true, 0));
        assert!(!TOGGLE_CHORD.matches(true, true, 12));
    }
}
