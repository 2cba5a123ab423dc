//! Key-press contract for the input surface.
//!
//! Enter without shift triggers a submit; Enter with shift is reserved
//! for multi-line intent and falls through to a literal newline. Both
//! presentation layers derive their bindings from this mapping so the
//! contract lives in one place.

/// Key identity as seen by the input surface. Only Enter is meaningful
/// to the session; every other key edits the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
}

/// A key press with its shift modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn enter(shift: bool) -> Self {
        Self {
            key: Key::Enter,
            shift,
        }
    }
}

/// What the input surface should do with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Trigger `submit()`.
    Submit,
    /// Insert a literal newline into the draft.
    InsertNewline,
    /// Let the key edit the draft as usual.
    Passthrough,
}

/// Pure input-to-action mapping with no additional state.
pub fn action_for(press: KeyPress) -> InputAction {
    match press.key {
        Key::Enter if !press.shift => InputAction::Submit,
        Key::Enter => InputAction::InsertNewline,
        Key::Char(_) => InputAction::Passthrough,
    }
}
