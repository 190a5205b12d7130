//! Symbolic key name to `enigo::Key` mapping.
//!
//! The browser-side client translates DOM key names into this
//! vocabulary before sending them (spec §1, "key-name pass-through");
//! this module is the synthesizer-side half of that contract. Single
//! Unicode characters (e.g. `"a"`, `"!"`, `"€"`) fall through to
//! [`enigo::Key::Unicode`] so ordinary typing doesn't need an entry
//! here.

use enigo::Key;

/// Resolve a symbolic key name to an `enigo` key.
///
/// Returns `None` for names this synthesizer doesn't recognize; callers
/// turn that into [`crate::InputError::UnknownKey`].
#[must_use]
pub fn lookup(name: &str) -> Option<Key> {
    let named = match name {
        "Enter" => Key::Return,
        "Tab" => Key::Tab,
        "Space" => Key::Space,
        "Backspace" => Key::Backspace,
        "Delete" => Key::Delete,
        "Escape" => Key::Escape,
        "Insert" => Key::Insert,
        "Home" => Key::Home,
        "End" => Key::End,
        "PageUp" => Key::PageUp,
        "PageDown" => Key::PageDown,
        "ArrowUp" => Key::UpArrow,
        "ArrowDown" => Key::DownArrow,
        "ArrowLeft" => Key::LeftArrow,
        "ArrowRight" => Key::RightArrow,
        "ControlLeft" | "ControlRight" | "Control" => Key::Control,
        "ShiftLeft" | "ShiftRight" | "Shift" => Key::Shift,
        "AltLeft" | "AltRight" | "Alt" => Key::Alt,
        "MetaLeft" | "MetaRight" | "Meta" => Key::Meta,
        "CapsLock" => Key::CapsLock,
        "NumLock" => Key::Numlock,
        "PrintScreen" => Key::Print,
        "ScrollLock" => Key::ScrollLock,
        "Pause" => Key::Pause,
        "F1" => Key::F1,
        "F2" => Key::F2,
        "F3" => Key::F3,
        "F4" => Key::F4,
        "F5" => Key::F5,
        "F6" => Key::F6,
        "F7" => Key::F7,
        "F8" => Key::F8,
        "F9" => Key::F9,
        "F10" => Key::F10,
        "F11" => Key::F11,
        "F12" => Key::F12,
        _ => return single_char_key(name),
    };
    Some(named)
}

fn single_char_key(name: &str) -> Option<Key> {
    let mut chars = name.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None; // multi-char names that aren't in the table above are unknown
    }
    Some(Key::Unicode(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys_resolve() {
        assert_eq!(lookup("Enter"), Some(Key::Return));
        assert_eq!(lookup("ArrowUp"), Some(Key::UpArrow));
        assert_eq!(lookup("F5"), Some(Key::F5));
    }

    #[test]
    fn single_characters_resolve_to_unicode() {
        assert_eq!(lookup("a"), Some(Key::Unicode('a')));
        assert_eq!(lookup("€"), Some(Key::Unicode('€')));
    }

    #[test]
    fn unknown_multi_char_name_is_none() {
        assert_eq!(lookup("NotAKey"), None);
    }
}
