use serde_json::Value;

use crate::error::ProtocolError;

/// Mouse button identifiers as sent on the wire (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    fn from_wire(n: i64) -> Option<Self> {
        match n {
            1 => Some(Self::Left),
            2 => Some(Self::Middle),
            3 => Some(Self::Right),
            _ => None,
        }
    }

    fn to_wire(self) -> i64 {
        match self {
            Self::Left => 1,
            Self::Middle => 2,
            Self::Right => 3,
        }
    }
}

/// A single decoded input event, already validated against its schema.
///
/// The wire format is a positional JSON array `[event_type, ...]`; this
/// type replaces the per-type arity with named fields checked once at
/// decode time, per the "tagged variant" re-architecture (design notes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    MouseMove { x: i32, y: i32 },
    MouseDown { x: i32, y: i32, button: MouseButton },
    MouseUp { x: i32, y: i32, button: MouseButton },
    MouseScroll { x: i32, y: i32, dy: i32 },
    KeyDown { keycode: String },
    KeyUp { keycode: String },
}

const TAG_MOUSE_MOVE: i64 = 0;
const TAG_MOUSE_DOWN: i64 = 1;
const TAG_MOUSE_UP: i64 = 2;
const TAG_MOUSE_SCROLL: i64 = 3;
const TAG_KEY_DOWN: i64 = 4;
const TAG_KEY_UP: i64 = 5;

fn as_i64(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
}

impl InputEvent {
    /// Decode one positional JSON record into a typed event.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::BadEventArity`] if the record's shape
    /// (length or field types) doesn't match its declared `event_type`,
    /// or if `event_type` itself is unrecognized.
    pub fn from_json_record(value: &Value) -> Result<Self, ProtocolError> {
        let array = value.as_array().ok_or(ProtocolError::BadEventArity)?;
        let tag = array.first().and_then(as_i64).ok_or(ProtocolError::BadEventArity)?;

        let int_at = |i: usize| -> Option<i32> { array.get(i).and_then(as_i64).map(|n| n as i32) };
        let str_at = |i: usize| -> Option<String> {
            array.get(i).and_then(Value::as_str).map(str::to_owned)
        };

        match tag {
            TAG_MOUSE_MOVE if array.len() == 3 => {
                let (x, y) = (int_at(1), int_at(2));
                match (x, y) {
                    (Some(x), Some(y)) => Ok(Self::MouseMove { x, y }),
                    _ => Err(ProtocolError::BadEventArity),
                }
            }
            TAG_MOUSE_DOWN if array.len() == 4 => {
                let (x, y, button) = (int_at(1), int_at(2), array.get(3).and_then(as_i64));
                match (x, y, button.and_then(MouseButton::from_wire)) {
                    (Some(x), Some(y), Some(button)) => Ok(Self::MouseDown { x, y, button }),
                    _ => Err(ProtocolError::BadEventArity),
                }
            }
            TAG_MOUSE_UP if array.len() == 4 => {
                let (x, y, button) = (int_at(1), int_at(2), array.get(3).and_then(as_i64));
                match (x, y, button.and_then(MouseButton::from_wire)) {
                    (Some(x), Some(y), Some(button)) => Ok(Self::MouseUp { x, y, button }),
                    _ => Err(ProtocolError::BadEventArity),
                }
            }
            TAG_MOUSE_SCROLL if array.len() == 4 => {
                let (x, y, dy) = (int_at(1), int_at(2), int_at(3));
                match (x, y, dy) {
                    (Some(x), Some(y), Some(dy)) => Ok(Self::MouseScroll { x, y, dy }),
                    _ => Err(ProtocolError::BadEventArity),
                }
            }
            TAG_KEY_DOWN if array.len() == 2 => {
                str_at(1).map(|keycode| Self::KeyDown { keycode }).ok_or(ProtocolError::BadEventArity)
            }
            TAG_KEY_UP if array.len() == 2 => {
                str_at(1).map(|keycode| Self::KeyUp { keycode }).ok_or(ProtocolError::BadEventArity)
            }
            _ => Err(ProtocolError::BadEventArity),
        }
    }

    /// Encode a typed event back into its positional JSON record.
    #[must_use]
    pub fn to_json_record(&self) -> Value {
        match self {
            Self::MouseMove { x, y } => Value::from(vec![
                Value::from(TAG_MOUSE_MOVE),
                Value::from(*x),
                Value::from(*y),
            ]),
            Self::MouseDown { x, y, button } => Value::from(vec![
                Value::from(TAG_MOUSE_DOWN),
                Value::from(*x),
                Value::from(*y),
                Value::from(button.to_wire()),
            ]),
            Self::MouseUp { x, y, button } => Value::from(vec![
                Value::from(TAG_MOUSE_UP),
                Value::from(*x),
                Value::from(*y),
                Value::from(button.to_wire()),
            ]),
            Self::MouseScroll { x, y, dy } => Value::from(vec![
                Value::from(TAG_MOUSE_SCROLL),
                Value::from(*x),
                Value::from(*y),
                Value::from(*dy),
            ]),
            Self::KeyDown { keycode } => {
                Value::from(vec![Value::from(TAG_KEY_DOWN), Value::from(keycode.clone())])
            }
            Self::KeyUp { keycode } => {
                Value::from(vec![Value::from(TAG_KEY_UP), Value::from(keycode.clone())])
            }
        }
    }
}

/// Decode a whole input-request payload (a JSON array of records).
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidJson`] if `bytes` isn't a JSON array,
/// or the first event-level error encountered while decoding records.
pub fn decode_batch(bytes: &[u8]) -> Result<Vec<InputEvent>, ProtocolError> {
    let raw: Vec<Value> = serde_json::from_slice(bytes).map_err(|_| ProtocolError::InvalidJson)?;
    raw.iter().map(InputEvent::from_json_record).collect()
}

/// Encode a batch of events back into the wire's JSON array payload.
#[must_use]
pub fn encode_batch(events: &[InputEvent]) -> Vec<u8> {
    let records: Vec<Value> = events.iter().map(InputEvent::to_json_record).collect();
    serde_json::to_vec(&Value::Array(records)).expect("JSON array of records always serializes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_move_round_trips() {
        let events = vec![InputEvent::MouseMove { x: 12, y: -3 }];
        let bytes = encode_batch(&events);
        assert_eq!(decode_batch(&bytes).unwrap(), events);
    }

    #[test]
    fn full_batch_round_trips() {
        let events = vec![
            InputEvent::MouseMove { x: 1, y: 2 },
            InputEvent::MouseDown { x: 1, y: 2, button: MouseButton::Left },
            InputEvent::MouseUp { x: 1, y: 2, button: MouseButton::Right },
            InputEvent::MouseScroll { x: 1, y: 2, dy: -3 },
            InputEvent::KeyDown { keycode: "Enter".into() },
            InputEvent::KeyUp { keycode: "Enter".into() },
        ];
        let bytes = encode_batch(&events);
        assert_eq!(decode_batch(&bytes).unwrap(), events);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let bytes = b"[[1, 5, 6]]"; // MOUSE_DOWN needs 4 fields, got 3
        assert_eq!(decode_batch(bytes), Err(ProtocolError::BadEventArity));
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let bytes = b"[[99, 0, 0]]";
        assert_eq!(decode_batch(bytes), Err(ProtocolError::BadEventArity));
    }

    #[test]
    fn non_json_is_rejected() {
        assert_eq!(decode_batch(b"not json"), Err(ProtocolError::InvalidJson));
    }

    #[test]
    fn unknown_button_is_rejected() {
        let bytes = b"[[1, 5, 6, 9]]"; // button 9 is not in {1,2,3}
        assert_eq!(decode_batch(bytes), Err(ProtocolError::BadEventArity));
    }
}
