//! Wire protocol, frame differ, and the shared [`Image`] type.
//!
//! This crate has no I/O: every function here is pure or operates only
//! on in-memory buffers, so the session state machine in `webrd-server`
//! can unit-test protocol behavior without a real display, encoder, or
//! network socket.

pub mod codec;
pub mod differ;
pub mod error;
pub mod image;
pub mod input_event;

pub use codec::{decode_client, decode_server, encode_client, encode_server, ClientPacket, FrameResponse, ServerPacket};
pub use differ::{diff, FrameDiff};
pub use error::ProtocolError;
pub use image::{Image, Rect};
pub use input_event::{decode_batch, encode_batch, InputEvent, MouseButton};
