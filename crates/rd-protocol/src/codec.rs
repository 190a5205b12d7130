use crate::error::ProtocolError;
use crate::input_event::{decode_batch, encode_batch, InputEvent};

const TAG_LOGIN: u8 = 0x00;
const TAG_FRAME_REQUEST: u8 = 0x01;
const TAG_FRAME_RESPONSE: u8 = 0x02;
const TAG_INPUT_REQUEST: u8 = 0x03;
const TAG_AUTH_FAILURE: u8 = 0x04;

const FRAME_TYPE_EMPTY: u8 = 0x00;
const FRAME_TYPE_FULL: u8 = 0x01;
const FRAME_TYPE_PARTIAL: u8 = 0x02;

/// A packet sent by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientPacket {
    /// First message on a session; carries the shared-secret password.
    Login { password: String },
    FrameRequest { width: u16, height: u16, quality: u8 },
    InputRequest { events: Vec<InputEvent> },
}

/// A frame-response payload, matching `frame_type` in spec §4.1.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameResponse {
    Empty { width: u16, height: u16 },
    Full { width: u16, height: u16, jpeg: Vec<u8> },
    Partial { width: u16, height: u16, x: u16, y: u16, jpeg: Vec<u8> },
}

/// A packet sent by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerPacket {
    FrameResponse(FrameResponse),
    AuthFailure,
}

/// Decode one inbound message into a [`ClientPacket`].
///
/// # Errors
///
/// Returns [`ProtocolError`] if the tag is unrecognized or the payload
/// doesn't match the tag's schema (spec §4.1).
pub fn decode_client(bytes: &[u8]) -> Result<ClientPacket, ProtocolError> {
    let (&tag, payload) = bytes.split_first().ok_or(ProtocolError::MalformedPayload)?;

    match tag {
        TAG_LOGIN => decode_login(payload),
        TAG_FRAME_REQUEST => decode_frame_request(payload),
        TAG_INPUT_REQUEST => Ok(ClientPacket::InputRequest {
            events: decode_batch(payload)?,
        }),
        other => Err(ProtocolError::UnknownTag(other)),
    }
}

fn decode_login(payload: &[u8]) -> Result<ClientPacket, ProtocolError> {
    if payload.len() < 2 {
        return Err(ProtocolError::MalformedPayload);
    }
    let len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    let rest = &payload[2..];
    if rest.len() != len {
        return Err(ProtocolError::MalformedPayload);
    }
    let password = String::from_utf8(rest.to_vec()).map_err(|_| ProtocolError::MalformedPayload)?;
    Ok(ClientPacket::Login { password })
}

fn decode_frame_request(payload: &[u8]) -> Result<ClientPacket, ProtocolError> {
    if payload.len() != 5 {
        return Err(ProtocolError::BadFrameRequestLength(payload.len()));
    }
    let width = u16::from_be_bytes([payload[0], payload[1]]);
    let height = u16::from_be_bytes([payload[2], payload[3]]);
    let quality = payload[4];
    if quality == 0 {
        return Err(ProtocolError::ZeroQuality);
    }
    Ok(ClientPacket::FrameRequest { width, height, quality })
}

/// Encode an outbound [`ClientPacket`] (used by tests and any future
/// client-side tooling sharing this codec).
#[must_use]
pub fn encode_client(packet: &ClientPacket) -> Vec<u8> {
    match packet {
        ClientPacket::Login { password } => {
            let mut out = vec![TAG_LOGIN];
            let bytes = password.as_bytes();
            out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            out.extend_from_slice(bytes);
            out
        }
        ClientPacket::FrameRequest { width, height, quality } => {
            let mut out = vec![TAG_FRAME_REQUEST];
            out.extend_from_slice(&width.to_be_bytes());
            out.extend_from_slice(&height.to_be_bytes());
            out.push(*quality);
            out
        }
        ClientPacket::InputRequest { events } => {
            let mut out = vec![TAG_INPUT_REQUEST];
            out.extend_from_slice(&encode_batch(events));
            out
        }
    }
}

/// Encode an outbound [`ServerPacket`] into wire bytes (spec §4.1).
#[must_use]
pub fn encode_server(packet: &ServerPacket) -> Vec<u8> {
    match packet {
        ServerPacket::AuthFailure => vec![TAG_AUTH_FAILURE],
        ServerPacket::FrameResponse(response) => {
            let mut out = vec![TAG_FRAME_RESPONSE];
            match response {
                FrameResponse::Empty { width, height } => {
                    out.push(FRAME_TYPE_EMPTY);
                    out.extend_from_slice(&width.to_be_bytes());
                    out.extend_from_slice(&height.to_be_bytes());
                }
                FrameResponse::Full { width, height, jpeg } => {
                    out.push(FRAME_TYPE_FULL);
                    out.extend_from_slice(&width.to_be_bytes());
                    out.extend_from_slice(&height.to_be_bytes());
                    out.extend_from_slice(jpeg);
                }
                FrameResponse::Partial { width, height, x, y, jpeg } => {
                    out.push(FRAME_TYPE_PARTIAL);
                    out.extend_from_slice(&width.to_be_bytes());
                    out.extend_from_slice(&height.to_be_bytes());
                    out.extend_from_slice(&x.to_be_bytes());
                    out.extend_from_slice(&y.to_be_bytes());
                    out.extend_from_slice(jpeg);
                }
            }
            out
        }
    }
}

/// Decode an inbound message into a [`ServerPacket`] (used by tests that
/// exercise the codec from the client's point of view).
///
/// # Errors
///
/// Returns [`ProtocolError`] if the tag or payload is malformed.
pub fn decode_server(bytes: &[u8]) -> Result<ServerPacket, ProtocolError> {
    let (&tag, payload) = bytes.split_first().ok_or(ProtocolError::MalformedPayload)?;
    match tag {
        TAG_AUTH_FAILURE => Ok(ServerPacket::AuthFailure),
        TAG_FRAME_RESPONSE => decode_frame_response(payload).map(ServerPacket::FrameResponse),
        other => Err(ProtocolError::UnknownTag(other)),
    }
}

fn decode_frame_response(payload: &[u8]) -> Result<FrameResponse, ProtocolError> {
    if payload.len() < 5 {
        return Err(ProtocolError::MalformedPayload);
    }
    let frame_type = payload[0];
    let width = u16::from_be_bytes([payload[1], payload[2]]);
    let height = u16::from_be_bytes([payload[3], payload[4]]);
    let rest = &payload[5..];

    match frame_type {
        FRAME_TYPE_EMPTY => Ok(FrameResponse::Empty { width, height }),
        FRAME_TYPE_FULL => Ok(FrameResponse::Full {
            width,
            height,
            jpeg: rest.to_vec(),
        }),
        FRAME_TYPE_PARTIAL => {
            if rest.len() < 4 {
                return Err(ProtocolError::MalformedPayload);
            }
            let x = u16::from_be_bytes([rest[0], rest[1]]);
            let y = u16::from_be_bytes([rest[2], rest[3]]);
            Ok(FrameResponse::Partial {
                width,
                height,
                x,
                y,
                jpeg: rest[4..].to_vec(),
            })
        }
        _ => Err(ProtocolError::MalformedPayload),
    }
}
