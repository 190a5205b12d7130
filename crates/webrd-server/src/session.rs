//! Session state machine (spec §4.5): handshake, authentication, role
//! assignment, then the serve loop.
//!
//! The serve loop is one task that concurrently watches two things via
//! `select!`: the inbound channel (frame requests, input batches) and,
//! when a capture-encode cycle is in flight, its completion. This
//! keeps the session responsive to input while a frame is being
//! produced (spec §5) without splitting the duplex channel into
//! separate reader/writer halves.

use std::sync::Arc;
use std::time::Instant;

use rd_capture::DisplayCapture;
use rd_encode::JpegEncoder;
use rd_input::InputSynth;
use rd_protocol::{ClientPacket, FrameResponse, ServerPacket};

use crate::config::Config;
use crate::dispatcher::dispatch_batch;
use crate::pacer::{FramePacer, InputBudget};
use crate::pipeline::{produce_frame, PipelineError, PipelineState};
use crate::transport::{DuplexChannel, TransportError};

/// Authenticated session role (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Controller,
    Viewer,
}

#[derive(Debug, Clone, Copy)]
struct PendingRequest {
    width: u16,
    height: u16,
    quality: u8,
}

type EncodeOutcome = (PipelineState, Result<crate::pipeline::FrameOutcome, PipelineError>, PendingRequest);

/// Runs one session end to end over `channel` until the channel closes
/// or a fatal protocol error occurs.
///
/// # Errors
///
/// Returns [`TransportError`] only if the channel itself fails outside
/// the ordinary close path; a bad packet or a failed login is handled
/// in-band (spec §7) and returns `Ok(())` once the session closes.
pub async fn run_session(
    config: Arc<Config>,
    mut channel: Box<dyn DuplexChannel>,
    capture: Arc<dyn DisplayCapture>,
    encoder: Arc<dyn JpegEncoder>,
    synth: Arc<dyn InputSynth>,
) -> Result<(), TransportError> {
    let role = match await_login(&mut channel, &config).await? {
        Some(role) => role,
        None => return Ok(()),
    };
    tracing::info!(?role, "session authenticated");

    let mut pacer = FramePacer::new(config.max_fps);
    let mut budget = InputBudget::new(config.max_ips, Instant::now());
    let mut pipeline_state = PipelineState::new();
    let mut host_size = (0u32, 0u32);
    let mut last_viewport: Option<(u16, u16)> = None;

    let mut pending: Option<PendingRequest> = None;
    let mut in_flight: Option<tokio::task::JoinHandle<EncodeOutcome>> = None;

    loop {
        if in_flight.is_none() {
            if let Some(request) = pending {
                let wait = pacer.wait_time(Instant::now());
                if wait.is_zero() {
                    pending = None;
                    in_flight = Some(spawn_encode(
                        std::mem::take(&mut pipeline_state),
                        config.clone(),
                        capture.clone(),
                        encoder.clone(),
                        request,
                    ));
                }
            }
        }

        let pace_deadline = if in_flight.is_none() {
            pending.map(|_| pacer.wait_time(Instant::now()))
        } else {
            None
        };

        tokio::select! {
            biased;

            result = async { in_flight.as_mut().unwrap().await }, if in_flight.is_some() => {
                in_flight = None;
                let (state, outcome, request) = result.expect("capture-encode task panicked");
                pipeline_state = state;
                let response = match outcome {
                    Ok(outcome) => {
                        host_size = outcome.host_size;
                        outcome.response
                    }
                    Err(err) => {
                        tracing::warn!(%err, "pipeline failure, emitting empty frame");
                        FrameResponse::Empty { width: request.width, height: request.height }
                    }
                };
                pacer.record_sent(Instant::now());
                let bytes = rd_protocol::encode_server(&ServerPacket::FrameResponse(response));
                if channel.send(bytes).await.is_err() {
                    break;
                }
            }

            _ = tokio::time::sleep(pace_deadline.unwrap_or(std::time::Duration::from_secs(3600))), if pace_deadline.is_some() => {
                // Pacer budget elapsed; loop around to kick off the encode.
            }

            message = channel.recv() => {
                let Some(bytes) = message? else { break };
                match rd_protocol::decode_client(&bytes) {
                    Ok(ClientPacket::FrameRequest { width, height, quality }) => {
                        if last_viewport != Some((width, height)) {
                            last_viewport = Some((width, height));
                        }
                        pending = Some(PendingRequest { width, height, quality });
                    }
                    Ok(ClientPacket::InputRequest { events }) => {
                        let viewport = last_viewport.unwrap_or((1, 1));
                        dispatch_batch(&events, role, viewport, host_size, synth.as_ref(), &mut budget, Instant::now());
                    }
                    Ok(ClientPacket::Login { .. }) => {
                        tracing::debug!("ignoring unexpected login after handshake");
                    }
                    Err(err) => {
                        tracing::warn!(%err, "malformed packet, closing session");
                        break;
                    }
                }
            }
        }
    }

    if let Some(handle) = in_flight {
        handle.abort();
    }
    tracing::info!("session closed");
    Ok(())
}

fn spawn_encode(
    mut state: PipelineState,
    config: Arc<Config>,
    capture: Arc<dyn DisplayCapture>,
    encoder: Arc<dyn JpegEncoder>,
    request: PendingRequest,
) -> tokio::task::JoinHandle<EncodeOutcome> {
    tokio::task::spawn_blocking(move || {
        let outcome = produce_frame(
            &mut state,
            &config,
            capture.as_ref(),
            encoder.as_ref(),
            request.width,
            request.height,
            request.quality,
        );
        (state, outcome, request)
    })
}

/// Await the session's first message and resolve it into a role, or
/// `None` if authentication failed and the session is already closed.
async fn await_login(
    channel: &mut Box<dyn DuplexChannel>,
    config: &Config,
) -> Result<Option<Role>, TransportError> {
    let Some(bytes) = channel.recv().await? else {
        return Ok(None);
    };

    let role = match rd_protocol::decode_client(&bytes) {
        Ok(ClientPacket::Login { password }) if password == config.control_password => {
            Some(Role::Controller)
        }
        Ok(ClientPacket::Login { password }) if config.view_password.as_deref() == Some(password.as_str()) => {
            Some(Role::Viewer)
        }
        Ok(ClientPacket::Login { .. }) => None,
        _ => None,
    };

    match role {
        Some(role) => Ok(Some(role)),
        None => {
            let bytes = rd_protocol::encode_server(&ServerPacket::AuthFailure);
            let _ = channel.send(bytes).await;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use crate::transport::fakes::FakeChannel;
    use rd_capture::fakes::FakeCapture;
    use rd_encode::fakes::FakeEncoder;
    use rd_input::fakes::RecordingSynth;
    use rd_protocol::{ClientPacket, Image, InputEvent, MouseButton};

    fn config(view_password: Option<&str>) -> Arc<Config> {
        Arc::new(
            Config::try_from_cli(Cli {
                port: 7417,
                password: "a".into(),
                view_password: view_password.map(str::to_owned),
                fullscreen: false,
                max_fps: 1000,
                max_ips: 1000,
                min_quality: 1,
                max_quality: 100,
                partial_frames_before_full_repaint: 20,
                empty_frames_before_full_repaint: 60,
            })
            .unwrap(),
        )
    }

    fn solid(w: u32, h: u32, v: u8) -> Image {
        Image::new(w, h, vec![v; (w * h * 4) as usize])
    }

    #[tokio::test]
    async fn wrong_password_gets_auth_failure_and_no_capture() {
        let config = config(None);
        let capture = Arc::new(FakeCapture::new(vec![solid(4, 4, 1)]));
        let channel: Box<dyn DuplexChannel> = Box::new(FakeChannel::with_inbound(vec![
            rd_protocol::encode_client(&ClientPacket::Login { password: "wrong".into() }),
        ]));
        let encoder = Arc::new(FakeEncoder);
        let synth = Arc::new(RecordingSynth::new());

        run_session(config, channel, capture.clone(), encoder, synth).await.unwrap();

        // Capture backend must still hold its single canned frame, unused.
        assert!(capture.capture(false).is_ok());
    }

    #[tokio::test]
    async fn first_frame_request_yields_full_frame() {
        let config = config(None);
        let capture = Arc::new(FakeCapture::new(vec![solid(4, 4, 1), solid(4, 4, 1)]));
        let login = rd_protocol::encode_client(&ClientPacket::Login { password: "a".into() });
        let request = rd_protocol::encode_client(&ClientPacket::FrameRequest { width: 4, height: 4, quality: 50 });
        let channel: Box<dyn DuplexChannel> = Box::new(FakeChannel::with_inbound(vec![login, request]));
        let encoder = Arc::new(FakeEncoder);
        let synth = Arc::new(RecordingSynth::new());

        // The fake channel stays "open" once its script is exhausted
        // (an idle client, not a closed one), so the session never
        // returns on its own; give it a moment to emit the frame
        // instead of awaiting completion.
        tokio::spawn(run_session(config, channel, capture, encoder, synth));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn viewer_input_never_reaches_synth() {
        let config = config(Some("v"));
        let capture = Arc::new(FakeCapture::new(vec![solid(4, 4, 1)]));
        let login = rd_protocol::encode_client(&ClientPacket::Login { password: "v".into() });
        let input = rd_protocol::encode_client(&ClientPacket::InputRequest {
            events: vec![InputEvent::MouseDown { x: 1, y: 1, button: MouseButton::Left }],
        });
        let channel: Box<dyn DuplexChannel> = Box::new(FakeChannel::with_inbound(vec![login, input]));
        let encoder = Arc::new(FakeEncoder);
        let synth = Arc::new(RecordingSynth::new());

        tokio::spawn(run_session(config, channel, capture, encoder, synth.clone()));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(synth.calls().is_empty());
    }
}
