//! Capture-encode pipeline (spec §4.3): on each serve tick, acquire a
//! screen image, resize it to the client viewport, diff against the
//! last transmitted frame, and JPEG-encode the emitted region.

use rd_capture::{CaptureError, DisplayCapture};
use rd_encode::{resize, EncodeError, JpegEncoder};
use rd_protocol::{diff, FrameDiff, FrameResponse, Image};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Per-session pipeline state carried between serve ticks (spec §3).
#[derive(Debug, Default)]
pub struct PipelineState {
    pub last_sent_image: Option<Image>,
    pub last_viewport: Option<(u16, u16)>,
    pub partial_streak: u32,
    pub empty_streak: u32,
}

impl PipelineState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// The outcome of one successful pipeline tick: the packet to send,
/// plus the host display's native size (needed by the input dispatcher
/// for coordinate scaling).
pub struct FrameOutcome {
    pub response: FrameResponse,
    pub host_size: (u32, u32),
}

/// Run one capture-diff-encode cycle for a pending `(width, height,
/// quality)` request.
///
/// # Errors
///
/// Returns [`PipelineError`] if the capture or encode collaborator
/// fails; the caller (the session loop) is responsible for turning
/// that into an `Empty` response per spec §7, since the pipeline
/// itself has no fallback frame to emit.
pub fn produce_frame(
    state: &mut PipelineState,
    config: &Config,
    capture: &dyn DisplayCapture,
    encoder: &dyn JpegEncoder,
    width: u16,
    height: u16,
    quality: u8,
) -> Result<FrameOutcome, PipelineError> {
    let src = capture.capture(config.fullscreen)?;
    let host_size = (src.width, src.height);

    if state.last_viewport != Some((width, height)) {
        state.last_sent_image = None;
        state.last_viewport = Some((width, height));
    }

    let cur = resize(&src, u32::from(width), u32::from(height));
    let quality = config.clamp_quality(quality);

    let kind = match &state.last_sent_image {
        None => FrameDiff::Full,
        Some(prev) => {
            let candidate = diff(Some(prev), &cur);
            match candidate {
                FrameDiff::Empty if state.empty_streak + 1 >= config.empty_frames_before_full_repaint => {
                    FrameDiff::Full
                }
                FrameDiff::Partial(_) if state.partial_streak + 1 >= config.partial_frames_before_full_repaint => {
                    FrameDiff::Full
                }
                other => other,
            }
        }
    };

    let response = match kind {
        FrameDiff::Full => {
            let jpeg = encoder.encode(&cur, quality)?;
            state.last_sent_image = Some(cur);
            state.partial_streak = 0;
            state.empty_streak = 0;
            FrameResponse::Full { width, height, jpeg }
        }
        FrameDiff::Partial(rect) => {
            let patch = cur.subimage(rect);
            let jpeg = encoder.encode(&patch, quality)?;
            let mut sent = state.last_sent_image.clone().unwrap_or_else(|| cur.clone());
            sent.paste(rect, &patch);
            state.last_sent_image = Some(sent);
            state.partial_streak += 1;
            state.empty_streak = 0;
            FrameResponse::Partial {
                width,
                height,
                x: u16::try_from(rect.x).unwrap_or(u16::MAX),
                y: u16::try_from(rect.y).unwrap_or(u16::MAX),
                jpeg,
            }
        }
        FrameDiff::Empty => {
            state.empty_streak += 1;
            state.partial_streak = 0;
            FrameResponse::Empty { width, height }
        }
    };

    Ok(FrameOutcome { response, host_size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rd_capture::fakes::FakeCapture;
    use rd_encode::fakes::{FailingEncoder, FakeEncoder};

    fn solid(width: u32, height: u32, value: u8) -> Image {
        Image::new(width, height, vec![value; (width * height * 4) as usize])
    }

    fn cli() -> Config {
        use crate::config::Cli;
        Config::try_from_cli(Cli {
            port: 7417,
            password: "secret".into(),
            view_password: None,
            fullscreen: false,
            max_fps: 30,
            max_ips: 60,
            min_quality: 30,
            max_quality: 80,
            partial_frames_before_full_repaint: 2,
            empty_frames_before_full_repaint: 3,
        })
        .unwrap()
    }

    #[test]
    fn first_frame_is_always_full() {
        let config = cli();
        let capture = FakeCapture::new(vec![solid(4, 4, 1)]);
        let encoder = FakeEncoder;
        let mut state = PipelineState::new();
        let outcome = produce_frame(&mut state, &config, &capture, &encoder, 4, 4, 50).unwrap();
        assert!(matches!(outcome.response, FrameResponse::Full { .. }));
    }

    #[test]
    fn stationary_display_yields_empty_then_forced_full() {
        let config = cli(); // N_E = 3
        let frame = solid(4, 4, 7);
        let capture = FakeCapture::new(vec![frame.clone(), frame.clone(), frame.clone(), frame.clone()]);
        let encoder = FakeEncoder;
        let mut state = PipelineState::new();

        let kinds: Vec<_> = (0..4)
            .map(|_| produce_frame(&mut state, &config, &capture, &encoder, 4, 4, 50).unwrap().response)
            .collect();

        assert!(matches!(kinds[0], FrameResponse::Full { .. }));
        assert!(matches!(kinds[1], FrameResponse::Empty { .. }));
        assert!(matches!(kinds[2], FrameResponse::Empty { .. }));
        assert!(matches!(kinds[3], FrameResponse::Full { .. }));
    }

    #[test]
    fn viewport_change_forces_full() {
        let config = cli();
        let capture = FakeCapture::new(vec![solid(4, 4, 1), solid(4, 4, 1)]);
        let encoder = FakeEncoder;
        let mut state = PipelineState::new();
        produce_frame(&mut state, &config, &capture, &encoder, 4, 4, 50).unwrap();
        let second = produce_frame(&mut state, &config, &capture, &encoder, 8, 8, 50).unwrap();
        assert!(matches!(second.response, FrameResponse::Full { width: 8, height: 8, .. }));
    }

    #[test]
    fn encode_failure_surfaces_as_pipeline_error() {
        let config = cli();
        let capture = FakeCapture::new(vec![solid(4, 4, 1)]);
        let encoder = FailingEncoder;
        let mut state = PipelineState::new();
        let result = produce_frame(&mut state, &config, &capture, &encoder, 4, 4, 50);
        assert!(matches!(result, Err(PipelineError::Encode(_))));
    }

    #[test]
    fn capture_failure_surfaces_as_pipeline_error() {
        let config = cli();
        let capture = FakeCapture::new(vec![]);
        let encoder = FakeEncoder;
        let mut state = PipelineState::new();
        let result = produce_frame(&mut state, &config, &capture, &encoder, 4, 4, 50);
        assert!(result.is_err());
    }
}
