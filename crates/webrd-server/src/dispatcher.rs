//! Input dispatcher (spec §4.4): validates a decoded input batch against
//! the session role and translates it into calls on the OS input
//! synthesizer.

use std::time::Instant;

use rd_input::InputSynth;
use rd_protocol::InputEvent;

use crate::pacer::InputBudget;
use crate::session::Role;

/// Scale a viewport-space coordinate into host-display space, clamped
/// to the host display's bounds (spec §4.4).
fn scale_point(x: i32, y: i32, viewport: (u16, u16), host: (u32, u32)) -> (i32, i32) {
    let (vw, vh) = (f64::from(viewport.0), f64::from(viewport.1));
    let (hw, hh) = (host.0, host.1);
    if vw <= 0.0 || vh <= 0.0 || hw == 0 || hh == 0 {
        return (0, 0);
    }
    let scaled_x = (f64::from(x) * f64::from(hw) / vw).round() as i32;
    let scaled_y = (f64::from(y) * f64::from(hh) / vh).round() as i32;
    (
        scaled_x.clamp(0, hw as i32 - 1),
        scaled_y.clamp(0, hh as i32 - 1),
    )
}

/// Apply the session's rate budget and dispatch the surviving events to
/// `synth`. A `viewer` session dispatches nothing: the batch is
/// consumed but has no side effect on the synthesizer.
///
/// Events beyond the budget are dropped oldest-first, per spec §4.4.
/// An `UnknownKey` error drops just that event and continues the
/// batch; any other synthesizer error is logged and the batch
/// continues as well, since no event failure should abort the rest.
pub fn dispatch_batch(
    events: &[InputEvent],
    role: Role,
    viewport: (u16, u16),
    host_size: (u32, u32),
    synth: &dyn InputSynth,
    budget: &mut InputBudget,
    now: Instant,
) {
    if matches!(role, Role::Viewer) {
        return;
    }

    let allowed = budget.take(now, events.len());
    let dropped = events.len() - allowed;
    if dropped > 0 {
        tracing::debug!(dropped, "input events dropped by rate limiter");
    }

    for event in &events[dropped..] {
        let result = match *event {
            InputEvent::MouseMove { x, y } => {
                let (x, y) = scale_point(x, y, viewport, host_size);
                synth.move_mouse(x, y)
            }
            InputEvent::MouseDown { x, y, button } => {
                let (x, y) = scale_point(x, y, viewport, host_size);
                synth.move_mouse(x, y).and_then(|()| synth.mouse_button(button, true))
            }
            InputEvent::MouseUp { x, y, button } => {
                let (x, y) = scale_point(x, y, viewport, host_size);
                synth.move_mouse(x, y).and_then(|()| synth.mouse_button(button, false))
            }
            InputEvent::MouseScroll { x, y, dy } => {
                let (x, y) = scale_point(x, y, viewport, host_size);
                synth.move_mouse(x, y).and_then(|()| synth.scroll(dy))
            }
            InputEvent::KeyDown { ref keycode } => synth.key_down(keycode),
            InputEvent::KeyUp { ref keycode } => synth.key_up(keycode),
        };
        if let Err(err) = result {
            tracing::debug!(%err, ?event, "input event rejected");
        }
    }
}
