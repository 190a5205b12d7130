use rd_protocol::{Image, Rect};
use xcap::Monitor;

use crate::error::CaptureError;
use crate::DisplayCapture;

/// Captures the host display via the `xcap` cross-platform capture crate.
///
/// `fullscreen = false` captures only the primary monitor; `fullscreen =
/// true` captures every monitor and composites them into one image sized
/// to their bounding box, each placed at its relative on-screen offset.
#[derive(Debug, Default)]
pub struct XcapCapture;

impl XcapCapture {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DisplayCapture for XcapCapture {
    fn capture(&self, fullscreen: bool) -> Result<Image, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
        if monitors.is_empty() {
            return Err(CaptureError::NoMonitors);
        }

        if fullscreen {
            capture_all(&monitors)
        } else {
            let primary = monitors
                .iter()
                .find(|m| m.is_primary())
                .unwrap_or(&monitors[0]);
            capture_one(primary)
        }
    }
}

fn capture_one(monitor: &Monitor) -> Result<Image, CaptureError> {
    let shot = monitor
        .capture_image()
        .map_err(|e| CaptureError::Backend(e.to_string()))?;
    let (width, height) = (shot.width(), shot.height());
    Ok(Image::new(width, height, shot.into_raw()))
}

fn capture_all(monitors: &[Monitor]) -> Result<Image, CaptureError> {
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;

    let mut shots = Vec::with_capacity(monitors.len());
    for monitor in monitors {
        let shot = monitor
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;
        let x = monitor.x();
        let y = monitor.y();
        let w = shot.width() as i32;
        let h = shot.height() as i32;

        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x + w);
        max_y = max_y.max(y + h);

        shots.push((x, y, shot));
    }

    let width = (max_x - min_x) as u32;
    let height = (max_y - min_y) as u32;
    let mut canvas = Image::blank(width, height);

    for (x, y, shot) in shots {
        let (w, h) = (shot.width(), shot.height());
        let patch = Image::new(w, h, shot.into_raw());
        let rect = Rect::new((x - min_x) as u32, (y - min_y) as u32, w, h);
        canvas.paste(rect, &patch);
    }

    Ok(canvas)
}
