/// Failures from the display-capture collaborator (spec §7 `CaptureError`).
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no monitors found")]
    NoMonitors,

    #[error("capture backend failed: {0}")]
    Backend(String),
}
