/// Failures from the JPEG-encode collaborator (spec §7 `EncodeError`).
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("jpeg encoder failed: {0}")]
    Backend(String),
}
