/// Failures from the OS input-synthesis collaborator (spec §7 `InputError`).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown key name {0:?}")]
    UnknownKey(String),

    #[error("input backend failed: {0}")]
    Backend(String),
}
