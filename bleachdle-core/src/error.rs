#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown game variant: {0}")]
    UnknownVariant(String),
    #[error("Unknown stale response policy: {0}")]
    UnknownPolicy(String),
}
