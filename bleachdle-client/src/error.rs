use bleachdle_core::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Page has no #{0} region")]
    MissingContent(String),
    #[error("Invalid command: {0}")]
    Command(String),
    #[error("Invalid value {value:?} for {key}")]
    Config { key: String, value: String },
    #[error(transparent)]
    Session(#[from] SessionError),
}
