use thiserror::Error;

pub const CONNECTION_REFUSED_MESSAGE: &str =
    "Unable to connect to the server. Please make sure the backend is running.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to load appliances. Please try again later.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach {url}: {source}")]
    Connection { url: String, source: reqwest::Error },
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },
    #[error("{url} answered {status}")]
    Status { url: String, status: u16, message: Option<String> },
    #[error("unexpected response body from {url}: {detail}")]
    Decode { url: String, detail: String },
}

impl ClientError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_connect() {
            Self::Connection { url, source }
        } else if source.is_decode() {
            Self::Decode { url, detail: source.to_string() }
        } else {
            Self::Transport { url, source }
        }
    }

    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Text to show in place of the catalog. Backend 4xx messages pass
    /// through; everything else collapses to a generic line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection { .. } => CONNECTION_REFUSED_MESSAGE.to_string(),
            Self::Status { status, message: Some(message), .. } if (400..500).contains(status) => {
                message.clone()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}
