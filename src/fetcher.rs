use std::fmt::{Display, Formatter};

use bytes::Bytes;

pub mod http_fetcher;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    InvalidUrl(String),
    Status(u16),
    Transport(String),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            FetchError::Status(code) => write!(f, "Status code {}", code),
            FetchError::Transport(cause) => write!(f, "{}", cause),
        }
    }
}

/// Body of a successful (200) response.
#[derive(Debug, Clone)]
pub struct Resource {
    pub url: String,
    pub content_type: String,
    pub content: Bytes,
}

/// Transport used to download source images.
///
/// Implementations must report any final status other than 200 as
/// [`FetchError::Status`], and must not write anything to disk.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Resource, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FetchError::Status(404).to_string(), "Status code 404");
        assert_eq!(FetchError::InvalidUrl("nope".to_string()).to_string(), "Invalid URL: nope");
        assert_eq!(FetchError::Transport("Connection refused".to_string()).to_string(), "Connection refused");
    }
}
