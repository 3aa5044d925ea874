use std::io::Read;

use bytes::Bytes;
use log::debug;
use url::Url;

use crate::fetcher::{FetchError, Fetcher, Resource};

pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> HttpFetcher {
        HttpFetcher {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        HttpFetcher::new()
    }
}

impl From<ureq::Error> for FetchError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => FetchError::Status(code),
            ureq::Error::Transport(transport) => FetchError::Transport(transport.to_string()),
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Transport(format!("Error occurred while reading response body. {}", err))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Resource, FetchError> {
        if Url::parse(url).is_err() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let response = self.agent.get(url).call()?;

        // ureq hands back 1xx-3xx as Ok; only an exact 200 carries an image.
        if response.status() != 200 {
            return Err(FetchError::Status(response.status()));
        }

        let content_type = response.content_type().to_string();
        let mut content: Vec<u8> = Vec::new();
        response.into_reader().read_to_end(&mut content)?;

        debug!("Fetched {} - {} bytes of {}", url, content.len(), content_type);

        Ok(Resource {
            url: url.to_string(),
            content_type,
            content: Bytes::from(content),
        })
    }
}
