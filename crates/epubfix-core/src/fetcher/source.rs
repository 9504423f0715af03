//! Where image bytes come from: libcurl in production, fakes in tests.

use std::time::Duration;

use super::FetchError;
use crate::config::FixerConfig;

/// Retrieves the raw bytes behind a URL. One call is one attempt.
pub trait ImageSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP(S) GET via the curl crate.
#[derive(Debug, Clone)]
pub struct CurlSource {
    timeout: Duration,
    user_agent: String,
}

impl CurlSource {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            timeout,
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(cfg: &FixerConfig) -> Self {
        Self::new(Duration::from_secs(cfg.timeout_secs), cfg.user_agent.clone())
    }
}

impl ImageSource for CurlSource {
    /// Follows redirects; the timeout bounds the whole request.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.timeout)?;
        easy.timeout(self.timeout)?;
        easy.useragent(&self.user_agent)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(body)
    }
}
