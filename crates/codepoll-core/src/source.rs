//! Where code sets come from.

use std::future::Future;

use crate::fetch::{self, FetchError, HttpTimeouts};
use crate::model::CodeSet;

/// An asynchronous provider of code sets. The controller awaits one fetch at a time.
pub trait CodeSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<CodeSet, FetchError>> + Send;
}

/// Fetches `/codes/` over HTTP with curl on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct HttpCodeSource {
    url: String,
    timeouts: HttpTimeouts,
}

impl HttpCodeSource {
    pub fn new(url: impl Into<String>, timeouts: HttpTimeouts) -> Self {
        Self {
            url: url.into(),
            timeouts,
        }
    }

    /// Source for a server origin; resolves `<server>/codes/`.
    pub fn for_server(server: &str, timeouts: HttpTimeouts) -> anyhow::Result<Self> {
        Ok(Self::new(fetch::codes_url(server)?.to_string(), timeouts))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CodeSource for HttpCodeSource {
    fn fetch(&self) -> impl Future<Output = Result<CodeSet, FetchError>> + Send {
        let url = self.url.clone();
        let timeouts = self.timeouts;
        async move {
            match tokio::task::spawn_blocking(move || fetch::fetch_codes(&url, timeouts)).await {
                Ok(result) => result,
                Err(e) => Err(FetchError::Join(e)),
            }
        }
    }
}
