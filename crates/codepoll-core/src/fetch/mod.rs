//! HTTP GET of the `/codes/` endpoint.
//!
//! Uses the curl crate (libcurl) to fetch the JSON body, then decodes it with
//! serde_json. Blocking; async callers go through `source::HttpCodeSource`.

mod error;
mod parse;

pub use error::FetchError;

use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

use crate::model::CodeSet;

/// Fixed path of the codes endpoint, relative to the server origin.
pub const CODES_PATH: &str = "/codes/";

/// Upper bound on a response body; a codes list is a few hundred bytes.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Curl timeouts for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub total: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            total: Duration::from_secs(10),
        }
    }
}

/// Resolve the codes endpoint for a server origin (e.g. `http://localhost:8000`).
pub fn codes_url(server: &str) -> Result<Url> {
    let base = Url::parse(server).with_context(|| format!("invalid server URL {server:?}"))?;
    if !matches!(base.scheme(), "http" | "https") {
        anyhow::bail!("unsupported scheme {:?} in {}", base.scheme(), server);
    }
    Ok(base.join(CODES_PATH)?)
}

/// Performs a GET on `url` and decodes the codes payload.
///
/// Follows redirects. Runs in the current thread.
pub fn fetch_codes(url: &str, timeouts: HttpTimeouts) -> Result<CodeSet, FetchError> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(5)?;
    easy.connect_timeout(timeouts.connect)?;
    easy.timeout(timeouts.total)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json")?;
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if body.len() + data.len() > MAX_BODY_BYTES {
                // Returning a short count aborts the transfer.
                return Ok(0);
            }
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }

    let set = parse::parse_code_set(&body)?;
    tracing::debug!(url, codes = set.codes.len(), valid = set.valid, "fetched codes");
    Ok(set)
}
