// HTTP stream directory client
//
// Wraps `reqwest::Client` with directory-specific URL construction and
// response decoding. The directory service aggregates the streams it has
// seen on its network segment and serves their XML info documents.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::directory::models::StreamRecord;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for a stream directory service.
///
/// Endpoints:
/// - `GET {base}/streams?wait=<secs>` — JSON array of [`StreamRecord`]
/// - `GET {base}/streams/{uid}/info` — XML info document of one stream
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DirectoryClient {
    /// Create a new directory client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Self::with_client(http, Url::parse(base_url)?)
    }

    fn with_client(http: reqwest::Client, base_url: Url) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    /// The directory base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// List the streams currently advertised.
    ///
    /// `wait` is forwarded to the service, which may aggregate
    /// announcements for up to that long before answering.
    pub async fn list_streams(&self, wait: Duration) -> Result<Vec<StreamRecord>, Error> {
        let mut url = self.endpoint(&["streams"])?;
        url.query_pairs_mut()
            .append_pair("wait", &wait.as_secs_f64().to_string());
        self.get_json(url).await
    }

    /// Fetch the full XML info document (including `<desc>`) of a stream.
    pub async fn stream_info(&self, uid: &str) -> Result<String, Error> {
        let url = self.endpoint(&["streams", uid, "info"])?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.text().await?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Append path segments to the base URL, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let resp = check_status(resp).await?;
        let body = resp.text().await?;
        trace!(bytes = body.len(), "directory response");

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Map a non-success response to [`Error::Directory`], keeping the body
/// as the message.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(Error::Directory {
        status: status.as_u16(),
        message: if message.is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_owned()
        } else {
            message
        },
    })
}
