// HTTP stream directory backend.

use std::time::Duration;

use lslmon_api::{DirectoryClient, TlsMode, TransportConfig};
use tracing::debug;

use super::{StreamDirectory, StreamHandle};
use crate::config::{HttpEndpoint, TlsVerification};
use crate::error::CoreError;
use crate::model::ResolvedStream;

/// Directory backed by an HTTP stream directory service.
pub struct HttpDirectory {
    client: DirectoryClient,
}

impl HttpDirectory {
    pub fn new(endpoint: &HttpEndpoint) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&endpoint.tls),
            timeout: endpoint.timeout,
            token: endpoint.token.clone(),
        };
        let client = DirectoryClient::new(endpoint.url.clone(), &transport)?;
        Ok(Self { client })
    }

    /// Wrap an already-built client.
    pub fn from_client(client: DirectoryClient) -> Self {
        Self { client }
    }
}

impl StreamDirectory for HttpDirectory {
    type Handle = HttpStreamHandle;

    async fn resolve(&self, wait: Duration) -> Result<Vec<ResolvedStream>, CoreError> {
        let records = self.client.list_streams(wait).await?;
        Ok(records.into_iter().map(ResolvedStream::from).collect())
    }

    async fn connect(&self, stream: &ResolvedStream) -> Result<HttpStreamHandle, CoreError> {
        let key = if stream.uid.is_empty() {
            stream.name.as_str()
        } else {
            stream.uid.as_str()
        };
        let xml = self
            .client
            .stream_info(key)
            .await
            .map_err(|e| CoreError::connection(&stream.name, e))?;
        Ok(HttpStreamHandle {
            uid: key.to_owned(),
            xml,
        })
    }
}

/// The info document fetched from the directory. Holds no connection.
pub struct HttpStreamHandle {
    uid: String,
    xml: String,
}

impl StreamHandle for HttpStreamHandle {
    fn info_xml(&self) -> &str {
        &self.xml
    }

    fn close(self) {
        debug!(uid = %self.uid, "released directory stream handle");
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
