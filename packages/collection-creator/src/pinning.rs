//! Pinning service client (Pinata).

use collection_types::ipfs_uri;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::metrics::METRICS;
use crate::selection::ImageFile;

const PIN_FILE_PATH: &str = "pinning/pinFileToIPFS";
const PIN_JSON_PATH: &str = "pinning/pinJSONToIPFS";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Stores content and returns its `ipfs://` URI.
pub trait Pinner: Send + Sync {
    fn pin_file(
        &self,
        file: &ImageFile,
    ) -> impl Future<Output = Result<String, crate::Error>> + Send;

    fn pin_json(
        &self,
        document: &Value,
    ) -> impl Future<Output = Result<String, crate::Error>> + Send;
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Parse a pin response body into an `ipfs://` URI.
pub fn parse_pin_response(body: &[u8]) -> Result<String, crate::Error> {
    let resp: PinResponse = serde_json::from_slice(body)
        .map_err(|e| crate::Error::Pinning(format!("unexpected pin response: {e}")))?;
    if resp.ipfs_hash.is_empty() {
        return Err(crate::Error::Pinning("pin response has an empty IpfsHash".into()));
    }
    Ok(ipfs_uri(&resp.ipfs_hash))
}

/// Pinata REST client authenticated with a JWT bearer token.
pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    jwt: String,
}

impl PinataClient {
    pub fn new(api_url: &str, jwt: &str, timeout: Duration) -> Result<Self, crate::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| crate::Error::Config(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            jwt: jwt.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    async fn finish(&self, what: &str, request: reqwest::RequestBuilder) -> Result<String, crate::Error> {
        let response = request.bearer_auth(&self.jwt).send().await.map_err(|e| {
            warn!(error = %e, what, "Pin request failed");
            crate::Error::Pinning(format!("{what}: {e}"))
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| crate::Error::Pinning(format!("{what}: reading response: {e}")))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let snippet: String = text.chars().take(MAX_ERROR_BODY).collect();
            warn!(status = %status, what, body = %snippet, "Pinning service rejected request");
            return Err(crate::Error::Pinning(format!("{what}: HTTP {status}: {snippet}")));
        }

        parse_pin_response(&body)
    }
}

impl Pinner for PinataClient {
    async fn pin_file(&self, file: &ImageFile) -> Result<String, crate::Error> {
        let part = reqwest::multipart::Part::stream_with_length(file.content.clone(), file.size())
            .file_name(file.name.clone())
            .mime_str(file.mime)
            .map_err(|e| crate::Error::Pinning(format!("{}: {e}", file.name)))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("pinataMetadata", json!({ "name": file.name }).to_string());

        let request = self.http.post(self.endpoint(PIN_FILE_PATH)).multipart(form);
        match self.finish(&file.name, request).await {
            Ok(uri) => {
                METRICS.record_pin(file.size());
                debug!(name = %file.name, uri = %uri, "Image pinned");
                Ok(uri)
            }
            Err(e) => {
                METRICS.record_pin_error();
                Err(e)
            }
        }
    }

    async fn pin_json(&self, document: &Value) -> Result<String, crate::Error> {
        let body = serde_json::to_vec(document)
            .map_err(|e| crate::Error::Pinning(format!("metadata serialization: {e}")))?;
        let size = body.len() as u64;
        let request = self
            .http
            .post(self.endpoint(PIN_JSON_PATH))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        match self.finish("metadata", request).await {
            Ok(uri) => {
                METRICS.record_pin(size);
                debug!(uri = %uri, "Metadata pinned");
                Ok(uri)
            }
            Err(e) => {
                METRICS.record_pin_error();
                Err(e)
            }
        }
    }
}
