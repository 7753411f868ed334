//! HTTP backend abstraction for the Civitai API.
//!
//! The client talks to the network only through [`HttpBackend`], so tests
//! can swap in the canned [`testing::FakeBackend`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::header;
use serde_json::Value;
use url::Url;

use crate::config::CivitaiClientConfig;
use crate::error::{CivitaiError, CivitaiResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// An open streaming response.
pub struct StreamResponse {
    /// Raw `Content-Disposition` header, if sent.
    pub content_disposition: Option<String>,
    /// Declared body length, if sent.
    pub content_length: Option<u64>,
    /// Body chunks as they arrive. Nothing is read until polled.
    pub body: BoxStream<'static, CivitaiResult<Bytes>>,
}

/// Trait for HTTP backends.
///
/// This is an implementation detail - external code should use the
/// `CivitaiClientPort` trait.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// GET a URL and parse the body as JSON.
    async fn get_json(&self, url: &Url) -> CivitaiResult<Value>;

    /// GET a URL and return its headers plus a lazy body stream.
    async fn open_stream(&self, url: &Url) -> CivitaiResult<StreamResponse>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
pub struct ReqwestBackend {
    client: reqwest::Client,
    timeout: Duration,
    api_key: Option<String>,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &CivitaiClientConfig) -> CivitaiResult<Self> {
        // No client-wide timeout: it would also cut off long file transfers.
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| CivitaiError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.timeout,
            api_key: config.api_key.clone(),
        })
    }

    /// Build a request with optional authentication.
    fn build_request(&self, url: &Url) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url.as_str());
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }
        request
    }

    /// Map a non-success status to an error.
    fn check_status(response: reqwest::Response, url: &Url) -> CivitaiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(CivitaiError::ApiRequestFailed {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json(&self, url: &Url) -> CivitaiResult<Value> {
        let response = self.build_request(url).timeout(self.timeout).send().await?;
        let response = Self::check_status(response, url)?;
        Ok(response.json().await?)
    }

    async fn open_stream(&self, url: &Url) -> CivitaiResult<StreamResponse> {
        let response = self.build_request(url).send().await?;
        let response = Self::check_status(response, url)?;

        let content_disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(CivitaiError::from))
            .boxed();

        Ok(StreamResponse {
            content_disposition,
            content_length,
            body,
        })
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// Canned JSON outcome for the fake backend.
    #[derive(Clone)]
    pub enum CannedResponse {
        Json(Value),
        Status(u16),
    }

    /// Canned streaming body.
    #[derive(Clone, Default)]
    pub struct CannedStream {
        pub content_disposition: Option<String>,
        pub content_length: Option<u64>,
        pub chunks: Vec<Bytes>,
        /// Fail with a transfer error after yielding this many chunks.
        pub fail_after: Option<usize>,
    }

    impl CannedStream {
        /// A body of `chunks`, with a correct content length.
        pub fn from_chunks<I, C>(chunks: I) -> Self
        where
            I: IntoIterator<Item = C>,
            C: AsRef<[u8]>,
        {
            let chunks: Vec<Bytes> = chunks
                .into_iter()
                .map(|c| Bytes::copy_from_slice(c.as_ref()))
                .collect();
            let len = chunks.iter().map(|c| c.len() as u64).sum();
            Self {
                content_length: Some(len),
                chunks,
                ..Self::default()
            }
        }

        pub fn with_disposition(mut self, value: &str) -> Self {
            self.content_disposition = Some(value.to_string());
            self
        }
    }

    /// A fake HTTP backend that returns canned responses.
    ///
    /// The longest registered pattern contained in the request URL wins.
    #[derive(Default)]
    pub struct FakeBackend {
        responses: Mutex<Vec<(String, CannedResponse)>>,
        streams: Mutex<Vec<(String, CannedStream)>>,
        requests: Mutex<Vec<(String, Instant)>>,
        body_reads: Arc<AtomicUsize>,
    }

    impl FakeBackend {
        /// Create a new fake backend.
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a canned JSON response for a URL pattern.
        pub fn with_json(self, url_contains: &str, json: Value) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push((url_contains.to_string(), CannedResponse::Json(json)));
            self
        }

        /// Add a canned error status for a URL pattern.
        pub fn with_status(self, url_contains: &str, status: u16) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push((url_contains.to_string(), CannedResponse::Status(status)));
            self
        }

        /// Add a canned streaming body for a URL pattern.
        pub fn with_stream(self, url_contains: &str, stream: CannedStream) -> Self {
            self.streams
                .lock()
                .unwrap()
                .push((url_contains.to_string(), stream));
            self
        }

        /// Number of requests issued so far (JSON and streams).
        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        /// URLs requested so far, in order.
        pub fn requested_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(u, _)| u.clone())
                .collect()
        }

        /// Instants at which requests were issued.
        pub fn request_times(&self) -> Vec<Instant> {
            self.requests.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }

        /// Number of body chunks actually consumed from streams.
        pub fn body_reads(&self) -> usize {
            self.body_reads.load(Ordering::SeqCst)
        }

        fn record(&self, url: &Url) {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), Instant::now()));
        }

        fn find<T: Clone>(entries: &Mutex<Vec<(String, T)>>, url: &str) -> Option<T> {
            entries
                .lock()
                .unwrap()
                .iter()
                .filter(|(pattern, _)| url.contains(pattern.as_str()))
                .max_by_key(|(pattern, _)| pattern.len())
                .map(|(_, value)| value.clone())
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn get_json(&self, url: &Url) -> CivitaiResult<Value> {
            self.record(url);
            match Self::find(&self.responses, url.as_str()) {
                Some(CannedResponse::Json(json)) => Ok(json),
                Some(CannedResponse::Status(status)) => Err(CivitaiError::ApiRequestFailed {
                    status,
                    url: url.to_string(),
                }),
                None => Err(CivitaiError::ApiRequestFailed {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }

        async fn open_stream(&self, url: &Url) -> CivitaiResult<StreamResponse> {
            self.record(url);
            let canned = Self::find(&self.streams, url.as_str()).ok_or_else(|| {
                CivitaiError::ApiRequestFailed {
                    status: 404,
                    url: url.to_string(),
                }
            })?;

            let reads = Arc::clone(&self.body_reads);
            let fail_after = canned.fail_after;
            let body = futures_util::stream::iter(canned.chunks.into_iter().enumerate())
                .map(move |(index, chunk)| {
                    reads.fetch_add(1, Ordering::SeqCst);
                    if fail_after.is_some_and(|limit| index >= limit) {
                        Err(CivitaiError::Transfer {
                            message: "connection reset".to_string(),
                        })
                    } else {
                        Ok(chunk)
                    }
                })
                .boxed();

            Ok(StreamResponse {
                content_disposition: canned.content_disposition,
                content_length: canned.content_length,
                body,
            })
        }
    }
}
