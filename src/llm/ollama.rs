//! Ollama-compatible streaming client

use super::ndjson::NdjsonDecoder;
use super::types::{GenerateChunk, GenerateRequest, TagsResponse};
use super::{FragmentStream, LlmError, ModelClient};
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use reqwest::Client;
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one backend address
///
/// Holds no per-call state: every `generate_stream` is one request and one
/// response body.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Result<Self, LlmError> {
        // Streaming calls carry no overall timeout; a generation may run for
        // as long as the model keeps producing tokens.
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LlmError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn generate_stream(&self, request: &GenerateRequest) -> Result<FragmentStream, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, &body));
        }

        Ok(FragmentStream::new(decode_generate_stream(
            response.bytes_stream(),
        )))
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(CATALOG_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, &body));
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.into_names())
    }
}

/// Turn a streamed `/api/generate` body into text fragments.
///
/// Every chunk yields one fragment, except an empty final `done: true`
/// marker. The stream ends after the line carrying `done: true`, or with an
/// error if the body fails or the backend reports one inline.
pub fn decode_generate_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, LlmError>>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
{
    let state = DecodeState {
        bytes: Box::pin(bytes),
        decoder: NdjsonDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
        failure: None,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Some((Ok(fragment), state));
            }
            if state.finished {
                let failure = state.failure.take();
                return failure.map(|e| (Err(e), state));
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let chunks = state.decoder.push::<GenerateChunk>(chunk.as_ref());
                    state.absorb(chunks);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state.failure = Some(e.into());
                }
                None => {
                    let tail = state.decoder.finish::<GenerateChunk>();
                    state.absorb(tail);
                    state.finished = true;
                }
            }
        }
    })
}

struct DecodeState<S> {
    bytes: Pin<Box<S>>,
    decoder: NdjsonDecoder,
    pending: VecDeque<String>,
    finished: bool,
    failure: Option<LlmError>,
}

impl<S> DecodeState<S> {
    fn absorb(&mut self, chunks: impl IntoIterator<Item = GenerateChunk>) {
        for chunk in chunks {
            if self.finished {
                break;
            }
            if let Some(error) = chunk.error {
                self.failure = Some(LlmError::server_error(error));
                self.finished = true;
                break;
            }
            // One fragment per chunk; only a bare done marker carries nothing
            if !(chunk.done && chunk.response.is_empty()) {
                self.pending.push_back(chunk.response);
            }
            if chunk.done {
                self.finished = true;
            }
        }
    }
}
