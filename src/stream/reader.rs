//! Stream Reader: opens a run and yields decoded text chunks.

use async_trait::async_trait;
use futures::stream::{BoxStream, Stream};
use futures::StreamExt;
use tracing::{debug, warn};

use super::http::{build_client, status_to_error, stream_headers};
use crate::config::StudioConfig;
use crate::error::{Result, StudioError};
use crate::types::ProviderInput;

/// Text chunks in arrival order. Ends when the server closes the response;
/// an `Err` item is always the last one.
pub type ChunkStream = BoxStream<'static, Result<String>>;

/// Source of a run's event stream.
#[async_trait]
pub trait PipelineTransport: Send + Sync {
    /// Submit `input` and return the response body as text chunks.
    async fn open(&self, input: &ProviderInput) -> Result<ChunkStream>;
}

/// Streams runs from the backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(config: &StudioConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: build_client(config)?,
            url: config.stream_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PipelineTransport for HttpTransport {
    async fn open(&self, input: &ProviderInput) -> Result<ChunkStream> {
        debug!(url = %self.url, provider = %input.name, "Opening pipeline stream");

        let resp = self
            .client
            .post(&self.url)
            .headers(stream_headers())
            .json(input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Pipeline stream rejected");
            return Err(status_to_error(status.as_u16(), &body));
        }

        Ok(decode_chunks(resp.bytes_stream()))
    }
}

/// Decode a byte stream into text without splitting multi-byte characters.
pub fn decode_chunks<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<StudioError> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut decoder = Utf8Decoder::new();
        let mut failed = false;
        futures::pin_mut!(bytes);

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    let text = decoder.decode(chunk.as_ref());
                    if !text.is_empty() {
                        yield Ok(text);
                    }
                }
                Err(e) => {
                    failed = true;
                    yield Err(e.into());
                    break;
                }
            }
        }

        if !failed {
            let tail = decoder.finish();
            if !tail.is_empty() {
                yield Ok(tail);
            }
        }
    };
    Box::pin(stream)
}

/// Incremental UTF-8 decoder.
///
/// An incomplete sequence at the end of a chunk is held until the next chunk;
/// invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }

    /// Flush held bytes at end of stream.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_multibyte_character_is_held_back() {
        let bytes = "café".as_bytes();
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&bytes[..4]), "caf");
        assert_eq!(decoder.decode(&bytes[4..]), "é");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn truncated_sequence_at_end_is_flushed_lossily() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&"é".as_bytes()[..1]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[tokio::test]
    async fn decode_chunks_stops_after_error() {
        let items: Vec<std::result::Result<Vec<u8>, StudioError>> = vec![
            Ok(b"data: ".to_vec()),
            Err(StudioError::ConnectionClosed),
            Ok(b"never".to_vec()),
        ];
        let chunks: Vec<Result<String>> = decode_chunks(futures::stream::iter(items)).collect().await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap(), "data: ");
        assert!(matches!(chunks[1], Err(StudioError::ConnectionClosed)));
    }

    #[test]
    fn transport_rejects_invalid_base_url() {
        let config = StudioConfig::new().with_base_url("localhost:8000");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(StudioError::Configuration(_))
        ));
    }
}
