//! Incremental parser for newline-delimited JSON response streams, as
//! produced by [`reqwest::Response::bytes_stream`]. Objects are parsed one
//! at a time as chunks arrive; blank lines are skipped and a trailing
//! unterminated line is still parsed when the stream ends.

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use thiserror::Error;

// Cap on buffered response bytes. A response that accumulates more than
// this without a newline indicates a misbehaving (or malicious) server.
const MAX_BUFFERED: usize = 1 << 22; // 4 MiB

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("the response overflowed the streaming buffer")]
    ResponseExceededBuffer,

    #[error("failed to deserialize a streamed JSON object {blob:?}: {source}")]
    DeserializationFailed {
        blob: String,
        source: serde_json::Error,
    },

    #[error("the source stream failed: {0}")]
    StreamFailed(#[source] reqwest::Error),
}

#[derive(Debug)]
pub(crate) struct NdjsonStream<S>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    stream: S,
    buf: Vec<u8>,
    max_buffered: usize,
}

impl<S: Stream<Item = reqwest::Result<Bytes>> + Unpin> NdjsonStream<S> {
    pub(crate) fn new(stream: S) -> NdjsonStream<S> {
        Self::with_max_buffered(stream, MAX_BUFFERED)
    }

    pub(crate) fn with_max_buffered(stream: S, max_buffered: usize) -> NdjsonStream<S> {
        NdjsonStream {
            stream,
            buf: Vec::new(),
            max_buffered,
        }
    }

    fn take_line(buf: &mut Vec<u8>, end: usize) -> Vec<u8> {
        let mut line: Vec<u8> = buf.drain(..=end).collect();

        line.pop(); // \n
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        line
    }

    /// The next non-empty line, without its terminator. `None` once the
    /// source stream is exhausted and the buffer is drained.
    async fn next_line(&mut self) -> Option<Result<Vec<u8>, Error>> {
        loop {
            if let Some(end) = self.buf.iter().position(|&b| b == b'\n') {
                let line = Self::take_line(&mut self.buf, end);

                if line.is_empty() {
                    continue;
                }

                return Some(Ok(line));
            }

            match self.stream.next().await {
                Some(Ok(chunk)) => {
                    if chunk.len() + self.buf.len() > self.max_buffered {
                        return Some(Err(Error::ResponseExceededBuffer));
                    }

                    self.buf.extend_from_slice(&chunk);
                }
                Some(Err(err)) => return Some(Err(Error::StreamFailed(err))),
                None => {
                    // The server closed the stream without a final newline.
                    let mut line = std::mem::take(&mut self.buf);

                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }

                    if line.is_empty() {
                        return None;
                    }

                    return Some(Ok(line));
                }
            }
        }
    }

    pub(crate) async fn parse<T: DeserializeOwned>(&mut self) -> Option<Result<T, Error>> {
        let line = self.next_line().await?;

        Some(line.and_then(|bytes| {
            serde_json::from_slice(&bytes).map_err(|e| Error::DeserializationFailed {
                blob: String::from_utf8_lossy(&bytes).into_owned(),
                source: e,
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use serde::Deserialize;

    const STREAM: &str = r#"
{"model":"gemma:2b","done":false}
{"model":"llama:7b","done":true}
"#;

    fn ndjson_stream(
        chunk_size: usize,
        raw: &'static str,
    ) -> NdjsonStream<
        futures_util::stream::Iter<std::vec::IntoIter<Result<bytes::Bytes, reqwest::Error>>>,
    > {
        let chunks: Vec<Result<Bytes, reqwest::Error>> = raw
            .as_bytes()
            .chunks(chunk_size)
            .map(|c| Ok(Bytes::from(c.to_owned())))
            .collect();

        NdjsonStream::new(stream::iter(chunks))
    }

    #[derive(Debug, Deserialize)]
    struct ModelJson {
        model: String,
        done: bool,
    }

    #[tokio::test]
    async fn parses_objects_across_arbitrary_chunk_boundaries() {
        for chunk_size in 1..STREAM.len() {
            let mut parser = ndjson_stream(chunk_size, STREAM);

            let first = parser.parse::<ModelJson>().await.unwrap().unwrap();
            assert_eq!(first.model, "gemma:2b");
            assert!(!first.done);

            let second = parser.parse::<ModelJson>().await.unwrap().unwrap();
            assert_eq!(second.model, "llama:7b");
            assert!(second.done);

            assert!(parser.parse::<ModelJson>().await.is_none());
        }
    }

    #[tokio::test]
    async fn parses_a_trailing_unterminated_line() {
        let mut parser = ndjson_stream(4, "{\"model\":\"gemma:2b\",\"done\":true}");

        let only = parser.parse::<ModelJson>().await.unwrap().unwrap();
        assert_eq!(only.model, "gemma:2b");

        assert!(parser.parse::<ModelJson>().await.is_none());
    }

    #[tokio::test]
    async fn reports_malformed_objects() {
        let mut parser = ndjson_stream(3, "{\"model\":\n");

        let result = parser.parse::<ModelJson>().await.unwrap();

        assert!(matches!(
            result.unwrap_err(),
            Error::DeserializationFailed { .. }
        ));
    }

    #[tokio::test]
    async fn rejects_a_response_that_overflows_the_buffer() {
        let chunks: Vec<Result<Bytes, reqwest::Error>> =
            vec![Ok(Bytes::from_static(b"0123456789"))];

        let mut parser = NdjsonStream::with_max_buffered(stream::iter(chunks), 8);

        let result = parser.parse::<ModelJson>().await.unwrap();

        assert!(matches!(
            result.unwrap_err(),
            Error::ResponseExceededBuffer
        ));
    }
}
