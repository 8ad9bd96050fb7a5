//! Drives one cited answer from prompt to final text

use super::prompt::{build_messages, VectorSnippet};
use super::sink::{StreamSink, StreamUpdate};
use super::transport::ChatTransport;
use super::types::ChatRequest;
use crate::error::{Error, Result};
use crate::network::with_cancellation;
use crate::results::SearchResult;
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Streams model output into a sink and returns the full answer
#[derive(Clone)]
pub struct AnswerStreamer {
    transport: Arc<dyn ChatTransport>,
    model: String,
}

impl AnswerStreamer {
    pub fn new(transport: Arc<dyn ChatTransport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a cited answer for `query`.
    ///
    /// Every non-terminal chunk with content, empty strings included, is
    /// pushed to `sink` as [`StreamUpdate::Delta`] and appended to the
    /// returned text; [`StreamUpdate::End`] follows exactly once. On error or
    /// cancellation nothing is returned and `End` is not sent.
    pub async fn stream_answer(
        &self,
        query: &str,
        snippets: &[VectorSnippet],
        results: &[SearchResult],
        sink: &mut dyn StreamSink,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let span = info_span!("answer", request_id = %Uuid::new_v4(), model = %self.model);

        async {
            self.run(query, snippets, results, sink, cancel)
                .await
                .map_err(|e| {
                    error!("Answer stream failed: {}", e);
                    e
                })
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        query: &str,
        snippets: &[VectorSnippet],
        results: &[SearchResult],
        sink: &mut dyn StreamSink,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let messages = build_messages(query, snippets, results)?;
        let request = ChatRequest::streaming(self.model.clone(), messages);
        debug!(
            "Requesting answer with {} snippets and {} references",
            snippets.len(),
            results.len()
        );

        let mut stream = with_cancellation(cancel, self.transport.stream_chat(request)).await?;

        let mut accumulated = String::new();
        let mut ended = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                next = stream.next() => next,
            };
            let Some(chunk) = next else { break };
            let chunk = chunk?;

            let Some(choice) = chunk.choices.first() else {
                continue;
            };

            if choice.is_stop() {
                if !ended {
                    sink.update(StreamUpdate::End);
                    ended = true;
                }
                continue;
            }

            if let Some(content) = choice.content() {
                if ended {
                    debug!("Ignoring content received after stop");
                    continue;
                }
                sink.update(StreamUpdate::Delta(content.to_string()));
                accumulated.push_str(content);
            }
        }

        // streams cut short by length limits never send "stop"
        if !ended {
            sink.update(StreamUpdate::End);
        }

        info!("Answer complete: {} chars", accumulated.len());
        Ok(accumulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::sink::CollectSink;
    use crate::answer::transport::ChunkStream;
    use crate::answer::types::{ChatCompletionChunk, ChunkChoice};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays a fixed list of chunks and remembers the request
    struct Scripted {
        chunks: Mutex<Option<Vec<Result<ChatCompletionChunk>>>>,
        seen: Mutex<Option<ChatRequest>>,
    }

    impl Scripted {
        fn new(chunks: Vec<Result<ChatCompletionChunk>>) -> Arc<Self> {
            Arc::new(Self {
                chunks: Mutex::new(Some(chunks)),
                seen: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ChatTransport for Scripted {
        async fn stream_chat(&self, request: ChatRequest) -> Result<ChunkStream> {
            *self.seen.lock().unwrap() = Some(request);
            let chunks = self.chunks.lock().unwrap().take().unwrap_or_default();
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    async fn answer(transport: Arc<Scripted>, sink: &mut CollectSink) -> Result<String> {
        AnswerStreamer::new(transport, "test-model")
            .stream_answer("q", &[], &[], sink, &CancellationToken::new())
            .await
    }

    #[tokio::test]
    async fn test_hello_scenario() {
        let transport = Scripted::new(vec![
            Ok(ChatCompletionChunk::delta("Hel")),
            Ok(ChatCompletionChunk::delta("lo")),
            Ok(ChatCompletionChunk::stop()),
        ]);
        let mut sink = CollectSink::new();

        let text = answer(transport.clone(), &mut sink).await.unwrap();

        assert_eq!(text, "Hello");
        assert_eq!(
            sink.updates,
            vec![
                StreamUpdate::Delta("Hel".to_string()),
                StreamUpdate::Delta("lo".to_string()),
                StreamUpdate::End,
            ]
        );

        let request = transport.seen.lock().unwrap().clone().unwrap();
        assert!(request.stream);
        assert_eq!(request.model, "test-model");
    }

    #[tokio::test]
    async fn test_end_sent_once_for_repeated_stop() {
        let transport = Scripted::new(vec![
            Ok(ChatCompletionChunk::delta("a")),
            Ok(ChatCompletionChunk::stop()),
            Ok(ChatCompletionChunk::stop()),
            Ok(ChatCompletionChunk::delta("late")),
        ]);
        let mut sink = CollectSink::new();

        let text = answer(transport, &mut sink).await.unwrap();

        assert_eq!(text, "a");
        assert_eq!(sink.end_count(), 1);
        assert_eq!(sink.updates.last(), Some(&StreamUpdate::End));
    }

    #[tokio::test]
    async fn test_end_sent_when_stream_lacks_stop() {
        let transport = Scripted::new(vec![Ok(ChatCompletionChunk::delta("partial"))]);
        let mut sink = CollectSink::new();

        let text = answer(transport, &mut sink).await.unwrap();

        assert_eq!(text, "partial");
        assert_eq!(sink.end_count(), 1);
    }

    #[tokio::test]
    async fn test_choiceless_chunks_skipped_empty_deltas_forwarded() {
        let transport = Scripted::new(vec![
            Ok(ChatCompletionChunk::default()),
            Ok(ChatCompletionChunk {
                id: None,
                choices: vec![ChunkChoice::default()],
            }),
            Ok(ChatCompletionChunk::delta("")),
            Ok(ChatCompletionChunk::delta("x")),
            Ok(ChatCompletionChunk::stop()),
        ]);
        let mut sink = CollectSink::new();

        let text = answer(transport, &mut sink).await.unwrap();

        assert_eq!(text, "x");
        assert_eq!(
            sink.updates,
            vec![
                StreamUpdate::Delta(String::new()),
                StreamUpdate::Delta("x".to_string()),
                StreamUpdate::End,
            ]
        );
    }

    #[tokio::test]
    async fn test_transport_error_propagates_without_end() {
        let transport = Scripted::new(vec![
            Ok(ChatCompletionChunk::delta("Hel")),
            Err(Error::InvalidResponseFormat("broken".to_string())),
        ]);
        let mut sink = CollectSink::new();

        let err = answer(transport, &mut sink).await.unwrap_err();

        assert!(matches!(err, Error::InvalidResponseFormat(_)));
        assert_eq!(sink.end_count(), 0);
    }

    /// Yields one delta, then never produces another chunk
    struct Stalled;

    #[async_trait]
    impl ChatTransport for Stalled {
        async fn stream_chat(&self, _request: ChatRequest) -> Result<ChunkStream> {
            let first = futures::stream::iter(vec![Ok(ChatCompletionChunk::delta("Hel"))]);
            Ok(Box::pin(first.chain(futures::stream::pending())))
        }
    }

    #[tokio::test]
    async fn test_cancelled_between_chunks() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });
        let mut sink = CollectSink::new();

        let err = AnswerStreamer::new(Arc::new(Stalled), "m")
            .stream_answer("q", &[], &[], &mut sink, &token)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(sink.updates, vec![StreamUpdate::Delta("Hel".to_string())]);
        assert_eq!(sink.end_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_chunk() {
        let transport = Scripted::new(vec![Ok(ChatCompletionChunk::delta("never"))]);
        let token = CancellationToken::new();
        token.cancel();
        let mut sink = CollectSink::new();

        let err = AnswerStreamer::new(transport, "m")
            .stream_answer("q", &[], &[], &mut sink, &token)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert!(sink.updates.is_empty());
    }
}
