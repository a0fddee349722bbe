//! The stream transcoder.
//!
//! Consumes the raw byte stream of an upstream event-stream response,
//! reassembles `data: <json>` framing across arbitrary chunk boundaries,
//! decodes each event with the adapter's decoder, and emits the normalized
//! [`OutputChunk`] sequence. Single-pass, pull-based, one outstanding read;
//! each byte source is consumed exactly once.

use crate::adapter::EventDecoder;
use async_stream::try_stream;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::Stream;
use futures_util::{pin_mut, StreamExt};
use relay_core::{OutputChunk, ProviderKind, RelayError, StreamEvent};
use std::sync::Arc;
use tracing::{debug, warn};

/// Event-stream line prefix.
const DATA_PREFIX: &str = "data: ";

/// End-of-stream sentinel payload.
const DONE_SENTINEL: &str = "[DONE]";

/// Reassembles complete lines from arbitrarily chunked reads.
///
/// The trailing unterminated bytes of each read are carried over and only
/// decoded once their newline (or the end of the source) arrives, so a
/// read boundary may fall mid-line or even mid-character.
#[derive(Debug, Default)]
struct LineBuffer {
    carry: Vec<u8>,
}

impl LineBuffer {
    /// Feed one read's bytes; returns the complete lines now available.
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.carry.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// Drain the remaining carry at end-of-source, if non-empty.
    fn finish(self) -> Option<String> {
        (!self.carry.is_empty()).then(|| String::from_utf8_lossy(&self.carry).into_owned())
    }
}

/// Tracks the one-shot section markers across a call.
///
/// `ReasoningHeader` is emitted at most once, before the first reasoning
/// bytes; `AnswerHeader` at most once, only after a reasoning section was
/// shown, before the first answer bytes.
#[derive(Debug, Default)]
struct SectionTracker {
    shown_reasoning: bool,
    shown_answer: bool,
}

impl SectionTracker {
    /// Chunks (headers included) for one decoded event, in emission order.
    fn chunks_for(&mut self, event: &StreamEvent) -> Vec<OutputChunk> {
        let mut chunks = Vec::new();

        if let Some(reasoning) = event.delta_reasoning.as_deref() {
            if !reasoning.is_empty() {
                if !self.shown_reasoning {
                    chunks.push(OutputChunk::reasoning_header());
                    self.shown_reasoning = true;
                }
                chunks.push(OutputChunk::reasoning_text(reasoning));
            }
        }

        if let Some(content) = event.delta_text.as_deref() {
            if !content.is_empty() {
                if self.shown_reasoning && !self.shown_answer {
                    chunks.push(OutputChunk::answer_header());
                    self.shown_answer = true;
                }
                chunks.push(OutputChunk::answer_text(content));
            }
        }

        chunks
    }
}

/// What processing one line means for the stream.
enum LineOutcome {
    /// Not a data line, or a skipped malformed event.
    Nothing,
    /// A decoded event's chunks; `finished` if it carried a finish reason.
    Chunks(Vec<OutputChunk>, bool),
    /// The `[DONE]` sentinel.
    Sentinel,
}

fn process_line(
    line: &str,
    decoder: &dyn EventDecoder,
    sections: &mut SectionTracker,
    provider: ProviderKind,
) -> LineOutcome {
    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return LineOutcome::Nothing;
    };

    if data == DONE_SENTINEL {
        return LineOutcome::Sentinel;
    }

    match decoder.decode(data) {
        Ok(event) => {
            let finished = event.finish_reason.is_some();
            LineOutcome::Chunks(sections.chunks_for(&event), finished)
        }
        Err(e) => {
            // Malformed individual events never abort the stream.
            warn!(%provider, error = %e, data, "Skipping malformed stream event");
            LineOutcome::Nothing
        }
    }
}

/// Transcode an upstream byte source into the normalized chunk sequence.
///
/// The returned stream is lazy, finite, and not restartable. It ends with a
/// single `Done` chunk on the `[DONE]` sentinel, on an upstream finish
/// reason, or on a clean end-of-source; a transport failure mid-read
/// terminates it abnormally with [`RelayError::StreamTransport`] instead.
pub fn transcode<S, E>(
    provider: ProviderKind,
    decoder: Arc<dyn EventDecoder>,
    source: S,
) -> BoxStream<'static, Result<OutputChunk, RelayError>>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let stream = try_stream! {
        pin_mut!(source);

        let mut buffer = LineBuffer::default();
        let mut sections = SectionTracker::default();
        let mut terminated = false;

        'reads: while let Some(read) = source.next().await {
            let bytes = read
                .map_err(|e| RelayError::stream_transport(provider, e.to_string()))?;

            for line in buffer.push(&bytes) {
                match process_line(&line, decoder.as_ref(), &mut sections, provider) {
                    LineOutcome::Nothing => {}
                    LineOutcome::Chunks(chunks, finished) => {
                        for chunk in chunks {
                            yield chunk;
                        }
                        if finished {
                            terminated = true;
                            break 'reads;
                        }
                    }
                    LineOutcome::Sentinel => {
                        // Stop reading immediately; anything still buffered
                        // is discarded.
                        terminated = true;
                        break 'reads;
                    }
                }
            }
        }

        if !terminated {
            // End-of-source without a sentinel or finish reason: a clean
            // but provider-irregular close. A final unterminated data line
            // is still processed so output does not depend on whether the
            // upstream flushed a trailing newline.
            debug!(%provider, "Upstream closed without [DONE] sentinel or finish reason");
            if let Some(line) = buffer.finish() {
                if let LineOutcome::Chunks(chunks, _) =
                    process_line(&line, decoder.as_ref(), &mut sections, provider)
                {
                    for chunk in chunks {
                        yield chunk;
                    }
                }
            }
        }

        yield OutputChunk::done();
    };

    stream.boxed()
}
