//! Normalized streaming types.
//!
//! A provider-specific decoder turns each upstream event into a
//! [`StreamEvent`]; the transcoder folds those into the ordered
//! [`OutputChunk`] sequence handed to the caller.

use bytes::Bytes;

/// Section marker emitted once before the first reasoning delta.
pub const REASONING_HEADER: &str = "**Reasoning:**\n";

/// Section marker emitted once before the first answer delta, and only when
/// a reasoning section was shown first.
pub const ANSWER_HEADER: &str = "\n\n**Answer:**\n";

/// One decoded upstream event, normalized across provider schemas.
///
/// A single event may carry a reasoning delta, a content delta, both, or
/// neither; the fields are inspected independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEvent {
    /// Incremental fragment of the final answer.
    pub delta_text: Option<String>,
    /// Incremental fragment of the reasoning channel, where exposed.
    pub delta_reasoning: Option<String>,
    /// Non-null when the upstream declares the generation finished.
    pub finish_reason: Option<String>,
    /// Token usage, if the provider reports it on this event.
    pub usage: Option<Usage>,
}

/// Token usage reported by the upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens produced by the completion.
    pub completion_tokens: u32,
    /// Total tokens billed.
    pub total_tokens: u32,
}

/// Kind of an output chunk. Ordering across a call is significant: at most
/// one `ReasoningHeader` and one `AnswerHeader` are ever emitted, in that
/// relative order, and `Done` is always terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// One-shot marker opening the reasoning section.
    ReasoningHeader,
    /// A fragment of reasoning text.
    ReasoningText,
    /// One-shot marker opening the answer section.
    AnswerHeader,
    /// A fragment of answer text.
    AnswerText,
    /// Terminal chunk; never followed by further chunks.
    Done,
}

/// One unit handed to the caller: a kind tag plus UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    /// What this chunk is.
    pub kind: ChunkKind,
    /// The chunk payload. Empty for `Done`.
    pub bytes: Bytes,
}

impl OutputChunk {
    /// The one-shot reasoning section marker.
    #[must_use]
    pub fn reasoning_header() -> Self {
        Self {
            kind: ChunkKind::ReasoningHeader,
            bytes: Bytes::from_static(REASONING_HEADER.as_bytes()),
        }
    }

    /// A reasoning text fragment.
    #[must_use]
    pub fn reasoning_text(text: impl Into<String>) -> Self {
        Self {
            kind: ChunkKind::ReasoningText,
            bytes: Bytes::from(text.into()),
        }
    }

    /// The one-shot answer section marker.
    #[must_use]
    pub fn answer_header() -> Self {
        Self {
            kind: ChunkKind::AnswerHeader,
            bytes: Bytes::from_static(ANSWER_HEADER.as_bytes()),
        }
    }

    /// An answer text fragment.
    #[must_use]
    pub fn answer_text(text: impl Into<String>) -> Self {
        Self {
            kind: ChunkKind::AnswerText,
            bytes: Bytes::from(text.into()),
        }
    }

    /// The terminal chunk.
    #[must_use]
    pub fn done() -> Self {
        Self {
            kind: ChunkKind::Done,
            bytes: Bytes::new(),
        }
    }

    /// Whether this is the terminal chunk.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.kind == ChunkKind::Done
    }
}
