//! Chunk configuration and output types.

// ── Configuration ───────────────────────────────────────────────────────────

/// Configuration for the chunking pass.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum characters per chunk, counted in Unicode scalar values
    /// (default: 2000).
    pub max_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self { max_chars: 2000 }
    }
}

// ── Chunk output ────────────────────────────────────────────────────────────

/// A bounded run of extracted text, ready to post as one message.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// The chunk text content.
    pub content: String,
    /// Page the text came from (1-based).
    pub page_number: usize,
}
